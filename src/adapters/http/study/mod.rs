//! AI study tools: note generation, quiz generation and document extraction.

mod dto;
mod handlers;
mod routes;

pub use dto::{GenerateNotesRequest, GenerateQuizRequest, GeneratedQuizResponse};
pub use routes::study_routes;
