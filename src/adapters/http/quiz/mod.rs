//! Quiz session endpoints: solo start, play, completion and results.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CompletedQuizResponse, QuestionResponse, QuizResultsResponse, SessionResponse,
    SessionWithQuestionsResponse, StartQuizRequest, SubmitAnswerRequest, SubmitAnswerResponse,
};
pub use routes::quiz_routes;
