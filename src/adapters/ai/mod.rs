//! AI provider adapters.
//!
//! - `OpenAIProvider` - OpenAI-compatible chat completions over HTTP
//! - `MockAIProvider` - scripted responses for tests and offline development

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
