//! Language completion: turns the user's sentence into the assistant's spoken reply.

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use reqwest::StatusCode;

pub use gemini::GeminiClient;

#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    /// Built with [`reqwest::Error::without_url`]; the URL carries the API key.
    #[error("request to language service failed: {0}")]
    Request(reqwest::Error),

    #[error("language service returned {0}")]
    Status(StatusCode),

    #[error("could not decode language service response: {0}")]
    Decode(String),

    #[error("response has no candidate text")]
    MissingText,

    #[error("language service returned an empty reply")]
    EmptyReply,
}

/// Something that can answer a user's sentence with reply text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, user_sentence: &str) -> Result<String, CompletionError>;
}
