//! Text generation collaborator and the strict parsing of its output.

pub mod client;
pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

pub use client::{OpenAiClient, OpenAiConfig};

/// Errors raised while talking to the text generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    Disabled,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("empty response")]
    EmptyResponse,
}

/// (prompt) -> text. A single attempt per call; callers decide what a failure means.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
