//! Text generation abstraction
//!
//! The analysis flow only needs "prompt in, finish reason and text out", so the
//! hosted model sits behind `TextGenerator` and tests can swap in a stub.

use async_trait::async_trait;

use crate::model::{MaxOutputTokens, ModelResponse};

/// Errors raised while talking to a generation endpoint
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub candidate_count: u32,
    pub max_output_tokens: MaxOutputTokens,
}

impl GenerationConfig {
    /// Temperature 0 and a single candidate, for fact-oriented answers
    pub fn deterministic(max_output_tokens: MaxOutputTokens) -> Self {
        Self {
            temperature: 0.0,
            candidate_count: 1,
            max_output_tokens,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logging and responses
    fn model(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<ModelResponse, LlmError>;
}
