//! Engine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend error: {0}")]
    Backend(#[from] gemini_client::GeminiError),

    #[error("turn cancelled")]
    Cancelled,
}
