//! Session error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no stored data for this key")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
