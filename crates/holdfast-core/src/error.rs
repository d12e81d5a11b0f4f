//! Error types for Holdfast Core.

use thiserror::Error;

/// Errors raised at the boundary where raw input becomes core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed context: {0}")]
    MalformedContext(String),

    #[error("unknown meta type: {0}")]
    UnknownMetaType(String),

    #[error("unknown chat meta type: {0}")]
    UnknownChatMetaType(String),

    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
