//! Error types for Holdfast.

use holdfast_core::CoreError;
use thiserror::Error;

/// Errors that can occur while constructing holders or parsing their input.
///
/// The mutation and resolution operations themselves never fail; their
/// outcomes are explicit values.
#[derive(Debug, Error)]
pub enum HoldfastError {
    /// Core error (context, selector or node parsing).
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Holder identifier is empty or contains whitespace.
    #[error("invalid holder id: {0:?}")]
    InvalidHolderId(String),
}

/// Result type for Holdfast operations.
pub type Result<T> = std::result::Result<T, HoldfastError>;
