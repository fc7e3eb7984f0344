//! Structured error types for flattening.

use crate::format::InputFormat;
use serde::Serialize;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors
    MalformedInput,
    UnsupportedRootType,
    NonStringKey,

    // Traversal errors
    DepthExceeded,
    UnsupportedSequence,
}

/// Failure of a flattening call. No partial output accompanies any variant.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// The raw text is not well-formed structured data.
    #[error("malformed {format} input: {message}")]
    MalformedInput { format: InputFormat, message: String },

    /// The document root is something other than a mapping.
    #[error("document root must be a mapping, found {found}")]
    UnsupportedRootType { found: &'static str },

    /// A YAML mapping key that cannot be used as a key path segment.
    #[error("mapping key under '{path}' is not a scalar")]
    NonStringKey { path: String },

    /// Nesting goes deeper than the configured limit.
    #[error("nesting at '{path}' exceeds the maximum depth of {max_depth}")]
    DepthExceeded { path: String, max_depth: usize },

    /// A sequence value was found while sequences are rejected.
    #[error("sequence value at '{path}' is not supported")]
    UnsupportedSequence { path: String },
}

impl FlattenError {
    pub fn code(&self) -> ErrorCode {
        match self {
            FlattenError::MalformedInput { .. } => ErrorCode::MalformedInput,
            FlattenError::UnsupportedRootType { .. } => ErrorCode::UnsupportedRootType,
            FlattenError::NonStringKey { .. } => ErrorCode::NonStringKey,
            FlattenError::DepthExceeded { .. } => ErrorCode::DepthExceeded,
            FlattenError::UnsupportedSequence { .. } => ErrorCode::UnsupportedSequence,
        }
    }

    pub fn malformed(format: InputFormat, err: impl std::fmt::Display) -> Self {
        FlattenError::MalformedInput {
            format,
            message: err.to_string(),
        }
    }
}

/// Result type for flattening operations.
pub type FlattenResult<T> = std::result::Result<T, FlattenError>;
