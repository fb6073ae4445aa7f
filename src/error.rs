//! Error types for Maternity Flux

use thiserror::Error;

/// Errors that can occur at the boundary of the core (snapshot parsing, FFI).
///
/// The calculator and summarizer themselves never fail.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Unknown metric kind: {0}")]
    UnknownMetricKind(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
