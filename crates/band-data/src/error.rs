//! Error types for dataset parsing.

use thiserror::Error;

/// Errors that fail a whole dataset parse.
///
/// Individual malformed rows never produce these; they are skipped with a
/// logged warning.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Dataset has no header row")]
    MissingHeader,

    #[error("Header is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Pointer manifest has no dataset entries")]
    EmptyPointer,
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;
