//! Error types for rs-prodsheet.
//!
//! This module defines the error types returned by pipeline operations.
//! Recoverable per-item conditions (a malformed JSON-LD block, a failed
//! dimension probe) are modeled as values in their modules, not as errors;
//! only conditions that end processing for a document surface here.

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The named input document does not exist or could not be read.
    #[error("input document missing: {0}")]
    InputMissing(String),

    /// HTML parsing failed.
    #[error("HTML parsing failed: {0}")]
    ParseError(String),

    /// Character encoding detection or conversion failed.
    #[error("Encoding detection failed: {0}")]
    EncodingError(String),

    /// HTTP client construction failed (probe or reasoning client).
    #[error("HTTP client setup failed: {0}")]
    ClientError(String),

    /// The reasoning service call failed in transport (timeout, quota, non-success status).
    #[error("completion request failed: {0}")]
    CompletionError(String),

    /// The reasoning service reply did not conform to the product schema.
    #[error("completion reply failed schema validation: {0}")]
    SchemaError(String),

    /// Writing the batch export failed.
    #[error("export failed: {0}")]
    ExportError(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
