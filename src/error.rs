//! Harness error types

use std::io;
use thiserror::Error;

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that end a measurement run
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Unrecognized token or out-of-range parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Scorer delay does not leave any sample to compare
    #[error("invalid delay: {delay} (buffer length {len})")]
    InvalidDelay { delay: usize, len: usize },

    /// Original and recovered buffers differ in length
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
