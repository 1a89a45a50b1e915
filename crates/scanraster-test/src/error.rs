//! Error types for the test framework

use thiserror::Error;

/// Errors raised by the harness itself, not by failed checks
#[derive(Debug, Error)]
pub enum TestError {
    #[error("failed to build synthetic image '{name}': {message}")]
    Synthetic { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TestResult<T> = Result<T, TestError>;
