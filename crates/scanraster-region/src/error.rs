//! Error types for scanraster-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] scanraster_core::Error),

    /// Morphology error (picture mask estimation)
    #[error("morphology error: {0}")]
    Morph(#[from] scanraster_morph::MorphError),

    /// Unsupported pixel format for this operation
    #[error("unsupported format: expected {expected}, got {actual}")]
    UnsupportedFormat {
        expected: &'static str,
        actual: &'static str,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
