//! Error types for scanraster-morph

use thiserror::Error;

/// Errors that can occur during morphological operations
#[derive(Debug, Error)]
pub enum MorphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] scanraster_core::Error),

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

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;

/// Require an 8-bit gray input.
pub(crate) fn require_gray(image: &scanraster_core::RasterBuffer) -> MorphResult<()> {
    if image.format() != scanraster_core::PixelFormat::Gray8 {
        return Err(MorphError::UnsupportedFormat {
            expected: "8-bit gray",
            actual: image.format().name(),
        });
    }
    Ok(())
}
