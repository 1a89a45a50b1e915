//! Error types for scanraster-threshold

use thiserror::Error;

/// Errors that can occur during threshold estimation
#[derive(Debug, Error)]
pub enum ThresholdError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] scanraster_core::Error),

    /// Morphology error (Gatos background estimation)
    #[error("morphology error: {0}")]
    Morph(#[from] scanraster_morph::MorphError),

    /// Unsupported pixel format for this operation
    #[error("unsupported format: expected {expected}, got {actual}")]
    UnsupportedFormat {
        /// Expected format description
        expected: &'static str,
        /// Actual format name
        actual: &'static str,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for threshold operations
pub type ThresholdResult<T> = Result<T, ThresholdError>;

/// Require an 8-bit gray input.
pub(crate) fn require_gray(image: &scanraster_core::RasterBuffer) -> ThresholdResult<()> {
    if image.format() != scanraster_core::PixelFormat::Gray8 {
        return Err(ThresholdError::UnsupportedFormat {
            expected: "8-bit gray",
            actual: image.format().name(),
        });
    }
    Ok(())
}
