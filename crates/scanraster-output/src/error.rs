//! Error and warning types for scanraster-output
//!
//! [`OutputError`] aborts the current page only. [`StageWarning`]s are
//! non-fatal and travel alongside the produced image.

use crate::zone::ZoneGeometryError;
use thiserror::Error;

/// Fatal error of the output stage for one page
#[derive(Debug, Error)]
pub enum OutputError {
    /// An image or mask does not match the working image size
    #[error("dimension mismatch for {what}: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        /// Which input was mis-sized
        what: &'static str,
        /// Working image size
        expected: (u32, u32),
        /// Offending size
        actual: (u32, u32),
    },

    /// Processing was cancelled between two steps
    #[error("processing cancelled")]
    Cancelled,

    /// Settings could not be read or parsed
    #[error("settings error: {0}")]
    Settings(String),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[source] scanraster_core::Error),

    /// Morphology error
    #[error("morphology error: {0}")]
    Morph(#[from] scanraster_morph::MorphError),

    /// Threshold estimation error
    #[error("threshold error: {0}")]
    Threshold(#[from] scanraster_threshold::ThresholdError),

    /// Region analysis error
    #[error("region error: {0}")]
    Region(#[from] scanraster_region::RegionError),

    /// File system error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OutputError {
    /// Create a settings error.
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

impl From<scanraster_core::Error> for OutputError {
    fn from(e: scanraster_core::Error) -> Self {
        match e {
            scanraster_core::Error::DimensionMismatch { expected, actual } => Self::DimensionMismatch {
                what: "image",
                expected,
                actual,
            },
            other => Self::Core(other),
        }
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        Self::Settings(e.to_string())
    }
}

impl From<serde_yml::Error> for OutputError {
    fn from(e: serde_yml::Error) -> Self {
        Self::Settings(e.to_string())
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Non-fatal condition reported with the output image
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageWarning {
    /// An iterative reconstruction stopped at its iteration cap
    #[error("{step}: reconstruction stopped after {iterations} iterations without converging")]
    ConvergenceWarning {
        /// Step whose result is best effort
        step: &'static str,
        /// Iterations performed
        iterations: u32,
    },

    /// A zone was rejected and skipped
    #[error("zone {index} rejected: {reason}")]
    InvalidZoneGeometry {
        /// Position of the zone in the settings list
        index: usize,
        /// What is wrong with it
        reason: ZoneGeometryError,
    },
}
