use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Job file error: {0}")]
    JobError(String),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Raster error: {0}")]
    RasterError(#[from] scanraster::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CliError {
    /// Create a job file error.
    pub fn job(msg: impl Into<String>) -> Self {
        Self::JobError(msg.into())
    }
}

impl From<serde_yml::Error> for CliError {
    fn from(e: serde_yml::Error) -> Self {
        Self::JobError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
