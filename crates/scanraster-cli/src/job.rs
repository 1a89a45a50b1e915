use std::path::{Path, PathBuf};

use scanraster::output::PageSettings;
use serde::Deserialize;

use crate::error::{CliError, Result};

/// A job file: one settings record applied to a list of pages.
///
/// ```yaml
/// settings:
///   output_mode: mixed
///   despeckle: cautious
/// pages:
///   - input: scans/p001.png
///     output: out/p001.png
///     dpi: 600
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub settings: PageSettings,
    pub pages: Vec<PageJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageJob {
    pub input: String,
    pub output: String,
    /// Resolution of the input image; image files rarely carry a reliable one.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_dpi() -> u32 {
    300
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let job: JobFile = serde_yml::from_str(yaml)
            .map_err(|e| CliError::job(format!("Failed to parse job YAML: {e}")))?;
        if job.pages.is_empty() {
            return Err(CliError::job("Job lists no pages"));
        }
        if let Some(page) = job.pages.iter().find(|p| p.dpi == 0) {
            return Err(CliError::job(format!("Page {} has a zero resolution", page.input)));
        }
        Ok(job)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
