//! Batch processing
//!
//! Pages are independent, so a batch runs them in parallel on the rayon
//! pool. A page that fails is recorded and the rest of the batch goes on.

use crate::error::OutputError;
use crate::settings::PageSettings;
use crate::stage::{CancelToken, OutputStage, StageOutput};
use rayon::prelude::*;
use scanraster_core::RasterBuffer;
use tracing::{info, instrument, warn};

/// A page that could not be processed
#[derive(Debug)]
pub struct PageFailure {
    /// Index of the page in the batch
    pub page: usize,
    pub error: OutputError,
}

/// Outcome of a batch, ordered by page index
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully processed pages
    pub outputs: Vec<(usize, StageOutput)>,
    /// Failed pages
    pub failures: Vec<PageFailure>,
}

impl BatchReport {
    /// True if no page failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of pages in the batch
    pub fn len(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    /// True for an empty batch
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Output of page `index`, if it succeeded
    pub fn output(&self, index: usize) -> Option<&StageOutput> {
        self.outputs.iter().find(|(i, _)| *i == index).map(|(_, o)| o)
    }
}

/// Process pages sharing one settings record
///
/// # Arguments
///
/// * `pages` - Page images
/// * `settings` - Settings applied to every page
/// * `cancel` - Cancels every page that has not finished yet
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn run_batch(pages: &[RasterBuffer], settings: &PageSettings, cancel: &CancelToken) -> BatchReport {
    let stage = OutputStage::new(settings.clone());
    let results: Vec<_> = pages
        .par_iter()
        .enumerate()
        .map(|(i, page)| (i, stage.process(page, cancel)))
        .collect();
    collect_report(results)
}

/// Process pages that each carry their own settings
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn run_batch_with_settings(pages: &[(RasterBuffer, PageSettings)], cancel: &CancelToken) -> BatchReport {
    let results: Vec<_> = pages
        .par_iter()
        .enumerate()
        .map(|(i, (page, settings))| (i, OutputStage::new(settings.clone()).process(page, cancel)))
        .collect();
    collect_report(results)
}

fn collect_report(results: Vec<(usize, Result<StageOutput, OutputError>)>) -> BatchReport {
    let mut report = BatchReport::default();
    // par_iter().collect() keeps input order
    for (page, result) in results {
        match result {
            Ok(output) => report.outputs.push((page, output)),
            Err(error) => {
                warn!(page, %error, "page failed");
                report.failures.push(PageFailure { page, error });
            }
        }
    }
    info!(
        processed = report.outputs.len(),
        failed = report.failures.len(),
        "batch finished"
    );
    report
}
