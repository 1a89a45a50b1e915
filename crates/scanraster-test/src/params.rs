//! Regression check bookkeeping
//!
//! A [`RegParams`] numbers every check it runs. Failed checks are logged
//! and collected; the test asserts on [`RegParams::cleanup`] at the end so
//! that one run reports every mismatch instead of stopping at the first.

use crate::error::TestResult;
use crate::{golden_dir, regout_dir};
use scanraster_core::{Mask, RasterBuffer};
use std::fs;
use std::path::Path;

/// What to do with golden files, from `REGTEST_MODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Overwrite golden files with the current output
    Generate,
    /// Compare against golden files, creating missing ones
    #[default]
    Compare,
    /// Skip golden file checks
    Display,
}

impl RegTestMode {
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE").unwrap_or_default().to_lowercase().as_str() {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// State of one regression test
pub struct RegParams {
    pub test_name: String,
    pub mode: RegTestMode,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a regression test named `test_name` (e.g. "despeckle")
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        let _ = fs::create_dir_all(golden_dir());
        let _ = fs::create_dir_all(regout_dir());
        eprintln!("== {test_name}_reg ({mode:?})");

        Self {
            test_name: test_name.to_string(),
            mode,
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Advance to the next check and record `detail` if it failed
    fn check(&mut self, ok: bool, detail: impl FnOnce() -> String) -> bool {
        self.index += 1;
        if !ok {
            let msg = format!("{}_reg #{}: {}", self.test_name, self.index, detail());
            eprintln!("  FAIL {msg}");
            self.failures.push(msg);
        }
        ok
    }

    /// `actual` must be within `delta` of `expected`
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let diff = (expected - actual).abs();
        self.check(diff <= delta, || {
            format!("expected {expected}, got {actual} (diff {diff} > {delta})")
        })
    }

    /// Rasters must agree in format, size and every pixel
    pub fn compare_raster(&mut self, r1: &RasterBuffer, r2: &RasterBuffer) -> bool {
        let geometry = (r1.size(), r1.format()) == (r2.size(), r2.format());
        let first_diff = if geometry {
            r1.data().iter().zip(r2.data()).position(|(a, b)| a != b)
        } else {
            None
        };
        let width = r1.width().max(1) as usize;
        self.check(geometry && first_diff.is_none(), || match first_diff {
            Some(pos) => format!("pixel mismatch at ({}, {})", pos % width, pos / width),
            None => format!(
                "geometry mismatch: {:?} {:?} vs {:?} {:?}",
                r1.size(),
                r1.format(),
                r2.size(),
                r2.format()
            ),
        })
    }

    pub fn compare_masks(&mut self, m1: &Mask, m2: &Mask) -> bool {
        self.check(m1 == m2, || {
            format!("mask mismatch: {} vs {} set pixels", m1.count(), m2.count())
        })
    }

    pub fn compare_strings(&mut self, data1: &[u8], data2: &[u8]) -> bool {
        self.check(data1 == data2, || {
            format!(
                "string mismatch: {:?} vs {:?}",
                String::from_utf8_lossy(data1),
                String::from_utf8_lossy(data2)
            )
        })
    }

    /// Write `data` to the regout directory and check it against the
    /// golden file of the same index
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written or read.
    pub fn write_data_and_check(&mut self, data: &[u8], ext: &str) -> TestResult<()> {
        let index = self.index + 1;
        let local = format!("{}/{}.{index:02}.{ext}", regout_dir(), self.test_name);
        let golden = format!("{}/{}_golden.{index:02}.{ext}", golden_dir(), self.test_name);
        fs::write(&local, data)?;

        let matches = match self.mode {
            RegTestMode::Display => true,
            RegTestMode::Generate => {
                fs::copy(&local, &golden)?;
                true
            }
            RegTestMode::Compare if !Path::new(&golden).exists() => {
                fs::copy(&local, &golden)?;
                eprintln!("  golden file created: {golden}");
                true
            }
            RegTestMode::Compare => fs::read(&golden)? == data,
        };
        self.check(matches, || format!("{local} differs from {golden}"));
        Ok(())
    }

    /// Report the outcome; `true` if every check passed
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("== {}_reg: ok ({} checks)", self.test_name, self.index);
        } else {
            eprintln!("== {}_reg: {} of {} checks failed", self.test_name, self.failures.len(), self.index);
        }
        self.failures.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
