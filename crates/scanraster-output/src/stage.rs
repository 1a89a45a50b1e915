//! The output stage
//!
//! [`OutputStage::process`] turns one geometrically corrected page into
//! the delivered image:
//!
//! 1. Normalize settings; resample to the target resolution (zones follow).
//! 2. Build the gray working copy; equalize illumination if requested.
//!    Mixed pages always get an equalized gray copy for picture detection
//!    and binarization.
//! 3. Mixed only: picture mask (auto layer), picture rectangles (picture
//!    zones layer), zone edits.
//! 4. Binarize (BlackAndWhite and Mixed) and smooth the stroke edges.
//! 5. Mixed only: clear the binarization inside picture areas.
//! 6. Despeckle; foreground layer binarization with its own adjustment.
//! 7. Compose the layers.
//! 8. Paint fill zones.
//!
//! Steps run sequentially; the [`CancelToken`] is checked between them.
//! Debug snapshots are collected only when `debug` is set and never
//! influence the produced image.

use crate::compositor::compose;
use crate::equalize::equalize_illumination;
use crate::error::{OutputError, OutputResult, StageWarning};
use crate::masks::{LayerMasks, apply_fill_zones, apply_zones};
use crate::settings::{OutputMode, PageSettings};
use crate::zone::{Zone, validate_zones};
use scanraster_core::{Mask, PixelFormat, RasterBuffer, Rect};
use scanraster_morph::smooth_edges;
use scanraster_region::{DespeckleReport, despeckle_with_report, detect, estimate_picture_mask, rects_to_mask};
use scanraster_threshold::{Estimate, ThresholdMethod, binarize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};

/// Shared cancellation flag
///
/// Clones share the same flag, so one token can stop a whole batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checkpoint between two steps
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> OutputResult<()> {
        if self.is_cancelled() {
            Err(OutputError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Intermediate image recorded in debug mode
#[derive(Debug, Clone)]
pub struct DebugSnapshot {
    /// Step name, e.g. `"binarization"`
    pub name: &'static str,
    /// Image produced by the step
    pub image: RasterBuffer,
    /// Warnings raised by the step that produced this image
    pub warnings: Vec<StageWarning>,
}

/// Result of processing one page
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// The delivered page
    pub image: RasterBuffer,
    /// Picture rectangles found by the detector (Mixed only)
    pub picture_zones: Vec<Rect>,
    /// What despeckling removed
    pub despeckle: DespeckleReport,
    /// Intermediate images; empty unless debug is on
    pub snapshots: Vec<DebugSnapshot>,
    /// Non-fatal conditions
    pub warnings: Vec<StageWarning>,
}

/// Collects snapshots only when enabled
struct DebugSink {
    enabled: bool,
    snapshots: Vec<DebugSnapshot>,
}

impl DebugSink {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            snapshots: Vec::new(),
        }
    }

    fn add(&mut self, name: &'static str, image: impl FnOnce() -> RasterBuffer, warnings: &[StageWarning]) {
        if self.enabled {
            debug!(name, "debug snapshot");
            self.snapshots.push(DebugSnapshot {
                name,
                image: image(),
                warnings: warnings.to_vec(),
            });
        }
    }
}

/// Output stage configured for one page
#[derive(Debug, Clone)]
pub struct OutputStage {
    settings: PageSettings,
}

impl OutputStage {
    /// Create a stage; the settings are normalized
    pub fn new(settings: PageSettings) -> Self {
        Self {
            settings: settings.normalized(),
        }
    }

    /// Normalized settings in effect
    pub fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Process one page
    ///
    /// # Arguments
    ///
    /// * `input` - Page image in any pixel format
    /// * `cancel` - Checked between steps
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Cancelled`] if cancelled, or the first fatal
    /// error of any step. Invalid zones and capped reconstructions are not
    /// errors; they are reported in [`StageOutput::warnings`].
    #[instrument(skip_all, fields(width = input.width(), height = input.height(), mode = ?self.settings.output_mode))]
    pub fn process(&self, input: &RasterBuffer, cancel: &CancelToken) -> OutputResult<StageOutput> {
        let settings = &self.settings;
        let mode = settings.output_mode;
        let mut sink = DebugSink::new(settings.debug);
        cancel.check()?;

        // 1. resolution
        let (source, zones) = self.resample(input)?;
        let (zones, mut warnings) = validate_zones(&zones);
        for w in &warnings {
            warn!(%w, "zone skipped");
        }
        cancel.check()?;

        // 2. working copies
        let mut base = if source.format() == PixelFormat::Bit1 {
            source.to_gray()
        } else {
            source
        };
        let mut gray = base.to_gray();
        sink.add("grayscale", || gray.clone(), &[]);
        if settings.normalize_illumination {
            base = equalize_illumination(&base)?;
            gray = base.to_gray();
            sink.add("equalized", || gray.clone(), &[]);
        } else if mode == OutputMode::Mixed {
            // the picture layer keeps the source colours
            gray = equalize_illumination(&gray)?;
            sink.add("equalized", || gray.clone(), &[]);
        }
        cancel.check()?;

        let (w, h) = gray.size();
        let dpi = gray.dpi();
        let mut masks = LayerMasks::empty(w, h)?;
        let mut picture_zones = Vec::new();

        // 3. picture layers
        if mode == OutputMode::Mixed {
            let opts = settings.mixed;
            if opts.auto_layer || opts.picture_zones_layer {
                let pm = estimate_picture_mask(&gray)?;
                let notes = convergence("picture-mask", pm.converged, pm.iterations);
                sink.add("picture-mask", || RasterBuffer::from_mask(&pm.mask, dpi), &notes);
                warnings.extend(notes);

                if opts.picture_zones_layer {
                    picture_zones = detect(&pm.mask, settings.picture_sensitivity)?;
                    masks.picture_zones = rects_to_mask(&picture_zones, w, h)?;
                    debug!(count = picture_zones.len(), "picture zones detected");
                    sink.add(
                        "picture-zones",
                        || RasterBuffer::from_mask(&masks.picture_zones, dpi),
                        &[],
                    );
                }
                if opts.auto_layer {
                    masks.auto = pm.mask;
                }
            }
            apply_zones(&zones, &mut masks)?;
            cancel.check()?;
        }

        // 4-6. binarization, picture clearing, despeckling, foreground layer
        let mut despeckle = DespeckleReport::default();
        let binarized = if mode.binarizes() {
            let picture_area = if mode == OutputMode::Mixed {
                Some(masks.picture_area()?)
            } else {
                None
            };

            let bw = self.binarize_text(&gray, &settings.threshold, picture_area.as_ref(), &mut sink, &mut warnings)?;
            cancel.check()?;

            let (bw, report) = despeckle_with_report(&bw, settings.despeckle, dpi)?;
            debug!(removed = report.removed, threshold = ?report.threshold, "despeckled");
            despeckle = report;
            sink.add("despeckled", || bw.clone(), &[]);
            cancel.check()?;

            if mode == OutputMode::Mixed && settings.mixed.foreground_layer {
                let fg_bw = if settings.foreground_adjustment == settings.threshold.adjustment() {
                    bw.clone()
                } else {
                    let method = settings.threshold.with_adjustment(settings.foreground_adjustment);
                    let mut scratch = DebugSink::new(false);
                    let fg = self.binarize_text(&gray, &method, picture_area.as_ref(), &mut scratch, &mut warnings)?;
                    despeckle_with_report(&fg, settings.despeckle, dpi)?.0
                };
                masks.foreground = Some(fg_bw.to_mask()?);
                // picks up PictureSubtractAll for the new layer; re-applying is idempotent
                apply_zones(&zones, &mut masks)?;
                if let Some(fg) = &masks.foreground {
                    sink.add("foreground-mask", || RasterBuffer::from_mask(fg, dpi), &[]);
                }
                cancel.check()?;
            }
            Some(bw)
        } else {
            None
        };

        // 7. compose
        let composed = compose(&base, binarized.as_ref(), &masks, mode)?;
        sink.add("composited", || composed.clone(), &[]);
        cancel.check()?;

        // 8. fill zones
        let image = apply_fill_zones(&composed, &zones)?;

        info!(
            picture_zones = picture_zones.len(),
            removed_specks = despeckle.removed,
            warnings = warnings.len(),
            "page processed"
        );

        Ok(StageOutput {
            image,
            picture_zones,
            despeckle,
            snapshots: sink.snapshots,
            warnings,
        })
    }

    /// Resample to the target resolution and map the zones along
    fn resample(&self, input: &RasterBuffer) -> OutputResult<(RasterBuffer, Vec<Zone>)> {
        let Some(target) = self.settings.target_dpi else {
            return Ok((input.clone(), self.settings.zones.clone()));
        };
        if target == input.dpi() {
            return Ok((input.clone(), self.settings.zones.clone()));
        }

        let scaled = input.scale_to_dpi(target)?;
        let sx = scaled.width() as f64 / input.width() as f64;
        let sy = scaled.height() as f64 / input.height() as f64;
        debug!(from = ?input.dpi(), to = ?target, width = scaled.width(), height = scaled.height(), "resampled");
        let zones = self.settings.zones.iter().map(|z| z.scaled(sx, sy)).collect();
        Ok((scaled, zones))
    }

    /// Binarize the text area of the page
    ///
    /// Global statistics are taken outside the picture area, and pixels
    /// inside it are cleared from the result.
    fn binarize_text(
        &self,
        gray: &RasterBuffer,
        method: &ThresholdMethod,
        picture_area: Option<&Mask>,
        sink: &mut DebugSink,
        warnings: &mut Vec<StageWarning>,
    ) -> OutputResult<RasterBuffer> {
        let text_area = picture_area.map(|area| {
            let mut text = area.clone();
            text.invert();
            text
        });
        let histogram_mask = text_area.as_ref().filter(|m| !m.is_empty());

        let (bw, estimate) = binarize(gray, method, histogram_mask)?;
        let notes = estimate_notes(&estimate);
        debug!(method = method.name(), converged = estimate.converged, "binarized");

        let bw = clear_area(bw, picture_area);
        sink.add("binarization", || bw.clone(), &notes);
        warnings.extend(notes);

        if !self.settings.smooth_edges {
            return Ok(bw);
        }
        // notches along a picture border must not grow into the picture
        let bw = clear_area(smooth_edges(&bw)?, picture_area);
        sink.add("edges_smoothed", || bw.clone(), &[]);
        Ok(bw)
    }
}

/// Turn every pixel inside `area` white
fn clear_area(bw: RasterBuffer, area: Option<&Mask>) -> RasterBuffer {
    match area {
        Some(area) if !area.is_empty() => {
            let mut out = bw.to_mut();
            for (d, &pic) in out.data_mut().iter_mut().zip(area.bits()) {
                if pic {
                    *d = 0;
                }
            }
            out.into()
        }
        _ => bw,
    }
}

fn convergence(step: &'static str, converged: bool, iterations: u32) -> Vec<StageWarning> {
    if converged {
        return Vec::new();
    }
    warn!(step, iterations, "reconstruction did not converge");
    vec![StageWarning::ConvergenceWarning { step, iterations }]
}

fn estimate_notes(estimate: &Estimate) -> Vec<StageWarning> {
    convergence("binarization", estimate.converged, estimate.iterations.unwrap_or(0))
}

/// Process one page with the given settings
///
/// # Errors
///
/// See [`OutputStage::process`].
pub fn process_page(input: &RasterBuffer, settings: &PageSettings) -> OutputResult<StageOutput> {
    OutputStage::new(settings.clone()).process(input, &CancelToken::new())
}
