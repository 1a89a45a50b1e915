//! scanraster-output - Zones, layer compositing and the output stage
//!
//! This crate assembles the delivered page image:
//!
//! - [`zone`] / [`rasterize`] - Tagged polygon and ellipse zones
//! - [`masks`] - Layer masks and zone application
//! - [`compositor`] - Per-mode layer compositing
//! - [`equalize`] - Illumination equalization
//! - [`settings`] - The per-page settings record
//! - [`stage`] - The output stage pipeline
//! - [`batch`] - Parallel processing of many pages
//!
//! # Example
//!
//! ```no_run
//! use scanraster_core::{PixelFormat, RasterBuffer};
//! use scanraster_output::{CancelToken, OutputMode, OutputStage, PageSettings};
//!
//! let page = RasterBuffer::new_filled(100, 100, PixelFormat::Gray8, 200).unwrap();
//! let settings = PageSettings {
//!     output_mode: OutputMode::Mixed,
//!     ..PageSettings::default()
//! };
//! let out = OutputStage::new(settings).process(&page, &CancelToken::new()).unwrap();
//! assert_eq!(out.image.size(), (100, 100));
//! ```

pub mod batch;
pub mod compositor;
pub mod equalize;
mod error;
pub mod masks;
pub mod rasterize;
pub mod settings;
pub mod stage;
pub mod zone;

pub use batch::{BatchReport, PageFailure, run_batch, run_batch_with_settings};
pub use compositor::compose;
pub use equalize::{background_window, equalize_illumination};
pub use error::{OutputError, OutputResult, StageWarning};
pub use masks::{LayerMasks, apply_fill_zones, apply_zones};
pub use rasterize::{rasterize, rasterize_into};
pub use settings::{MixedOptions, OutputMode, PageSettings};
pub use stage::{CancelToken, DebugSnapshot, OutputStage, StageOutput, process_page};
pub use zone::{Point, Zone, ZoneGeometryError, ZoneShape, ZoneTag, validate_zones};
