//! Scanraster - Output compositing and adaptive binarization for scanned pages
//!
//! Given a geometrically corrected page and its settings, scanraster
//! produces the delivered raster:
//!
//! - Global and adaptive thresholding (Otsu, Sauvola, Wolf, Gatos)
//! - Fast gray morphology, grayscale reconstruction and hit-miss edge smoothing
//! - Picture detection and picture zone rectangles
//! - Despeckling of bi-level output
//! - Zone masks and Black & White / Colour / Mixed compositing
//! - Parallel batch processing
//!
//! # Example
//!
//! ```
//! use scanraster::{PixelFormat, RasterBuffer};
//! use scanraster::output::{PageSettings, process_page};
//!
//! // A light page with one dark stroke
//! let mut page = RasterBuffer::new_filled(64, 48, PixelFormat::Gray8, 220)
//!     .unwrap()
//!     .to_mut();
//! for y in 10..30 {
//!     for x in 20..24 {
//!         page.set_pixel(x, y, 30).unwrap();
//!     }
//! }
//! let out = process_page(&page.into(), &PageSettings::default()).unwrap();
//! assert_eq!(out.image.format(), PixelFormat::Bit1);
//! assert_eq!(out.image.count_black().unwrap(), 80);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use scanraster_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use scanraster_morph as morph;
pub use scanraster_output as output;
pub use scanraster_region as region;
pub use scanraster_threshold as threshold;
