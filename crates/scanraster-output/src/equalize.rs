//! Illumination equalization
//!
//! The paper background is estimated by a gray dilation with a window of
//! about a tenth of an inch, which erases text and thin lines, and every
//! sample is divided by it: `out = min(255, v * 255 / bg)`. Colour images
//! are handled channel by channel.

use crate::error::OutputResult;
use scanraster_core::{Dpi, PixelFormat, RasterBuffer, color};
use scanraster_morph::dilate_gray;

/// Background window side for a resolution: about 1/10 inch, odd, at least 3
pub fn background_window(dpi: Dpi) -> u32 {
    let side = (dpi.min_axis() as f64 / 10.0).round() as u32;
    let odd = if side % 2 == 0 { side + 1 } else { side };
    odd.max(3)
}

/// Equalize the illumination of a gray or colour image
///
/// 1-bit images are returned unchanged.
///
/// # Errors
///
/// Returns an error if the background estimation fails.
pub fn equalize_illumination(image: &RasterBuffer) -> OutputResult<RasterBuffer> {
    let window = background_window(image.dpi());
    match image.format() {
        PixelFormat::Bit1 => Ok(image.clone()),
        PixelFormat::Gray8 => equalize_channel(image, window),
        PixelFormat::Rgb32 => {
            let (w, h) = image.size();
            let mut planes = Vec::with_capacity(3);
            for extract in [color::red, color::green, color::blue] {
                let bytes: Vec<u8> = image.data().iter().map(|&p| extract(p)).collect();
                let plane = RasterBuffer::from_gray_bytes(w, h, &bytes)?.with_dpi(image.dpi());
                planes.push(equalize_channel(&plane, window)?);
            }
            let mut out = image.to_mut();
            for (i, d) in out.data_mut().iter_mut().enumerate() {
                *d = color::compose_rgb(
                    planes[0].data()[i] as u8,
                    planes[1].data()[i] as u8,
                    planes[2].data()[i] as u8,
                );
            }
            Ok(out.into())
        }
    }
}

fn equalize_channel(gray: &RasterBuffer, window: u32) -> OutputResult<RasterBuffer> {
    let background = dilate_gray(gray, window, window)?;
    let mut out = gray.to_mut();
    for (d, &bg) in out.data_mut().iter_mut().zip(background.data()) {
        // bg >= v, so bg == 0 implies v == 0
        if bg > 0 {
            *d = (*d * 255 / bg).min(255);
        }
    }
    Ok(out.into())
}
