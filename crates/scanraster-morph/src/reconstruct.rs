//! Grayscale reconstruction by dilation
//!
//! The marker image is repeatedly dilated (geodesic dilation) and clipped
//! to the mask image until nothing changes. Propagation uses alternating
//! raster scans: a forward pass (top-left to bottom-right) that looks at
//! the already-visited neighbors above and to the left, then a backward
//! pass that looks below and to the right.
//!
//! The number of forward/backward iterations is capped by the image
//! diagonal. Hitting the cap is not an error; the partial result is
//! returned with `converged == false` so callers can report it.

use crate::error::{MorphError, MorphResult, require_gray};
use scanraster_core::{ConnectivityType, PixelFormat, RasterBuffer};

/// Result of a reconstruction run
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// Reconstructed 8-bit image (always `<= mask`)
    pub image: RasterBuffer,
    /// Whether propagation reached a fixed point
    pub converged: bool,
    /// Number of forward/backward iterations performed
    pub iterations: u32,
}

/// Default iteration cap: the image diagonal, rounded up.
pub fn iteration_limit(width: u32, height: u32) -> u32 {
    let diag = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
    (diag.ceil() as u32).max(1)
}

/// Grayscale reconstruction of `marker` under `mask`
///
/// # Arguments
///
/// * `marker` - 8-bit seed image
/// * `mask` - 8-bit clipping image, same size as `marker`
/// * `connectivity` - Neighborhood used for propagation
///
/// # Returns
///
/// A [`Reconstruction`] whose image satisfies
/// `min(marker, mask) <= image <= mask` pixelwise.
///
/// # Errors
///
/// Returns an error if either image is not 8-bit gray or the sizes differ.
pub fn grayscale_reconstruct(
    marker: &RasterBuffer,
    mask: &RasterBuffer,
    connectivity: ConnectivityType,
) -> MorphResult<Reconstruction> {
    let limit = iteration_limit(marker.width(), marker.height());
    grayscale_reconstruct_with_limit(marker, mask, connectivity, limit)
}

/// Grayscale reconstruction with an explicit iteration cap
///
/// Same as [`grayscale_reconstruct`], but stops after `max_iterations`
/// forward/backward iterations.
///
/// # Errors
///
/// Returns an error if either image is not 8-bit gray, the sizes differ,
/// or `max_iterations` is zero.
pub fn grayscale_reconstruct_with_limit(
    marker: &RasterBuffer,
    mask: &RasterBuffer,
    connectivity: ConnectivityType,
    max_iterations: u32,
) -> MorphResult<Reconstruction> {
    require_gray(marker)?;
    require_gray(mask)?;
    mask.check_size(marker.size())?;
    if max_iterations == 0 {
        return Err(MorphError::InvalidParameters(
            "max_iterations must be at least 1".to_string(),
        ));
    }

    let w = marker.width() as i32;
    let h = marker.height() as i32;
    let limit: Vec<u8> = mask.data().iter().map(|&v| v as u8).collect();
    let mut out: Vec<u8> = marker
        .data()
        .iter()
        .zip(&limit)
        .map(|(&m, &l)| (m as u8).min(l))
        .collect();

    let forward = connectivity.causal_offsets();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let mut changed = false;

        // Forward pass
        for y in 0..h {
            for x in 0..w {
                changed |= propagate(&mut out, &limit, w, h, x, y, forward, 1);
            }
        }

        // Backward pass
        for y in (0..h).rev() {
            for x in (0..w).rev() {
                changed |= propagate(&mut out, &limit, w, h, x, y, forward, -1);
            }
        }

        if !changed {
            converged = true;
            break;
        }
    }

    let mut result = marker.create_template(PixelFormat::Gray8)?;
    for (d, &v) in result.data_mut().iter_mut().zip(&out) {
        *d = v as u32;
    }

    Ok(Reconstruction {
        image: result.into(),
        converged,
        iterations,
    })
}

/// Raise pixel (x, y) to the max of its visited neighbors, clipped to the mask.
#[inline]
#[allow(clippy::too_many_arguments)]
fn propagate(
    out: &mut [u8],
    limit: &[u8],
    w: i32,
    h: i32,
    x: i32,
    y: i32,
    offsets: &[(i32, i32)],
    sign: i32,
) -> bool {
    let idx = (y * w + x) as usize;
    let current = out[idx];
    let cap = limit[idx];
    if current == cap {
        return false;
    }

    let mut best = current;
    for &(dx, dy) in offsets {
        let nx = x + dx * sign;
        let ny = y + dy * sign;
        if nx >= 0 && ny >= 0 && nx < w && ny < h {
            best = best.max(out[(ny * w + nx) as usize]);
        }
    }

    let new_val = best.min(cap);
    if new_val > current {
        out[idx] = new_val;
        true
    } else {
        false
    }
}

/// Fill holes in a grayscale image
///
/// A hole is a dark basin that is not connected to the image border
/// through pixels at least as dark. Holes are raised to the level of
/// their lowest surrounding rim.
///
/// Implemented as reconstruction on the inverted image, seeded from the
/// border.
///
/// # Errors
///
/// Returns an error if the image is not 8-bit gray.
pub fn fill_holes_gray(image: &RasterBuffer, connectivity: ConnectivityType) -> MorphResult<Reconstruction> {
    require_gray(image)?;
    let (w, h) = image.size();

    let inverted = image.invert()?;
    let mut marker = image.create_template(PixelFormat::Gray8)?;
    for y in 0..h {
        for x in 0..w {
            if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                let v = inverted.get_pixel(x, y).unwrap_or(0);
                marker.set_pixel_unchecked(x, y, v);
            }
        }
    }

    let rec = grayscale_reconstruct(&marker.into(), &inverted, connectivity)?;
    Ok(Reconstruction {
        image: rec.image.invert()?,
        converged: rec.converged,
        iterations: rec.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(w: u32, h: u32, values: &[u8]) -> RasterBuffer {
        RasterBuffer::from_gray_bytes(w, h, values).unwrap()
    }

    #[test]
    fn test_iteration_limit() {
        assert_eq!(iteration_limit(3, 4), 5);
        assert_eq!(iteration_limit(1, 1), 2);
        assert_eq!(iteration_limit(100, 100), 142);
    }

    #[test]
    fn test_single_seed_floods_plateau() {
        let mask = gray(5, 1, &[200, 200, 200, 50, 200]);
        let marker = gray(5, 1, &[0, 0, 180, 0, 0]);
        let rec = grayscale_reconstruct(&marker, &mask, ConnectivityType::EightWay).unwrap();
        assert!(rec.converged);
        assert_eq!(rec.image.data(), &[180, 180, 180, 50, 50]);
    }

    #[test]
    fn test_marker_clipped_to_mask() {
        let mask = gray(3, 1, &[10, 20, 30]);
        let marker = gray(3, 1, &[255, 255, 255]);
        let rec = grayscale_reconstruct(&marker, &mask, ConnectivityType::FourWay).unwrap();
        assert_eq!(rec.image.data(), &[10, 20, 30]);
        assert_eq!(rec.iterations, 1);
    }

    #[test]
    fn test_four_way_blocks_diagonal() {
        #[rustfmt::skip]
        let mask = gray(2, 2, &[
            100, 0,
            0, 100,
        ]);
        let marker = gray(2, 2, &[100, 0, 0, 0]);
        let four = grayscale_reconstruct(&marker, &mask, ConnectivityType::FourWay).unwrap();
        assert_eq!(four.image.get_pixel(1, 1), Some(0));
        let eight = grayscale_reconstruct(&marker, &mask, ConnectivityType::EightWay).unwrap();
        assert_eq!(eight.image.get_pixel(1, 1), Some(100));
    }

    #[test]
    fn test_size_mismatch() {
        let a = gray(2, 2, &[0; 4]);
        let b = gray(3, 1, &[0; 3]);
        assert!(matches!(
            grayscale_reconstruct(&a, &b, ConnectivityType::EightWay),
            Err(MorphError::Core(scanraster_core::Error::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_limit_reports_non_convergence() {
        let mask = gray(4, 1, &[200; 4]);
        let marker = gray(4, 1, &[0, 0, 0, 200]);
        // the first iteration changes pixels, so a cap of one cannot confirm a fixed point
        let rec =
            grayscale_reconstruct_with_limit(&marker, &mask, ConnectivityType::EightWay, 1).unwrap();
        assert!(!rec.converged);
        assert_eq!(rec.iterations, 1);
    }

    #[test]
    fn test_fill_holes_raises_basin() {
        #[rustfmt::skip]
        let img = gray(5, 5, &[
            200, 200, 200, 200, 200,
            200, 150, 150, 150, 200,
            200, 150,  10, 150, 200,
            200, 150, 150, 150, 200,
            200, 200, 200, 200, 200,
        ]);
        let filled = fill_holes_gray(&img, ConnectivityType::FourWay).unwrap();
        assert!(filled.converged);
        assert!(filled.image.data().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_fill_holes_keeps_open_basin() {
        let img = gray(5, 1, &[10, 10, 200, 10, 10]);
        let filled = fill_holes_gray(&img, ConnectivityType::FourWay).unwrap();
        assert_eq!(filled.image.data(), img.data());
    }
}
