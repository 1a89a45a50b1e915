//! Otsu threshold regression test
//!
//! Compares the histogram scan against an exhaustive search that uses
//! exact integer arithmetic for the between-class criterion.
//!
//! Run with:
//! ```
//! cargo test -p scanraster-threshold --test otsu_reg
//! ```

use scanraster_core::{GrayHistogram, PixelFormat, RasterBuffer};
use scanraster_threshold::{ThresholdMethod, binarize, otsu_threshold};
use scanraster_test::{RegParams, synth};

/// Between-class criterion as an exact fraction `num / den`, proportional
/// to the between-class variance.
fn criterion(hist: &GrayHistogram, t: usize) -> (u128, u128) {
    let bins = hist.bins();
    let w0: u128 = bins[..t].iter().map(|&c| c as u128).sum();
    let s0: u128 = bins[..t]
        .iter()
        .enumerate()
        .map(|(l, &c)| l as u128 * c as u128)
        .sum();
    let w1 = hist.total() as u128 - w0;
    let s1 = hist.weighted_sum() as u128 - s0;
    if w0 == 0 || w1 == 0 {
        return (0, 1);
    }
    let a = s0 * w1;
    let b = s1 * w0;
    let d = a.abs_diff(b);
    (d * d, w0 * w1)
}

fn brute_force_best(hist: &GrayHistogram) -> f64 {
    (0..=255)
        .map(|t| {
            let (n, d) = criterion(hist, t);
            n as f64 / d as f64
        })
        .fold(0.0, f64::max)
}

#[test]
fn otsu_reg() {
    let mut rp = RegParams::new("otsu");

    for seed in [1u32, 7, 42, 1234, 99_999] {
        let img = synth::noise_gray(64, 48, seed).unwrap();
        let hist = GrayHistogram::from_raster(&img, None).unwrap();
        let t = otsu_threshold(&hist);
        let (n, d) = criterion(&hist, t as usize);
        let chosen = n as f64 / d as f64;
        let best = brute_force_best(&hist);
        eprintln!("  seed {} -> t = {}", seed, t);
        rp.compare_values(best, chosen, best * 1e-12);
    }

    // two separated modes: every split between them is optimal, the highest wins
    let board = synth::checkerboard(16, 16, 4, 40, 210).unwrap();
    let hist = GrayHistogram::from_raster(&board, None).unwrap();
    rp.compare_values(210.0, otsu_threshold(&hist) as f64, 0.0);

    // a uniform page comes out a single colour
    let flat = RasterBuffer::new_filled(100, 100, PixelFormat::Gray8, 100).unwrap();
    let (bw, _) = binarize(&flat, &ThresholdMethod::default(), None).unwrap();
    let black = bw.count_black().unwrap();
    rp.compare_values(1.0, if black == 0 || black == 10_000 { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "otsu regression test failed");
}
