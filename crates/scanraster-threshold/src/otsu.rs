//! Otsu global thresholding
//!
//! The threshold `t` splits the histogram into class 0 = `[0, t)` (black)
//! and class 1 = `[t, 255]` (white). Otsu's method picks the `t` that
//! maximizes the between-class variance
//!
//! ```text
//! σ²_B(t) = ω0(t) · ω1(t) · (μ0(t) − μ1(t))²
//! ```
//!
//! where `ω` are the class probabilities and `μ` the class means. An empty
//! class contributes a variance of 0. Exact ties are resolved in favour of
//! the higher threshold.

use scanraster_core::GrayHistogram;

/// Lowest threshold produced by [`adjust_threshold`]
pub const MIN_ADJUSTED_THRESHOLD: i32 = 30;
/// Highest threshold produced by [`adjust_threshold`]
pub const MAX_ADJUSTED_THRESHOLD: i32 = 225;

/// Between-class variance for threshold `t`
///
/// # Arguments
///
/// * `hist` - Gray level histogram
/// * `t` - Candidate threshold; class 0 is `[0, t)`
///
/// # Returns
///
/// The normalized between-class variance, or 0.0 when either class is
/// empty.
pub fn between_class_variance(hist: &GrayHistogram, t: u8) -> f64 {
    let bins = hist.bins();
    let t = t as usize;

    let mut w0 = 0u64;
    let mut s0 = 0u64;
    for (level, &count) in bins.iter().enumerate().take(t) {
        w0 += count;
        s0 += count * level as u64;
    }
    let total = hist.total();
    let w1 = total - w0;
    if w0 == 0 || w1 == 0 {
        return 0.0;
    }
    let s1 = hist.weighted_sum() - s0;

    let total = total as f64;
    let p0 = w0 as f64 / total;
    let p1 = w1 as f64 / total;
    let mu0 = s0 as f64 / w0 as f64;
    let mu1 = s1 as f64 / w1 as f64;
    let d = mu0 - mu1;
    p0 * p1 * d * d
}

/// Otsu threshold of a histogram
///
/// Scans every candidate `t` in `0..=255`. A histogram with a single
/// occupied level has no split and yields 255.
pub fn otsu_threshold(hist: &GrayHistogram) -> u8 {
    let bins = hist.bins();
    let total = hist.total() as f64;
    let sum_all = hist.weighted_sum() as f64;
    if total == 0.0 {
        return u8::MAX;
    }

    let mut best_t = 0u8;
    let mut best_var = -1.0f64;
    let mut w0 = 0u64;
    let mut s0 = 0u64;

    for t in 0..=255usize {
        if t > 0 {
            w0 += bins[t - 1];
            s0 += bins[t - 1] * (t as u64 - 1);
        }
        let w1 = hist.total() - w0;
        let var = if w0 == 0 || w1 == 0 {
            0.0
        } else {
            let p0 = w0 as f64 / total;
            let p1 = w1 as f64 / total;
            let mu0 = s0 as f64 / w0 as f64;
            let mu1 = (sum_all - s0 as f64) / w1 as f64;
            let d = mu0 - mu1;
            p0 * p1 * d * d
        };
        if var >= best_var {
            best_var = var;
            best_t = t as u8;
        }
    }

    best_t
}

/// Apply a signed adjustment to a global threshold
///
/// The result is bounded to `30..=225` so that a page whose content went
/// entirely into picture areas still gets a usable threshold.
pub fn adjust_threshold(threshold: u8, adjustment: i32) -> u8 {
    (threshold as i32 + adjustment).clamp(MIN_ADJUSTED_THRESHOLD, MAX_ADJUSTED_THRESHOLD) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist_of(pairs: &[(usize, u64)]) -> GrayHistogram {
        let mut bins = [0u64; 256];
        for &(level, count) in pairs {
            bins[level] = count;
        }
        GrayHistogram::from_bins(bins)
    }

    #[test]
    fn test_bimodal_split_takes_higher_tie() {
        let h = hist_of(&[(50, 10), (200, 10)]);
        // every t in 51..=200 separates the modes equally well
        assert_eq!(otsu_threshold(&h), 200);
    }

    #[test]
    fn test_single_level_yields_max() {
        let h = hist_of(&[(100, 10_000)]);
        assert_eq!(otsu_threshold(&h), 255);
        assert_eq!(between_class_variance(&h, 100), 0.0);
        assert_eq!(between_class_variance(&h, 101), 0.0);
    }

    #[test]
    fn test_matches_between_class_variance() {
        let h = hist_of(&[(10, 5), (40, 20), (90, 7), (180, 30), (240, 12)]);
        let t = otsu_threshold(&h);
        let best = (0..=255u8)
            .map(|c| between_class_variance(&h, c))
            .fold(0.0, f64::max);
        assert!((between_class_variance(&h, t) - best).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_bounds() {
        assert_eq!(adjust_threshold(128, 10), 138);
        assert_eq!(adjust_threshold(255, 0), 225);
        assert_eq!(adjust_threshold(10, -50), 30);
    }
}
