//! Threshold method selection and parameter normalization

use serde::{Deserialize, Serialize};

/// Default window side for adaptive methods
pub const DEFAULT_WINDOW: u32 = 199;
/// Default coefficient for adaptive methods
pub const DEFAULT_COEFFICIENT: f64 = 0.3;
/// Default Gatos contrast scale `q`
pub const DEFAULT_GATOS_SCALE: f64 = 0.6;
/// Default Gatos Wiener noise sigma
pub const DEFAULT_NOISE_SIGMA: f64 = 3.0;
/// Default Wolf lower bound
pub const DEFAULT_WOLF_LOWER: u8 = 1;
/// Default Wolf upper bound
pub const DEFAULT_WOLF_UPPER: u8 = 254;

const WINDOW_RANGE: std::ops::RangeInclusive<u32> = 1..=9999;
const COEFFICIENT_RANGE: std::ops::RangeInclusive<f64> = 0.01..=9.99;

/// Thresholding algorithm and its parameters
///
/// Serialized with a `method` tag, e.g.
/// `{"method": "sauvola", "window": 51, "coefficient": 0.34}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum ThresholdMethod {
    /// Global histogram threshold
    Otsu {
        #[serde(default)]
        adjustment: i32,
    },
    /// Local mean / deviation threshold
    Sauvola {
        #[serde(default = "default_window")]
        window: u32,
        #[serde(default = "default_coefficient")]
        coefficient: f64,
        #[serde(default)]
        adjustment: i32,
    },
    /// Contrast-normalized local threshold with hard bounds
    Wolf {
        #[serde(default = "default_window")]
        window: u32,
        #[serde(default = "default_coefficient")]
        coefficient: f64,
        #[serde(default)]
        adjustment: i32,
        #[serde(default = "default_wolf_lower")]
        lower_bound: u8,
        #[serde(default = "default_wolf_upper")]
        upper_bound: u8,
    },
    /// Background-surface threshold on a Wiener-filtered image
    Gatos {
        #[serde(default = "default_window")]
        window: u32,
        #[serde(default = "default_coefficient")]
        coefficient: f64,
        #[serde(default = "default_gatos_scale")]
        scale: f64,
        #[serde(default = "default_noise_sigma")]
        noise_sigma: f64,
        #[serde(default)]
        adjustment: i32,
    },
}

fn default_window() -> u32 {
    DEFAULT_WINDOW
}

fn default_coefficient() -> f64 {
    DEFAULT_COEFFICIENT
}

fn default_gatos_scale() -> f64 {
    DEFAULT_GATOS_SCALE
}

fn default_noise_sigma() -> f64 {
    DEFAULT_NOISE_SIGMA
}

fn default_wolf_lower() -> u8 {
    DEFAULT_WOLF_LOWER
}

fn default_wolf_upper() -> u8 {
    DEFAULT_WOLF_UPPER
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Otsu { adjustment: 0 }
    }
}

impl ThresholdMethod {
    /// Sauvola with default window and coefficient
    pub fn sauvola() -> Self {
        Self::Sauvola {
            window: DEFAULT_WINDOW,
            coefficient: DEFAULT_COEFFICIENT,
            adjustment: 0,
        }
    }

    /// Wolf with default window, coefficient and bounds
    pub fn wolf() -> Self {
        Self::Wolf {
            window: DEFAULT_WINDOW,
            coefficient: DEFAULT_COEFFICIENT,
            adjustment: 0,
            lower_bound: DEFAULT_WOLF_LOWER,
            upper_bound: DEFAULT_WOLF_UPPER,
        }
    }

    /// Gatos with default parameters
    pub fn gatos() -> Self {
        Self::Gatos {
            window: DEFAULT_WINDOW,
            coefficient: DEFAULT_COEFFICIENT,
            scale: DEFAULT_GATOS_SCALE,
            noise_sigma: DEFAULT_NOISE_SIGMA,
            adjustment: 0,
        }
    }

    /// Short lowercase name of the method
    pub fn name(&self) -> &'static str {
        match self {
            Self::Otsu { .. } => "otsu",
            Self::Sauvola { .. } => "sauvola",
            Self::Wolf { .. } => "wolf",
            Self::Gatos { .. } => "gatos",
        }
    }

    /// Signed threshold adjustment
    pub fn adjustment(&self) -> i32 {
        match *self {
            Self::Otsu { adjustment }
            | Self::Sauvola { adjustment, .. }
            | Self::Wolf { adjustment, .. }
            | Self::Gatos { adjustment, .. } => adjustment,
        }
    }

    /// Copy of this method with a different adjustment
    pub fn with_adjustment(&self, value: i32) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::Otsu { adjustment }
            | Self::Sauvola { adjustment, .. }
            | Self::Wolf { adjustment, .. }
            | Self::Gatos { adjustment, .. } => *adjustment = value,
        }
        out
    }

    /// Reset out-of-range parameters to their defaults
    ///
    /// Windows outside `1..=9999` become 199, coefficients outside
    /// `0.01..=9.99` become 0.3, non-positive or non-finite Gatos scale
    /// and noise sigma take their defaults, and inverted Wolf bounds are
    /// reset to `1..=254`. Window parity is fixed later, against the image
    /// size (see [`crate::WindowSize::normalize`]).
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::Otsu { .. } => {}
            Self::Sauvola {
                window, coefficient, ..
            } => {
                normalize_window(window);
                normalize_coefficient(coefficient);
            }
            Self::Wolf {
                window,
                coefficient,
                lower_bound,
                upper_bound,
                ..
            } => {
                normalize_window(window);
                normalize_coefficient(coefficient);
                if lower_bound > upper_bound {
                    *lower_bound = DEFAULT_WOLF_LOWER;
                    *upper_bound = DEFAULT_WOLF_UPPER;
                }
            }
            Self::Gatos {
                window,
                coefficient,
                scale,
                noise_sigma,
                ..
            } => {
                normalize_window(window);
                normalize_coefficient(coefficient);
                if !scale.is_finite() || *scale <= 0.0 {
                    *scale = DEFAULT_GATOS_SCALE;
                }
                if !noise_sigma.is_finite() || *noise_sigma < 0.0 {
                    *noise_sigma = DEFAULT_NOISE_SIGMA;
                }
            }
        }
        out
    }
}

fn normalize_window(window: &mut u32) {
    if !WINDOW_RANGE.contains(&*window) {
        *window = DEFAULT_WINDOW;
    }
}

fn normalize_coefficient(coefficient: &mut f64) {
    if !COEFFICIENT_RANGE.contains(&*coefficient) {
        *coefficient = DEFAULT_COEFFICIENT;
    }
}
