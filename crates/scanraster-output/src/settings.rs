//! Page settings
//!
//! [`PageSettings`] is the persisted per-page record that fully determines
//! the output of a page. It is read from JSON (the per-page record) or YAML
//! (job files), and every field has a default so partial records are
//! accepted.

use crate::error::{OutputError, OutputResult};
use crate::zone::Zone;
use scanraster_core::Dpi;
use scanraster_region::DespecklePolicy;
use scanraster_region::picture::FULL_SENSITIVITY;
use scanraster_threshold::ThresholdMethod;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output mode of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Pure bi-level output; picture layers are not consulted
    #[default]
    BlackAndWhite,
    /// The (optionally equalized) source image; no binarization
    ColorOrGrayscale,
    /// Bi-level text with source pixels kept in picture areas
    Mixed,
}

impl OutputMode {
    /// Whether this mode produces a binarization
    pub fn binarizes(self) -> bool {
        matches!(self, Self::BlackAndWhite | Self::Mixed)
    }
}

/// Layer switches for [`OutputMode::Mixed`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedOptions {
    /// Detect pictures automatically
    pub auto_layer: bool,
    /// Rectangularize detected pictures into picture zones
    pub picture_zones_layer: bool,
    /// Restore source pixels under the foreground binarization
    pub foreground_layer: bool,
}

impl Default for MixedOptions {
    fn default() -> Self {
        Self {
            auto_layer: true,
            picture_zones_layer: true,
            foreground_layer: false,
        }
    }
}

/// Everything that determines the output of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub output_mode: OutputMode,
    pub threshold: ThresholdMethod,
    pub despeckle: DespecklePolicy,
    pub zones: Vec<Zone>,
    /// Resample the page to this resolution before processing
    pub target_dpi: Option<Dpi>,
    /// Picture zone contraction sensitivity, `0..=100`
    pub picture_sensitivity: u32,
    /// Equalize the illumination of the delivered image.
    ///
    /// Mixed pages detect pictures and binarize on an equalized gray copy
    /// either way; this only decides whether the picture layer is
    /// equalized too.
    pub normalize_illumination: bool,
    /// Remove one to three pixel bumps and fill notches of the same size
    /// along the edges of the binarization
    pub smooth_edges: bool,
    pub mixed: MixedOptions,
    /// Threshold adjustment of the foreground layer binarization
    pub foreground_adjustment: i32,
    /// Collect intermediate images
    pub debug: bool,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::default(),
            threshold: ThresholdMethod::default(),
            despeckle: DespecklePolicy::default(),
            zones: Vec::new(),
            target_dpi: None,
            picture_sensitivity: FULL_SENSITIVITY,
            normalize_illumination: false,
            smooth_edges: true,
            mixed: MixedOptions::default(),
            foreground_adjustment: 0,
            debug: false,
        }
    }
}

impl PageSettings {
    /// Parse a JSON settings record.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Settings`] if the JSON is malformed.
    pub fn from_json(json: &str) -> OutputResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| OutputError::settings(format!("failed to parse settings JSON: {e}")))
    }

    /// Parse a YAML settings record.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Settings`] if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> OutputResult<Self> {
        serde_yml::from_str(yaml)
            .map_err(|e| OutputError::settings(format!("failed to parse settings YAML: {e}")))
    }

    /// Read settings from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] if the file cannot be read, or
    /// [`OutputError::Settings`] for unknown extensions and parse errors.
    pub fn from_file(path: &Path) -> OutputResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let content = std::fs::read_to_string(path)?;
        match ext.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml" | "yml") => Self::from_yaml(&content),
            _ => Err(OutputError::settings(format!(
                "unsupported settings file extension: {}",
                path.display()
            ))),
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Settings`] if serialization fails.
    pub fn to_json(&self) -> OutputResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Bring every field into its valid range
    ///
    /// * threshold parameters outside their ranges reset to defaults
    /// * sensitivity above 100 becomes 100
    /// * a target resolution with a zero axis is dropped
    pub fn normalized(&self) -> Self {
        Self {
            threshold: self.threshold.normalized(),
            picture_sensitivity: self.picture_sensitivity.min(FULL_SENSITIVITY),
            target_dpi: self.target_dpi.filter(Dpi::is_valid),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneTag;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = PageSettings::from_json(r#"{"output_mode": "mixed"}"#).unwrap();
        assert_eq!(s.output_mode, OutputMode::Mixed);
        assert_eq!(s.picture_sensitivity, 100);
        assert!(s.mixed.auto_layer);
        assert_eq!(s.threshold, ThresholdMethod::default());
    }

    #[test]
    fn test_yaml_with_zones_and_threshold() {
        let yaml = r#"
output_mode: mixed
despeckle: aggressive
threshold:
  method: sauvola
  window: 51
  coefficient: 0.2
zones:
  - tag: picture_add
    shape:
      type: polygon
      vertices: [{x: 0, y: 0}, {x: 10, y: 0}, {x: 10, y: 10}]
  - tag: fill
    fill_color: 4278190335
    shape:
      type: ellipse
      center: {x: 5, y: 5}
      rx: 2
      ry: 3
"#;
        let s = PageSettings::from_yaml(yaml).unwrap();
        assert_eq!(s.despeckle, DespecklePolicy::Aggressive);
        assert_eq!(s.threshold.name(), "sauvola");
        assert_eq!(s.zones.len(), 2);
        assert_eq!(s.zones[0].tag, ZoneTag::PictureAdd);
        assert_eq!(s.zones[1].fill_color, Some(0xff00_00ff));
    }

    #[test]
    fn test_json_round_trip() {
        let s = PageSettings {
            output_mode: OutputMode::ColorOrGrayscale,
            zones: vec![Zone::rect(1.0, 2.0, 3.0, 4.0, ZoneTag::PictureSubtractAll)],
            target_dpi: Some(Dpi::uniform(600)),
            ..PageSettings::default()
        };
        let back = PageSettings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_malformed_is_settings_error() {
        let err = PageSettings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, OutputError::Settings(_)));
    }

    #[test]
    fn test_normalized() {
        let s = PageSettings {
            picture_sensitivity: 250,
            target_dpi: Some(Dpi::new(0, 300)),
            ..PageSettings::default()
        }
        .normalized();
        assert_eq!(s.picture_sensitivity, 100);
        assert_eq!(s.target_dpi, None);
    }
}
