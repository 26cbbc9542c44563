//! Explicit configuration for detection, field extraction and output.
//!
//! Two presets mirror the two card layouts the scanner has been tuned for:
//! [`Preset::Collection`] (adaptive threshold, four-column table) and
//! [`Preset::Details`] (Otsu threshold, two-column table). A JSON file can
//! override any field of a preset; fields it omits keep the preset's value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CardScanError, Result};
use crate::models::FieldRegion;

pub const NAME_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-/.()&! ";
pub const SET_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-/";

/// How the local threshold of an adaptive binarization is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    /// Gaussian-weighted neighbourhood mean
    Gaussian,
    /// Unweighted neighbourhood mean
    Mean,
}

/// Binarization strategy for whole-screenshot card detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Local threshold per neighbourhood. `block_size` is the odd side length
    /// of the neighbourhood, `bias` is subtracted from the local mean.
    Adaptive {
        method: AdaptiveMethod,
        block_size: u32,
        bias: i32,
    },
    /// Global threshold chosen from the histogram
    Otsu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub threshold: ThresholdMethod,
    pub min_width: u32,
    pub min_height: u32,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Adaptive {
                method: AdaptiveMethod::Gaussian,
                block_size: 15,
                bias: 2,
            },
            min_width: 150,
            min_height: 200,
            min_aspect_ratio: 0.65,
            max_aspect_ratio: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub name_region: FieldRegion,
    pub set_region: FieldRegion,
    pub name_whitelist: String,
    pub set_whitelist: String,
    /// Dark text becomes white foreground on black
    pub invert: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            name_region: FieldRegion::new(0.05, 0.35, 0.05, 0.95),
            set_region: FieldRegion::new(0.80, 0.95, 0.70, 0.95),
            name_whitelist: NAME_WHITELIST.to_string(),
            set_whitelist: SET_WHITELIST.to_string(),
            invert: true,
        }
    }
}

/// Column layout of the output table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    /// `Card Name, Set Info, Card Number, Quantity`
    #[default]
    Full,
    /// `Card Name, Details`
    Details,
}

impl OutputSchema {
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            OutputSchema::Full => &["Card Name", "Set Info", "Card Number", "Quantity"],
            OutputSchema::Details => &["Card Name", "Details"],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub schema: OutputSchema,
}

/// Debug artifact dump. Disabled when `output_dir` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub output_dir: Option<PathBuf>,
}

impl DebugConfig {
    pub fn enabled(&self) -> bool {
        self.output_dir.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detection: DetectionConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
    pub debug: DebugConfig,
}

/// Named starting points for [`ScanConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Adaptive threshold, name at top, number bottom-right, four-column table
    #[default]
    Collection,
    /// Otsu threshold, name strip and full-width details strip, two-column table
    Details,
}

impl ScanConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Collection => Self::default(),
            Preset::Details => Self {
                detection: DetectionConfig {
                    threshold: ThresholdMethod::Otsu,
                    ..DetectionConfig::default()
                },
                extraction: ExtractionConfig {
                    name_region: FieldRegion::new(0.04, 0.14, 0.06, 0.94),
                    set_region: FieldRegion::new(0.88, 0.97, 0.04, 0.96),
                    ..ExtractionConfig::default()
                },
                output: OutputConfig {
                    schema: OutputSchema::Details,
                },
                debug: DebugConfig::default(),
            },
        }
    }

    /// Load a JSON config file over the collection preset and validate it
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_over(&Self::default(), path)
    }

    /// Load a JSON config file, taking every field it omits from `base`
    pub fn load_over(base: &ScanConfig, path: &Path) -> Result<Self> {
        let parse_err = |source| CardScanError::ConfigParse {
            path: path.to_path_buf(),
            source,
        };

        let text = std::fs::read_to_string(path).map_err(|source| CardScanError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides: Value = serde_json::from_str(&text).map_err(parse_err)?;

        let mut merged = serde_json::to_value(base).map_err(parse_err)?;
        merge_json(&mut merged, overrides);
        let config: ScanConfig = serde_json::from_value(merged).map_err(parse_err)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;

        if let ThresholdMethod::Adaptive { block_size, .. } = detection.threshold {
            if block_size < 3 || block_size % 2 == 0 {
                return Err(CardScanError::InvalidConfig(format!(
                    "adaptive block size must be odd and at least 3, got {block_size}"
                )));
            }
        }

        if !(detection.min_aspect_ratio > 0.0 && detection.min_aspect_ratio < detection.max_aspect_ratio) {
            return Err(CardScanError::InvalidConfig(format!(
                "aspect ratio bounds must satisfy 0 < min < max, got {} and {}",
                detection.min_aspect_ratio, detection.max_aspect_ratio
            )));
        }

        for (label, region) in [
            ("name_region", &self.extraction.name_region),
            ("set_region", &self.extraction.set_region),
        ] {
            if !region.is_valid() {
                return Err(CardScanError::InvalidConfig(format!(
                    "{label} must lie in [0,1] with top < bottom and left < right, got {region:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Recursively overlay `overrides` onto `base`.
///
/// Objects carrying a `kind` tag are replaced whole, so switching threshold
/// method does not inherit the old variant's fields.
fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) if !overrides.contains_key("kind") => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
