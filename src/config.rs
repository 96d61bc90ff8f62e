//! Canvas configuration module.
//!
//! Handles loading, validating, and merging canvas default files. Stock
//! defaults are the construction defaults of a fresh canvas; a user file
//! overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! background = "none"       # Background pixel; "none" is transparent
//! foreground = "#000000"
//! fill = "#888888"          # Fill for shapes and text
//! quality = 90              # Lossy encoder quality (1-100)
//!
//! [stroke]
//! color = "#ffffff"
//! width = 1.0
//! opacity = 1.0             # 0.0 (invisible) - 1.0 (opaque)
//! antialias = true
//! line_cap = "round"        # butt | round | square
//! line_join = "round"       # miter | round | bevel
//!
//! [thumbnail]
//! filter = "gaussian"       # point | triangle | gaussian | catrom | lanczos
//! blur = 1.0                # > 1 blurs, < 1 sharpens
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [stroke]
//! width = 3.0
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::color::Color;
use crate::drawing::{LineCap, LineJoin};
use crate::imaging::{Filter, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Canvas defaults as written in a config file.
///
/// Colors stay strings here; [`CanvasConfig::resolve`] parses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub background: String,
    pub foreground: String,
    pub fill: String,
    pub quality: u32,
    pub stroke: StrokeConfig,
    pub thumbnail: ThumbnailConfig,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: "none".to_string(),
            foreground: "#000000".to_string(),
            fill: "#888888".to_string(),
            quality: 90,
            stroke: StrokeConfig::default(),
            thumbnail: ThumbnailConfig::default(),
        }
    }
}

/// Stroke settings applied to a new canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrokeConfig {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
    pub antialias: bool,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            width: 1.0,
            opacity: 1.0,
            antialias: true,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
        }
    }
}

/// Resampling used by the shrink step of a thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    pub filter: Filter,
    pub blur: f64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            filter: Filter::Gaussian,
            blur: 1.0,
        }
    }
}

/// Typed defaults a canvas is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasDefaults {
    pub background: Color,
    pub foreground: Color,
    pub fill: Color,
    pub quality: Quality,
    pub stroke: StrokeDefaults,
    pub thumbnail_filter: Filter,
    pub thumbnail_blur: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefaults {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
    pub antialias: bool,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            background: Color::TRANSPARENT,
            foreground: Color::BLACK,
            fill: Color::MID_GRAY,
            quality: Quality::default(),
            stroke: StrokeDefaults {
                color: Color::WHITE,
                width: 1.0,
                opacity: 1.0,
                antialias: true,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
            },
            thumbnail_filter: Filter::Gaussian,
            thumbnail_blur: 1.0,
        }
    }
}

fn parse_color(field: &str, value: &str) -> Result<Color, ConfigError> {
    Color::parse(value)
        .map_err(|_| ConfigError::Validation(format!("{field}: invalid color \"{value}\"")))
}

impl CanvasConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolve().map(|_| ())
    }

    /// Parse and range-check every field into [`CanvasDefaults`].
    pub fn resolve(&self) -> Result<CanvasDefaults, ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if !(0.0..=1.0).contains(&self.stroke.opacity) {
            return Err(ConfigError::Validation(
                "stroke.opacity must be 0.0-1.0".into(),
            ));
        }
        if !(self.stroke.width >= 0.0) {
            return Err(ConfigError::Validation(
                "stroke.width must not be negative".into(),
            ));
        }
        if !(self.thumbnail.blur > 0.0) {
            return Err(ConfigError::Validation(
                "thumbnail.blur must be positive".into(),
            ));
        }
        Ok(CanvasDefaults {
            background: parse_color("background", &self.background)?,
            foreground: parse_color("foreground", &self.foreground)?,
            fill: parse_color("fill", &self.fill)?,
            quality: Quality::new(self.quality),
            stroke: StrokeDefaults {
                color: parse_color("stroke.color", &self.stroke.color)?,
                width: self.stroke.width,
                opacity: self.stroke.opacity,
                antialias: self.stroke.antialias,
                line_cap: self.stroke.line_cap,
                line_join: self.stroke.line_join,
            },
            thumbnail_filter: self.thumbnail.filter,
            thumbnail_blur: self.thumbnail.blur,
        })
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(CanvasConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CanvasConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CanvasConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load canvas defaults from a TOML file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<CanvasConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    log::debug!(target: "canvas", "loaded canvas config from {}", path.display());
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# Canvas Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Background pixel, used for blank images and exposed corners after a
# rotation. "none" is fully transparent.
background = "none"

# Foreground pixel.
foreground = "#000000"

# Fill color for shapes and annotations.
fill = "#888888"

# Lossy encoder quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Stroke
# ---------------------------------------------------------------------------
[stroke]
color = "#ffffff"
width = 1.0
# 0.0 (invisible) to 1.0 (opaque).
opacity = 1.0
antialias = true
# butt | round | square
line_cap = "round"
# miter | round | bevel
line_join = "round"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnail]
# Resampling filter for the shrink step:
# point | triangle | gaussian | catrom | lanczos
filter = "gaussian"
# Filter support multiplier. Above 1.0 blurs, below sharpens.
blur = 1.0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stock_config_resolves_to_construction_defaults() {
        let defaults = CanvasConfig::default().resolve().unwrap();
        assert_eq!(defaults, CanvasDefaults::default());
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let config: CanvasConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, CanvasConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
fill = "red"

[stroke]
width = 3.5
"##;
        let config: CanvasConfig = toml::from_str(toml).unwrap();
        // Overridden values
        assert_eq!(config.fill, "red");
        assert_eq!(config.stroke.width, 3.5);
        // Default values preserved
        assert_eq!(config.stroke.color, "#ffffff");
        assert_eq!(config.stroke.line_cap, LineCap::Round);
        assert_eq!(config.background, "none");
    }

    #[test]
    fn parse_enums_lowercase() {
        let toml = r#"
[stroke]
line_cap = "square"
line_join = "bevel"

[thumbnail]
filter = "lanczos"
"#;
        let config: CanvasConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.stroke.line_cap, LineCap::Square);
        assert_eq!(config.stroke.line_join, LineJoin::Bevel);
        assert_eq!(config.thumbnail.filter, Filter::Lanczos);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("canvas.toml")).unwrap();
        assert_eq!(config, CanvasConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("canvas.toml");
        fs::write(
            &path,
            r##"
background = "#123456"
quality = 75
"##,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.background, "#123456");
        assert_eq!(config.quality, 75);
        // Unspecified values should be defaults
        assert_eq!(config.fill, "#888888");

        let defaults = config.resolve().unwrap();
        assert_eq!(defaults.background, Color::rgb(0x12, 0x34, 0x56));
        assert_eq!(defaults.quality.value(), 75);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("canvas.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_rejects_bad_color() {
        let config = CanvasConfig {
            fill: "not-a-color".into(),
            ..CanvasConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("fill"), "{err}");
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = CanvasConfig::default();
        config.quality = 0;
        assert!(config.validate().is_err());

        let mut config = CanvasConfig::default();
        config.stroke.opacity = 1.5;
        assert!(config.validate().is_err());

        let mut config = CanvasConfig::default();
        config.stroke.width = -1.0;
        assert!(config.validate().is_err());

        let mut config = CanvasConfig::default();
        config.thumbnail.blur = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_error_surfaces_through_load_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("canvas.toml");
        fs::write(&path, "quality = 101\n").unwrap();
        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(1));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[stroke]\nwidth = 4.0").unwrap();
        let merged = merge_toml(base, overlay);
        let stroke = merged.get("stroke").unwrap();
        assert_eq!(stroke.get("width").unwrap().as_float(), Some(4.0));
        // Sibling keys survive the merge
        assert_eq!(stroke.get("color").unwrap().as_str(), Some("#ffffff"));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[stroke]
widht = 2.0
"#;
        let result: Result<CanvasConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<CanvasConfig, _> = toml::from_str("[strokes]\nwidth = 2.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("canvas.toml");
        fs::write(&path, "qualty = 90\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
