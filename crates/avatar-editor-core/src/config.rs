//! Editor configuration.
//!
//! Every field has a default matching the stock avatar dialog (400x400
//! working surface, 256x256 export, light gray backdrop), so hosts only need
//! to send the fields they want to change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::transform::{MAX_SCALE, MIN_SCALE};

/// Largest surface or output edge the engine will allocate buffers for.
pub const MAX_EDGE: u32 = 4096;

/// Errors raised while validating an [`EditorConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Working surface or output edge is zero or larger than [`MAX_EDGE`].
    #[error("Invalid {what} dimensions: {width}x{height} (edges must be 1..=4096)")]
    InvalidDimensions {
        what: &'static str,
        width: u32,
        height: u32,
    },

    /// Default scale is outside the slider range.
    #[error("Default scale {0} is outside the 0.1..=3.0 slider range")]
    InvalidDefaultScale(f64),

    /// Color string could not be parsed.
    #[error("Invalid color {0:?}: expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        // #f8f9fa
        Color::rgb(0xf8, 0xf9, 0xfa)
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_string());

        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let nibble = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

/// Settings for one editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Working surface width in surface units (pixels).
    pub surface_width: u32,
    /// Working surface height in surface units (pixels).
    pub surface_height: u32,
    /// Edge length of the square export.
    pub output_size: u32,
    /// Fill drawn behind the placed image.
    pub background: Color,
    /// Scale applied on load and on reset.
    pub default_scale: f64,
    /// Sources whose longest edge exceeds this are downscaled on load.
    /// Zero disables the cap.
    pub max_source_edge: u32,
    /// Sampling filter for interactive previews.
    pub preview_filter: FilterType,
    /// Sampling filter for the export render and the resample to output size.
    pub export_filter: FilterType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            surface_width: 400,
            surface_height: 400,
            output_size: 256,
            background: Color::default(),
            default_scale: 0.5,
            max_source_edge: 2048,
            preview_filter: FilterType::Bilinear,
            export_filter: FilterType::Bilinear,
        }
    }
}

impl EditorConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the config for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge_ok = |edge: u32| (1..=MAX_EDGE).contains(&edge);

        if !edge_ok(self.surface_width) || !edge_ok(self.surface_height) {
            return Err(ConfigError::InvalidDimensions {
                what: "surface",
                width: self.surface_width,
                height: self.surface_height,
            });
        }
        if !edge_ok(self.output_size) {
            return Err(ConfigError::InvalidDimensions {
                what: "output",
                width: self.output_size,
                height: self.output_size,
            });
        }
        if !(MIN_SCALE..=MAX_SCALE).contains(&self.default_scale) {
            return Err(ConfigError::InvalidDefaultScale(self.default_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::value::{Error as ValueError, MapDeserializer};

    #[test]
    fn test_default_config_is_valid() {
        let config = EditorConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.surface_width, 400);
        assert_eq!(config.output_size, 256);
        assert_eq!(config.background.to_string(), "#f8f9fa");
    }

    #[test]
    fn test_validate_rejects_zero_surface() {
        let mut config = EditorConfig::new();
        config.surface_height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions {
                what: "surface",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_output() {
        let mut config = EditorConfig::new();
        config.output_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { what: "output", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_edges() {
        let mut config = EditorConfig::new();
        config.surface_width = 65536;
        config.surface_height = 65536;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions {
                what: "surface",
                width: 65536,
                height: 65536,
            })
        );

        let mut config = EditorConfig::new();
        config.output_size = MAX_EDGE + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { what: "output", .. })
        ));
    }

    #[test]
    fn test_validate_accepts_max_edge() {
        let mut config = EditorConfig::new();
        config.surface_width = MAX_EDGE;
        config.surface_height = MAX_EDGE;
        config.output_size = MAX_EDGE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_default_scale_out_of_range() {
        let mut config = EditorConfig::new();
        config.default_scale = 5.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDefaultScale(5.0))
        );

        config.default_scale = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("#f8f9fa".parse::<Color>().unwrap(), Color::rgb(248, 249, 250));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::rgb(255, 255, 255));
        assert_eq!(
            "#00000080".parse::<Color>().unwrap(),
            Color::rgba(0, 0, 0, 128)
        );
        assert_eq!("#ABCDEF".parse::<Color>().unwrap(), Color::rgb(0xab, 0xcd, 0xef));
    }

    #[test]
    fn test_color_parsing_errors() {
        for bad in ["", "f8f9fa", "#f8f9f", "#zzzzzz", "#f8f9fa0", "#ü12"] {
            assert!(bad.parse::<Color>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_color_display_round_trip() {
        for color in [Color::rgb(1, 2, 3), Color::rgba(250, 128, 0, 7)] {
            assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
        }
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let de: MapDeserializer<'_, _, ValueError> = MapDeserializer::new(
            vec![("background", "#000000"), ("exportFilter", "lanczos3")].into_iter(),
        );

        let config = EditorConfig::deserialize(de).unwrap();
        assert_eq!(config.background, Color::rgb(0, 0, 0));
        assert_eq!(config.export_filter, FilterType::Lanczos3);
        assert_eq!(config.surface_width, 400);
        assert_eq!(config.default_scale, 0.5);
    }

    #[test]
    fn test_invalid_color_fails_deserialization() {
        let de: MapDeserializer<'_, _, ValueError> =
            MapDeserializer::new(vec![("background", "blue")].into_iter());
        assert!(EditorConfig::deserialize(de).is_err());
    }
}
