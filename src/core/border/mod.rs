//! # Border Module
//!
//! Adds solid-color borders around images.
//!
//! ## Pieces
//! - [`BorderSettings`] - per-side widths, color and a name, stored as JSON
//! - [`apply_border`] / [`border_file`] - border one image in memory or on disk
//! - [`BatchBorderer`] - border many images into an output folder
//! - [`PresetStore`] - named settings kept in the user's config directory
//!
//! ## Settings file
//! ```json
//! {
//!   "name": "gallery",
//!   "top_border": 40,
//!   "bottom_border": 120,
//!   "left_border": 40,
//!   "right_border": 40,
//!   "border_color": [255, 255, 255]
//! }
//! ```
//! `border_color` is stored blue first (`[b, g, r]`), matching files written
//! by the desktop editor. Missing keys fall back to zero widths,
//! white and the name `default`.

mod batch;
mod presets;
mod render;

pub use batch::{BatchBorderer, BorderBatchResult, PARALLEL_THRESHOLD};
pub use presets::PresetStore;
pub use render::{apply_border, border_file};

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Widest border accepted on any side, in pixels
pub const MAX_BORDER_WIDTH: u32 = 500;

/// An opaque RGB color, serialized as `[b, g, r]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Bgr", into = "Bgr")]
pub struct BorderColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor::new(255, 255, 255);
    pub const BLACK: BorderColor = BorderColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        Self::WHITE
    }
}

/// On-disk channel order of a color
#[derive(Serialize, Deserialize)]
struct Bgr([u8; 3]);

impl From<Bgr> for BorderColor {
    fn from(Bgr([b, g, r]): Bgr) -> Self {
        Self::new(r, g, b)
    }
}

impl From<BorderColor> for Bgr {
    fn from(color: BorderColor) -> Self {
        Bgr([color.b, color.g, color.r])
    }
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Accepts `white`, `black`, `#rrggbb`, `rrggbb` or `r,g,b`
impl FromStr for BorderColor {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidColor {
            value: s.to_string(),
        };
        let text = s.trim();

        match text.to_ascii_lowercase().as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }

        if text.contains(',') {
            let parts = text
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::new(*r, *g, *b)),
                _ => Err(invalid()),
            };
        }

        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Border widths in pixels plus the fill color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSettings {
    pub name: String,
    #[serde(rename = "top_border")]
    pub top: u32,
    #[serde(rename = "bottom_border")]
    pub bottom: u32,
    #[serde(rename = "left_border")]
    pub left: u32,
    #[serde(rename = "right_border")]
    pub right: u32,
    #[serde(rename = "border_color")]
    pub color: BorderColor,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            top: 0,
            bottom: 0,
            left: 0,
            right: 0,
            color: BorderColor::WHITE,
        }
    }
}

impl BorderSettings {
    /// The same width on every side
    pub fn uniform(width: u32, color: BorderColor) -> Self {
        Self {
            top: width,
            bottom: width,
            left: width,
            right: width,
            color,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// True when every width is zero
    pub fn is_empty(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }

    /// Reject widths above [`MAX_BORDER_WIDTH`]
    pub fn validate(&self) -> Result<(), SettingsError> {
        let sides = [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ];
        for (side, value) in sides {
            if value > MAX_BORDER_WIDTH {
                return Err(SettingsError::InvalidWidth {
                    side,
                    value,
                    max: MAX_BORDER_WIDTH,
                });
            }
        }
        Ok(())
    }

    /// Write the settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        let json =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), name = %self.name, "border settings saved");
        Ok(())
    }

    /// Read settings written by [`BorderSettings::save`]
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_keeps_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gallery.json");
        let settings = BorderSettings {
            name: "gallery".to_string(),
            top: 40,
            bottom: 120,
            left: 30,
            right: 30,
            color: BorderColor::new(12, 34, 56),
        };

        settings.save(&path).unwrap();
        let loaded = BorderSettings::load(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn file_uses_documented_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("s.json");
        BorderSettings::uniform(10, BorderColor::new(255, 128, 0))
            .save(&path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["top_border"], 10);
        assert_eq!(value["right_border"], 10);
        assert_eq!(value["border_color"], serde_json::json!([0, 128, 255]));
        assert_eq!(value["name"], "default");
    }

    #[test]
    fn reads_desktop_editor_file_blue_first() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("editor.json");
        fs::write(
            &path,
            r#"{"top_border": 10, "bottom_border": 30, "left_border": 10, "right_border": 10, "border_color": [0, 0, 255]}"#,
        )
        .unwrap();

        let loaded = BorderSettings::load(&path).unwrap();

        assert_eq!(loaded.color, BorderColor::new(255, 0, 0));
        assert_eq!(loaded.color.to_string(), "#ff0000");
        assert_eq!(loaded.bottom, 30);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.json");
        fs::write(&path, r#"{"top_border": 25}"#).unwrap();

        let loaded = BorderSettings::load(&path).unwrap();

        assert_eq!(loaded.top, 25);
        assert_eq!(loaded.bottom, 0);
        assert_eq!(loaded.color, BorderColor::WHITE);
        assert_eq!(loaded.name, "default");
    }

    #[test]
    fn rejects_wide_borders() {
        let settings = BorderSettings {
            left: 501,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidWidth { side: "left", value: 501, .. })
        ));
        assert!(BorderSettings::uniform(MAX_BORDER_WIDTH, BorderColor::WHITE)
            .validate()
            .is_ok());
    }

    #[test]
    fn load_rejects_out_of_range_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wide.json");
        fs::write(&path, r#"{"bottom_border": 900}"#).unwrap();

        assert!(matches!(
            BorderSettings::load(&path),
            Err(SettingsError::InvalidWidth { side: "bottom", .. })
        ));
    }

    #[test]
    fn load_reports_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let error = BorderSettings::load(&path).unwrap_err();
        assert!(matches!(error, SettingsError::Parse { .. }));
        assert!(error.to_string().contains("broken.json"));
    }

    #[test]
    fn parses_color_forms() {
        assert_eq!("#ff8000".parse::<BorderColor>().unwrap(), BorderColor::new(255, 128, 0));
        assert_eq!("FF8000".parse::<BorderColor>().unwrap(), BorderColor::new(255, 128, 0));
        assert_eq!("10, 20,30".parse::<BorderColor>().unwrap(), BorderColor::new(10, 20, 30));
        assert_eq!("White".parse::<BorderColor>().unwrap(), BorderColor::WHITE);
        assert!("#ff80".parse::<BorderColor>().is_err());
        assert!("1,2".parse::<BorderColor>().is_err());
        assert!("300,0,0".parse::<BorderColor>().is_err());
    }

    #[test]
    fn color_displays_as_hex() {
        assert_eq!(BorderColor::new(255, 128, 0).to_string(), "#ff8000");
    }
}
