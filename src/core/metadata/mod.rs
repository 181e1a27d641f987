//! # Metadata Module
//!
//! Per-image EXIF fields as reported by exiftool.
//!
//! ## Extracted Fields
//! - Focal length (and its 35 mm equivalent)
//! - Shutter count (only some bodies report it)
//! - Camera make and model, lens model
//! - Date taken (DateTimeOriginal)
//!
//! Records are built from one object of exiftool's `-j -n` output.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

use crate::core::exiftool::ExifField;

/// A focal length in millimetres, held in tenths so it can key a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct FocalLength(u32);

impl FocalLength {
    /// Round a millimetre value to the nearest tenth. Zero, negative and
    /// non-finite values have no focal length.
    pub fn from_mm(mm: f64) -> Option<Self> {
        if !mm.is_finite() || mm <= 0.0 {
            return None;
        }
        let tenths = (mm * 10.0).round();
        if tenths < 1.0 || tenths > u32::MAX as f64 {
            return None;
        }
        Some(Self(tenths as u32))
    }

    /// Value in millimetres
    pub fn mm(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Value in tenths of a millimetre
    pub fn tenths(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FocalLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 10 == 0 {
            write!(f, "{}mm", self.0 / 10)
        } else {
            write!(f, "{}.{}mm", self.0 / 10, self.0 % 10)
        }
    }
}

impl From<FocalLength> for f64 {
    fn from(value: FocalLength) -> Self {
        value.mm()
    }
}

impl TryFrom<f64> for FocalLength {
    type Error = String;

    fn try_from(mm: f64) -> Result<Self, Self::Error> {
        FocalLength::from_mm(mm).ok_or_else(|| format!("invalid focal length: {}", mm))
    }
}

/// EXIF fields extracted for one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Image path as reported back by exiftool
    pub path: PathBuf,
    /// Actual focal length of the lens
    pub focal_length: Option<FocalLength>,
    /// 35 mm-equivalent focal length
    pub focal_length_35mm: Option<FocalLength>,
    /// Shutter actuations
    pub shutter_count: Option<u64>,
    /// Camera make (e.g. "NIKON CORPORATION")
    pub camera_make: Option<String>,
    /// Camera model (e.g. "NIKON Z 6_2")
    pub camera_model: Option<String>,
    /// Lens model
    pub lens_model: Option<String>,
    /// Original capture time
    pub date_taken: Option<NaiveDateTime>,
}

impl MetadataRecord {
    /// Build a record from one exiftool JSON object.
    ///
    /// Returns `None` when the object has no `SourceFile`, since such an
    /// entry cannot be attributed to an image.
    pub fn from_json(object: &Map<String, Value>) -> Option<Self> {
        let path = object.get("SourceFile")?.as_str()?;

        Some(Self {
            path: PathBuf::from(path),
            focal_length: field(object, ExifField::FocalLength)
                .and_then(number_of)
                .and_then(FocalLength::from_mm),
            focal_length_35mm: field(object, ExifField::FocalLengthIn35mmFormat)
                .and_then(number_of)
                .and_then(FocalLength::from_mm),
            shutter_count: field(object, ExifField::ShutterCount)
                .and_then(number_of)
                .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64),
            camera_make: field(object, ExifField::Make).and_then(text_of),
            camera_model: field(object, ExifField::Model).and_then(text_of),
            lens_model: field(object, ExifField::LensModel).and_then(text_of),
            date_taken: field(object, ExifField::DateTimeOriginal)
                .and_then(text_of)
                .and_then(|s| parse_exif_datetime(&s)),
        })
    }

    /// Get a display string for the camera
    pub fn camera_display(&self) -> Option<String> {
        match (&self.camera_make, &self.camera_model) {
            (Some(make), Some(model)) => {
                // Avoid "Canon Canon EOS R5"
                if model.starts_with(make.as_str()) {
                    Some(model.clone())
                } else {
                    Some(format!("{} {}", make, model))
                }
            }
            (None, Some(model)) => Some(model.clone()),
            (Some(make), None) => Some(make.clone()),
            (None, None) => None,
        }
    }
}

fn field(object: &Map<String, Value>, field: ExifField) -> Option<&Value> {
    object.get(field.tag()).filter(|v| !v.is_null())
}

/// Numeric value of a field. With `-n` exiftool emits numbers, but some
/// tags still arrive as strings such as `"50.0 mm"`.
pub(crate) fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let token: String = s
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            token.parse().ok()
        }
        _ => None,
    }
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// EXIF date format: "YYYY:MM:DD HH:MM:SS", optionally followed by
/// sub-seconds or a zone offset which are ignored.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let head = s.get(..19)?;
    NaiveDateTime::parse_from_str(head, "%Y:%m:%d %H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn focal_length_display() {
        assert_eq!(FocalLength::from_mm(50.0).unwrap().to_string(), "50mm");
        assert_eq!(FocalLength::from_mm(18.5).unwrap().to_string(), "18.5mm");
        assert_eq!(FocalLength::from_mm(23.96).unwrap().to_string(), "24mm");
    }

    #[test]
    fn focal_length_rejects_zero_and_nan() {
        assert!(FocalLength::from_mm(0.0).is_none());
        assert!(FocalLength::from_mm(-35.0).is_none());
        assert!(FocalLength::from_mm(f64::NAN).is_none());
    }

    #[test]
    fn focal_length_orders_numerically() {
        let wide = FocalLength::from_mm(9.0).unwrap();
        let tele = FocalLength::from_mm(105.0).unwrap();
        assert!(wide < tele);
    }

    #[test]
    fn focal_length_serializes_as_millimetres() {
        let json = serde_json::to_string(&FocalLength::from_mm(35.0).unwrap()).unwrap();
        assert_eq!(json, "35.0");
        let back: FocalLength = serde_json::from_str("85").unwrap();
        assert_eq!(back.to_string(), "85mm");
    }

    #[test]
    fn record_from_numeric_output() {
        let record = MetadataRecord::from_json(&object(json!({
            "SourceFile": "/shoot/DSC_0001.NEF",
            "FocalLength": 24,
            "FocalLengthIn35mmFormat": 36,
            "ShutterCount": 48213,
            "Make": "NIKON CORPORATION",
            "Model": "NIKON D7500",
            "DateTimeOriginal": "2024:05:01 10:11:12"
        })))
        .unwrap();

        assert_eq!(record.path, PathBuf::from("/shoot/DSC_0001.NEF"));
        assert_eq!(record.focal_length.unwrap().to_string(), "24mm");
        assert_eq!(record.focal_length_35mm.unwrap().to_string(), "36mm");
        assert_eq!(record.shutter_count, Some(48213));
        assert_eq!(
            record.date_taken.unwrap().to_string(),
            "2024-05-01 10:11:12"
        );
    }

    #[test]
    fn record_tolerates_string_values() {
        let record = MetadataRecord::from_json(&object(json!({
            "SourceFile": "a.jpg",
            "FocalLength": "50.0 mm"
        })))
        .unwrap();
        assert_eq!(record.focal_length.unwrap().to_string(), "50mm");
    }

    #[test]
    fn record_without_source_file_is_dropped() {
        assert!(MetadataRecord::from_json(&object(json!({ "FocalLength": 50 }))).is_none());
    }

    #[test]
    fn record_without_fields_has_no_data() {
        let record = MetadataRecord::from_json(&object(json!({ "SourceFile": "a.png" }))).unwrap();
        assert_eq!(
            record,
            MetadataRecord {
                path: PathBuf::from("a.png"),
                ..Default::default()
            }
        );
    }

    #[test]
    fn camera_display_avoids_duplication() {
        let record = MetadataRecord {
            camera_make: Some("Canon".to_string()),
            camera_model: Some("Canon EOS R5".to_string()),
            ..Default::default()
        };
        assert_eq!(record.camera_display(), Some("Canon EOS R5".to_string()));
    }
}
