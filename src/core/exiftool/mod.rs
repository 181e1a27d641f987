//! # ExifTool Module
//!
//! Talks to the external `exiftool` binary.
//!
//! Two invocation styles are used:
//! - **JSON** (`-fast2 -j -n -q -m -<Tag>... files`) for bulk extraction,
//!   with `-fast` instead of `-fast2` when a maker-note tag is requested
//! - **Text** (`-<Tag> file`) for the single-image shutter-count lookup
//!
//! Everything above this module goes through [`MetadataSource`], so tests
//! can run without exiftool installed.

mod parse;
mod runner;

pub use parse::{find_text_value, parse_json_output, parse_text_output};
pub use runner::ExifTool;

use crate::error::ExifToolError;
use std::path::{Path, PathBuf};

/// EXIF tags the toolkit knows how to request and read back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExifField {
    FocalLength,
    FocalLengthIn35mmFormat,
    ShutterCount,
    Make,
    Model,
    LensModel,
    DateTimeOriginal,
}

impl ExifField {
    /// exiftool tag name, also the key in its JSON output
    pub fn tag(&self) -> &'static str {
        match self {
            ExifField::FocalLength => "FocalLength",
            ExifField::FocalLengthIn35mmFormat => "FocalLengthIn35mmFormat",
            ExifField::ShutterCount => "ShutterCount",
            ExifField::Make => "Make",
            ExifField::Model => "Model",
            ExifField::LensModel => "LensModel",
            ExifField::DateTimeOriginal => "DateTimeOriginal",
        }
    }

    /// Label exiftool prints for the tag in text mode
    pub fn label(&self) -> &'static str {
        match self {
            ExifField::FocalLength => "Focal Length",
            ExifField::FocalLengthIn35mmFormat => "Focal Length In 35mm Format",
            ExifField::ShutterCount => "Shutter Count",
            ExifField::Make => "Make",
            ExifField::Model => "Camera Model Name",
            ExifField::LensModel => "Lens Model",
            ExifField::DateTimeOriginal => "Date/Time Original",
        }
    }

    /// Command-line switch selecting the tag
    pub fn arg(&self) -> String {
        format!("-{}", self.tag())
    }

    /// Tags stored in the maker notes, which `-fast2` skips
    pub fn in_maker_notes(&self) -> bool {
        matches!(self, ExifField::ShutterCount)
    }
}

/// Fields requested by focal-length analysis
pub const ANALYSIS_FIELDS: &[ExifField] = &[
    ExifField::FocalLength,
    ExifField::FocalLengthIn35mmFormat,
    ExifField::Make,
    ExifField::Model,
    ExifField::LensModel,
    ExifField::ShutterCount,
    ExifField::DateTimeOriginal,
];

/// A provider of raw metadata output
///
/// [`ExifTool`] is the real implementation; tests substitute a fake.
pub trait MetadataSource: Send + Sync {
    /// Query `fields` for `files` and return the raw JSON array text
    fn query_json(&self, files: &[PathBuf], fields: &[ExifField]) -> Result<String, ExifToolError>;

    /// Query `fields` for one file and return the human-readable text output
    fn query_text(&self, file: &Path, fields: &[ExifField]) -> Result<String, ExifToolError>;
}
