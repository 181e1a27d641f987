//! # Shutter Module
//!
//! Reads a camera's shutter actuation count from one image.
//!
//! Only bodies that write the count into their maker notes report it
//! (most Nikon and Pentax, some Sony and Canon). Everything else yields
//! [`ShutterCount::NotAvailable`].

use crate::core::exiftool::{find_text_value, ExifField, ExifTool, MetadataSource};
use crate::error::{ScanError, ToolkitError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Time allowed for a single lookup before exiftool is killed
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a shutter-count lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutterCount {
    /// A numeric actuation count
    Count(u64),
    /// A value exiftool printed that is not a plain number
    Raw(String),
    /// The image carries no shutter count
    NotAvailable,
}

impl ShutterCount {
    fn from_text(value: &str) -> Self {
        let digits: String = value.chars().filter(|c| *c != ',' && *c != '_').collect();
        match digits.parse() {
            Ok(count) => ShutterCount::Count(count),
            Err(_) => ShutterCount::Raw(value.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, ShutterCount::NotAvailable)
    }
}

impl fmt::Display for ShutterCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutterCount::Count(count) => write!(f, "{}", count),
            ShutterCount::Raw(text) => write!(f, "{}", text),
            ShutterCount::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// Looks up shutter counts one image at a time
pub struct ShutterCountReader {
    source: Box<dyn MetadataSource>,
}

impl ShutterCountReader {
    /// Read through any metadata source
    pub fn new(source: Box<dyn MetadataSource>) -> Self {
        Self { source }
    }

    /// Read through exiftool, applying [`LOOKUP_TIMEOUT`]
    pub fn with_exiftool(tool: ExifTool) -> Self {
        Self::new(Box::new(tool.with_timeout(LOOKUP_TIMEOUT)))
    }

    /// Shutter count of one image
    pub fn read(&self, image: &Path) -> Result<ShutterCount, ToolkitError> {
        if !image.is_file() {
            return Err(ScanError::FileNotFound {
                path: image.to_path_buf(),
            }
            .into());
        }

        let output = self.source.query_text(image, &[ExifField::ShutterCount])?;
        let count = find_text_value(&output, ExifField::ShutterCount.label())
            .map(|value| ShutterCount::from_text(&value))
            .unwrap_or(ShutterCount::NotAvailable);

        debug!(path = %image.display(), %count, "shutter count read");
        Ok(count)
    }

    /// Look up several images, one query each. A failure for one image does
    /// not stop the others.
    pub fn read_many(
        &self,
        images: &[PathBuf],
    ) -> Vec<(PathBuf, Result<ShutterCount, ToolkitError>)> {
        images
            .iter()
            .map(|image| (image.clone(), self.read(image)))
            .collect()
    }
}

impl Default for ShutterCountReader {
    fn default() -> Self {
        Self::with_exiftool(ExifTool::new())
    }
}
