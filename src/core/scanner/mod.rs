//! # Scanner Module
//!
//! Finds the image files in a folder.
//!
//! ## Supported Formats
//! - Camera raw (.nef, .cr2, .arw, .dng)
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - HEIC (.heic, .heif)
//! - TIFF (.tif, .tiff)
//!
//! Scanning is non-recursive unless [`ScanConfig::recursive`] is set.
//!
//! ## Example
//! ```rust,ignore
//! use photo_toolkit::core::scanner::{ImageScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let found = scanner.scan(&["/Users/me/Pictures/2024".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::{ImageFilter, DEFAULT_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered image file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the image
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Format family detected from the extension
    pub kind: ImageKind,
}

/// Broad image format families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Raw,
    Jpeg,
    Png,
    Heic,
    Tiff,
    Other,
}

impl ImageKind {
    /// Detect the format family from a file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "nef" | "cr2" | "cr3" | "arw" | "dng" | "raf" | "orf" | "rw2" => ImageKind::Raw,
            "jpg" | "jpeg" => ImageKind::Jpeg,
            "png" => ImageKind::Png,
            "heic" | "heif" => ImageKind::Heic,
            "tif" | "tiff" => ImageKind::Tiff,
            _ => ImageKind::Other,
        }
    }

    /// Detect the format family from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(ImageKind::Other)
    }

    /// Whether the `image` crate may decode this family for bordering.
    /// Raw and HEIC need a converter; anything else is left to the decoder.
    pub fn is_decodable(&self) -> bool {
        !matches!(self, ImageKind::Raw | ImageKind::Heic)
    }
}

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered images, sorted by path, no duplicates
    pub images: Vec<ImageFile>,
    /// Non-fatal errors
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    /// Paths of the discovered images
    pub fn paths(&self) -> Vec<PathBuf> {
        self.images.iter().map(|i| i.path.clone()).collect()
    }

    /// Combined size of the discovered images in bytes
    pub fn total_bytes(&self) -> u64 {
        self.images.iter().map(|i| i.size).sum()
    }

    /// Number of discovered images in one format family
    pub fn count_of(&self, kind: ImageKind) -> usize {
        self.images.iter().filter(|i| i.kind == kind).count()
    }
}

/// Trait for image scanners
///
/// Implement this to feed the analyzer from somewhere other than disk.
pub trait ImageScanner: Send + Sync {
    /// Scan folders and return discovered images
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(ImageKind::from_extension("NEF"), ImageKind::Raw);
        assert_eq!(ImageKind::from_extension("jpeg"), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_extension("Heif"), ImageKind::Heic);
        assert_eq!(ImageKind::from_extension("TIF"), ImageKind::Tiff);
    }

    #[test]
    fn unknown_extension_is_other() {
        assert_eq!(ImageKind::from_extension("xmp"), ImageKind::Other);
    }

    #[test]
    fn raw_files_are_not_decodable_for_borders() {
        assert!(!ImageKind::Raw.is_decodable());
        assert!(!ImageKind::Heic.is_decodable());
        assert!(ImageKind::Jpeg.is_decodable());
        assert!(ImageKind::Other.is_decodable());
    }

    #[test]
    fn kind_from_path_uses_extension() {
        assert_eq!(ImageKind::from_path(Path::new("/a/DSC_0001.NEF")), ImageKind::Raw);
        assert_eq!(ImageKind::from_path(Path::new("/a/IMG_0001.HEIC")), ImageKind::Heic);
        assert_eq!(ImageKind::from_path(Path::new("/a/scan")), ImageKind::Other);
    }
}
