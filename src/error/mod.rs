//! # Error Module
//!
//! User-facing error types for the photo toolkit.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("exiftool error: {0}")]
    ExifTool(#[from] ExifToolError),

    #[error("Border error: {0}")]
    Border(#[from] BorderError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering image files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from invoking the external exiftool binary
#[derive(Error, Debug)]
pub enum ExifToolError {
    #[error("exiftool was not found at '{program}'. Install exiftool or pass --exiftool <path>.")]
    NotFound { program: String },

    #[error("exiftool exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("exiftool did not finish within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Malformed exiftool output: {reason}")]
    MalformedOutput { reason: String },

    #[error("Failed to communicate with exiftool: {0}")]
    Io(#[source] std::io::Error),
}

/// Errors that occur while adding borders to images
#[derive(Error, Debug)]
pub enum BorderError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to write image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No images to process")]
    NoImages,

    #[error("Invalid border settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("Bordered image would be {width}x{height} pixels, which is too large")]
    TooLarge { width: u64, height: u64 },

    #[error("Cannot border {path}: camera raw and HEIC files must be converted first")]
    Unsupported { path: PathBuf },
}

/// Errors that occur while reading or writing border settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file {path} is not valid: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    #[error("Border width {value} for {side} is out of range (0-{max})")]
    InvalidWidth { side: &'static str, value: u32, max: u32 },

    #[error("Invalid color '{value}': expected #rrggbb or r,g,b")]
    InvalidColor { value: String },

    #[error("Invalid preset name '{name}'")]
    InvalidName { name: String },

    #[error("Preset '{name}' does not exist")]
    PresetNotFound { name: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ToolkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        assert!(error.to_string().contains("/photos/vacation"));
    }

    #[test]
    fn missing_exiftool_suggests_recovery() {
        let error = ExifToolError::NotFound {
            program: "exiftool".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Install exiftool"));
        assert!(message.contains("--exiftool"));
    }

    #[test]
    fn border_error_includes_path_and_reason() {
        let error = BorderError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn border_error_wraps_settings_error() {
        let error: BorderError = SettingsError::InvalidWidth {
            side: "left",
            value: 900,
            max: 500,
        }
        .into();
        assert!(error.to_string().contains("900 for left"));
    }

    #[test]
    fn invalid_width_names_side() {
        let error = SettingsError::InvalidWidth {
            side: "top",
            value: 900,
            max: 500,
        };
        assert_eq!(
            error.to_string(),
            "Border width 900 for top is out of range (0-500)"
        );
    }

    #[test]
    fn toolkit_error_wraps_exiftool_error() {
        let error: ToolkitError = ExifToolError::Timeout { seconds: 10 }.into();
        assert!(error.to_string().contains("10s"));
    }
}
