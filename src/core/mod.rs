//! # Core Module
//!
//! The front-end-agnostic photo toolkit engine.
//!
//! ## Modules
//! - `scanner` - Discovers image files in folders
//! - `exiftool` - Runs the external exiftool binary
//! - `metadata` - Per-image EXIF records
//! - `analysis` - Batched extraction and focal-length tabulation
//! - `shutter` - Shutter-count lookup for one image
//! - `border` - Border rendering, batch bordering and settings files
//! - `reporter` - Histogram, CSV and JSON output

pub mod analysis;
pub mod border;
pub mod exiftool;
pub mod metadata;
pub mod reporter;
pub mod scanner;
pub mod shutter;

// Re-export commonly used types
pub use analysis::{ExtractionMode, FocalAnalysis, FocalAnalyzer, FocalLengthTable};
pub use border::{BatchBorderer, BorderColor, BorderSettings, PresetStore};
pub use exiftool::{ExifTool, MetadataSource};
pub use metadata::{FocalLength, MetadataRecord};
pub use scanner::ImageFile;
pub use shutter::{ShutterCount, ShutterCountReader};
