//! # Analysis Module
//!
//! Focal-length analysis over a folder of images.
//!
//! ## Stages
//! 1. **Scan** - find image files in the folder
//! 2. **Extract** - run exiftool per batch (or once, in single mode)
//! 3. **Parse** - turn JSON output into [`MetadataRecord`]s on a worker pool
//! 4. **Tabulate** - count images per focal length
//!
//! ## Parallelism
//! A dedicated rayon pool sized to the worker count runs batch invocations
//! (batched mode) or output parsing (single mode). Results are merged once
//! every worker has returned.
//!
//! [`MetadataRecord`]: crate::core::metadata::MetadataRecord

mod extractor;
mod table;

pub use extractor::{
    AnalyzerConfig, ExtractionMode, FocalAnalysis, FocalAnalyzer, FocalAnalyzerBuilder,
};
pub use table::FocalLengthTable;
