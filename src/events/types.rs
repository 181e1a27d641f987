//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the toolkit's long-running operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Folder scanning events
    Scan(ScanEvent),
    /// Metadata extraction events
    Extract(ExtractEvent),
    /// Batch border events
    Border(BorderEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// An image was found
    ImageFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_images: usize },
}

/// Events during metadata extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractEvent {
    /// Extraction has started
    Started { total_files: usize, batches: usize },
    /// A batch finished and its output was parsed
    BatchCompleted(BatchProgress),
    /// A batch invocation failed; its files are skipped
    BatchFailed { index: usize, files: usize, message: String },
    /// Extraction completed
    Completed {
        records: usize,
        with_focal_length: usize,
        duration_ms: u64,
    },
}

/// Progress information after a batch completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Zero-based batch index
    pub index: usize,
    /// Batches finished so far (in completion order)
    pub completed_batches: usize,
    /// Total number of batches
    pub total_batches: usize,
    /// Files finished so far
    pub files_done: usize,
    /// Records parsed from this batch
    pub records: usize,
}

/// Events while bordering a set of images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BorderEvent {
    /// Bordering has started
    Started { total_images: usize },
    /// An image finished (successfully or not)
    Progress {
        completed: usize,
        total: usize,
        current_path: PathBuf,
    },
    /// An image could not be bordered
    ImageFailed { path: PathBuf, message: String },
    /// All images processed
    Completed { succeeded: usize, failed: usize },
}
