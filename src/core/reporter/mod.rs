//! # Reporter Module
//!
//! Presents focal-length analysis results.
//!
//! ## Outputs
//! - **Histogram**: text bars per focal length for the terminal
//! - **CSV**: `focal_length_mm,count` rows for spreadsheets
//! - **JSON**: totals plus the full table, via [`FocalReport`]

mod export;
mod visualization;

pub use export::{export_csv, export_json, summary_line};
pub use visualization::HistogramRenderer;

use crate::core::analysis::{FocalAnalysis, FocalLengthTable};
use crate::core::metadata::FocalLength;
use serde::{Deserialize, Serialize};

/// One row of the focal-length table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalLengthEntry {
    pub focal_length_mm: FocalLength,
    pub count: usize,
    /// Share of images with a focal length, 0-100
    pub percent: f64,
}

/// Serializable summary of an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocalReport {
    pub total_images: usize,
    pub images_with_focal_length: usize,
    pub unique_focal_lengths: usize,
    pub duration_ms: u64,
    /// Ascending by focal length
    pub focal_lengths: Vec<FocalLengthEntry>,
    pub errors: Vec<String>,
}

impl FocalReport {
    pub fn from_analysis(analysis: &FocalAnalysis) -> Self {
        Self {
            total_images: analysis.total_images,
            images_with_focal_length: analysis.images_with_focal_length,
            unique_focal_lengths: analysis.unique_focal_lengths(),
            duration_ms: analysis.duration_ms,
            focal_lengths: entries(&analysis.table),
            errors: analysis.errors.clone(),
        }
    }
}

/// Table rows with their share of the total
pub fn entries(table: &FocalLengthTable) -> Vec<FocalLengthEntry> {
    let total = table.total();
    table
        .iter()
        .map(|(focal_length_mm, count)| FocalLengthEntry {
            focal_length_mm,
            count,
            percent: percent_of(count, total),
        })
        .collect()
}

fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
