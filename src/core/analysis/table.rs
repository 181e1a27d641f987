//! Focal-length frequency table.

use crate::core::metadata::{FocalLength, MetadataRecord};
use std::collections::BTreeMap;

/// How often each focal length occurs, ordered by focal length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocalLengthTable {
    counts: BTreeMap<FocalLength, usize>,
}

impl FocalLengthTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Tabulate the focal lengths of `records`, skipping records without one
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a MetadataRecord>) -> Self {
        let mut table = Self::new();
        for focal_length in records.into_iter().filter_map(|r| r.focal_length) {
            table.record(focal_length);
        }
        table
    }

    /// Count one more image at `focal_length`
    pub fn record(&mut self, focal_length: FocalLength) {
        *self.counts.entry(focal_length).or_insert(0) += 1;
    }

    /// Images counted at `focal_length`
    pub fn count(&self, focal_length: FocalLength) -> usize {
        self.counts.get(&focal_length).copied().unwrap_or(0)
    }

    /// Total images counted
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct focal lengths
    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Largest single count, 0 for an empty table
    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Entries in ascending focal-length order
    pub fn iter(&self) -> impl Iterator<Item = (FocalLength, usize)> + '_ {
        self.counts.iter().map(|(fl, count)| (*fl, *count))
    }

    /// The `n` most used focal lengths; ties go to the shorter focal length
    pub fn most_common(&self, n: usize) -> Vec<(FocalLength, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }
}
