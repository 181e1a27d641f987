//! Batched metadata extraction and focal-length analysis.

use super::table::FocalLengthTable;
use crate::core::exiftool::{parse_json_output, ExifField, ExifTool, MetadataSource, ANALYSIS_FIELDS};
use crate::core::metadata::MetadataRecord;
use crate::core::scanner::{ImageKind, ImageScanner, ScanConfig, WalkDirScanner};
use crate::error::{ExifToolError, ScanError, ToolkitError};
use crate::events::{null_sender, BatchProgress, Event, EventSender, ExtractEvent};
use rayon::prelude::*;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How files are handed to exiftool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One invocation per fixed-size batch, batches spread across workers
    Batched,
    /// One invocation for every file; the output is parsed across workers
    Single,
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMode::Batched => write!(f, "batched"),
            ExtractionMode::Single => write!(f, "single"),
        }
    }
}

/// Configuration for the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub mode: ExtractionMode,
    /// Files per exiftool invocation in batched mode
    pub batch_size: usize,
    /// Worker threads for invocation and parsing
    pub workers: usize,
    /// Tags to request
    pub fields: Vec<ExifField>,
    pub scan_config: ScanConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Batched,
            batch_size: 100,
            workers: 4,
            fields: ANALYSIS_FIELDS.to_vec(),
            scan_config: ScanConfig::default(),
        }
    }
}

/// Result of a focal-length analysis run
#[derive(Debug, Clone, Default)]
pub struct FocalAnalysis {
    /// One record per image that exiftool reported on
    pub records: BTreeMap<PathBuf, MetadataRecord>,
    /// Focal-length frequency
    pub table: FocalLengthTable,
    /// Images found in the folder
    pub total_images: usize,
    /// Images that reported a focal length
    pub images_with_focal_length: usize,
    /// Non-fatal problems (skipped batches, unreadable entries)
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl FocalAnalysis {
    fn from_records(
        records: BTreeMap<PathBuf, MetadataRecord>,
        total_images: usize,
        errors: Vec<String>,
        duration_ms: u64,
    ) -> Self {
        let table = FocalLengthTable::from_records(records.values());
        Self {
            images_with_focal_length: table.total(),
            table,
            records,
            total_images,
            errors,
            duration_ms,
        }
    }

    /// Number of distinct focal lengths
    pub fn unique_focal_lengths(&self) -> usize {
        self.table.unique()
    }

    /// Images per camera, most used first, ties by name
    pub fn cameras(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for camera in self.records.values().filter_map(MetadataRecord::camera_display) {
            *counts.entry(camera).or_insert(0) += 1;
        }
        let mut cameras: Vec<_> = counts.into_iter().collect();
        cameras.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        cameras
    }
}

/// Builder for [`FocalAnalyzer`]
pub struct FocalAnalyzerBuilder {
    config: AnalyzerConfig,
    source: Option<Box<dyn MetadataSource>>,
}

impl FocalAnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            source: None,
        }
    }

    /// Set the extraction mode
    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the batch size (batched mode only)
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the worker count
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Override the requested tags
    pub fn fields(mut self, fields: Vec<ExifField>) -> Self {
        self.config.fields = fields;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Descend into subfolders
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.scan_config.recursive = recursive;
        self
    }

    /// Use a specific metadata source (defaults to `exiftool` on `PATH`)
    pub fn source(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Validate the configuration and start the worker pool
    pub fn build(self) -> Result<FocalAnalyzer, ToolkitError> {
        if self.config.batch_size == 0 {
            return Err(ToolkitError::Config("batch size must be at least 1".to_string()));
        }
        if self.config.workers == 0 {
            return Err(ToolkitError::Config("worker count must be at least 1".to_string()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("exif-worker-{}", i))
            .build()
            .map_err(|e| ToolkitError::Config(format!("failed to start worker pool: {}", e)))?;

        Ok(FocalAnalyzer {
            config: self.config,
            source: self.source.unwrap_or_else(|| Box::new(ExifTool::new())),
            pool,
        })
    }
}

impl Default for FocalAnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of one exiftool invocation
struct BatchOutcome {
    index: usize,
    files: usize,
    records: Result<Vec<MetadataRecord>, ExifToolError>,
}

/// Runs exiftool over a folder and tabulates focal lengths
pub struct FocalAnalyzer {
    config: AnalyzerConfig,
    source: Box<dyn MetadataSource>,
    pool: rayon::ThreadPool,
}

impl FocalAnalyzer {
    /// Create a new analyzer builder
    pub fn builder() -> FocalAnalyzerBuilder {
        FocalAnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a folder without events
    pub fn analyze(&self, folder: &Path) -> Result<FocalAnalysis, ToolkitError> {
        self.analyze_with_events(folder, &null_sender())
    }

    /// Scan `folder` and analyze every image found, reporting progress
    pub fn analyze_with_events(
        &self,
        folder: &Path,
        events: &EventSender,
    ) -> Result<FocalAnalysis, ToolkitError> {
        if !folder.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: folder.to_path_buf(),
            }
            .into());
        }

        let scanner = WalkDirScanner::new(self.config.scan_config.clone());
        let scan = scanner.scan_with_events(&[folder.to_path_buf()], events)?;
        let files = scan.paths();
        info!(
            images = files.len(),
            raw = scan.count_of(ImageKind::Raw),
            bytes = scan.total_bytes(),
            "scan finished"
        );

        let mut analysis = self.extract_with_events(&files, events)?;
        let mut errors: Vec<String> = scan.errors.iter().map(|e| e.to_string()).collect();
        errors.append(&mut analysis.errors);
        analysis.errors = errors;
        Ok(analysis)
    }

    /// Analyze an explicit list of files
    pub fn extract_with_events(
        &self,
        files: &[PathBuf],
        events: &EventSender,
    ) -> Result<FocalAnalysis, ToolkitError> {
        let start = Instant::now();

        if files.is_empty() {
            info!("no image files to analyze");
            events.send(Event::Extract(ExtractEvent::Completed {
                records: 0,
                with_focal_length: 0,
                duration_ms: 0,
            }));
            return Ok(FocalAnalysis::default());
        }

        let total_batches = match self.config.mode {
            ExtractionMode::Batched => files.len().div_ceil(self.config.batch_size),
            ExtractionMode::Single => 1,
        };
        info!(
            files = files.len(),
            batches = total_batches,
            workers = self.config.workers,
            mode = %self.config.mode,
            "starting metadata extraction"
        );
        events.send(Event::Extract(ExtractEvent::Started {
            total_files: files.len(),
            batches: total_batches,
        }));

        let outcomes = match self.config.mode {
            ExtractionMode::Batched => self.run_batched(files, events),
            ExtractionMode::Single => vec![self.run_single(files, events)],
        };

        // Join-then-merge: all workers have finished at this point.
        let mut records = BTreeMap::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome.records {
                Ok(batch) => {
                    for record in batch {
                        match records.entry(record.path.clone()) {
                            Entry::Vacant(slot) => {
                                slot.insert(record);
                            }
                            Entry::Occupied(_) => {
                                debug!(path = %record.path.display(), "duplicate entry ignored");
                            }
                        }
                    }
                }
                Err(e @ ExifToolError::NotFound { .. }) => return Err(e.into()),
                Err(e) => {
                    warn!(batch = outcome.index + 1, files = outcome.files, "batch skipped: {}", e);
                    errors.push(format!(
                        "Batch {} ({} files) skipped: {}",
                        outcome.index + 1,
                        outcome.files,
                        e
                    ));
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let analysis = FocalAnalysis::from_records(records, files.len(), errors, duration_ms);

        info!(
            records = analysis.records.len(),
            with_focal_length = analysis.images_with_focal_length,
            duration_ms,
            "metadata extraction finished"
        );
        events.send(Event::Extract(ExtractEvent::Completed {
            records: analysis.records.len(),
            with_focal_length: analysis.images_with_focal_length,
            duration_ms,
        }));

        Ok(analysis)
    }

    fn run_batched(&self, files: &[PathBuf], events: &EventSender) -> Vec<BatchOutcome> {
        let batches: Vec<&[PathBuf]> = files.chunks(self.config.batch_size).collect();
        let total_batches = batches.len();
        let completed = AtomicUsize::new(0);
        let files_done = AtomicUsize::new(0);

        self.pool.install(|| {
            batches
                .par_iter()
                .enumerate()
                .map(|(index, batch)| {
                    let records = self
                        .source
                        .query_json(batch, &self.config.fields)
                        .and_then(|output| parse_json_output(&output))
                        .map(|objects| {
                            objects
                                .iter()
                                .filter_map(MetadataRecord::from_json)
                                .collect::<Vec<_>>()
                        });

                    let outcome = BatchOutcome {
                        index,
                        files: batch.len(),
                        records,
                    };
                    report(
                        &outcome,
                        completed.fetch_add(1, Ordering::SeqCst) + 1,
                        total_batches,
                        files_done.fetch_add(batch.len(), Ordering::SeqCst) + batch.len(),
                        events,
                    );
                    outcome
                })
                .collect()
        })
    }

    fn run_single(&self, files: &[PathBuf], events: &EventSender) -> BatchOutcome {
        let records = self
            .source
            .query_json(files, &self.config.fields)
            .and_then(|output| parse_json_output(&output))
            .map(|objects| {
                let chunk_size = objects.len().div_ceil(self.config.workers).max(1);
                debug!(entries = objects.len(), chunk_size, "parsing exiftool output");
                self.pool.install(|| {
                    objects
                        .par_chunks(chunk_size)
                        .flat_map_iter(|chunk| {
                            chunk
                                .iter()
                                .filter_map(MetadataRecord::from_json)
                                .collect::<Vec<_>>()
                        })
                        .collect::<Vec<_>>()
                })
            });

        let outcome = BatchOutcome {
            index: 0,
            files: files.len(),
            records,
        };
        report(&outcome, 1, 1, files.len(), events);
        outcome
    }
}

fn report(
    outcome: &BatchOutcome,
    completed_batches: usize,
    total_batches: usize,
    files_done: usize,
    events: &EventSender,
) {
    let event = match &outcome.records {
        Ok(records) => ExtractEvent::BatchCompleted(BatchProgress {
            index: outcome.index,
            completed_batches,
            total_batches,
            files_done,
            records: records.len(),
        }),
        Err(e) => ExtractEvent::BatchFailed {
            index: outcome.index,
            files: outcome.files,
            message: e.to_string(),
        },
    };
    events.send(Event::Extract(event));
}
