//! Folder walking with walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{ImageFile, ImageKind, ImageScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the folder scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Descend into subfolders
    pub recursive: bool,
    /// Include hidden files and folders
    pub include_hidden: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Custom extensions (None = [`super::DEFAULT_EXTENSIONS`])
    pub extensions: Option<Vec<String>>,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);
        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }
        Self { config, filter }
    }

    fn scan_folder(
        &self,
        root: &Path,
        events: &EventSender,
        found: &mut BTreeMap<PathBuf, ImageFile>,
        errors: &mut Vec<ScanError>,
    ) -> Result<(), ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .min_depth(1);
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        // The predicate also sees the root, which may itself be a dot-folder.
        let include_hidden = self.config.include_hidden;
        let entries = walker.into_iter().filter_entry(|e| {
            include_hidden || e.depth() == 0 || !e.file_type().is_dir() || !is_hidden(e.path())
        });

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    warn!(path = %path.display(), "{}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            if !entry.file_type().is_file() && !entry.path().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.filter.should_include(path) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    let image = ImageFile {
                        path: path.to_path_buf(),
                        size: metadata.len(),
                        kind: ImageKind::from_path(path),
                    };
                    if !found.contains_key(&image.path) {
                        events.send(Event::Scan(ScanEvent::ImageFound {
                            path: image.path.clone(),
                        }));
                        found.insert(image.path.clone(), image);
                    }
                }
                Err(e) => {
                    let error = ScanError::ReadDirectory {
                        path: path.to_path_buf(),
                        source: std::io::Error::other(e.to_string()),
                    };
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        Ok(())
    }
}

impl ImageScanner for WalkDirScanner {
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError> {
        self.scan_with_events(paths, &crate::events::null_sender())
    }

    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        // Keyed by path so overlapping roots yield each image once.
        let mut found = BTreeMap::new();
        let mut errors = Vec::new();

        for path in paths {
            if let Err(e) = self.scan_folder(path, events, &mut found, &mut errors) {
                warn!("{}", e);
                events.send(Event::Scan(ScanEvent::Error {
                    path: path.clone(),
                    message: e.to_string(),
                }));
                errors.push(e);
            }
        }

        debug!(images = found.len(), errors = errors.len(), "scan finished");
        events.send(Event::Scan(ScanEvent::Completed {
            total_images: found.len(),
        }));

        Ok(ScanResult {
            images: found.into_values().collect(),
            errors,
        })
    }
}
