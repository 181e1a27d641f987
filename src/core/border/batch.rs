//! Bordering many images into an output folder.

use super::{border_file, BorderSettings};
use crate::core::scanner::ImageKind;
use crate::error::{BorderError, ToolkitError};
use crate::events::{null_sender, BorderEvent, Event, EventSender};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Batches larger than this run on the worker pool
pub const PARALLEL_THRESHOLD: usize = 10;

const DEFAULT_WORKERS: usize = 4;

/// Result of bordering a batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BorderBatchResult {
    pub succeeded: usize,
    pub failed: usize,
    /// Written files, in input order
    pub outputs: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Applies one set of border settings to many images
pub struct BatchBorderer {
    settings: BorderSettings,
    output_dir: PathBuf,
    workers: usize,
}

impl BatchBorderer {
    /// Border images into `output_dir` using `settings`
    pub fn new(settings: BorderSettings, output_dir: impl Into<PathBuf>) -> Result<Self, ToolkitError> {
        settings.validate()?;
        Ok(Self {
            settings,
            output_dir: output_dir.into(),
            workers: DEFAULT_WORKERS,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn settings(&self) -> &BorderSettings {
        &self.settings
    }

    /// Where the bordered copy of `input` is written: `<stem>_bordered.<ext>`
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        self.numbered_output_path(input, 1)
    }

    /// Output path for each input, in order. An input whose name is already
    /// taken by an earlier one gets `_2`, `_3`, ... after `_bordered`.
    /// Names are compared ignoring case.
    pub fn output_paths(&self, images: &[PathBuf]) -> Vec<PathBuf> {
        let mut taken = HashSet::new();
        images
            .iter()
            .map(|input| {
                let mut n = 1;
                loop {
                    let candidate = self.numbered_output_path(input, n);
                    if taken.insert(candidate.to_string_lossy().to_lowercase()) {
                        if n > 1 {
                            debug!(
                                input = %input.display(),
                                output = %candidate.display(),
                                "output name taken, numbered"
                            );
                        }
                        return candidate;
                    }
                    n += 1;
                }
            })
            .collect()
    }

    fn numbered_output_path(&self, input: &Path, n: usize) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let suffix = if n > 1 {
            format!("_bordered_{}", n)
        } else {
            "_bordered".to_string()
        };
        let name = match input.extension() {
            Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
            None => format!("{}{}", stem, suffix),
        };
        self.output_dir.join(name)
    }

    fn border_one(&self, input: &Path, output: PathBuf) -> Result<PathBuf, BorderError> {
        if !ImageKind::from_path(input).is_decodable() {
            return Err(BorderError::Unsupported {
                path: input.to_path_buf(),
            });
        }
        border_file(input, &output, &self.settings).map(|_| output)
    }

    /// Border every image without events
    pub fn run(&self, images: &[PathBuf]) -> Result<BorderBatchResult, ToolkitError> {
        self.run_with_events(images, &null_sender())
    }

    /// Border every image, reporting progress. A failed image is counted
    /// and the batch continues.
    pub fn run_with_events(
        &self,
        images: &[PathBuf],
        events: &EventSender,
    ) -> Result<BorderBatchResult, ToolkitError> {
        if images.is_empty() {
            return Err(BorderError::NoImages.into());
        }
        fs::create_dir_all(&self.output_dir).map_err(|source| BorderError::OutputDirectory {
            path: self.output_dir.clone(),
            source,
        })?;

        let start = Instant::now();
        let total = images.len();
        let parallel = total > PARALLEL_THRESHOLD && self.workers > 1;
        info!(images = total, parallel, workers = self.workers, "bordering images");
        events.send(Event::Border(BorderEvent::Started { total_images: total }));

        let jobs: Vec<(&PathBuf, PathBuf)> = images.iter().zip(self.output_paths(images)).collect();
        let completed = AtomicUsize::new(0);
        let process = |(input, output): &(&PathBuf, PathBuf)| {
            let result = self.border_one(input, output.clone());
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Err(e) = &result {
                warn!(path = %input.display(), "border failed: {}", e);
                events.send(Event::Border(BorderEvent::ImageFailed {
                    path: input.to_path_buf(),
                    message: e.to_string(),
                }));
            }
            events.send(Event::Border(BorderEvent::Progress {
                completed: done,
                total,
                current_path: input.to_path_buf(),
            }));
            result
        };

        let outcomes: Vec<Result<PathBuf, BorderError>> = if parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .thread_name(|i| format!("border-worker-{}", i))
                .build()
                .map_err(|e| ToolkitError::Config(format!("failed to start worker pool: {}", e)))?;
            pool.install(|| jobs.par_iter().map(process).collect())
        } else {
            jobs.iter().map(process).collect()
        };

        let mut result = BorderBatchResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(output) => {
                    result.succeeded += 1;
                    result.outputs.push(output);
                }
                Err(e) => {
                    result.failed += 1;
                    result.errors.push(e.to_string());
                }
            }
        }
        result.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            duration_ms = result.duration_ms,
            "bordering complete"
        );
        events.send(Event::Border(BorderEvent::Completed {
            succeeded: result.succeeded,
            failed: result.failed,
        }));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::border::BorderColor;
    use crate::events::EventChannel;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_images(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("photo_{:02}.png", i));
                RgbImage::from_pixel(6, 4, Rgb([i as u8, 0, 0])).save(&path).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn names_outputs_after_inputs() {
        let borderer = BatchBorderer::new(BorderSettings::default(), "/out").unwrap();
        assert_eq!(
            borderer.output_path_for(Path::new("/photos/DSC_0001.JPG")),
            PathBuf::from("/out/DSC_0001_bordered.JPG")
        );
        assert_eq!(
            borderer.output_path_for(Path::new("/photos/scan")),
            PathBuf::from("/out/scan_bordered")
        );
    }

    #[test]
    fn same_named_inputs_get_numbered_outputs() {
        let borderer = BatchBorderer::new(BorderSettings::default(), "/out").unwrap();
        let images = vec![
            PathBuf::from("/day1/x.jpg"),
            PathBuf::from("/day2/x.jpg"),
            PathBuf::from("/day3/X.JPG"),
            PathBuf::from("/day1/y.jpg"),
        ];

        assert_eq!(
            borderer.output_paths(&images),
            vec![
                PathBuf::from("/out/x_bordered.jpg"),
                PathBuf::from("/out/x_bordered_2.jpg"),
                PathBuf::from("/out/X_bordered_3.JPG"),
                PathBuf::from("/out/y_bordered.jpg"),
            ]
        );
    }

    #[test]
    fn colliding_inputs_are_all_written() {
        let temp = TempDir::new().unwrap();
        let mut images = Vec::new();
        for (folder, shade) in [("a", 10u8), ("b", 200u8)] {
            let dir = temp.path().join(folder);
            fs::create_dir(&dir).unwrap();
            let path = dir.join("x.png");
            RgbImage::from_pixel(3, 3, Rgb([shade, shade, shade])).save(&path).unwrap();
            images.push(path);
        }
        let out = temp.path().join("out");

        let borderer = BatchBorderer::new(BorderSettings::uniform(1, BorderColor::BLACK), &out).unwrap();
        let result = borderer.run(&images).unwrap();

        assert_eq!(result.succeeded, 2);
        assert_eq!(result.outputs, vec![out.join("x_bordered.png"), out.join("x_bordered_2.png")]);
        let first = image::open(&result.outputs[0]).unwrap().to_rgb8();
        let second = image::open(&result.outputs[1]).unwrap().to_rgb8();
        assert_eq!(first.get_pixel(1, 1), &Rgb([10, 10, 10]));
        assert_eq!(second.get_pixel(1, 1), &Rgb([200, 200, 200]));
    }

    #[test]
    fn raw_inputs_fail_without_decoding() {
        let temp = TempDir::new().unwrap();
        let mut images = write_images(temp.path(), 1);
        let raw = temp.path().join("DSC_0001.NEF");
        fs::write(&raw, b"raw sensor data").unwrap();
        images.push(raw);

        let borderer = BatchBorderer::new(BorderSettings::uniform(1, BorderColor::WHITE), temp.path().join("out"))
            .unwrap();
        let result = borderer.run(&images).unwrap();

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failed, 1);
        assert!(result.errors[0].contains("DSC_0001.NEF"));
        assert!(result.errors[0].contains("camera raw and HEIC"));
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = BorderSettings {
            top: 10_000,
            ..Default::default()
        };
        assert!(matches!(
            BatchBorderer::new(settings, "/out"),
            Err(ToolkitError::Settings(_))
        ));
    }

    #[test]
    fn empty_batch_is_an_error() {
        let temp = TempDir::new().unwrap();
        let borderer = BatchBorderer::new(BorderSettings::default(), temp.path()).unwrap();
        assert!(matches!(
            borderer.run(&[]),
            Err(ToolkitError::Border(BorderError::NoImages))
        ));
    }

    #[test]
    fn sequential_batch_counts_failures() {
        let temp = TempDir::new().unwrap();
        let mut images = write_images(temp.path(), 3);
        let broken = temp.path().join("broken.png");
        fs::write(&broken, b"garbage").unwrap();
        images.insert(1, broken);

        let out = temp.path().join("out");
        let borderer = BatchBorderer::new(BorderSettings::uniform(2, BorderColor::WHITE), &out)
            .unwrap()
            .with_workers(1);
        let result = borderer.run(&images).unwrap();

        assert_eq!(result.succeeded, 3);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("broken.png"));
        assert!(out.join("photo_00_bordered.png").exists());
        assert!(!out.join("broken_bordered.png").exists());
    }

    #[test]
    fn parallel_batch_borders_every_image() {
        let temp = TempDir::new().unwrap();
        let images = write_images(temp.path(), PARALLEL_THRESHOLD + 5);
        let out = temp.path().join("out");

        let (sender, receiver) = EventChannel::new();
        let borderer = BatchBorderer::new(BorderSettings::uniform(1, BorderColor::BLACK), &out)
            .unwrap()
            .with_workers(3);
        let result = borderer.run_with_events(&images, &sender).unwrap();

        assert_eq!(result.succeeded, images.len());
        assert_eq!(result.failed, 0);
        let expected: Vec<_> = images.iter().map(|p| borderer.output_path_for(p)).collect();
        assert_eq!(result.outputs, expected);
        for output in &result.outputs {
            assert_eq!(image::open(output).unwrap().to_rgb8().dimensions(), (8, 6));
        }

        drop(sender);
        let events: Vec<_> = receiver.iter().collect();
        let progress = events
            .iter()
            .filter(|e| matches!(e, Event::Border(BorderEvent::Progress { .. })))
            .count();
        assert_eq!(progress, images.len());
        assert!(matches!(
            events.last(),
            Some(Event::Border(BorderEvent::Completed { failed: 0, .. }))
        ));
    }
}
