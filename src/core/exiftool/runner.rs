//! Process management for the exiftool binary.

use super::{ExifField, MetadataSource};
use crate::error::ExifToolError;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Flags for bulk JSON extraction after the fast-scan level: JSON,
/// numeric values, quiet, minor errors demoted to warnings.
const JSON_FLAGS: &[&str] = &["-j", "-n", "-q", "-m"];

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Handle to an exiftool installation
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ExifTool {
    /// Use `exiftool` from `PATH` with no timeout
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("exiftool"),
            timeout: None,
        }
    }

    /// Use a specific binary
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill invocations that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured binary
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Installed exiftool version (`exiftool -ver`)
    pub fn version(&self) -> Result<String, ExifToolError> {
        let output = self.run(vec![OsString::from("-ver")])?;
        if !output.status.success() {
            return Err(failed(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Whether the binary can be started at all
    pub fn is_available(&self) -> bool {
        self.version().is_ok()
    }

    fn run(&self, args: Vec<OsString>) -> Result<Output, ExifToolError> {
        debug!(program = %self.program.display(), args = args.len(), "spawning exiftool");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExifToolError::NotFound {
                    program: self.program.display().to_string(),
                },
                _ => ExifToolError::Io(e),
            })?;

        // Drain both pipes on their own threads so a chatty child cannot
        // block on a full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit)?,
            None => child.wait().map_err(ExifToolError::Io)?,
        };

        Ok(Output {
            status,
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
        })
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataSource for ExifTool {
    fn query_json(&self, files: &[PathBuf], fields: &[ExifField]) -> Result<String, ExifToolError> {
        let output = self.run(json_args(files, fields))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            // exiftool exits 1 when any single file fails; the rest is still usable.
            if stdout.trim_start().starts_with('[') {
                warn!(
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "exiftool reported errors for some files"
                );
            } else {
                return Err(failed(&output));
            }
        }

        Ok(stdout)
    }

    fn query_text(&self, file: &Path, fields: &[ExifField]) -> Result<String, ExifToolError> {
        let mut args: Vec<OsString> = fields.iter().map(|f| OsString::from(f.arg())).collect();
        args.push(file.as_os_str().to_os_string());

        let output = self.run(args)?;
        if !output.status.success() {
            return Err(failed(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn failed(output: &Output) -> ExifToolError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    ExifToolError::Failed {
        status: describe_status(output.status),
        stderr: if stderr.is_empty() {
            "no error output".to_string()
        } else {
            stderr
        },
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

type Drain = Option<JoinHandle<io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn collect(handle: Drain) -> Result<Vec<u8>, ExifToolError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| ExifToolError::Io(io::Error::other("pipe reader panicked")))?
            .map_err(ExifToolError::Io),
        None => Ok(Vec::new()),
    }
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<ExitStatus, ExifToolError> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().map_err(ExifToolError::Io)? {
            return Ok(status);
        }
        if started.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            warn!(seconds = limit.as_secs(), "exiftool timed out and was killed");
            return Err(ExifToolError::Timeout {
                seconds: limit.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Full argument list for a JSON query. `-fast2` also skips the maker
/// notes, so it is only used when no requested tag lives there.
fn json_args(files: &[PathBuf], fields: &[ExifField]) -> Vec<OsString> {
    let fast = if fields.iter().any(ExifField::in_maker_notes) {
        "-fast"
    } else {
        "-fast2"
    };
    let mut args = vec![OsString::from(fast)];
    args.extend(JSON_FLAGS.iter().map(OsString::from));
    args.extend(fields.iter().map(|f| OsString::from(f.arg())));
    args.extend(files.iter().map(|f| f.as_os_str().to_os_string()));
    args
}
