//! # Photo Toolkit
//!
//! Focal-length statistics, shutter counts and image borders for photographers.
//!
//! ## Features
//! - **Focal-length analysis** - how often each focal length appears in a folder,
//!   read through exiftool in parallel batches
//! - **Shutter count** - actuation count of the camera that took an image
//! - **Borders** - solid-color frames around one or many images, with saved presets
//!
//! ## Architecture
//! - `core` - The engine, free of any front end
//! - `events` - Progress events for front ends
//! - `error` - User-friendly error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, ToolkitError};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `info` and the
/// default is `warn`. Logs go to stderr so they never mix with exported
/// output on stdout. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
