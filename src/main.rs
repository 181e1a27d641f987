//! # phototool CLI
//!
//! Command-line interface for the photo toolkit.
//!
//! ## Usage
//! ```bash
//! phototool focal ~/Photos --recursive
//! phototool focal ~/Photos --mode single --output csv > focal.csv
//! phototool shutter ~/Photos/DSC_0001.NEF
//! phototool border ~/Photos/*.jpg --output-dir ~/Bordered --preset gallery
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            cli::report_error(&error);
            ExitCode::FAILURE
        }
    }
}
