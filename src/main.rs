//! # matflat Converter
//!
//! Converts legacy MATLAB spike-sorting records to NumPy `.npz` archives.
//!
//! ## Usage
//!
//! ```bash
//! # Convert every Data/*.mat into ./*.npz
//! matflat-convert
//!
//! # Same, with explicit directories and compressed archives
//! matflat-convert convert --input recordings --output converted --compress
//!
//! # Inspect a converted archive
//! matflat-convert info session_01.npz
//!
//! # Write sample legacy files to try the converter on
//! matflat-convert demo Data
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
