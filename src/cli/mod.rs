use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod demo;
mod info;

/// matflat - Legacy MAT record to NumPy archive converter
#[derive(Parser)]
#[command(name = "matflat-convert")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Defaults to `convert` with no options
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options of the convert command
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Directory of input .mat files [default: Data]
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Directory for the .npz archives [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Deflate archive entries (like numpy.savez_compressed)
    #[arg(long)]
    pub compress: bool,

    /// Top-level MAT variable holding the record [default: data]
    #[arg(long, value_name = "NAME")]
    pub variable: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every .mat file in a directory to .npz
    Convert(ConvertArgs),

    /// Display the fields of a converted .npz archive
    Info {
        /// Archive to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the whole mapping as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate sample legacy .mat files for testing
    Demo {
        /// Directory to write the files into
        #[arg(value_name = "DIR", default_value = "Data")]
        output: PathBuf,

        /// Number of files to generate
        #[arg(short = 'n', long, default_value = "3")]
        files: usize,

        /// Store variables zlib-compressed, as MATLAB does by default
        #[arg(long)]
        compress: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        None => convert::run(ConvertArgs::default()),
        Some(Commands::Convert(args)) => convert::run(args),
        Some(Commands::Info { file, json }) => info::run(file, json),
        Some(Commands::Demo {
            output,
            files,
            compress,
        }) => demo::run(output, files, compress),
    }
}
