pub mod report;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for scintimark
#[derive(Parser, Debug)]
#[command(name = "scintimark")]
#[command(about = "Lesion zone scoring and case worklist for whole-body scintigraphy")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log records to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a JSON region snapshot
    Score {
        /// Region snapshot exported from the annotation host
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Engine configuration (JSON)
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the cases of a directory and their progress
    Worklist {
        /// Directory containing the scans
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,

        /// Reading stage
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        stage: u8,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
