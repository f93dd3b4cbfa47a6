//! CLI argument parsing for fortunedb

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fdb")]
#[command(author, version, about = "In-memory indexed fortune corpus store", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Operate on a single corpus file instead of the configured directory
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the fortune at an ordinal position
    Get {
        /// Zero-based insertion position
        #[arg(required = true)]
        index: usize,
    },

    /// Print a uniformly random fortune
    Random {
        /// Only draw from files whose name starts with one of these
        /// ;-separated prefixes
        #[arg(short, long)]
        prefixes: Option<String>,

        /// Only draw from files whose name matches this regex
        #[arg(short, long)]
        regex: Option<String>,
    },

    /// Print the number of fortunes
    Size,

    /// List fortunes satisfying a metric predicate
    Query {
        /// Metric to filter on: length, width, or height
        #[arg(required = true)]
        metric: String,

        /// Keep fortunes whose metric equals this value
        #[arg(long, conflicts_with_all = ["min", "max"])]
        eq: Option<usize>,

        /// Keep fortunes whose metric is at least this value
        #[arg(long)]
        min: Option<usize>,

        /// Keep fortunes whose metric is at most this value
        #[arg(long)]
        max: Option<usize>,
    },

    /// Show corpus statistics
    Stats,
}
