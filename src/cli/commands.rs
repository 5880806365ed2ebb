//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse the bars feed from the terminal
#[derive(Parser, Debug)]
#[command(name = "barscout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through bars near a location
    Browse {
        /// Bars endpoint (overrides the config file)
        #[arg(long)]
        endpoint: Option<String>,

        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Tags to filter by (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Only bars open right now
        #[arg(long)]
        open_now: bool,

        /// Stop after this many pages
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Print the effective configuration
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One bar per line as JSON
    Json,
    /// Human-readable table
    Pretty,
}
