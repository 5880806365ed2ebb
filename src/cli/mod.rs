//! CLI module
//!
//! Command-line harness around the page loader.
//!
//! # Commands
//!
//! - `browse` - Page through bars near a location
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
