//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use cascade_log::{Delivery, Options, Result, Severity};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Write log lines into cascading, rotating severity files
#[derive(Parser, Debug)]
#[command(name = "cascade-log")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose diagnostic output
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML options file (flags below override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log directory (default: platform temp dir)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Base name used in every filename
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Discard records below this severity
    #[arg(long, value_name = "SEVERITY")]
    pub min_severity: Option<Severity>,

    /// Mirror every record to stdout
    #[arg(long)]
    pub stdout: bool,

    /// Write from a background thread
    #[arg(long = "async")]
    pub async_delivery: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to log
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log one line made of the given words
    Emit {
        /// Severity of the line
        #[arg(short, long, default_value = "info")]
        severity: Severity,

        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Log every line read from stdin
    Pipe {
        /// Severity of each line
        #[arg(short, long, default_value = "info")]
        severity: Severity,
    },
}

impl Cli {
    /// Resolve options: config file (or defaults), then flag overrides
    pub fn options(&self) -> Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::load(path)?,
            None => Options::default(),
        };
        if let Some(dir) = &self.dir {
            options.dir = dir.clone();
        }
        if let Some(name) = &self.name {
            options.name = name.clone();
        }
        if let Some(severity) = self.min_severity {
            options.min_severity = severity;
        }
        if self.stdout {
            options.mirror_to_terminal = true;
        }
        if self.async_delivery && options.delivery == Delivery::Sync {
            options.delivery = Delivery::Async {
                capacity: cascade_log::constants::DEFAULT_QUEUE_CAPACITY,
                overflow: Default::default(),
            };
        }
        options.validate()?;
        Ok(options)
    }
}

// =============================================================================
// Tests
// =============================================================================
