//! cascade-log - write log lines into cascading severity files
//!
//! Usage:
//!   cascade-log emit -s error disk full     Log one line
//!   some-command | cascade-log pipe -s info  Log each stdin line
//!   cascade-log --dir /var/log/app --name app --min-severity notice ...

mod cli;

use anyhow::Result;
use cascade_log::{diagnostics, Logger};
use clap::Parser;
use cli::{Cli, Command};
use std::fmt::Display;
use std::io::BufRead;

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init_tracing(cli.verbose);

    let options = cli.options()?;
    let logger = Logger::new(options)?;

    match &cli.command {
        Command::Emit { severity, words } => {
            let values: Vec<&dyn Display> = words.iter().map(|w| w as &dyn Display).collect();
            logger.log(*severity, &values);
        }
        Command::Pipe { severity } => {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                logger.log_f(*severity, format_args!("{}", line));
            }
        }
    }

    logger.flush()?;
    if let Some(reason) = logger.last_error() {
        anyhow::bail!("file output suspended: {}", reason);
    }
    Ok(())
}
