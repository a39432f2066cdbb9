//! Line rendering
//!
//! `{letter} {YYYY-MM-DDTHH:MM:SS} {file}:{line} ->] {message}\n`
//!
//! The rotation bucket is computed from the same timestamp as the header so a
//! record never lands in a file whose bucket disagrees with its header time.

use crate::bucket::RotationPeriod;
use crate::caller::Caller;
use crate::constants::{HEADER_MARKER, HEADER_TIME_FORMAT};
use crate::severity::Severity;
use chrono::{DateTime, Local};
use std::fmt::{self, Write};

/// A fully rendered log line, ready for the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub severity: Severity,
    pub data: Vec<u8>,
    /// Bucket active when the record was produced
    pub bucket: String,
}

/// Message body of a log call
pub enum Message<'a> {
    /// Values joined with single spaces
    Values(&'a [&'a dyn fmt::Display]),
    /// Pre-formatted arguments
    Format(fmt::Arguments<'a>),
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            Self::Format(args) => f.write_fmt(*args),
        }
    }
}

/// Render the header and message into a `Record`
pub fn render(
    severity: Severity,
    caller: &Caller,
    now: &DateTime<Local>,
    period: RotationPeriod,
    message: &Message<'_>,
) -> Record {
    let mut line = String::with_capacity(64);
    // Writing into a String cannot fail.
    let _ = writeln!(
        line,
        "{} {} {}{}{}",
        severity.letter(),
        now.format(HEADER_TIME_FORMAT),
        caller,
        HEADER_MARKER,
        message
    );
    Record {
        severity,
        data: line.into_bytes(),
        bucket: period.bucket(now),
    }
}
