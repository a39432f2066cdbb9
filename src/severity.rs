//! Severity levels
//!
//! Ordered `DEBUG < INFO < TRACE < NOTICE < WARNING < ERROR`. A record at a
//! given severity is also written to the file of every lower severity.

use crate::error::LogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Trace = 2,
    Notice = 3,
    Warning = 4,
    Error = 5,
}

impl Severity {
    /// Number of severities (and files per set)
    pub const COUNT: usize = 6;

    /// All severities, ascending
    pub const ALL: [Severity; Severity::COUNT] = [
        Severity::Debug,
        Severity::Info,
        Severity::Trace,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
    ];

    /// Single-letter tag at the start of each line
    pub fn letter(self) -> &'static str {
        match self {
            Self::Debug => "D",
            Self::Info => "I",
            Self::Trace => "T",
            Self::Notice => "N",
            Self::Warning => "W",
            Self::Error => "E",
        }
    }

    /// Tag used in filenames
    pub fn file_tag(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Trace => "trace",
            Self::Notice => "notice",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }

    /// Position in `ALL`
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `self` followed by every strictly lower severity, descending.
    pub fn cascade(self) -> impl DoubleEndedIterator<Item = Severity> {
        (0..=self.index()).rev().map(|i| Self::ALL[i])
    }
}

impl TryFrom<u8> for Severity {
    type Error = LogError;

    fn try_from(value: u8) -> Result<Self, LogError> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(LogError::UnknownSeverity { value })
    }
}

impl FromStr for Severity {
    type Err = LogError;

    /// Accepts the file tag, the full name, or the letter (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|sev| {
                lower == sev.file_tag()
                    || lower == sev.to_string().to_ascii_lowercase()
                    || lower == sev.letter().to_ascii_lowercase()
            })
            .ok_or_else(|| LogError::ConfigValidation {
                field: "severity",
                reason: format!("unknown severity '{}'", s),
            })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Trace => "TRACE",
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}
