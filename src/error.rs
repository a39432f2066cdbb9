//! Centralized error types for the logger
//!
//! All logger errors are represented by the `LogError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, LogError>`.

use std::fmt;
use std::path::PathBuf;

/// All logger errors
#[derive(Debug)]
pub enum LogError {
    // === File system ===
    /// Log directory path exists but is not a directory
    DirectoryConflict { path: PathBuf },
    /// Create/open/write/link failed on a log file or directory
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Writing the terminal mirror failed
    Terminal { source: std::io::Error },

    // === Engine ===
    /// Severity value outside the known range
    UnknownSeverity { value: u8 },
    /// Async queue full and the overflow policy rejects
    QueueSaturated,
    /// Engine carries a sticky error; file writes are suppressed
    Degraded { reason: String },
    /// Async writer thread is gone
    WorkerStopped,

    // === Config ===
    /// Failed to read a config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },
}

impl LogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. }
            | Self::Terminal { source }
            | Self::ConfigRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryConflict { path } => {
                write!(f, "Log path is not a directory: {}", path.display())
            }
            Self::Io { path, source } => write!(f, "IO error: {}: {}", path.display(), source),
            Self::Terminal { source } => write!(f, "Terminal write failed: {}", source),
            Self::UnknownSeverity { value } => write!(f, "Unknown severity: {}", value),
            Self::QueueSaturated => write!(f, "Log queue is full"),
            Self::Degraded { reason } => write!(f, "Logger degraded: {}", reason),
            Self::WorkerStopped => write!(f, "Log writer thread stopped"),
            Self::ConfigRead { path, .. } => {
                write!(f, "Cannot read config: {}", path.display())
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
        }
    }
}

/// Alias for Result with LogError
pub type Result<T> = std::result::Result<T, LogError>;
