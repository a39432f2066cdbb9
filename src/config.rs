//! Logger configuration
//!
//! `Options` is fixed once the logger is built; changing rotation or fan-out
//! behavior means building a new logger. It can be loaded from TOML:
//!
//! ```toml
//! dir = "/var/log/myapp"
//! name = "myapp"
//! min_severity = "notice"
//! mirror_to_terminal = false
//! rotation = "hourly"
//!
//! [delivery]
//! mode = "async"
//! capacity = 512
//! overflow = "block"
//! ```

use crate::bucket::RotationPeriod;
use crate::constants::DEFAULT_BASE_NAME;
use crate::delivery::Delivery;
use crate::error::{LogError, Result};
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Log directory, created if absent
    pub dir: PathBuf,
    /// Base name used in every filename
    pub name: String,
    /// Records below this severity are discarded before rendering
    pub min_severity: Severity,
    /// Also write every record to stdout
    pub mirror_to_terminal: bool,
    /// Rotation granularity
    pub rotation: RotationPeriod,
    /// Sync or async delivery
    pub delivery: Delivery,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
            name: DEFAULT_BASE_NAME.to_string(),
            min_severity: Severity::Debug,
            mirror_to_terminal: false,
            rotation: RotationPeriod::Hourly,
            delivery: Delivery::Sync,
        }
    }
}

impl Options {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn mirror_to_terminal(mut self, enabled: bool) -> Self {
        self.mirror_to_terminal = enabled;
        self
    }

    pub fn rotation(mut self, period: RotationPeriod) -> Self {
        self.rotation = period;
        self
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Parse options from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: Options =
            toml::from_str(content).map_err(|e| LogError::ConfigValidation {
                field: "config",
                reason: e.to_string(),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LogError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject values that would produce unusable filenames or queues
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LogError::ConfigValidation {
                field: "name",
                reason: "must not be empty".into(),
            });
        }
        if self.name.contains(['/', '\\']) {
            return Err(LogError::ConfigValidation {
                field: "name",
                reason: format!("'{}' contains a path separator", self.name),
            });
        }
        if let Delivery::Async { capacity: 0, .. } = self.delivery {
            return Err(LogError::ConfigValidation {
                field: "delivery.capacity",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
