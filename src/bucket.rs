//! Time buckets
//!
//! A bucket is the coarse time key that decides which versioned file set is
//! active. A record whose bucket differs from the engine's active bucket
//! triggers a rotation.

use crate::constants::{DAILY_BUCKET_FORMAT, HOURLY_BUCKET_FORMAT};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Rotation granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPeriod {
    /// New file set every hour
    #[default]
    Hourly,
    /// New file set every day
    Daily,
}

impl RotationPeriod {
    fn format(self) -> &'static str {
        match self {
            Self::Hourly => HOURLY_BUCKET_FORMAT,
            Self::Daily => DAILY_BUCKET_FORMAT,
        }
    }

    /// Bucket key for `now`
    pub fn bucket(self, now: &DateTime<Local>) -> String {
        now.format(self.format()).to_string()
    }
}
