//! Severity-leveled file logger with cascading fan-out
//!
//! Every record is written to the file of its own severity and to the file
//! of every lower severity, so an ERROR line is visible to anyone tailing the
//! INFO file. Files rotate when the time bucket (hour or day) changes; a
//! hard-linked alias always names the newest file of each severity.
//!
//! On-disk layout for base name `app`:
//! - `app_error_2024070915.log` - versioned, append-only
//! - `app_error.log` - alias of the newest versioned file

pub mod bucket;
pub mod caller;
pub mod clock;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod file_set;
pub mod header;
pub mod logger;
mod macros;
pub mod severity;
pub mod stats;

pub use bucket::RotationPeriod;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Options;
pub use delivery::{Delivery, Overflow};
pub use error::{LogError, Result};
pub use logger::Logger;
pub use severity::Severity;
pub use stats::Stats;
