//! Library-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Line format
// =============================================================================

/// Header timestamp format (`YYYY-MM-DDTHH:MM:SS`)
pub const HEADER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Marker between the caller location and the message
pub const HEADER_MARKER: &str = " ->] ";

// =============================================================================
// Rotation
// =============================================================================

/// Bucket format for hourly rotation
pub const HOURLY_BUCKET_FORMAT: &str = "%Y%m%d%H";

/// Bucket format for daily rotation
pub const DAILY_BUCKET_FORMAT: &str = "%Y%m%d";

/// Extension of every log file
pub const LOG_EXTENSION: &str = "log";

// =============================================================================
// Delivery
// =============================================================================

/// Default capacity of the async record queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Name of the async writer thread
pub const WRITER_THREAD_NAME: &str = "cascade-log-writer";

// =============================================================================
// Defaults
// =============================================================================

/// Default base name used in every filename
pub const DEFAULT_BASE_NAME: &str = "app";

/// Default caller depth (the frame that called the facade)
pub const DEFAULT_CALLER_DEPTH: usize = 1;
