//! Diagnostic side channel
//!
//! Write failures on entry points without an error return are reported as
//! `tracing` events. A degraded engine rejects every record until the next
//! successful rotation; those rejections are counted in `Stats` and not
//! re-reported, since the failure that caused them already was.

use crate::error::LogError;
use tracing::{error, warn};

/// Initialize tracing output on stderr for the library's diagnostics
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}

/// Report a failure from a call site that cannot return it
pub(crate) fn report(err: &LogError) {
    match err {
        LogError::Degraded { .. } => {}
        LogError::QueueSaturated => warn!("log queue full, record dropped"),
        _ => error!(error = %err, "log write failed"),
    }
}
