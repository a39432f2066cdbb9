//! Logger counters
//!
//! Thread-safe counters for rendered, written and dropped records.
//! Uses lock-free atomics for all operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Record counters (fully lock-free)
#[derive(Debug, Default)]
pub struct Stats {
    /// Lines rendered by the header formatter
    rendered: AtomicU64,
    /// Records fanned out to the file set
    written: AtomicU64,
    /// Records rejected by a full queue
    dropped: AtomicU64,
    /// Records that failed or were suppressed by a sticky error
    failed: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn add_rendered(&self) {
        self.rendered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn rendered(&self) -> u64 {
        self.rendered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}
