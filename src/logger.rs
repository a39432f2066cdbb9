//! Logging facade
//!
//! One plain and one formatted method per severity. Each call is filtered
//! against the configured minimum severity before anything is rendered, then
//! rendered on the calling thread and handed to the delivery path.
//!
//! ```ignore
//! let logger = Logger::new(Options::new("/var/log/svc", "svc"))?;
//! logger.info(&[&"listening on", &port]);
//! logger.error_f(format_args!("request {} failed: {}", id, err));
//! cascade_log::log_warn!(logger, "retrying in {}s", delay);
//! ```

use crate::caller::Caller;
use crate::clock::{Clock, SystemClock};
use crate::config::Options;
use crate::constants::DEFAULT_CALLER_DEPTH;
use crate::delivery::Dispatcher;
use crate::diagnostics;
use crate::engine::Engine;
use crate::error::Result;
use crate::file_set::FileOperator;
use crate::header::{self, Message};
use crate::severity::Severity;
use crate::stats::Stats;
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Inner {
    options: Options,
    clock: Arc<dyn Clock>,
    engine: Arc<Engine>,
    dispatcher: Dispatcher,
    depth: AtomicUsize,
    stats: Arc<Stats>,
}

/// Cheap, cloneable handle to one logging engine
///
/// The plain and `_f` methods have no error return. Their failures go to
/// `tracing` and only reach stderr when the host has installed a subscriber,
/// for example with [`crate::diagnostics::init_tracing`]. Without one, poll
/// [`Logger::last_error`] and [`Logger::stats`], or log through
/// [`Logger::try_log`].
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("options", &self.inner.options)
            .field("caller_depth", &self.caller_depth())
            .finish()
    }
}

impl Logger {
    /// Build a logger on the system clock.
    ///
    /// Fails if the options are invalid, the directory cannot be prepared,
    /// or any initial file cannot be created or linked.
    pub fn new(options: Options) -> Result<Self> {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    pub fn with_clock(options: Options, clock: Arc<dyn Clock>) -> Result<Self> {
        options.validate()?;
        let stats = Arc::new(Stats::new());
        let engine = Arc::new(Engine::open(
            FileOperator::new(&options.dir, &options.name),
            options.rotation,
            &clock.now(),
            options.mirror_to_terminal,
            stats.clone(),
        )?);
        let dispatcher = Dispatcher::new(options.delivery, engine.clone(), stats.clone())?;

        Ok(Self {
            inner: Arc::new(Inner {
                options,
                clock,
                engine,
                dispatcher,
                depth: AtomicUsize::new(DEFAULT_CALLER_DEPTH),
                stats,
            }),
        })
    }

    // === Caller depth ===

    /// Override the caller depth reported in line headers.
    ///
    /// 1 is the frame that called the facade. Wrappers that add their own
    /// (non-`#[track_caller]`) frames raise it by one per frame. Does not
    /// affect the severity filter.
    pub fn set_level(&self, depth: usize) {
        self.inner.depth.store(depth, Ordering::Relaxed);
    }

    pub fn caller_depth(&self) -> usize {
        self.inner.depth.load(Ordering::Relaxed)
    }

    // === Accessors ===

    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    pub fn stats(&self) -> &Stats {
        &self.inner.stats
    }

    /// Whether a record at `severity` passes the filter
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.inner.options.min_severity
    }

    /// Sticky engine error, if file output is suspended
    pub fn last_error(&self) -> Option<String> {
        self.inner.engine.last_error()
    }

    pub fn active_bucket(&self) -> String {
        self.inner.engine.active_bucket()
    }

    pub fn versioned_path(&self, severity: Severity) -> PathBuf {
        self.inner.engine.versioned_path(severity)
    }

    pub fn alias_path(&self, severity: Severity) -> PathBuf {
        self.inner.engine.alias_path(severity)
    }

    /// Block until every record logged so far is written
    pub fn flush(&self) -> Result<()> {
        self.inner.dispatcher.flush()
    }

    // === Error-returning entry points ===

    /// Log formatted arguments and return any delivery error
    #[track_caller]
    pub fn try_log(&self, severity: Severity, args: fmt::Arguments<'_>) -> Result<()> {
        self.submit(
            severity,
            Location::caller(),
            self.caller_depth(),
            &Message::Format(args),
        )
    }

    /// Log with an explicit call site, for wrappers that capture their own.
    ///
    /// The caller depth is ignored.
    pub fn log_at(
        &self,
        severity: Severity,
        location: &'static Location<'static>,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        self.submit(
            severity,
            location,
            DEFAULT_CALLER_DEPTH,
            &Message::Format(args),
        )
    }

    // === Plain and formatted entry points ===

    #[track_caller]
    pub fn log(&self, severity: Severity, values: &[&dyn fmt::Display]) {
        self.emit(severity, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn log_f(&self, severity: Severity, args: fmt::Arguments<'_>) {
        self.emit(severity, Location::caller(), Message::Format(args));
    }

    #[track_caller]
    pub fn debug(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Debug, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn debug_f(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Debug, Location::caller(), Message::Format(args));
    }

    #[track_caller]
    pub fn info(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Info, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn info_f(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Info, Location::caller(), Message::Format(args));
    }

    #[track_caller]
    pub fn trace(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Trace, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn trace_f(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Trace, Location::caller(), Message::Format(args));
    }

    #[track_caller]
    pub fn notice(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Notice, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn notice_f(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Notice, Location::caller(), Message::Format(args));
    }

    #[track_caller]
    pub fn warn(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Warning, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn warn_f(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Warning, Location::caller(), Message::Format(args));
    }

    #[track_caller]
    pub fn error(&self, values: &[&dyn fmt::Display]) {
        self.emit(Severity::Error, Location::caller(), Message::Values(values));
    }

    #[track_caller]
    pub fn error_f(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::Error, Location::caller(), Message::Format(args));
    }

    // === Internals ===

    fn emit(&self, severity: Severity, location: &'static Location<'static>, message: Message<'_>) {
        if let Err(e) = self.submit(severity, location, self.caller_depth(), &message) {
            diagnostics::report(&e);
        }
    }

    fn submit(
        &self,
        severity: Severity,
        location: &'static Location<'static>,
        depth: usize,
        message: &Message<'_>,
    ) -> Result<()> {
        if !self.enabled(severity) {
            return Ok(());
        }
        let inner = &self.inner;
        let caller = Caller::resolve(location, depth);
        let now = inner.clock.now();
        let record = header::render(severity, &caller, &now, inner.options.rotation, message);
        inner.stats.add_rendered();
        inner.dispatcher.dispatch(record)
    }
}
