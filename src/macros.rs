//! Formatting macros
//!
//! `log_info!(logger, "user {} joined", name)` expands to
//! `logger.info_f(format_args!(...))`, so the reported call site is the
//! macro invocation.

/// Log at DEBUG with format arguments
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug_f(::std::format_args!($($arg)+))
    };
}

/// Log at INFO with format arguments
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info_f(::std::format_args!($($arg)+))
    };
}

/// Log at TRACE with format arguments
#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)+) => {
        $logger.trace_f(::std::format_args!($($arg)+))
    };
}

/// Log at NOTICE with format arguments
#[macro_export]
macro_rules! log_notice {
    ($logger:expr, $($arg:tt)+) => {
        $logger.notice_f(::std::format_args!($($arg)+))
    };
}

/// Log at WARNING with format arguments
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn_f(::std::format_args!($($arg)+))
    };
}

/// Log at ERROR with format arguments
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error_f(::std::format_args!($($arg)+))
    };
}
