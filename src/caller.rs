//! Caller location
//!
//! The facade methods are `#[track_caller]`, so the location they hand down
//! is already the application's call site. A caller depth above 1 (set with
//! `Logger::set_level`) is for wrappers that add frames of their own: the
//! location is then taken from a captured backtrace, counting only frames
//! outside this library and the standard library.

use crate::constants::DEFAULT_CALLER_DEPTH;
use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// Modules of this library that appear in a backtrace between the
/// application frame and the capture point.
const INTERNAL_SOURCES: &[&str] = &["caller.rs", "header.rs", "logger.rs", "delivery.rs"];

const MANIFEST_SRC: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/");

const CRATE_PATH: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Source location reported in a line header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: Cow<'static, str>,
    pub line: u32,
}

impl Caller {
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }

    /// Resolve the caller `depth` application frames up.
    ///
    /// `location` is the facade's `#[track_caller]` location and is returned
    /// as is for the default depth or when no symbolised frame is found.
    pub fn resolve(location: &'static Location<'static>, depth: usize) -> Self {
        if depth <= DEFAULT_CALLER_DEPTH {
            return Self::from_location(location);
        }
        let trace = Backtrace::force_capture().to_string();
        nth_application_frame(&trace, depth).unwrap_or_else(|| Self::from_location(location))
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One symbolised backtrace frame
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    symbol: Option<String>,
    caller: Caller,
}

fn nth_application_frame(trace: &str, depth: usize) -> Option<Caller> {
    let frames = parse_frames(trace);
    let last_internal = frames.iter().rposition(is_internal)?;
    frames[last_internal + 1..]
        .iter()
        .filter(|f| !is_std(&f.caller.file))
        .nth(depth - 1)
        .map(|f| f.caller.clone())
}

/// Pair every `at file:line:col` line with the symbol line above it
fn parse_frames(trace: &str) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut symbol = None;
    for line in trace.lines() {
        match parse_frame(line) {
            Some(caller) => frames.push(Frame {
                symbol: symbol.clone(),
                caller,
            }),
            None => symbol = parse_symbol(line),
        }
    }
    frames
}

/// Parse a `at path/to/file.rs:LINE:COL` backtrace line
fn parse_frame(line: &str) -> Option<Caller> {
    let rest = line.trim_start().strip_prefix("at ")?;
    let mut parts = rest.rsplitn(3, ':');
    let _col = parts.next()?;
    let line_no = parts.next()?.parse().ok()?;
    let file = parts.next()?.replace('\\', "/");
    let file = file.trim_start_matches("./");
    Some(Caller {
        file: Cow::Owned(file.to_string()),
        line: line_no,
    })
}

/// Parse a `  12: crate::module::function` line; inlined frames omit the index
fn parse_symbol(line: &str) -> Option<String> {
    let line = line.trim();
    let name = match line.split_once(": ") {
        Some((index, name)) if index.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => line,
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// A frame of this library's own modules.
///
/// A path anchored at this crate's manifest is ours whatever the symbol. A
/// relative path is only ours when the symbol also belongs to this crate, so
/// an application module that shares a file name is not skipped.
fn is_internal(frame: &Frame) -> bool {
    let file = frame.caller.file.as_ref();
    if let Some(rel) = file.strip_prefix(MANIFEST_SRC.replace('\\', "/").as_str()) {
        return INTERNAL_SOURCES.contains(&rel);
    }
    let ours = frame
        .symbol
        .as_deref()
        .is_some_and(|s| s.trim_start_matches('<').starts_with(CRATE_PATH));
    ours && file
        .strip_prefix("src/")
        .is_some_and(|rel| INTERNAL_SOURCES.contains(&rel))
}

fn is_std(file: &str) -> bool {
    file.starts_with("/rustc/")
        || file.contains("/library/std/")
        || file.contains("/library/core/")
        || file.contains("/library/alloc/")
}
