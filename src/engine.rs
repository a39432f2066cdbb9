//! Rotation and cascading writes
//!
//! The engine owns the file set, the active bucket and the sticky error
//! behind a single mutex. Rotation and writes both need exclusive access to
//! the same handles, so one lock covers both: a writer never sees a
//! half-installed file set.

use crate::bucket::RotationPeriod;
use crate::error::{LogError, Result};
use crate::file_set::{FileOperator, FileSet};
use crate::header::Record;
use crate::severity::Severity;
use crate::stats::Stats;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// Terminal mirror destination
pub type Mirror = Box<dyn Write + Send>;

struct State {
    files: FileSet,
    /// Receives every record before the file cascade
    mirror: Option<Mirror>,
    /// Bucket of the installed file set
    bucket: String,
    /// Set by a failed write or rotation, cleared by a successful rotation
    sticky: Option<String>,
}

/// Owner of the on-disk file set
pub struct Engine {
    operator: FileOperator,
    state: Mutex<State>,
    stats: Arc<Stats>,
}

impl Engine {
    /// Open the initial file set for the bucket of `now`.
    ///
    /// Fails if the directory cannot be prepared or any file cannot be
    /// created or linked.
    pub fn open(
        operator: FileOperator,
        period: RotationPeriod,
        now: &DateTime<Local>,
        mirror_to_terminal: bool,
        stats: Arc<Stats>,
    ) -> Result<Self> {
        let bucket = period.bucket(now);
        let files = FileSet::open_all(&operator, &bucket)?;
        debug!(dir = %operator.dir().display(), %bucket, "log files opened");
        let mirror = mirror_to_terminal.then(|| Box::new(io::stdout()) as Mirror);
        Ok(Self {
            operator,
            state: Mutex::new(State {
                files,
                mirror,
                bucket,
                sticky: None,
            }),
            stats,
        })
    }

    /// Send the mirror to `sink` instead of stdout
    pub fn with_mirror(self, sink: Mirror) -> Self {
        self.state.lock().mirror = Some(sink);
        self
    }

    /// Rotate if the record's bucket changed, then fan the record out.
    ///
    /// Records are rendered before the lock is taken, so around a bucket
    /// boundary a record stamped with the previous bucket can arrive after
    /// the rotation. It rotates back to the set of its own bucket, and the
    /// next record of the newer bucket rotates forward again and repoints
    /// the aliases. Between the two the aliases name the older files.
    pub fn deliver(&self, record: Record) -> Result<()> {
        let mut state = self.state.lock();
        if state.bucket != record.bucket {
            self.rotate(&mut state, &record.bucket);
        }
        self.write_locked(&mut state, record.severity, &record.data)
    }

    /// Write `data` to the file of `severity` and of every lower severity,
    /// without a bucket check.
    pub fn write(&self, severity: Severity, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        self.write_locked(&mut state, severity, data)
    }

    /// Write a record given its raw severity value
    pub fn write_raw(&self, severity: u8, data: &[u8]) -> Result<()> {
        let severity = Severity::try_from(severity)?;
        self.write(severity, data)
    }

    fn write_locked(&self, state: &mut State, severity: Severity, data: &[u8]) -> Result<()> {
        if let Some(out) = state.mirror.as_mut() {
            out.write_all(data)
                .map_err(|source| LogError::Terminal { source })?;
        }

        if let Some(reason) = &state.sticky {
            self.stats.add_failed();
            return Err(LogError::Degraded {
                reason: reason.clone(),
            });
        }

        for target in severity.cascade() {
            if let Err(e) = state.files.write(target, data) {
                state.sticky = Some(e.to_string());
                self.stats.add_failed();
                return Err(e);
            }
        }
        self.stats.add_written();
        Ok(())
    }

    /// Close the current set and open a fresh one for `bucket`.
    ///
    /// The new bucket is adopted even on failure so the same bucket is not
    /// retried on every record; the next bucket change retries.
    fn rotate(&self, state: &mut State, bucket: &str) {
        state.files.close();
        match FileSet::open_all(&self.operator, bucket) {
            Ok(files) => {
                state.files = files;
                state.sticky = None;
                debug!(from = %state.bucket, to = %bucket, "log files rotated");
            }
            Err(e) => {
                error!(bucket = %bucket, error = %e, "log rotation failed, file output suspended");
                state.files = FileSet::empty();
                state.sticky = Some(e.to_string());
            }
        }
        state.bucket = bucket.to_string();
    }

    /// Flush the terminal mirror and every open file
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(out) = state.mirror.as_mut() {
            out.flush().map_err(|source| LogError::Terminal { source })?;
        }
        state
            .files
            .flush()
            .map_err(|e| LogError::io(self.operator.dir(), e))
    }

    /// Sticky error message, if the engine is degraded
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().sticky.clone()
    }

    pub fn active_bucket(&self) -> String {
        self.state.lock().bucket.clone()
    }

    /// Versioned file of `severity` for the active bucket
    pub fn versioned_path(&self, severity: Severity) -> PathBuf {
        let state = self.state.lock();
        self.operator.versioned_path(severity, &state.bucket)
    }

    pub fn alias_path(&self, severity: Severity) -> PathBuf {
        self.operator.alias_path(severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    /// Mirror sink the test can read back
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ClosedTerminal;

    impl Write for ClosedTerminal {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap()
    }

    fn open(dir: &std::path::Path) -> Engine {
        Engine::open(
            FileOperator::new(dir, "t"),
            RotationPeriod::Hourly,
            &now(),
            false,
            Arc::new(Stats::new()),
        )
        .unwrap()
    }

    fn record(severity: Severity, text: &str, bucket: &str) -> Record {
        Record {
            severity,
            data: text.as_bytes().to_vec(),
            bucket: bucket.to_string(),
        }
    }

    fn read(engine: &Engine, severity: Severity) -> String {
        fs::read_to_string(engine.versioned_path(severity)).unwrap()
    }

    #[test]
    fn test_open_uses_bucket_of_now() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());
        assert_eq!(engine.active_bucket(), "2024020304");
        assert!(tmp.path().join("t_error_2024020304.log").is_file());
        assert!(tmp.path().join("t_error.log").is_file());
    }

    #[test]
    fn test_write_cascades_down_only() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());

        engine.write(Severity::Notice, b"n\n").unwrap();

        for sev in [Severity::Notice, Severity::Trace, Severity::Info, Severity::Debug] {
            assert_eq!(read(&engine, sev), "n\n", "{}", sev);
        }
        for sev in [Severity::Warning, Severity::Error] {
            assert_eq!(read(&engine, sev), "", "{}", sev);
        }
    }

    #[test]
    fn test_write_raw_unknown_severity() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());

        assert!(matches!(
            engine.write_raw(6, b"x\n"),
            Err(LogError::UnknownSeverity { value: 6 })
        ));
        for sev in Severity::ALL {
            assert_eq!(read(&engine, sev), "");
        }
        engine.write_raw(5, b"e\n").unwrap();
        assert_eq!(read(&engine, Severity::Debug), "e\n");
    }

    #[test]
    fn test_deliver_rotates_on_bucket_change() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());
        let first = engine.active_bucket();

        engine
            .deliver(record(Severity::Error, "one\n", &first))
            .unwrap();
        engine
            .deliver(record(Severity::Error, "two\n", "2024020305"))
            .unwrap();

        assert_eq!(engine.active_bucket(), "2024020305");
        let old = tmp.path().join(format!("t_error_{}.log", first));
        assert_eq!(fs::read_to_string(old).unwrap(), "one\n");
        assert_eq!(read(&engine, Severity::Error), "two\n");
        assert_eq!(
            fs::read_to_string(engine.alias_path(Severity::Error)).unwrap(),
            "two\n"
        );
    }

    #[test]
    fn test_rotation_back_to_same_bucket_keeps_alias_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());
        let first = engine.active_bucket();

        engine.deliver(record(Severity::Info, "a\n", &first)).unwrap();
        engine.deliver(record(Severity::Info, "b\n", "other")).unwrap();
        engine.deliver(record(Severity::Info, "c\n", &first)).unwrap();

        assert_eq!(
            fs::read_to_string(engine.alias_path(Severity::Info)).unwrap(),
            "a\nc\n"
        );
    }

    #[test]
    fn test_failed_rotation_is_sticky_until_next_rotation() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let engine = open(&dir);
        let stats = engine.stats.clone();

        // Replace the directory with a plain file so rotation cannot open files.
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "blocked").unwrap();

        let err = engine
            .deliver(record(Severity::Error, "lost\n", "b2"))
            .unwrap_err();
        assert!(matches!(err, LogError::Degraded { .. }));
        assert!(engine.last_error().is_some());
        assert_eq!(engine.active_bucket(), "b2");

        // Same bucket: no retry, still degraded.
        assert!(matches!(
            engine.deliver(record(Severity::Error, "lost\n", "b2")),
            Err(LogError::Degraded { .. })
        ));
        assert_eq!(stats.failed(), 2);

        // Restore the directory; the next bucket change recovers.
        fs::remove_file(&dir).unwrap();
        engine
            .deliver(record(Severity::Error, "back\n", "b3"))
            .unwrap();
        assert!(engine.last_error().is_none());
        assert_eq!(read(&engine, Severity::Debug), "back\n");
    }

    #[test]
    fn test_mirror_receives_record_before_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mirror = Captured::default();
        let engine = open(tmp.path()).with_mirror(Box::new(mirror.clone()));

        engine.write(Severity::Warning, b"w\n").unwrap();

        assert_eq!(mirror.text(), "w\n");
        assert_eq!(read(&engine, Severity::Warning), "w\n");
        assert_eq!(read(&engine, Severity::Debug), "w\n");
    }

    #[test]
    fn test_mirror_continues_while_degraded() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("logs");
        let mirror = Captured::default();
        let engine = open(&dir).with_mirror(Box::new(mirror.clone()));

        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "blocked").unwrap();

        assert!(matches!(
            engine.deliver(record(Severity::Info, "first\n", "b2")),
            Err(LogError::Degraded { .. })
        ));
        assert!(matches!(
            engine.deliver(record(Severity::Info, "second\n", "b2")),
            Err(LogError::Degraded { .. })
        ));
        assert_eq!(mirror.text(), "first\nsecond\n");
    }

    #[test]
    fn test_mirror_failure_skips_files() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path()).with_mirror(Box::new(ClosedTerminal));
        let stats = engine.stats.clone();

        let err = engine.write(Severity::Error, b"e\n").unwrap_err();
        assert!(matches!(err, LogError::Terminal { .. }));
        for sev in Severity::ALL {
            assert_eq!(read(&engine, sev), "", "{}", sev);
        }
        assert_eq!(stats.written(), 0);
        assert!(engine.last_error().is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_is_sticky_until_next_rotation() {
        let full = std::path::Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let tmp = tempfile::tempdir().unwrap();
        // Every write to the DEBUG file of the first bucket fails with ENOSPC.
        std::os::unix::fs::symlink(full, tmp.path().join("t_debug_2024020304.log")).unwrap();
        let engine = open(tmp.path());
        let stats = engine.stats.clone();
        let bucket = engine.active_bucket();

        let err = engine
            .deliver(record(Severity::Notice, "n\n", &bucket))
            .unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
        assert!(engine.last_error().is_some());
        assert_eq!(read(&engine, Severity::Notice), "n\n");

        assert!(matches!(
            engine.deliver(record(Severity::Error, "e\n", &bucket)),
            Err(LogError::Degraded { .. })
        ));
        assert_eq!(read(&engine, Severity::Error), "");
        assert_eq!(stats.failed(), 2);

        engine
            .deliver(record(Severity::Error, "back\n", "2024020305"))
            .unwrap();
        assert!(engine.last_error().is_none());
        assert_eq!(read(&engine, Severity::Debug), "back\n");
    }

    #[test]
    fn test_late_record_from_previous_bucket() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = open(tmp.path());
        let first = engine.active_bucket();
        let alias = engine.alias_path(Severity::Info);

        engine
            .deliver(record(Severity::Info, "new\n", "2024020305"))
            .unwrap();
        engine.deliver(record(Severity::Info, "late\n", &first)).unwrap();

        let old = tmp.path().join(format!("t_info_{}.log", first));
        assert_eq!(fs::read_to_string(&old).unwrap(), "late\n");
        assert_eq!(fs::read_to_string(&alias).unwrap(), "late\n");

        engine
            .deliver(record(Severity::Info, "next\n", "2024020305"))
            .unwrap();
        assert_eq!(read(&engine, Severity::Info), "new\nnext\n");
        assert_eq!(fs::read_to_string(&alias).unwrap(), "new\nnext\n");
    }
}
