//! On-disk log files
//!
//! Per severity there is one versioned file `{name}_{tag}_{bucket}.log`,
//! opened for append and never truncated, and one alias `{name}_{tag}.log`
//! hard-linked to the newest versioned file. Readers holding the old alias
//! open keep the old inode; new opens see the new one.

use crate::constants::LOG_EXTENSION;
use crate::error::{LogError, Result};
use crate::severity::Severity;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Create `dir` (with parents) if missing.
///
/// Fails with `DirectoryConflict` when the path exists but is not a directory.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LogError::DirectoryConflict {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| LogError::io(dir, e))
        }
        Err(e) => Err(LogError::io(dir, e)),
    }
}

pub fn versioned_name(base: &str, severity: Severity, bucket: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        base,
        severity.file_tag(),
        bucket,
        LOG_EXTENSION
    )
}

pub fn alias_name(base: &str, severity: Severity) -> String {
    format!("{}_{}.{}", base, severity.file_tag(), LOG_EXTENSION)
}

/// Produces (or reopens) the files of one log directory
#[derive(Debug, Clone)]
pub struct FileOperator {
    dir: PathBuf,
    base: String,
}

impl FileOperator {
    pub fn new(dir: impl Into<PathBuf>, base: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base: base.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn versioned_path(&self, severity: Severity, bucket: &str) -> PathBuf {
        self.dir.join(versioned_name(&self.base, severity, bucket))
    }

    pub fn alias_path(&self, severity: Severity) -> PathBuf {
        self.dir.join(alias_name(&self.base, severity))
    }

    /// Open the versioned file for `severity`/`bucket` and repoint its alias.
    ///
    /// No handle is left open on failure.
    pub fn ensure(&self, severity: Severity, bucket: &str) -> Result<File> {
        ensure_dir(&self.dir)?;

        let path = self.versioned_path(severity, bucket);
        let file = open_append(&path)?;

        let alias = self.alias_path(severity);
        // `file` is dropped (closed) on either error path.
        remove_alias(&alias)?;
        fs::hard_link(&path, &alias).map_err(|e| LogError::io(&alias, e))?;

        Ok(file)
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogError::io(path, e))
}

fn remove_alias(alias: &Path) -> Result<()> {
    match fs::remove_file(alias) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LogError::io(alias, e)),
    }
}

/// One open handle per severity
#[derive(Debug)]
pub struct FileSet {
    files: [Option<File>; Severity::COUNT],
    paths: [Option<PathBuf>; Severity::COUNT],
}

impl FileSet {
    /// A set with no open files (degraded engine)
    pub fn empty() -> Self {
        Self {
            files: Default::default(),
            paths: Default::default(),
        }
    }

    /// Open the files of every severity for `bucket`.
    ///
    /// Aborts on the first failure; handles opened so far are closed.
    pub fn open_all(operator: &FileOperator, bucket: &str) -> Result<Self> {
        let mut set = Self::empty();
        for severity in Severity::ALL {
            let file = operator.ensure(severity, bucket)?;
            set.files[severity.index()] = Some(file);
            set.paths[severity.index()] = Some(operator.versioned_path(severity, bucket));
        }
        Ok(set)
    }

    pub fn is_open(&self) -> bool {
        self.files.iter().all(Option::is_some)
    }

    /// Append `data` to the file of `severity`
    pub fn write(&mut self, severity: Severity, data: &[u8]) -> Result<()> {
        let idx = severity.index();
        let result = match self.files[idx].as_mut() {
            Some(file) => file.write_all(data),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "log file is not open",
            )),
        };
        result.map_err(|e| LogError::io(self.paths[idx].clone().unwrap_or_default(), e))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        for file in self.files.iter_mut().flatten() {
            file.flush()?;
        }
        Ok(())
    }

    /// Close every handle, ignoring errors
    pub fn close(&mut self) {
        for slot in self.files.iter_mut() {
            slot.take();
        }
        for slot in self.paths.iter_mut() {
            slot.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(
            versioned_name("app", Severity::Warning, "2024010203"),
            "app_warn_2024010203.log"
        );
        assert_eq!(alias_name("app", Severity::Error), "app_error.log");
    }

    #[test]
    fn test_ensure_dir_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Existing directory is fine.
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_dir(&file),
            Err(LogError::DirectoryConflict { .. })
        ));
    }

    #[test]
    fn test_ensure_links_alias_to_versioned() {
        let tmp = tempfile::tempdir().unwrap();
        let op = FileOperator::new(tmp.path(), "app");

        let mut file = op.ensure(Severity::Info, "b1").unwrap();
        file.write_all(b"hello\n").unwrap();

        let alias = fs::read(op.alias_path(Severity::Info)).unwrap();
        let versioned = fs::read(op.versioned_path(Severity::Info, "b1")).unwrap();
        assert_eq!(alias, b"hello\n");
        assert_eq!(alias, versioned);
    }

    #[test]
    fn test_ensure_repoints_alias_and_keeps_old_file() {
        let tmp = tempfile::tempdir().unwrap();
        let op = FileOperator::new(tmp.path(), "app");

        let mut first = op.ensure(Severity::Error, "b1").unwrap();
        first.write_all(b"old\n").unwrap();
        drop(first);

        let mut second = op.ensure(Severity::Error, "b2").unwrap();
        second.write_all(b"new\n").unwrap();

        assert_eq!(fs::read(op.alias_path(Severity::Error)).unwrap(), b"new\n");
        assert_eq!(
            fs::read(op.versioned_path(Severity::Error, "b1")).unwrap(),
            b"old\n"
        );
    }

    #[test]
    fn test_ensure_same_bucket_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let op = FileOperator::new(tmp.path(), "app");

        op.ensure(Severity::Debug, "b1")
            .unwrap()
            .write_all(b"one\n")
            .unwrap();
        op.ensure(Severity::Debug, "b1")
            .unwrap()
            .write_all(b"two\n")
            .unwrap();

        assert_eq!(
            fs::read(op.alias_path(Severity::Debug)).unwrap(),
            b"one\ntwo\n"
        );
    }

    #[test]
    fn test_open_all_creates_six_pairs() {
        let tmp = tempfile::tempdir().unwrap();
        let op = FileOperator::new(tmp.path().join("logs"), "svc");

        let set = FileSet::open_all(&op, "b1").unwrap();
        assert!(set.is_open());
        for severity in Severity::ALL {
            assert!(op.versioned_path(severity, "b1").is_file());
            assert!(op.alias_path(severity).is_file());
        }
    }

    #[test]
    fn test_open_all_fails_when_dir_is_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs");
        fs::write(&path, "not a dir").unwrap();
        let op = FileOperator::new(&path, "svc");

        assert!(matches!(
            FileSet::open_all(&op, "b1"),
            Err(LogError::DirectoryConflict { .. })
        ));
    }

    #[test]
    fn test_empty_set_rejects_writes() {
        let mut set = FileSet::empty();
        assert!(!set.is_open());
        assert!(matches!(
            set.write(Severity::Info, b"x"),
            Err(LogError::Io { .. })
        ));
    }
}
