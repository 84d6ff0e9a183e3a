//! File-backed line sources
//!
//! `FileSource` wraps one file on disk and carries the file-management
//! helpers (create, open-or-create, delete, line windows). `FileSourceProvider`
//! hands them to the store.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use super::traits::{LineSource, SourceProvider};

/// A line source backed by a file
///
/// Reads always go back to disk, so the source is restartable. Overwrites are
/// atomic: the new content is written to a temporary file in the same
/// directory and renamed over the target, so a failed write leaves the old
/// content in place.
///
/// # Example
///
/// ```no_run
/// use propstore_core::source::{FileSource, LineSource};
///
/// let file = FileSource::open_or_create("settings.properties").unwrap();
/// file.append_line("[general]").unwrap();
/// assert_eq!(file.read_first_lines(1).unwrap(), vec!["[general]".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    location: String,
}

impl FileSource {
    fn from_path(path: &Path) -> StoreResult<Self> {
        // Canonical paths give every file one identity, whichever relative
        // spelling a reference used to reach it.
        let path = fs::canonicalize(path)
            .map_err(|e| StoreError::io(path.display().to_string(), e))?;
        let location = path.display().to_string();
        Ok(Self { path, location })
    }

    /// Open an existing file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        Self::from_path(path)
    }

    /// Create a new, empty file. Fails if the file already exists.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Self::from_path(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(path.display().to_string()))
            }
            Err(e) => Err(StoreError::io(path.display().to_string(), e)),
        }
    }

    /// Create an empty file, discarding any existing content
    pub fn create_or_truncate(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        fs::File::create(path).map_err(|e| StoreError::io(path.display().to_string(), e))?;
        Self::from_path(path)
    }

    /// Open the file if it exists, otherwise create it empty
    pub fn open_or_create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Check whether a file exists at `path`
    pub fn exists_at(path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    /// Absolute path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file
    pub fn delete(self) -> StoreResult<()> {
        fs::remove_file(&self.path).map_err(|e| StoreError::io(&self.location, e))
    }

    /// The first `n` lines
    pub fn read_first_lines(&self, n: usize) -> StoreResult<Vec<String>> {
        let lines = self.read_lines()?;
        Ok(window(&lines, 0, n))
    }

    /// The last `n` lines, in file order
    pub fn read_last_lines(&self, n: usize) -> StoreResult<Vec<String>> {
        let lines = self.read_lines()?;
        let start = lines.len().saturating_sub(n);
        Ok(window(&lines, start, lines.len()))
    }

    /// Lines `start..end` counted from the top. Out-of-range bounds are clamped.
    pub fn read_between_lines(&self, start: usize, end: usize) -> StoreResult<Vec<String>> {
        let lines = self.read_lines()?;
        Ok(window(&lines, start, end))
    }

    /// Lines `start..end` counted from the bottom (0 is the last line),
    /// returned in file order. Out-of-range bounds are clamped.
    pub fn read_between_lines_from_end(&self, start: usize, end: usize) -> StoreResult<Vec<String>> {
        let mut lines = self.read_lines()?;
        lines.reverse();
        let mut selected = window(&lines, start, end);
        selected.reverse();
        Ok(selected)
    }
}

fn window(lines: &[String], start: usize, end: usize) -> Vec<String> {
    let end = end.min(lines.len());
    let start = start.min(end);
    lines[start..end].to_vec()
}

impl LineSource for FileSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_lines(&self) -> StoreResult<Vec<String>> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(self.location.clone()),
            _ => StoreError::io(&self.location, e),
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }

    fn overwrite(&self, content: &str) -> StoreResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(&self.location, e))?;
        // Temp files are created owner-only; keep the target's mode.
        if let Ok(meta) = fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| StoreError::io(&self.location, e))?;
        }
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| StoreError::io(&self.location, e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.location, e.error))?;
        Ok(())
    }

    fn append(&self, content: &str) -> StoreResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.location, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| StoreError::io(&self.location, e))
    }
}

/// Opens `FileSource`s. Indirection stems resolve next to the referencing file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSourceProvider;

impl FileSourceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SourceProvider for FileSourceProvider {
    fn open(&self, location: &str) -> StoreResult<Arc<dyn LineSource>> {
        Ok(Arc::new(FileSource::open(location)?))
    }

    fn locate_reference(&self, referrer: &str, stem: &str, extension: &str) -> String {
        let file_name = format!("{}.{}", stem, extension);
        match Path::new(referrer).parent() {
            Some(dir) => dir.join(file_name).display().to_string(),
            None => file_name,
        }
    }
}
