//! In-memory line sources

use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use super::traits::{LineSource, SourceProvider};

/// In-memory line source for testing and embedding
///
/// # Thread Safety
///
/// Content sits behind a `RwLock`; the source is safe to share between threads.
#[derive(Debug)]
pub struct MemorySource {
    location: String,
    content: RwLock<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemorySource {
    /// Create a source holding `content`
    pub fn new(location: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: RwLock::new(Some(content.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create a source that does not exist yet. Reads fail with `NotFound`
    /// until something is written.
    pub fn missing(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            content: RwLock::new(None),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Current raw content, `None` if the source does not exist
    pub fn content(&self) -> Option<String> {
        self.content.read().clone()
    }

    /// Make every following write fail with an IO error (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::io(
                &self.location,
                std::io::Error::new(ErrorKind::PermissionDenied, "writes disabled"),
            ));
        }
        Ok(())
    }
}

impl LineSource for MemorySource {
    fn location(&self) -> &str {
        &self.location
    }

    fn exists(&self) -> bool {
        self.content.read().is_some()
    }

    fn read_lines(&self) -> StoreResult<Vec<String>> {
        let content = self.content.read();
        match content.as_ref() {
            Some(text) => Ok(text.lines().map(str::to_string).collect()),
            None => Err(StoreError::NotFound(self.location.clone())),
        }
    }

    fn overwrite(&self, content: &str) -> StoreResult<()> {
        self.check_writable()?;
        *self.content.write() = Some(content.to_string());
        Ok(())
    }

    fn append(&self, content: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.content
            .write()
            .get_or_insert_with(String::new)
            .push_str(content);
        Ok(())
    }
}

/// A set of named in-memory sources
///
/// # Example
///
/// ```
/// use propstore_core::source::{MemorySourceProvider, LineSource};
///
/// let provider = MemorySourceProvider::new();
/// let app = provider.insert("app.properties", "[net]\nport = 80\n");
/// assert_eq!(app.read_lines().unwrap().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemorySourceProvider {
    sources: RwLock<HashMap<String, Arc<MemorySource>>>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the source at `location`
    pub fn insert(&self, location: &str, content: &str) -> Arc<MemorySource> {
        let source = Arc::new(MemorySource::new(location, content));
        self.sources
            .write()
            .insert(location.to_string(), Arc::clone(&source));
        source
    }

    /// Get the source at `location`, if one was inserted
    pub fn get(&self, location: &str) -> Option<Arc<MemorySource>> {
        self.sources.read().get(location).cloned()
    }
}

impl SourceProvider for MemorySourceProvider {
    fn open(&self, location: &str) -> StoreResult<Arc<dyn LineSource>> {
        match self.get(location) {
            Some(source) if source.exists() => {
                let source: Arc<dyn LineSource> = source;
                Ok(source)
            }
            _ => Err(StoreError::NotFound(location.to_string())),
        }
    }
}
