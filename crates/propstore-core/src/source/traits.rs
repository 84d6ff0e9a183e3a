//! Line source abstractions consumed by the store

use std::sync::Arc;

use crate::error::StoreResult;

/// A named text resource that can be read line by line and rewritten
///
/// Implementations:
/// - `FileSource`: a file on disk
/// - `MemorySource`: an in-memory buffer for tests and embedding
pub trait LineSource: Send + Sync {
    /// Location of this resource. Used as its identity when detecting
    /// reference cycles and in error messages.
    fn location(&self) -> &str;

    /// Check if the resource currently exists
    fn exists(&self) -> bool;

    /// Read every line from the start of the resource, without line terminators.
    ///
    /// Each call starts over, so a source can be read any number of times.
    fn read_lines(&self) -> StoreResult<Vec<String>>;

    /// Replace the whole content of the resource
    fn overwrite(&self, content: &str) -> StoreResult<()>;

    /// Append raw text to the end of the resource
    fn append(&self, content: &str) -> StoreResult<()>;

    /// Read the whole resource, lines joined with `\n`
    fn read_all(&self) -> StoreResult<String> {
        Ok(self.read_lines()?.join("\n"))
    }

    /// Append text followed by a newline
    fn append_line(&self, content: &str) -> StoreResult<()> {
        self.append(content)?;
        self.append("\n")
    }
}

/// Opens line sources by location
///
/// The store goes through a provider for its own source and for every file
/// an indirection value points at.
pub trait SourceProvider: Send + Sync {
    /// Open an existing resource.
    ///
    /// Returns `Err(StoreError::NotFound)` if nothing exists at `location`.
    fn open(&self, location: &str) -> StoreResult<Arc<dyn LineSource>>;

    /// Location of the resource named by `stem` in an indirection value that
    /// appears in the resource at `referrer`.
    fn locate_reference(&self, _referrer: &str, stem: &str, extension: &str) -> String {
        format!("{}.{}", stem, extension)
    }
}
