//! Line sources the store reads from and writes back to
//!
//! - `LineSource` / `SourceProvider` traits for plugging in other backends
//! - `FileSource` / `FileSourceProvider`: files on disk
//! - `MemorySource` / `MemorySourceProvider`: in-memory, for tests and embedding

mod traits;
mod file;
mod memory;

pub use traits::{LineSource, SourceProvider};
pub use file::{FileSource, FileSourceProvider};
pub use memory::{MemorySource, MemorySourceProvider};
