//! Propstore Core
//!
//! A small configuration store over a human-editable, category-structured
//! key/value format:
//!
//! ```text
//! [Server]
//! host = example.org
//! timeout = 60 * 5
//! password = {{secrets.Server.password}}
//! ```
//!
//! - Values are kept as raw strings and interpreted when read: numeric
//!   accessors evaluate arithmetic expressions, booleans match `true`.
//! - `{{stem.category.key}}` pulls a value from another file when the store
//!   is loaded.
//! - Every write saves the whole store back to its source.
//!
//! ```rust,no_run
//! use propstore_core::ConfigStore;
//!
//! let store = ConfigStore::open("server.properties")?;
//! let timeout = store.get_long("Server", "timeout")?;
//! let verbose = store.get_bool_or("Logging", "verbose", false)?;
//!
//! store.add_string("Server", "host", "backup.example.org")?;
//! # Ok::<(), propstore_core::StoreError>(())
//! ```

pub mod error;
pub mod logging;
pub mod source;
pub mod expression;
pub mod store;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};

pub use logging::{Logger, SharedLogger, NoOpLogger, ConsoleLogger};

pub use source::{
    LineSource, SourceProvider,
    FileSource, FileSourceProvider,
    MemorySource, MemorySourceProvider,
};

pub use store::{ConfigStore, StoreOptions, StoreSnapshot};
