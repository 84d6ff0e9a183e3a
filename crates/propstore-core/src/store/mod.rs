//! Category-structured properties store
//!
//! - `ConfigStore`: load, typed reads, writes, save
//! - `StoreOptions`: source provider, indirection extension, logger
//! - `Reference` / `ResolutionStack`: cross-file indirection values

mod config_store;
mod options;
mod parser;
mod resolver;
mod accessors;
mod mutator;

pub use config_store::{ConfigStore, StoreSnapshot};
pub use options::{StoreOptions, DEFAULT_EXTENSION};
pub use resolver::{Reference, ReferenceFrame, ResolutionStack};
