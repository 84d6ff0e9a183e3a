//! The store itself: construction, lookup, discovery

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::log_debug;
use crate::source::LineSource;
use super::options::StoreOptions;
use super::parser::{self, CategoryMap};
use super::resolver::{ResolutionStack, Resolver};

/// Owned copy of a store's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Location the store was loaded from
    pub location: String,
    /// Category name -> key -> raw value
    pub categories: BTreeMap<String, BTreeMap<String, String>>,
}

/// Parsed content of one properties source
///
/// The whole source is read and every indirection value resolved when the
/// store is opened. Reads and writes after that work on memory; each `add_*`
/// call writes the full store back to its source.
///
/// # Thread Safety
///
/// The category map sits behind a `RwLock` and is never handed out, so a
/// store can be shared between threads. Sequences of calls are not atomic.
///
/// # Example
///
/// ```no_run
/// use propstore_core::ConfigStore;
///
/// let store = ConfigStore::open("server.properties")?;
/// let port = store.get_int_or("Network", "port", 8080)?;
/// store.add_bool("Network", "tls", true)?;
/// # Ok::<(), propstore_core::StoreError>(())
/// ```
pub struct ConfigStore {
    location: String,
    source: Arc<dyn LineSource>,
    options: StoreOptions,
    pub(crate) categories: RwLock<CategoryMap>,
}

impl ConfigStore {
    /// Open the properties file at `path` with default options.
    ///
    /// Returns `Err(StoreError::InvalidArgument)` if `path` is not valid UTF-8.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let location = path.to_str().ok_or_else(|| {
            StoreError::InvalidArgument(format!("path '{}' is not valid UTF-8", path.display()))
        })?;
        Self::open_with(location, StoreOptions::default())
    }

    /// Open the source at `location` through the provider in `options`
    pub fn open_with(location: &str, options: StoreOptions) -> StoreResult<Self> {
        if location.trim().is_empty() {
            return Err(StoreError::InvalidArgument("path is empty".to_string()));
        }
        Self::load(location, &options, &mut ResolutionStack::new())
    }

    pub(crate) fn load(
        location: &str,
        options: &StoreOptions,
        stack: &mut ResolutionStack,
    ) -> StoreResult<Self> {
        let source = options.provider().open(location)?;
        let categories = Self::parse_source(source.as_ref(), options, stack)?;
        log_debug!(
            options.logger(),
            "{}: loaded {} categories",
            source.location(),
            categories.len()
        );

        Ok(Self {
            location: source.location().to_string(),
            source,
            options: options.clone(),
            categories: RwLock::new(categories),
        })
    }

    fn parse_source(
        source: &dyn LineSource,
        options: &StoreOptions,
        stack: &mut ResolutionStack,
    ) -> StoreResult<CategoryMap> {
        let lines = source.read_lines()?;
        let mut resolver = Resolver {
            location: source.location(),
            options,
            stack,
        };
        parser::parse(&lines, &mut resolver)
    }

    /// Re-read the source, replacing everything held in memory.
    ///
    /// On failure the current content is kept.
    pub fn reload(&self) -> StoreResult<()> {
        let categories =
            Self::parse_source(self.source.as_ref(), &self.options, &mut ResolutionStack::new())?;
        *self.categories.write() = categories;
        log_debug!(self.options.logger(), "{}: reloaded", self.location);
        Ok(())
    }

    /// Location of the backing source
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub(crate) fn source(&self) -> &Arc<dyn LineSource> {
        &self.source
    }

    /// Raw value of `key` in `category`
    pub(crate) fn raw(&self, category: &str, key: &str) -> StoreResult<String> {
        let categories = self.categories.read();
        let entries = categories
            .get(category)
            .ok_or_else(|| StoreError::CategoryNotFound(category.to_string()))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::key_not_found(category, key))
    }

    /// Names of all categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.categories.read().keys().cloned().collect()
    }

    /// Keys of `category`, sorted
    pub fn keys(&self, category: &str) -> StoreResult<Vec<String>> {
        let categories = self.categories.read();
        categories
            .get(category)
            .map(|entries| entries.keys().cloned().collect())
            .ok_or_else(|| StoreError::CategoryNotFound(category.to_string()))
    }

    /// Check if `category` exists
    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.read().contains_key(category)
    }

    /// Check if `key` exists in `category`.
    ///
    /// Returns `Err(StoreError::CategoryNotFound)` if the category itself is absent.
    pub fn contains_key(&self, category: &str, key: &str) -> StoreResult<bool> {
        let categories = self.categories.read();
        categories
            .get(category)
            .map(|entries| entries.contains_key(key))
            .ok_or_else(|| StoreError::CategoryNotFound(category.to_string()))
    }

    /// Copy of the current content
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            location: self.location.clone(),
            categories: self.categories.read().clone(),
        }
    }

    /// Current content as pretty-printed JSON
    pub fn export_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("location", &self.location)
            .field("categories", &self.categories.read().len())
            .finish()
    }
}
