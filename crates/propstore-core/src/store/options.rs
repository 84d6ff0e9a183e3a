//! Store configuration

use std::sync::Arc;

use crate::logging::{NoOpLogger, SharedLogger};
use crate::source::{FileSourceProvider, SourceProvider};

/// Extension appended to an indirection stem unless configured otherwise
pub const DEFAULT_EXTENSION: &str = "properties";

/// How a store finds its sources and where it reports what it does
///
/// Stores loaded while resolving references inherit the options of the store
/// that references them.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use propstore_core::{ConsoleLogger, StoreOptions};
/// use propstore_core::source::MemorySourceProvider;
///
/// let options = StoreOptions::new()
///     .with_extension("conf")
///     .with_provider(Arc::new(MemorySourceProvider::new()))
///     .with_logger(Arc::new(ConsoleLogger::new()));
/// assert_eq!(options.extension(), "conf");
/// ```
#[derive(Clone)]
pub struct StoreOptions {
    extension: String,
    provider: Arc<dyn SourceProvider>,
    logger: SharedLogger,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreOptions {
    /// File-backed sources, `properties` extension, no logging
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            provider: Arc::new(FileSourceProvider::new()),
            logger: Arc::new(NoOpLogger::new()),
        }
    }

    /// Set the extension used to turn an indirection stem into a location
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Set the provider that opens sources
    pub fn with_provider(mut self, provider: Arc<dyn SourceProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Set the logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn provider(&self) -> &Arc<dyn SourceProvider> {
        &self.provider
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }
}

impl std::fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptions")
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension() {
        assert_eq!(StoreOptions::default().extension(), "properties");
    }

    #[test]
    fn test_extension_leading_dot_is_dropped() {
        let options = StoreOptions::new().with_extension(".ini");
        assert_eq!(options.extension(), "ini");
    }
}
