//! Logger trait definition

use std::sync::Arc;

/// Sink for the store's diagnostic messages
///
/// Implementations:
/// - `NoOpLogger`: Silent, the default for every store
/// - `ConsoleLogger`: Logs to stdout/stderr
/// - Host adapters: forward into the embedding application's log system
pub trait Logger: Send + Sync {
    /// Log a debug message
    fn debug(&self, message: &str);

    /// Log an info message
    fn info(&self, message: &str);

    /// Log a warning message
    fn warn(&self, message: &str);

    /// Log an error message
    fn error(&self, message: &str);
}

/// Type alias for an Arc-wrapped logger, shared between a store and the
/// stores it loads while resolving references
pub type SharedLogger = Arc<dyn Logger>;

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
    };
}
