//! Store error types

use thiserror::Error;

/// Errors that can occur while loading, reading, or persisting a store
#[derive(Error, Debug)]
pub enum StoreError {
    /// An argument was empty or contained reserved syntax
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A line of the source did not follow the grammar
    #[error("Format error in {location} at line {line}: {message}")]
    Format {
        location: String,
        line: usize,
        message: String,
    },

    /// The requested category does not exist
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// The requested key does not exist within an existing category
    #[error("Key not found: {key} (in category {category})")]
    KeyNotFound { category: String, key: String },

    /// An indirection chain came back to an entry that is still being resolved
    #[error("Reference cycle: {0}")]
    ReferenceCycle(String),

    /// A raw value could not be read as a number
    #[error("Invalid number '{value}': {message}")]
    NumericFormat { value: String, message: String },

    /// The backing resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The backing resource exists but was expected not to
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// Underlying read or write failure
    #[error("IO error on {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a format error
    pub fn format(location: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            location: location.into(),
            line,
            message: message.into(),
        }
    }

    /// Create a key-not-found error
    pub fn key_not_found(category: impl Into<String>, key: impl Into<String>) -> Self {
        Self::KeyNotFound {
            category: category.into(),
            key: key.into(),
        }
    }

    /// Create a numeric format error
    pub fn numeric(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NumericFormat {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Wrap an IO error with the location it happened on
    pub fn io(location: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            location: location.into(),
            source,
        }
    }

    /// Whether this error only reports an absent category or key.
    ///
    /// Defaulted accessors replace exactly these errors with the default.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CategoryNotFound(_) | Self::KeyNotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(StoreError::CategoryNotFound("net".into()).is_not_found());
        assert!(StoreError::key_not_found("net", "port").is_not_found());
        assert!(!StoreError::numeric("abc", "unexpected character").is_not_found());
        assert!(!StoreError::NotFound("a.properties".into()).is_not_found());
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::format("app.properties", 3, "no category before entry");
        assert_eq!(
            err.to_string(),
            "Format error in app.properties at line 3: no category before entry"
        );

        let err = StoreError::key_not_found("net", "port");
        assert_eq!(err.to_string(), "Key not found: port (in category net)");
    }
}
