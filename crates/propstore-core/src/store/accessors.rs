//! Typed reads
//!
//! Every type has a strict accessor, which fails when the category or key is
//! absent, and an `_or` accessor, which returns the default instead. A value
//! that is present but malformed fails in both: defaults cover absence, never
//! bad syntax.
//!
//! Numeric accessors evaluate the raw value with [`crate::expression`] and
//! narrow the `f64` result. Integral types truncate toward zero and saturate
//! at their bounds.

use regex::Regex;

use crate::error::{StoreError, StoreResult};
use crate::expression;
use super::config_store::ConfigStore;

/// Replace an absent-category/absent-key error with `default`
fn or_default<T>(result: StoreResult<T>, default: T) -> StoreResult<T> {
    match result {
        Err(e) if e.is_not_found() => Ok(default),
        other => other,
    }
}

fn split_list(raw: &str, delimiter: &str) -> StoreResult<Vec<String>> {
    let pattern = Regex::new(delimiter).map_err(|e| {
        StoreError::InvalidArgument(format!("invalid delimiter pattern '{}': {}", delimiter, e))
    })?;
    if raw.is_empty() {
        return Ok(vec![String::new()]);
    }

    let mut parts: Vec<String> = pattern.split(raw).map(str::to_string).collect();
    // A zero-width match at the very start does not produce a leading segment
    if matches!(pattern.find(raw), Some(m) if m.start() == 0 && m.end() == 0) {
        parts.remove(0);
    }
    while parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    Ok(parts)
}

impl ConfigStore {
    /// Raw value, unchanged
    pub fn get_string(&self, category: &str, key: &str) -> StoreResult<String> {
        self.raw(category, key)
    }

    pub fn get_string_or(&self, category: &str, key: &str, default: &str) -> StoreResult<String> {
        or_default(self.raw(category, key), default.to_string())
    }

    /// Value as an arithmetic expression, evaluated in `f64`
    pub fn get_double(&self, category: &str, key: &str) -> StoreResult<f64> {
        expression::evaluate(&self.raw(category, key)?)
    }

    pub fn get_double_or(&self, category: &str, key: &str, default: f64) -> StoreResult<f64> {
        or_default(self.get_double(category, key), default)
    }

    pub fn get_float(&self, category: &str, key: &str) -> StoreResult<f32> {
        Ok(self.get_double(category, key)? as f32)
    }

    pub fn get_float_or(&self, category: &str, key: &str, default: f32) -> StoreResult<f32> {
        or_default(self.get_float(category, key), default)
    }

    /// Evaluated value truncated toward zero, e.g. `10 / 4` reads as `2`
    pub fn get_int(&self, category: &str, key: &str) -> StoreResult<i32> {
        Ok(self.get_double(category, key)? as i32)
    }

    pub fn get_int_or(&self, category: &str, key: &str, default: i32) -> StoreResult<i32> {
        or_default(self.get_int(category, key), default)
    }

    pub fn get_long(&self, category: &str, key: &str) -> StoreResult<i64> {
        Ok(self.get_double(category, key)? as i64)
    }

    pub fn get_long_or(&self, category: &str, key: &str, default: i64) -> StoreResult<i64> {
        or_default(self.get_long(category, key), default)
    }

    /// `true` when the value is `true` in any letter case, `false` for
    /// anything else. Only absence is an error.
    pub fn get_bool(&self, category: &str, key: &str) -> StoreResult<bool> {
        Ok(self.raw(category, key)?.eq_ignore_ascii_case("true"))
    }

    pub fn get_bool_or(&self, category: &str, key: &str, default: bool) -> StoreResult<bool> {
        or_default(self.get_bool(category, key), default)
    }

    /// Strict base-10 parse, no expressions
    pub fn get_byte(&self, category: &str, key: &str) -> StoreResult<i8> {
        let raw = self.raw(category, key)?;
        raw.parse::<i8>()
            .map_err(|e| StoreError::numeric(raw.as_str(), e.to_string()))
    }

    pub fn get_byte_or(&self, category: &str, key: &str, default: i8) -> StoreResult<i8> {
        or_default(self.get_byte(category, key), default)
    }

    /// Value split on the regular expression `delimiter`.
    ///
    /// Trailing empty segments are dropped; an empty value gives one empty
    /// segment.
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use propstore_core::{ConfigStore, StoreOptions};
    /// # use propstore_core::source::MemorySourceProvider;
    /// let provider = Arc::new(MemorySourceProvider::new());
    /// provider.insert("hosts.properties", "[pool]\nhosts = a, b ,c,,\n");
    /// let store = ConfigStore::open_with(
    ///     "hosts.properties",
    ///     StoreOptions::new().with_provider(provider),
    /// ).unwrap();
    ///
    /// let hosts = store.get_list("pool", "hosts", r"\s*,\s*").unwrap();
    /// assert_eq!(hosts, vec!["a", "b", "c"]);
    /// ```
    pub fn get_list(&self, category: &str, key: &str, delimiter: &str) -> StoreResult<Vec<String>> {
        split_list(&self.raw(category, key)?, delimiter)
    }

    pub fn get_list_or(
        &self,
        category: &str,
        key: &str,
        delimiter: &str,
        default: Vec<String>,
    ) -> StoreResult<Vec<String>> {
        or_default(self.get_list(category, key, delimiter), default)
    }
}
