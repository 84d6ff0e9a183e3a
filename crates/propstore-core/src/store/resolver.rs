//! Indirection values
//!
//! A value written as `{{stem.category.key}}` is replaced, while its line is
//! parsed, by the value of `key` in `category` of the store at
//! `stem.<extension>`. That store is loaded fresh with the same rules, so
//! references can chain. Every entry whose reference is being followed sits
//! on a `ResolutionStack`; meeting one of them again means the chain loops.

use std::fmt;

use crate::error::{StoreError, StoreResult};
use crate::log_debug;
use super::config_store::ConfigStore;
use super::options::StoreOptions;

/// Target of an indirection value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub stem: &'a str,
    pub category: &'a str,
    pub key: &'a str,
}

impl<'a> Reference<'a> {
    /// Read `value` as a reference.
    ///
    /// Returns `None` for plain values. A value in `{{...}}` whose path has
    /// fewer than three dot-separated parts gives `Some(Err(message))`. The
    /// key is everything after the second dot, so it may contain dots itself.
    pub fn parse(value: &'a str) -> Option<Result<Self, String>> {
        let path = value
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))?;

        let mut parts = path.splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(stem), Some(category), Some(key)) => Some(Ok(Self {
                stem,
                category,
                key,
            })),
            _ => Some(Err(format!(
                "reference '{}' must have the form stem.category.key",
                path
            ))),
        }
    }
}

/// An entry whose reference is being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFrame {
    pub location: String,
    pub category: String,
    pub key: String,
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}].{}", self.location, self.category, self.key)
    }
}

/// Entries currently being resolved, outermost first
#[derive(Debug, Default)]
pub struct ResolutionStack {
    frames: Vec<ReferenceFrame>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `frame`, failing if it is already in progress
    pub fn enter(&mut self, frame: ReferenceFrame) -> StoreResult<()> {
        if let Some(start) = self.frames.iter().position(|f| *f == frame) {
            let chain: Vec<String> = self.frames[start..]
                .iter()
                .chain(std::iter::once(&frame))
                .map(ToString::to_string)
                .collect();
            return Err(StoreError::ReferenceCycle(chain.join(" -> ")));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn exit(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Resolves the values of one source while it is parsed
pub(crate) struct Resolver<'a> {
    pub(crate) location: &'a str,
    pub(crate) options: &'a StoreOptions,
    pub(crate) stack: &'a mut ResolutionStack,
}

impl Resolver<'_> {
    /// Final raw value for the entry `category`/`key` written as `value` on `line`
    pub(crate) fn resolve(
        &mut self,
        category: &str,
        key: &str,
        value: &str,
        line: usize,
    ) -> StoreResult<String> {
        let reference = match Reference::parse(value) {
            None => return Ok(value.to_string()),
            Some(parsed) => parsed.map_err(|msg| StoreError::format(self.location, line, msg))?,
        };

        self.stack.enter(ReferenceFrame {
            location: self.location.to_string(),
            category: category.to_string(),
            key: key.to_string(),
        })?;

        let target = self.options.provider().locate_reference(
            self.location,
            reference.stem,
            self.options.extension(),
        );
        log_debug!(
            self.options.logger(),
            "{}: resolving [{}].{} from {}",
            self.location,
            category,
            key,
            target
        );

        let resolved = ConfigStore::load(&target, self.options, self.stack)
            .and_then(|store| store.get_string(reference.category, reference.key));
        self.stack.exit();
        resolved
    }
}
