//! Line grammar
//!
//! ```text
//! [Category]
//! key = value
//! other = {{stem.Category.key}}
//! ```
//!
//! Lines are trimmed and blank lines skipped. `[name]` opens a category,
//! anything else is `key = value` split on the first `=`. A repeated header
//! replaces the earlier category, a repeated key within one block replaces
//! the earlier value.

use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use super::resolver::Resolver;

pub(crate) type Category = BTreeMap<String, String>;
pub(crate) type CategoryMap = BTreeMap<String, Category>;

enum Line<'a> {
    Blank,
    Header(&'a str),
    Entry { key: &'a str, value: &'a str },
}

fn classify(line: &str) -> Option<Line<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return Some(Line::Blank);
    }
    if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
        return Some(Line::Header(&line[1..line.len() - 1]));
    }
    line.split_once('=').map(|(key, value)| Line::Entry {
        key: key.trim(),
        value: value.trim(),
    })
}

/// Parse `lines` read from `resolver.location` into categories, resolving
/// indirection values as they are met
pub(crate) fn parse(lines: &[String], resolver: &mut Resolver<'_>) -> StoreResult<CategoryMap> {
    let mut categories = CategoryMap::new();
    let mut current: Option<(String, Category)> = None;

    for (index, raw) in lines.iter().enumerate() {
        let number = index + 1;
        match classify(raw) {
            Some(Line::Blank) => {}
            Some(Line::Header(name)) => {
                if let Some((name, entries)) = current.take() {
                    categories.insert(name, entries);
                }
                current = Some((name.to_string(), Category::new()));
            }
            Some(Line::Entry { key, value }) => {
                let (category, entries) = current.as_mut().ok_or_else(|| {
                    StoreError::format(resolver.location, number, "no category before entry")
                })?;
                let value = resolver.resolve(category, key, value, number)?;
                entries.insert(key.to_string(), value);
            }
            None => {
                return Err(StoreError::format(
                    resolver.location,
                    number,
                    format!("expected 'key = value', found '{}'", raw.trim()),
                ));
            }
        }
    }

    if let Some((name, entries)) = current {
        categories.insert(name, entries);
    }
    Ok(categories)
}
