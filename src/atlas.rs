//! External reference index.
//!
//! Inherited library classes often carry no inline documentation at all.
//! When a method's docblock has no usable summary, the assembler falls back
//! to a precompiled index keyed by `Class::method` identity. Building and
//! refreshing that index is outside this crate; here it is just a lookup.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::Error;

/// Lookup interface consumed by the assembler. Injected so tests can
/// substitute a fake index.
pub trait DocIndex {
    fn lookup(&self, qualified: &str) -> Option<FallbackEntry>;
}

/// One reference index entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FallbackEntry {
    /// Short description text.
    #[serde(default)]
    pub short: String,
    /// Canonical reference link.
    #[serde(default)]
    pub link: String,
}

/// In-memory reference index. Keys are matched case-insensitively, since
/// PHP class and method names are.
#[derive(Debug, Default)]
pub struct AtlasIndex {
    entries: HashMap<String, FallbackEntry>,
}

impl AtlasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an index from a JSON object file:
    /// `{ "Exception::getMessage": { "short": "...", "link": "..." } }`
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)?;
        let parsed: HashMap<String, FallbackEntry> = serde_json::from_str(&raw)?;
        let mut index = Self::new();
        for (qualified, entry) in parsed {
            index.entries.insert(normalize_key(&qualified), entry);
        }
        Ok(index)
    }

    pub fn insert(&mut self, qualified: &str, entry: FallbackEntry) {
        self.entries.insert(normalize_key(qualified), entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl DocIndex for AtlasIndex {
    fn lookup(&self, qualified: &str) -> Option<FallbackEntry> {
        self.entries.get(&normalize_key(qualified)).cloned()
    }
}

/// Canonical PHP manual URL for a class method.
pub fn manual_link(class: &str, method: &str) -> String {
    format!(
        "https://secure.php.net/manual/en/{}.{}.php",
        class.trim_start_matches('\\'),
        method
    )
    .to_lowercase()
}

fn normalize_key(qualified: &str) -> String {
    qualified.trim_start_matches('\\').to_lowercase()
}
