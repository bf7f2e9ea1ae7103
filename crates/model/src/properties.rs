//! Narrow access to the key/value configuration store.

use log::LevelFilter;
use std::collections::{BTreeMap, BTreeSet};

/// Read-only view over the configuration store feeding the model.
///
/// The engine needs only a handful of typed lookups, so embedders adapt
/// their own store to this trait rather than the other way around. Every
/// accessor answers `None` when the key is absent or holds another type.
pub trait PropertyStore {
    fn has_key(&self, key: &str) -> bool;

    fn string(&self, key: &str) -> Option<String>;

    fn integer(&self, key: &str) -> Option<u32>;

    fn integer_set(&self, key: &str) -> Option<BTreeSet<u32>>;

    fn string_set(&self, key: &str) -> Option<BTreeSet<String>>;
}

/// In-memory [`PropertyStore`] with a builder surface, for tests and for
/// embedders that assemble configuration programmatically.
#[derive(Debug, Default, Clone)]
pub struct MemoryProperties {
    strings: BTreeMap<String, String>,
    integers: BTreeMap<String, u32>,
    integer_sets: BTreeMap<String, BTreeSet<u32>>,
    string_sets: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    pub fn with_integer(mut self, key: impl Into<String>, value: u32) -> Self {
        self.integers.insert(key.into(), value);
        self
    }

    pub fn with_integers(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = u32>,
    ) -> Self {
        self.integer_sets.insert(key.into(), values.into_iter().collect());
        self
    }

    pub fn with_strings<S: Into<String>>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.string_sets
            .insert(key.into(), values.into_iter().map(Into::into).collect());
        self
    }
}

impl PropertyStore for MemoryProperties {
    fn has_key(&self, key: &str) -> bool {
        self.strings.contains_key(key)
            || self.integers.contains_key(key)
            || self.integer_sets.contains_key(key)
            || self.string_sets.contains_key(key)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.strings.get(key).cloned()
    }

    fn integer(&self, key: &str) -> Option<u32> {
        self.integers.get(key).copied()
    }

    fn integer_set(&self, key: &str) -> Option<BTreeSet<u32>> {
        self.integer_sets.get(key).cloned()
    }

    fn string_set(&self, key: &str) -> Option<BTreeSet<String>> {
        self.string_sets.get(key).cloned()
    }
}

/// Map a configuration priority label onto a level filter.
///
/// The label set is the historical one; several labels collapse onto the
/// same filter.
pub fn level_from_label(label: &str) -> Option<LevelFilter> {
    match label.trim().to_ascii_lowercase().as_str() {
        "fatal" | "critical" | "error" => Some(LevelFilter::Error),
        "warning" | "notice" => Some(LevelFilter::Warn),
        "information" | "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Extract the optional `logging.priority` property.
pub fn extract_logging(config: &dyn PropertyStore) -> Option<LevelFilter> {
    config
        .string("logging.priority")
        .and_then(|label| level_from_label(&label))
}
