//! Dependency record store.

use crate::error::{ModelError, Result};
use log::LevelFilter;
use std::collections::{BTreeMap, BTreeSet};

/// One declared dependency: who depends, which dependee slots feed it, and
/// the optional logic formula combining them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub depender_path: String,
    pub input_slots: BTreeSet<u32>,
    pub logic_expression: Option<String>,
    pub logging: LevelFilter,
}

impl DependencyRecord {
    pub fn new(depender_path: impl Into<String>, input_slots: impl IntoIterator<Item = u32>) -> Self {
        Self {
            depender_path: depender_path.into(),
            input_slots: input_slots.into_iter().collect(),
            logic_expression: None,
            logging: LevelFilter::Error,
        }
    }

    pub fn with_logic(mut self, expression: impl Into<String>) -> Self {
        self.logic_expression = Some(expression.into());
        self
    }

    pub fn with_logging(mut self, level: LevelFilter) -> Self {
        self.logging = level;
        self
    }
}

/// Named dependency records, at most one per distinct depender path.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: BTreeMap<String, DependencyRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, record: DependencyRecord) -> Result<()> {
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        if record.depender_path.is_empty() {
            return Err(ModelError::EmptyDepender);
        }
        if record.input_slots.is_empty() {
            return Err(ModelError::NoInputSlots);
        }
        if self.records.contains_key(name) {
            return Err(ModelError::DuplicateRecord(name.to_string()));
        }
        if self.contains_depender(&record.depender_path) {
            return Err(ModelError::DuplicateDepender(record.depender_path));
        }
        self.records.insert(name.to_string(), record);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn contains_depender(&self, depender_path: &str) -> bool {
        self.records
            .values()
            .any(|record| record.depender_path == depender_path)
    }

    pub fn get(&self, name: &str) -> Option<&DependencyRecord> {
        self.records.get(name)
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.records.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DependencyRecord)> {
        self.records.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
