//! Dependency model orchestration.

use crate::dependency::VariantDependency;
use crate::error::{ModelError, Result};
use crate::graph::InfluenceGraph;
use crate::properties::{self, PropertyStore};
use crate::records::{DependencyRecord, RecordStore};
use crate::scope::{Scope, VariantRegistry, VariantRepository};
use crate::slots::SlotTable;
use log::LevelFilter;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};
use variant_address::{ParseMode, VariantAddress};

static NO_DEPENDERS: Lazy<BTreeSet<String>> = Lazy::new(BTreeSet::new);

/// Model of the dependencies between configuration objects of one scope.
///
/// Dependee slot table: each dependee of interest publishes its activation
/// state to a slot with a unique caller-assigned index:
///
/// ```text
/// +----------------+
/// |  Dependee "E0" o-->[0]
/// +----------------+
/// |  Dependee "E1" o-->[1]
/// +----------------+
/// |  Dependee "E2" o-->[5]
/// +----------------+
/// ```
///
/// Dependency records: each depender computes its enabled state from a
/// logic expression wired to a set of input slots:
///
/// ```text
/// +-----------------+     +-------+
/// |  Dependency "A" |--<--o  AND  o--<-- [0], [5]
/// +-----------------+     +-------+
/// |  Dependency "B" |--<--o  NOT  o--<-- [1]
/// +-----------------+     +-------+
/// ```
///
/// `initialize` compiles every record into a locked [`VariantDependency`]
/// and derives the reverse index answering "who depends on this dependee".
/// The model is strictly build-then-use: mutators require the uninitialized
/// state, queries the initialized one, and `reset` returns to a clean
/// slate.
pub struct DependencyModel<'a> {
    scope: Scope<'a>,
    logging: LevelFilter,
    slots: SlotTable,
    records: RecordStore,
    dependencies: BTreeMap<String, VariantDependency<'a>>,
    dependers: BTreeMap<String, BTreeSet<String>>,
    influence: InfluenceGraph,
    initialized: bool,
}

impl<'a> DependencyModel<'a> {
    /// Model over a whole repository: global addressing.
    pub fn for_repository(repository: &'a dyn VariantRepository) -> Self {
        Self::with_scope(Scope::global(repository))
    }

    /// Model local to one registry.
    pub fn for_registry(registry: &'a dyn VariantRegistry) -> Self {
        Self::with_scope(Scope::local(registry))
    }

    fn with_scope(scope: Scope<'a>) -> Self {
        Self {
            scope,
            logging: LevelFilter::Error,
            slots: SlotTable::new(),
            records: RecordStore::new(),
            dependencies: BTreeMap::new(),
            dependers: BTreeMap::new(),
            influence: InfluenceGraph::new(),
            initialized: false,
        }
    }

    pub fn scope(&self) -> Scope<'a> {
        self.scope
    }

    /// The bound registry, for local models.
    pub fn registry(&self) -> Option<&'a dyn VariantRegistry> {
        self.scope.registry()
    }

    /// The bound repository: direct for global models, the registry's
    /// parent (when mounted) for local ones.
    pub fn repository(&self) -> Option<&'a dyn VariantRepository> {
        self.scope.repository()
    }

    pub fn is_local(&self) -> bool {
        self.scope.is_local()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn logging(&self) -> LevelFilter {
        self.logging
    }

    pub fn set_logging(&mut self, level: LevelFilter) {
        self.logging = level;
    }

    /// Declare a dependee slot before initialization.
    pub fn add_dependee_slot(&mut self, slot: u32, dependee_path: &str) -> Result<()> {
        self.ensure_uninitialized()?;
        let address = VariantAddress::parse(dependee_path, self.parse_mode())
            .ok_or_else(|| ModelError::InvalidAddress(dependee_path.to_string()))?;
        self.slots.insert(slot, address)
    }

    /// Declare a dependency record before initialization.
    pub fn add_dependency_record(&mut self, name: &str, record: DependencyRecord) -> Result<()> {
        self.ensure_uninitialized()?;
        self.records.insert(name, record)
    }

    /// Populate the slot table and record store from configuration, compile
    /// every record, and build the reverse index.
    ///
    /// Fail-fast: on any error the model is left as if [`reset`] had run.
    ///
    /// [`reset`]: DependencyModel::reset
    pub fn initialize(&mut self, config: &dyn PropertyStore) -> Result<()> {
        self.ensure_uninitialized()?;
        match self.try_initialize(config) {
            Ok(()) => {
                self.initialized = true;
                log::info!(
                    "dependency model initialized: {} dependees, {} dependencies",
                    self.slots.len(),
                    self.dependencies.len()
                );
                Ok(())
            }
            Err(error) => {
                self.clear();
                Err(error)
            }
        }
    }

    fn try_initialize(&mut self, config: &dyn PropertyStore) -> Result<()> {
        if let Some(level) = properties::extract_logging(config) {
            self.logging = level;
        }

        let declared: BTreeSet<u32> = if let Some(slots) = config.integer_set("dependees.slots") {
            slots
        } else if let Some(count) = config.integer("dependees.number_of_slots") {
            (0..count).collect()
        } else {
            BTreeSet::new()
        };
        for slot in declared {
            let key = format!("dependees.slot_{slot}.variant");
            let dependee = config.string(&key).ok_or(ModelError::MissingKey(key))?;
            self.add_dependee_slot(slot, &dependee)?;
        }

        if config.has_key("dependencies") {
            let names = config.string_set("dependencies").unwrap_or_default();
            for name in names {
                let depender_key = format!("dependencies.{name}.depender");
                let depender = config
                    .string(&depender_key)
                    .ok_or(ModelError::MissingKey(depender_key))?;
                let slots_key = format!("dependencies.{name}.slots");
                let input_slots = config
                    .integer_set(&slots_key)
                    .ok_or(ModelError::MissingKey(slots_key))?;
                let mut record = DependencyRecord::new(depender, input_slots);
                if let Some(expression) = config.string(&format!("dependencies.{name}.logic")) {
                    record = record.with_logic(expression);
                }
                if let Some(label) = config.string(&format!("dependencies.{name}.logging")) {
                    if let Some(level) = properties::level_from_label(&label) {
                        record = record.with_logging(level);
                    }
                }
                self.records.insert(&name, record)?;
            }
        }

        self.build_dependencies()?;
        self.build_dependers_index();
        Ok(())
    }

    fn build_dependencies(&mut self) -> Result<()> {
        let records = std::mem::take(&mut self.records);
        let registry_scoped = self.is_local();
        for (name, record) in records.iter() {
            if self.trace() {
                log::debug!("compiling dependency record '{name}'");
            }
            let dependency =
                Self::compile_record(self.scope, &self.slots, record, registry_scoped)?;
            let depender_path = match dependency.depender() {
                Some(depender) => depender.to_string(),
                None => return Err(ModelError::NoDepender),
            };
            if self.dependencies.contains_key(&depender_path) {
                return Err(ModelError::DuplicateDepender(depender_path));
            }
            self.dependencies.insert(depender_path, dependency);
        }
        self.records = records;
        Ok(())
    }

    fn compile_record(
        scope: Scope<'a>,
        slots: &SlotTable,
        record: &DependencyRecord,
        registry_scoped: bool,
    ) -> Result<VariantDependency<'a>> {
        let mut dependency = VariantDependency::new(scope);
        dependency.set_logging(record.logging);
        dependency.bind_depender_path(&record.depender_path, registry_scoped)?;
        for &slot in &record.input_slots {
            if !slots.contains(slot) {
                return Err(ModelError::UnknownSlot(slot));
            }
            let address = slots.address(slot)?.clone();
            dependency.bind_dependee(slot, address)?;
        }
        dependency.compile(record.logic_expression.as_deref())?;
        dependency.lock()?;
        Ok(dependency)
    }

    fn build_dependers_index(&mut self) {
        for (depender_path, dependency) in &self.dependencies {
            for slot in dependency.dependee_slots() {
                let Ok(dependee) = dependency.dependee(slot) else {
                    continue;
                };
                let dependee_path = dependee.to_string();
                self.dependers
                    .entry(dependee_path.clone())
                    .or_default()
                    .insert(depender_path.clone());
                self.influence.add_influence(&dependee_path, depender_path);
            }
        }
    }

    /// Drop every compiled dependency, record and slot; back to the
    /// uninitialized state.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.dependers.clear();
        self.influence.clear();
        self.dependencies.clear();
        self.records.clear();
        self.slots.clear();
        self.initialized = false;
    }

    pub fn has_dependency(&self, depender_path: &str) -> Result<bool> {
        self.ensure_initialized()?;
        Ok(self.dependencies.contains_key(depender_path))
    }

    /// The compiled dependency whose depender has this canonical path.
    pub fn dependency(&self, depender_path: &str) -> Result<&VariantDependency<'a>> {
        self.ensure_initialized()?;
        self.dependencies
            .get(depender_path)
            .ok_or_else(|| ModelError::UnknownDependency(depender_path.to_string()))
    }

    /// All compiled dependencies, keyed by canonical depender path.
    pub fn dependencies(&self) -> Result<&BTreeMap<String, VariantDependency<'a>>> {
        self.ensure_initialized()?;
        Ok(&self.dependencies)
    }

    /// Dependers reading `dependee_path` directly. Unknown dependees map to
    /// the empty set, not an error.
    pub fn dependers_of(&self, dependee_path: &str) -> Result<&BTreeSet<String>> {
        self.ensure_initialized()?;
        Ok(self.dependers.get(dependee_path).unwrap_or(&NO_DEPENDERS))
    }

    /// Every depender transitively affected when `dependee_path` changes
    /// state, for cascade re-evaluation.
    pub fn dependers_closure(&self, dependee_path: &str) -> Result<BTreeSet<String>> {
        self.ensure_initialized()?;
        Ok(self.influence.closure(dependee_path))
    }

    pub fn has_dependee_slot(&self, slot: u32) -> bool {
        self.slots.contains(slot)
    }

    pub fn has_dependee_path(&self, dependee_path: &str) -> bool {
        self.slots.contains_path(dependee_path)
    }

    /// Canonical path bound to a dependee slot.
    pub fn dependee_slot_path(&self, slot: u32) -> Result<String> {
        self.slots.path(slot)
    }

    pub fn dependee_slots(&self) -> BTreeSet<u32> {
        self.slots.slots()
    }

    pub fn has_record(&self, name: &str) -> bool {
        self.records.contains(name)
    }

    pub fn has_record_for_depender(&self, depender_path: &str) -> bool {
        self.records.contains_depender(depender_path)
    }

    pub fn record_names(&self) -> BTreeSet<String> {
        self.records.names()
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    fn parse_mode(&self) -> ParseMode {
        if self.is_local() {
            ParseMode::LocalOnly
        } else {
            ParseMode::GlobalOnly
        }
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(ModelError::NotInitialized);
        }
        Ok(())
    }

    fn ensure_uninitialized(&self) -> Result<()> {
        if self.initialized {
            return Err(ModelError::AlreadyInitialized);
        }
        Ok(())
    }

    fn trace(&self) -> bool {
        self.logging >= LevelFilter::Debug
    }
}
