//! In-memory registry/repository fixtures for tests.
//!
//! State lives behind `RefCell` so tests can flip live values through a
//! shared borrow while a model holds the scope.

use crate::scope::{VariantRegistry, VariantRepository};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct ParameterState {
    active: bool,
    value: Option<String>,
    groups: BTreeMap<String, BTreeSet<String>>,
}

pub struct FixtureRegistry {
    name: String,
    variants: RefCell<BTreeMap<String, bool>>,
    parameters: RefCell<BTreeMap<String, ParameterState>>,
}

impl FixtureRegistry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            variants: RefCell::new(BTreeMap::new()),
            parameters: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn add_variant(&self, local_path: &str, active: bool) {
        self.variants
            .borrow_mut()
            .insert(local_path.to_string(), active);
    }

    pub fn set_variant_active(&self, local_path: &str, active: bool) {
        self.variants
            .borrow_mut()
            .insert(local_path.to_string(), active);
    }

    pub fn add_parameter(&self, local_path: &str, value: Option<&str>) {
        self.parameters.borrow_mut().insert(
            local_path.to_string(),
            ParameterState {
                active: true,
                value: value.map(str::to_string),
                groups: BTreeMap::new(),
            },
        );
    }

    pub fn set_parameter_active(&self, local_path: &str, active: bool) {
        if let Some(state) = self.parameters.borrow_mut().get_mut(local_path) {
            state.active = active;
        }
    }

    pub fn add_group(&self, local_path: &str, group: &str, members: &[&str]) {
        if let Some(state) = self.parameters.borrow_mut().get_mut(local_path) {
            state.groups.insert(
                group.to_string(),
                members.iter().map(|m| m.to_string()).collect(),
            );
        }
    }

    pub fn select_value(&self, local_path: &str, value: &str) {
        if let Some(state) = self.parameters.borrow_mut().get_mut(local_path) {
            state.value = Some(value.to_string());
        }
    }
}

impl VariantRegistry for FixtureRegistry {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_variant(&self, local_path: &str) -> bool {
        self.variants.borrow().contains_key(local_path)
    }

    fn has_parameter(&self, local_path: &str) -> bool {
        self.parameters.borrow().contains_key(local_path)
    }

    fn has_group(&self, param_local_path: &str, group: &str) -> bool {
        self.parameters
            .borrow()
            .get(param_local_path)
            .is_some_and(|state| state.groups.contains_key(group))
    }

    fn is_active_variant(&self, local_path: &str) -> bool {
        self.variants.borrow().get(local_path).copied().unwrap_or(false)
    }

    fn is_active_parameter(&self, local_path: &str) -> bool {
        self.parameters
            .borrow()
            .get(local_path)
            .is_some_and(|state| state.active)
    }

    fn selected_value(&self, param_local_path: &str) -> Option<String> {
        self.parameters
            .borrow()
            .get(param_local_path)
            .and_then(|state| state.value.clone())
    }

    fn group_holds_value(&self, param_local_path: &str, group: &str, value: &str) -> bool {
        self.parameters
            .borrow()
            .get(param_local_path)
            .and_then(|state| state.groups.get(group))
            .is_some_and(|members| members.contains(value))
    }
}

#[derive(Default)]
pub struct FixtureRepository {
    registries: BTreeMap<String, FixtureRegistry>,
}

impl FixtureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&mut self, registry: FixtureRegistry) {
        self.registries.insert(registry.name.clone(), registry);
    }
}

impl VariantRepository for FixtureRepository {
    fn has_registry(&self, name: &str) -> bool {
        self.registries.contains_key(name)
    }

    fn registry(&self, name: &str) -> Option<&dyn VariantRegistry> {
        self.registries
            .get(name)
            .map(|registry| registry as &dyn VariantRegistry)
    }
}
