//! Borrowed views over the live registry/repository state.
//!
//! The engine never owns the objects whose activation it arbitrates: it
//! resolves addresses against, and reads live state from, exactly one
//! registry (local scope) or one repository of registries (global scope),
//! both borrowed for the model's lifetime.

use crate::error::{ModelError, Result};
use variant_address::VariantAddress;

/// Live view of a single variant registry.
pub trait VariantRegistry {
    fn name(&self) -> &str;

    /// Parent repository, when the registry is mounted in one.
    fn parent_repository(&self) -> Option<&dyn VariantRepository> {
        None
    }

    fn has_variant(&self, local_path: &str) -> bool;

    fn has_parameter(&self, local_path: &str) -> bool;

    fn has_group(&self, param_local_path: &str, group: &str) -> bool;

    fn is_active_variant(&self, local_path: &str) -> bool;

    fn is_active_parameter(&self, local_path: &str) -> bool;

    /// Currently selected value of a parameter, if one is selected.
    fn selected_value(&self, param_local_path: &str) -> Option<String>;

    /// Whether `value` belongs to the named value group of a parameter.
    fn group_holds_value(&self, param_local_path: &str, group: &str, value: &str) -> bool;
}

/// Live view of a repository of registries.
pub trait VariantRepository {
    fn has_registry(&self, name: &str) -> bool;

    fn registry(&self, name: &str) -> Option<&dyn VariantRegistry>;

    fn is_active_registry(&self, name: &str) -> bool {
        self.has_registry(name)
    }
}

/// The addressing scope a dependency model is bound to.
///
/// Replaces the historical pair of nullable registry/repository handles:
/// the local/global distinction is a checked variant, not a convention. A
/// local scope still carries the registry's parent repository when there is
/// one, so both addressing families stay reachable.
#[derive(Clone, Copy)]
pub enum Scope<'a> {
    Local {
        registry: &'a dyn VariantRegistry,
        repository: Option<&'a dyn VariantRepository>,
    },
    Global {
        repository: &'a dyn VariantRepository,
    },
}

impl<'a> Scope<'a> {
    pub fn local(registry: &'a dyn VariantRegistry) -> Self {
        Scope::Local {
            registry,
            repository: registry.parent_repository(),
        }
    }

    pub fn global(repository: &'a dyn VariantRepository) -> Self {
        Scope::Global { repository }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Scope::Local { .. })
    }

    pub fn is_global(&self) -> bool {
        !self.is_local()
    }

    pub fn registry(&self) -> Option<&'a dyn VariantRegistry> {
        match self {
            Scope::Local { registry, .. } => Some(*registry),
            Scope::Global { .. } => None,
        }
    }

    pub fn repository(&self) -> Option<&'a dyn VariantRepository> {
        match self {
            Scope::Local { repository, .. } => *repository,
            Scope::Global { repository } => Some(*repository),
        }
    }

    /// Check that `address` matches the scope's locality and names objects
    /// that exist right now in the bound registry or repository.
    pub fn resolve(&self, address: &VariantAddress) -> Result<()> {
        match self {
            Scope::Local { registry, .. } => {
                if !address.is_local() {
                    return Err(ModelError::ScopeMismatch {
                        address: address.to_string(),
                        expected: "local",
                    });
                }
                resolve_in_registry(*registry, address)
            }
            Scope::Global { repository } => {
                if !address.is_global() {
                    return Err(ModelError::ScopeMismatch {
                        address: address.to_string(),
                        expected: "global",
                    });
                }
                if let VariantAddress::Registry { registry } = address {
                    if !repository.has_registry(registry) {
                        return Err(unresolvable(
                            address,
                            format!("repository has no registry named '{registry}'"),
                        ));
                    }
                    return Ok(());
                }
                let Some(name) = address.registry_name() else {
                    return Err(ModelError::ScopeMismatch {
                        address: address.to_string(),
                        expected: "global",
                    });
                };
                let Some(registry) = repository.registry(name) else {
                    return Err(unresolvable(
                        address,
                        format!("repository has no registry named '{name}'"),
                    ));
                };
                resolve_in_registry(registry, address)
            }
        }
    }

    /// Read the current activation state of `address`.
    ///
    /// For a variant or parameter this is its live active flag; for a value
    /// group, whether the parameter's selected value belongs to the group;
    /// for an enumerated string value, whether it is the selected value.
    /// Anything that no longer resolves reads as inactive.
    pub fn is_active(&self, address: &VariantAddress) -> bool {
        match self {
            Scope::Local { registry, .. } => active_in_registry(*registry, address),
            Scope::Global { repository } => match address {
                VariantAddress::Registry { registry } => repository.is_active_registry(registry),
                _ => address
                    .registry_name()
                    .and_then(|name| repository.registry(name))
                    .is_some_and(|registry| active_in_registry(registry, address)),
            },
        }
    }
}

fn unresolvable(address: &VariantAddress, reason: String) -> ModelError {
    ModelError::Unresolvable {
        address: address.to_string(),
        reason,
    }
}

fn resolve_in_registry(registry: &dyn VariantRegistry, address: &VariantAddress) -> Result<()> {
    match address {
        VariantAddress::Registry { .. } => Err(ModelError::ScopeMismatch {
            address: address.to_string(),
            expected: "scoped to a registry",
        }),
        VariantAddress::Variant { path, .. } => {
            if !registry.has_variant(path) {
                return Err(unresolvable(
                    address,
                    format!("registry '{}' has no variant '{path}'", registry.name()),
                ));
            }
            Ok(())
        }
        VariantAddress::Parameter { path, .. } => {
            if !registry.has_parameter(path) {
                return Err(unresolvable(
                    address,
                    format!("registry '{}' has no parameter '{path}'", registry.name()),
                ));
            }
            Ok(())
        }
        VariantAddress::ValueGroup { path, group, .. } => {
            if !registry.has_parameter(path) {
                return Err(unresolvable(
                    address,
                    format!("registry '{}' has no parameter '{path}'", registry.name()),
                ));
            }
            if !registry.has_group(path, group) {
                return Err(unresolvable(
                    address,
                    format!("parameter '{path}' has no value group '{group}'"),
                ));
            }
            Ok(())
        }
        VariantAddress::EnumValue { path, .. } => {
            if !registry.has_parameter(path) {
                return Err(unresolvable(
                    address,
                    format!("registry '{}' has no parameter '{path}'", registry.name()),
                ));
            }
            Ok(())
        }
    }
}

fn active_in_registry(registry: &dyn VariantRegistry, address: &VariantAddress) -> bool {
    match address {
        VariantAddress::Registry { .. } => false,
        VariantAddress::Variant { path, .. } => registry.is_active_variant(path),
        VariantAddress::Parameter { path, .. } => registry.is_active_parameter(path),
        VariantAddress::ValueGroup { path, group, .. } => registry
            .selected_value(path)
            .is_some_and(|value| registry.group_holds_value(path, group, &value)),
        VariantAddress::EnumValue { path, value, .. } => {
            registry.selected_value(path).as_deref() == Some(value.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{FixtureRegistry, FixtureRepository};

    #[test]
    fn test_local_scope_rejects_global_addresses() {
        let registry = FixtureRegistry::new("geo");
        let scope = Scope::local(&registry);
        let err = scope
            .resolve(&VariantAddress::variant("geo", "a/b"))
            .unwrap_err();
        assert!(matches!(err, ModelError::ScopeMismatch { .. }));
        assert!(err.is_logic());
    }

    #[test]
    fn test_global_scope_resolves_through_the_named_registry() {
        let mut repository = FixtureRepository::new();
        let registry = FixtureRegistry::new("geo");
        registry.add_variant("has_field/is_on", true);
        repository.mount(registry);
        let scope = Scope::global(&repository);

        scope
            .resolve(&VariantAddress::variant("geo", "has_field/is_on"))
            .expect("resolvable");
        let err = scope
            .resolve(&VariantAddress::variant("cal", "has_field/is_on"))
            .unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn test_unresolvable_targets_are_domain_errors() {
        let registry = FixtureRegistry::new("geo");
        registry.add_parameter("mode", Some("fast"));
        let scope = Scope::local(&registry);

        let err = scope
            .resolve(&VariantAddress::local_variant("a/b"))
            .unwrap_err();
        assert!(err.is_domain());
        let err = scope
            .resolve(&VariantAddress::local_value_group("mode", "slow_modes"))
            .unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn test_activation_of_groups_follows_the_selected_value() {
        let registry = FixtureRegistry::new("geo");
        registry.add_parameter("detector_type", Some("hpge"));
        registry.add_group("detector_type", "advanced", &["hpge", "clover"]);
        let scope = Scope::local(&registry);
        let group = VariantAddress::local_value_group("detector_type", "advanced");

        assert!(scope.is_active(&group));
        registry.select_value("detector_type", "nai");
        assert!(!scope.is_active(&group));
    }

    #[test]
    fn test_activation_of_parameters_follows_the_active_flag() {
        let registry = FixtureRegistry::new("geo");
        registry.add_parameter("mode", None);
        let scope = Scope::local(&registry);
        let parameter = VariantAddress::local_parameter("mode");

        assert!(scope.is_active(&parameter));
        registry.set_parameter_active("mode", false);
        assert!(!scope.is_active(&parameter));
    }

    #[test]
    fn test_activation_of_enum_values_is_an_exact_match() {
        let registry = FixtureRegistry::new("geo");
        registry.add_parameter("detector_type", Some("hpge"));
        let scope = Scope::local(&registry);

        assert!(scope.is_active(&VariantAddress::local_enum_value("detector_type", "hpge")));
        assert!(!scope.is_active(&VariantAddress::local_enum_value("detector_type", "nai")));
    }

    #[test]
    fn test_local_scope_accessors() {
        let registry = FixtureRegistry::new("geo");
        let scope = Scope::local(&registry);
        assert!(scope.is_local());
        // no parent repository on this fixture
        assert!(scope.repository().is_none());
        assert_eq!(
            scope.registry().map(|r| r.name().to_string()),
            Some("geo".to_string())
        );
    }
}
