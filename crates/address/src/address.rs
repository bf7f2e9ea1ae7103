use crate::error::{AddressError, Result};
use crate::parse::{self, ParseMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of one configuration object in a registry or across a repository
/// of registries.
///
/// An address is *global* when it names its registry explicitly and *local*
/// when it is relative to an implied registry scope; registries themselves
/// are always global by convention. The canonical string rendering (see
/// [`fmt::Display`]) is lossless and doubles as the lookup key wherever
/// addresses are compared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VariantAddress {
    /// A whole variant registry.
    Registry { registry: String },

    /// A variant record inside a registry.
    Variant {
        registry: Option<String>,
        path: String,
    },

    /// A parameter record inside a registry.
    Parameter {
        registry: Option<String>,
        path: String,
    },

    /// A named group of values of a parameter.
    ValueGroup {
        registry: Option<String>,
        path: String,
        group: String,
    },

    /// One enumerated string value of a parameter.
    EnumValue {
        registry: Option<String>,
        path: String,
        value: String,
    },
}

impl VariantAddress {
    pub fn registry(name: impl Into<String>) -> Self {
        Self::Registry {
            registry: name.into(),
        }
    }

    pub fn variant(registry: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Variant {
            registry: Some(registry.into()),
            path: path.into(),
        }
    }

    pub fn local_variant(path: impl Into<String>) -> Self {
        Self::Variant {
            registry: None,
            path: path.into(),
        }
    }

    pub fn parameter(registry: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Parameter {
            registry: Some(registry.into()),
            path: path.into(),
        }
    }

    pub fn local_parameter(path: impl Into<String>) -> Self {
        Self::Parameter {
            registry: None,
            path: path.into(),
        }
    }

    pub fn value_group(
        registry: impl Into<String>,
        path: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self::ValueGroup {
            registry: Some(registry.into()),
            path: path.into(),
            group: group.into(),
        }
    }

    pub fn local_value_group(path: impl Into<String>, group: impl Into<String>) -> Self {
        Self::ValueGroup {
            registry: None,
            path: path.into(),
            group: group.into(),
        }
    }

    pub fn enum_value(
        registry: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::EnumValue {
            registry: Some(registry.into()),
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn local_enum_value(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EnumValue {
            registry: None,
            path: path.into(),
            value: value.into(),
        }
    }

    /// Parse a textual address, restricted to the forms `mode` enables.
    ///
    /// Returns `None` when no enabled form matches; parsing never errors.
    pub fn parse(text: &str, mode: ParseMode) -> Option<Self> {
        parse::parse(text, mode)
    }

    pub fn is_registry(&self) -> bool {
        matches!(self, Self::Registry { .. })
    }

    pub fn is_variant(&self) -> bool {
        matches!(self, Self::Variant { .. })
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter { .. })
    }

    pub fn is_value_group(&self) -> bool {
        matches!(self, Self::ValueGroup { .. })
    }

    pub fn is_enum_value(&self) -> bool {
        matches!(self, Self::EnumValue { .. })
    }

    pub fn is_global(&self) -> bool {
        match self {
            Self::Registry { .. } => true,
            Self::Variant { registry, .. }
            | Self::Parameter { registry, .. }
            | Self::ValueGroup { registry, .. }
            | Self::EnumValue { registry, .. } => registry.is_some(),
        }
    }

    pub fn is_local(&self) -> bool {
        !self.is_global()
    }

    pub fn registry_name(&self) -> Option<&str> {
        match self {
            Self::Registry { registry } => Some(registry),
            Self::Variant { registry, .. }
            | Self::Parameter { registry, .. }
            | Self::ValueGroup { registry, .. }
            | Self::EnumValue { registry, .. } => registry.as_deref(),
        }
    }

    /// Scope-relative path, absent only for registry addresses.
    pub fn local_path(&self) -> Option<&str> {
        match self {
            Self::Registry { .. } => None,
            Self::Variant { path, .. }
            | Self::Parameter { path, .. }
            | Self::ValueGroup { path, .. }
            | Self::EnumValue { path, .. } => Some(path),
        }
    }

    pub fn variant_local_path(&self) -> Result<&str> {
        match self {
            Self::Variant { path, .. } => Ok(path),
            _ => Err(AddressError::NotAVariant(self.to_string())),
        }
    }

    /// Parameter path of a parameter, value-group or enum-value address.
    pub fn parameter_local_path(&self) -> Result<&str> {
        match self {
            Self::Parameter { path, .. }
            | Self::ValueGroup { path, .. }
            | Self::EnumValue { path, .. } => Ok(path),
            _ => Err(AddressError::NotAParameter(self.to_string())),
        }
    }

    pub fn group_name(&self) -> Result<&str> {
        match self {
            Self::ValueGroup { group, .. } => Ok(group),
            _ => Err(AddressError::NotAValueGroup(self.to_string())),
        }
    }

    pub fn enum_string_value(&self) -> Result<&str> {
        match self {
            Self::EnumValue { value, .. } => Ok(value),
            _ => Err(AddressError::NotAnEnumValue(self.to_string())),
        }
    }

    /// Compare against a canonical path string.
    pub fn matches_path(&self, path: &str) -> bool {
        self.to_string() == path
    }

    /// Whether every stored field obeys the address grammar.
    ///
    /// Constructors store their arguments verbatim; this is the check used
    /// before an address enters a slot table or gets bound.
    pub fn is_wellformed(&self) -> bool {
        let registry_ok =
            |registry: &Option<String>| registry.as_deref().map_or(true, parse::is_name);
        match self {
            Self::Registry { registry } => parse::is_name(registry),
            Self::Variant { registry, path } => {
                registry_ok(registry) && parse::is_variant_path(path)
            }
            Self::Parameter { registry, path } => {
                registry_ok(registry) && parse::is_parameter_path(path)
            }
            Self::ValueGroup {
                registry,
                path,
                group,
            } => registry_ok(registry) && parse::is_parameter_path(path) && parse::is_group(group),
            Self::EnumValue {
                registry,
                path,
                value,
            } => registry_ok(registry) && parse::is_parameter_path(path) && !value.is_empty(),
        }
    }
}

impl fmt::Display for VariantAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Local addresses always render with the explicit ':' marker so that
        // the canonical form reparses to the same address.
        fn scope(f: &mut fmt::Formatter<'_>, registry: &Option<String>) -> fmt::Result {
            match registry {
                Some(name) => write!(f, "{name}:"),
                None => write!(f, ":"),
            }
        }
        match self {
            Self::Registry { registry } => write!(f, "{registry}"),
            Self::Variant { registry, path } | Self::Parameter { registry, path } => {
                scope(f, registry)?;
                write!(f, "{path}")
            }
            Self::ValueGroup {
                registry,
                path,
                group,
            } => {
                scope(f, registry)?;
                write!(f, "{path}@{group}")
            }
            Self::EnumValue {
                registry,
                path,
                value,
            } => {
                scope(f, registry)?;
                write!(f, "{path}={value}")
            }
        }
    }
}

impl From<VariantAddress> for String {
    fn from(address: VariantAddress) -> String {
        address.to_string()
    }
}

impl FromStr for VariantAddress {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text, ParseMode::Any).ok_or_else(|| AddressError::Unparseable(text.to_string()))
    }
}

impl TryFrom<String> for VariantAddress {
    type Error = AddressError;

    fn try_from(text: String) -> Result<Self> {
        text.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_round_trip_for_every_kind() {
        let addresses = [
            VariantAddress::registry("geo"),
            VariantAddress::variant("geo", "has_field/is_on"),
            VariantAddress::local_variant("has_field/is_on"),
            VariantAddress::parameter("geo", "field_strength"),
            VariantAddress::local_parameter("a/b/c"),
            VariantAddress::value_group("geo", "detector_type", "advanced"),
            VariantAddress::local_value_group("detector_type", "adv/lab"),
            VariantAddress::enum_value("geo", "detector_type", "hpge"),
            VariantAddress::local_enum_value("mode", "2.5T"),
        ];
        for address in addresses {
            let text = address.to_string();
            assert_eq!(VariantAddress::parse(&text, ParseMode::Any), Some(address), "{text}");
        }
    }

    #[test]
    fn test_local_addresses_render_with_the_explicit_colon() {
        assert_eq!(VariantAddress::local_parameter("a/b/c").to_string(), ":a/b/c");
        assert_eq!(VariantAddress::local_variant("a/b").to_string(), ":a/b");
        assert_eq!(
            VariantAddress::local_value_group("p", "g").to_string(),
            ":p@g"
        );
    }

    #[test]
    fn test_global_addresses_render_with_the_registry_prefix() {
        assert_eq!(VariantAddress::registry("geo").to_string(), "geo");
        assert_eq!(
            VariantAddress::variant("geo", "a/b").to_string(),
            "geo:a/b"
        );
        assert_eq!(
            VariantAddress::enum_value("geo", "p", "v").to_string(),
            "geo:p=v"
        );
    }

    #[test]
    fn test_locality_follows_the_registry_field() {
        assert!(VariantAddress::registry("geo").is_global());
        assert!(VariantAddress::variant("geo", "a/b").is_global());
        assert!(VariantAddress::local_variant("a/b").is_local());
        assert!(!VariantAddress::local_variant("a/b").is_global());
    }

    #[test]
    fn test_checked_accessors_reject_wrong_kinds() {
        let variant = VariantAddress::variant("geo", "a/b");
        assert_eq!(variant.variant_local_path(), Ok("a/b"));
        assert_eq!(
            variant.parameter_local_path(),
            Err(AddressError::NotAParameter("geo:a/b".to_string()))
        );

        let group = VariantAddress::value_group("geo", "p", "g");
        assert_eq!(group.parameter_local_path(), Ok("p"));
        assert_eq!(group.group_name(), Ok("g"));
        assert_eq!(
            group.enum_string_value(),
            Err(AddressError::NotAnEnumValue("geo:p@g".to_string()))
        );
    }

    #[test]
    fn test_matches_path_compares_canonical_strings() {
        let address = VariantAddress::value_group("geo", "detector_type", "advanced");
        assert!(address.matches_path("geo:detector_type@advanced"));
        assert!(!address.matches_path("geo:detector_type"));
    }

    #[test]
    fn test_wellformedness_of_constructed_addresses() {
        assert!(VariantAddress::variant("geo", "a/b").is_wellformed());
        assert!(VariantAddress::parameter("geo", "ring[3]/b/c").is_wellformed());
        // constructors store verbatim, so parity violations surface here
        assert!(!VariantAddress::variant("geo", "a").is_wellformed());
        assert!(!VariantAddress::parameter("geo", "a/b").is_wellformed());
        assert!(!VariantAddress::registry("0geo").is_wellformed());
        assert!(!VariantAddress::local_enum_value("p", "").is_wellformed());
    }

    #[test]
    fn test_serde_uses_the_canonical_string() {
        let address = VariantAddress::value_group("geo", "detector_type", "advanced");
        let json = serde_json::to_string(&address).expect("serialize");
        assert_eq!(json, "\"geo:detector_type@advanced\"");
        let back: VariantAddress = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, address);
    }

    #[test]
    fn test_from_str_reports_unparseable_input() {
        let err = "geo::bad".parse::<VariantAddress>().unwrap_err();
        assert_eq!(err, AddressError::Unparseable("geo::bad".to_string()));
    }
}
