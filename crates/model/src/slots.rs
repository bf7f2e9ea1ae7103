//! Dependee slot table.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use variant_address::VariantAddress;

/// Ordered table binding small integer slots to dependee addresses.
///
/// Slots are the vocabulary logic expressions speak: `[3]` in a formula
/// reads the activation state of whatever address is bound to slot 3.
/// Indices are caller-assigned and need not be contiguous.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SlotTable {
    slots: BTreeMap<u32, VariantAddress>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `address` to `slot`.
    ///
    /// An address may occupy at most one slot, and an occupied slot cannot
    /// be re-bound to a different address. Re-inserting an identical pair
    /// is a no-op.
    pub fn insert(&mut self, slot: u32, address: VariantAddress) -> Result<()> {
        if !address.is_wellformed() {
            return Err(ModelError::InvalidAddress(address.to_string()));
        }
        if let Some(bound) = self.slots.get(&slot) {
            if *bound == address {
                return Ok(());
            }
            return Err(ModelError::SlotOccupied {
                slot,
                bound: bound.to_string(),
            });
        }
        if self.contains_path(&address.to_string()) {
            return Err(ModelError::DuplicateDependee(address.to_string()));
        }
        self.slots.insert(slot, address);
        Ok(())
    }

    pub fn contains(&self, slot: u32) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.slots.values().any(|address| address.matches_path(path))
    }

    pub fn address(&self, slot: u32) -> Result<&VariantAddress> {
        self.slots
            .get(&slot)
            .ok_or(ModelError::UnknownSlotRecord(slot))
    }

    /// Canonical path of the address bound to `slot`.
    pub fn path(&self, slot: u32) -> Result<String> {
        self.address(slot).map(|address| address.to_string())
    }

    pub fn slots(&self) -> BTreeSet<u32> {
        self.slots.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &VariantAddress)> {
        self.slots.iter().map(|(slot, address)| (*slot, address))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = SlotTable::new();
        table
            .insert(0, VariantAddress::variant("geo", "has_field/is_on"))
            .expect("slot 0");
        table
            .insert(4, VariantAddress::value_group("geo", "detector_type", "advanced"))
            .expect("slot 4");

        assert!(table.contains(0));
        assert!(table.contains(4));
        assert!(!table.contains(1));
        assert!(table.contains_path("geo:has_field/is_on"));
        assert_eq!(table.path(4).expect("path"), "geo:detector_type@advanced");
        assert_eq!(table.slots(), BTreeSet::from([0, 4]));
    }

    #[test]
    fn test_one_address_occupies_at_most_one_slot() {
        let mut table = SlotTable::new();
        let address = VariantAddress::variant("geo", "a/b");
        table.insert(0, address.clone()).expect("first");
        let err = table.insert(1, address).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateDependee(path) if path == "geo:a/b"));
    }

    #[test]
    fn test_occupied_slot_cannot_change_address() {
        let mut table = SlotTable::new();
        table
            .insert(0, VariantAddress::variant("geo", "a/b"))
            .expect("first");
        let err = table
            .insert(0, VariantAddress::variant("geo", "c/d"))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::SlotOccupied { slot: 0, ref bound } if bound == "geo:a/b"
        ));
        // identical re-insert is accepted silently
        table
            .insert(0, VariantAddress::variant("geo", "a/b"))
            .expect("idempotent");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_ill_formed_addresses_are_rejected() {
        let mut table = SlotTable::new();
        let err = table
            .insert(0, VariantAddress::local_variant("odd"))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidAddress(_)));
    }

    #[test]
    fn test_unknown_slot_lookup_fails() {
        let table = SlotTable::new();
        let err = table.path(7).unwrap_err();
        assert!(matches!(err, ModelError::UnknownSlotRecord(7)));
        assert!(err.is_logic());
    }
}
