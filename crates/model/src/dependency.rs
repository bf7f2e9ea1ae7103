//! A single compiled dependency.

use crate::error::{ModelError, Result};
use crate::logic::LogicExpr;
use crate::scope::Scope;
use log::LevelFilter;
use std::collections::{BTreeMap, BTreeSet};
use variant_address::{ParseMode, VariantAddress};

/// One depender whose activation is computed from a set of dependee slots
/// through a logic expression.
///
/// Built in three steps (bind the depender, bind each dependee slot,
/// compile the logic) and then locked. A locked dependency is immutable
/// and ready to [`evaluate`](VariantDependency::evaluate) against the live
/// scope state.
pub struct VariantDependency<'a> {
    scope: Scope<'a>,
    logging: LevelFilter,
    depender: Option<VariantAddress>,
    dependees: BTreeMap<u32, VariantAddress>,
    logic: Option<LogicExpr>,
    locked: bool,
}

impl<'a> std::fmt::Debug for VariantDependency<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantDependency")
            .field("is_local", &self.scope.is_local())
            .field("logging", &self.logging)
            .field("depender", &self.depender)
            .field("dependees", &self.dependees)
            .field("logic", &self.logic)
            .field("locked", &self.locked)
            .finish()
    }
}

impl<'a> VariantDependency<'a> {
    pub fn new(scope: Scope<'a>) -> Self {
        Self {
            scope,
            logging: LevelFilter::Error,
            depender: None,
            dependees: BTreeMap::new(),
            logic: None,
            locked: false,
        }
    }

    pub fn scope(&self) -> Scope<'a> {
        self.scope
    }

    pub fn is_local(&self) -> bool {
        self.scope.is_local()
    }

    pub fn logging(&self) -> LevelFilter {
        self.logging
    }

    pub fn set_logging(&mut self, level: LevelFilter) {
        self.logging = level;
    }

    /// Bind the depender, validating it against the bound scope.
    pub fn bind_depender(&mut self, address: VariantAddress) -> Result<()> {
        self.ensure_unlocked()?;
        if !address.is_wellformed() {
            return Err(ModelError::InvalidAddress(address.to_string()));
        }
        self.scope.resolve(&address)?;
        if self.trace() {
            log::debug!("bound depender '{address}'");
        }
        self.depender = Some(address);
        Ok(())
    }

    /// Bind the depender from its textual form. `registry_scoped` selects
    /// the local address family, otherwise the global one.
    pub fn bind_depender_path(&mut self, path: &str, registry_scoped: bool) -> Result<()> {
        let mode = if registry_scoped {
            ParseMode::LocalOnly
        } else {
            ParseMode::GlobalOnly
        };
        let address = VariantAddress::parse(path, mode)
            .ok_or_else(|| ModelError::InvalidAddress(path.to_string()))?;
        self.bind_depender(address)
    }

    /// Bind a dependee to `slot`, validating it against the bound scope.
    pub fn bind_dependee(&mut self, slot: u32, address: VariantAddress) -> Result<()> {
        self.ensure_unlocked()?;
        if !address.is_wellformed() {
            return Err(ModelError::InvalidAddress(address.to_string()));
        }
        self.scope.resolve(&address)?;
        if self.trace() {
            log::debug!("bound dependee '{address}' at slot [#{slot}]");
        }
        self.dependees.insert(slot, address);
        Ok(())
    }

    pub fn bind_dependee_path(&mut self, slot: u32, path: &str) -> Result<()> {
        let address = VariantAddress::parse(path, ParseMode::Any)
            .ok_or_else(|| ModelError::InvalidAddress(path.to_string()))?;
        self.bind_dependee(slot, address)
    }

    /// Compile the logic from a formula, or install the default logic when
    /// no formula is given. Every slot the formula references must already
    /// be bound.
    pub fn compile(&mut self, expression: Option<&str>) -> Result<()> {
        self.ensure_unlocked()?;
        let logic = match expression {
            Some(text) => LogicExpr::parse(text)?,
            None => self.default_logic()?,
        };
        for slot in logic.slots() {
            if !self.dependees.contains_key(&slot) {
                return Err(ModelError::UnknownSlot(slot));
            }
        }
        self.logic = Some(logic);
        Ok(())
    }

    fn default_logic(&self) -> Result<LogicExpr> {
        LogicExpr::default_over(self.dependees.keys().copied()).ok_or(ModelError::NoDependees)
    }

    /// Validate and freeze. Locking twice is a no-op; a dependency that
    /// never compiled a formula gets the default logic here.
    pub fn lock(&mut self) -> Result<()> {
        if self.locked {
            return Ok(());
        }
        if self.depender.is_none() {
            return Err(ModelError::NoDepender);
        }
        if self.dependees.is_empty() {
            return Err(ModelError::NoDependees);
        }
        if self.logic.is_none() {
            if self.trace() {
                log::debug!("installing default logic over {} dependees", self.dependees.len());
            }
            self.logic = Some(self.default_logic()?);
        }
        self.locked = true;
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_valid(&self) -> bool {
        self.depender.is_some() && !self.dependees.is_empty() && self.logic.is_some()
    }

    /// Compute the depender's current enabled state from the live scope.
    ///
    /// Read-only; requires a locked dependency.
    pub fn evaluate(&self) -> Result<bool> {
        if !self.locked {
            return Err(ModelError::NotLocked);
        }
        match &self.logic {
            Some(logic) => {
                let enabled = logic.evaluate(self.scope, &self.dependees);
                if self.trace() {
                    if let Some(depender) = &self.depender {
                        log::debug!("dependency of '{depender}' evaluates to {enabled}");
                    }
                }
                Ok(enabled)
            }
            None => Err(ModelError::NotLocked),
        }
    }

    pub fn depender(&self) -> Option<&VariantAddress> {
        self.depender.as_ref()
    }

    pub fn dependee(&self, slot: u32) -> Result<&VariantAddress> {
        self.dependees.get(&slot).ok_or(ModelError::UnknownSlot(slot))
    }

    pub fn dependee_slots(&self) -> BTreeSet<u32> {
        self.dependees.keys().copied().collect()
    }

    pub fn has_dependee(&self, slot: u32) -> bool {
        self.dependees.contains_key(&slot)
    }

    pub fn has_dependee_path(&self, path: &str) -> bool {
        self.dependees.values().any(|address| address.matches_path(path))
    }

    pub fn number_of_dependees(&self) -> usize {
        self.dependees.len()
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(ModelError::Locked);
        }
        Ok(())
    }

    fn trace(&self) -> bool {
        self.logging >= LevelFilter::Debug
    }
}
