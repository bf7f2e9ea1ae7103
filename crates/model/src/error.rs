use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model is already initialized")]
    AlreadyInitialized,

    #[error("Model is not initialized")]
    NotInitialized,

    #[error("Missing '{0}' property")]
    MissingKey(String),

    #[error("Empty dependency name")]
    EmptyName,

    #[error("Empty depender path")]
    EmptyDepender,

    #[error("Empty set of input slots")]
    NoInputSlots,

    #[error("Slot [#{slot}] is already bound to '{bound}'")]
    SlotOccupied { slot: u32, bound: String },

    #[error("A slot with dependee '{0}' already exists")]
    DuplicateDependee(String),

    #[error("A dependency record named '{0}' already exists")]
    DuplicateRecord(String),

    #[error("A dependency associated to depender '{0}' already exists")]
    DuplicateDepender(String),

    #[error("Ill-formed object address '{0}'")]
    InvalidAddress(String),

    #[error("Address '{address}' is not {expected} in this scope")]
    ScopeMismatch {
        address: String,
        expected: &'static str,
    },

    #[error("Cannot resolve '{address}': {reason}")]
    Unresolvable { address: String, reason: String },

    #[error("No dependee slot [#{0}]")]
    UnknownSlotRecord(u32),

    #[error("No dependee at slot [#{0}]")]
    UnknownSlot(u32),

    #[error("No dependency associated to path '{0}'")]
    UnknownDependency(String),

    #[error("Invalid dependency logic formula: {0}")]
    Formula(String),

    #[error("Dependency is locked")]
    Locked,

    #[error("Dependency is not locked")]
    NotLocked,

    #[error("Dependency has no depender")]
    NoDepender,

    #[error("Dependency has no dependees")]
    NoDependees,
}

impl ModelError {
    /// Errors caused by referencing objects that do not exist, as opposed
    /// to violating the API contract.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::Unresolvable { .. } | Self::UnknownSlot(_) | Self::UnknownDependency(_)
        )
    }

    pub fn is_logic(&self) -> bool {
        !self.is_domain()
    }
}
