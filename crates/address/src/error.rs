use thiserror::Error;

pub type Result<T> = std::result::Result<T, AddressError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Not a variant path: '{0}'")]
    NotAVariant(String),

    #[error("Not a parameter path: '{0}'")]
    NotAParameter(String),

    #[error("Not a parameter value group: '{0}'")]
    NotAValueGroup(String),

    #[error("Not an enumerated string value: '{0}'")]
    NotAnEnumValue(String),

    #[error("Unparseable object address: '{0}'")]
    Unparseable(String),
}
