use crate::TypeTag;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when working with `AnyValue` and the storages built on it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnyError {
    /// The held value is not of the requested type, or two operands hold different types
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: TypeTag, found: TypeTag },
    /// A comparison was attempted with an empty operand
    #[error("Attempt to compare empty values")]
    EmptyCompare,
    /// No less/equal pair is registered for the held type
    #[error("Comparison not implemented for type {0}")]
    ComparatorNotImplemented(TypeTag),
    /// The key cannot be ordered against other keys (it differs from itself)
    #[error("Invalid key of type {0}: it does not compare equal to itself")]
    InvalidKey(TypeTag),
    /// The requested key was not found
    #[error("Key not found: {0}")]
    KeyNotFound(String),
    /// Failed to acquire an internal lock
    #[error("Failed to acquire lock")]
    LockError,
    /// No value became ready within the allotted time
    #[error("Timed out after {0:?} waiting for data")]
    Timeout(Duration),
}

/// Result alias used throughout the crate
pub type AnyResult<T> = Result<T, AnyError>;

impl AnyError {
    pub(crate) fn mismatch(expected: TypeTag, found: TypeTag) -> Self {
        AnyError::TypeMismatch { expected, found }
    }
}
