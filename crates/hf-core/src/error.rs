use std::fmt;

use crate::diagnostics::{Category, Severity};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// NaN/Inf components, empty or oversized tags, invalid configuration.
    InvalidInput(String),
    /// A bounded structure is full. The operation was a no-op.
    CapacityExceeded {
        structure: &'static str,
        capacity: usize,
    },
    /// Fewer than two literals, so no anchor record exists.
    InsufficientData { literals: usize },
    /// A computation produced NaN/Inf.
    NumericalInstability(String),
    /// A cascade found a handle that was already released.
    DoubleReleaseAttempt(String),
    /// Backing storage could not be created.
    AllocationFailure(String),
}

impl FieldError {
    pub fn category(&self) -> Category {
        match self {
            FieldError::InvalidInput(_) => Category::User,
            FieldError::CapacityExceeded { .. } => Category::Memory,
            FieldError::InsufficientData { .. } => Category::Logic,
            FieldError::NumericalInstability(_) => Category::Math,
            FieldError::DoubleReleaseAttempt(_) => Category::Memory,
            FieldError::AllocationFailure(_) => Category::Memory,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FieldError::AllocationFailure(_) => Severity::Fatal,
            FieldError::DoubleReleaseAttempt(_) | FieldError::NumericalInstability(_) => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }

    /// Only allocation failures leave a structure unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FieldError::AllocationFailure(_))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            FieldError::CapacityExceeded {
                structure,
                capacity,
            } => write!(f, "{structure} full (capacity {capacity})"),
            FieldError::InsufficientData { literals } => {
                write!(f, "insufficient data: {literals} literal(s), need at least 2")
            }
            FieldError::NumericalInstability(msg) => write!(f, "numerical instability: {msg}"),
            FieldError::DoubleReleaseAttempt(msg) => write!(f, "double release attempt: {msg}"),
            FieldError::AllocationFailure(msg) => write!(f, "allocation failure: {msg}"),
        }
    }
}

impl std::error::Error for FieldError {}

pub type Result<T> = std::result::Result<T, FieldError>;
