//! Error taxonomy for the power core.
//!
//! `SchemaError` is a programmer error surfaced when a module type's schema is
//! built. Every other `PowerError` variant is a recoverable user-input error
//! raised at the text coercion boundary; the attribute under edit is left
//! unchanged when one is returned.

use std::fmt;

use crate::value::AttributeKind;

/// Numeric kind named in [`PowerError::InvalidNumber`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl NumberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Int32 => "int32",
            NumberKind::Int64 => "int64",
            NumberKind::Float32 => "float32",
            NumberKind::Float64 => "float64",
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("module {module} declares attribute '{name}' more than once")]
    DuplicateName { module: &'static str, name: &'static str },
    #[error("module {module} attributes '{first}' and '{second}' share order key {order}")]
    DuplicateOrder {
        module: &'static str,
        order: i32,
        first: &'static str,
        second: &'static str,
    },
    #[error("module {module} has no attribute '{name}'")]
    UnknownAttribute { module: &'static str, name: String },
    #[error("no power type registered as '{name}'")]
    UnknownModule { name: String },
    #[error("attribute '{attribute}' cannot store a {found} value, expected {expected:?}")]
    KindMismatch {
        attribute: &'static str,
        expected: AttributeKind,
        found: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PowerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("'{value}' is not a valid option for {attribute}, accepted: {}", .allowed.join(", "))]
    InvalidOption {
        attribute: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error("'{value}' is not a valid {kind} for {attribute}")]
    InvalidNumber {
        attribute: String,
        kind: NumberKind,
        value: String,
    },
    #[error("'{value}' is not a member of {attribute}, accepted: {}", .allowed.join(", "))]
    InvalidEnum {
        attribute: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error("cannot resolve '{value}' for {attribute}")]
    UnresolvedResource { attribute: String, value: String },
    #[error("{attribute} requires an item in hand")]
    NoItemInHand { attribute: String },
    #[error("invalid value for {attribute}: {message}")]
    InvalidValue { attribute: String, message: String },
}

impl PowerError {
    /// True for user-input errors that leave the instance untouched and can be
    /// reported back to the sender
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PowerError::Schema(_))
    }

    /// Name of the attribute the error refers to, if any
    pub fn attribute(&self) -> Option<&str> {
        match self {
            PowerError::Schema(SchemaError::KindMismatch { attribute, .. }) => Some(*attribute),
            PowerError::Schema(_) => None,
            PowerError::InvalidOption { attribute, .. }
            | PowerError::InvalidNumber { attribute, .. }
            | PowerError::InvalidEnum { attribute, .. }
            | PowerError::UnresolvedResource { attribute, .. }
            | PowerError::NoItemInHand { attribute }
            | PowerError::InvalidValue { attribute, .. } => Some(attribute.as_str()),
        }
    }
}
