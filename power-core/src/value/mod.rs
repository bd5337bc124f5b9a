//! Attribute Value Model
//!
//! Closed set of attribute kinds a power may declare and the values they hold:
//! - Scalars: int32, int64, float32, float64, bool, string, enum,
//!   opaque resource key, trigger tag
//! - Ordered lists and unordered sets of one scalar kind
//!
//! Rust field types map onto kinds through [`ScalarType`] / [`AttributeType`],
//! so a descriptor infers its kind from the field it is bound to.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::document::ConfigValue;
use crate::resource::{ResourceCategory, ResourceKey};
use crate::trigger::TriggerTag;

/// Kind of a single scalar element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
    /// Canonical member names, matched case-sensitively
    Enum(&'static [&'static str]),
    Resource(ResourceCategory),
    Trigger,
}

/// Declared kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Scalar(ScalarKind),
    List(ScalarKind),
    Set(ScalarKind),
}

impl AttributeKind {
    pub fn element(&self) -> ScalarKind {
        match self {
            AttributeKind::Scalar(k) | AttributeKind::List(k) | AttributeKind::Set(k) => *k,
        }
    }

    pub fn is_collection(&self) -> bool {
        !matches!(self, AttributeKind::Scalar(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
    Enum(&'static str),
    Resource(ResourceKey),
    Trigger(TriggerTag),
}

impl ScalarValue {
    /// Encode as a document leaf. Numbers and bools stay typed, everything
    /// else is written as its canonical text.
    pub fn to_config_value(&self) -> ConfigValue {
        match self {
            ScalarValue::Int32(v) => ConfigValue::Int(i64::from(*v)),
            ScalarValue::Int64(v) => ConfigValue::Int(*v),
            // through text so 0.1f32 is written as 0.1 rather than its widened form
            ScalarValue::Float32(v) => {
                ConfigValue::Float(v.to_string().parse().unwrap_or(f64::from(*v)))
            }
            ScalarValue::Float64(v) => ConfigValue::Float(*v),
            ScalarValue::Bool(v) => ConfigValue::Bool(*v),
            other => ConfigValue::String(other.to_string()),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float32(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::String(v) => f.write_str(v),
            ScalarValue::Enum(v) => f.write_str(v),
            ScalarValue::Resource(v) => write!(f, "{v}"),
            ScalarValue::Trigger(v) => write!(f, "{v}"),
        }
    }
}

/// Value held by an attribute.
///
/// `Set` is always canonical: deduplicated and sorted by element text, so
/// structural equality is set equality and the encoded form is stable.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(ScalarValue),
    List(Vec<ScalarValue>),
    Set(Vec<ScalarValue>),
}

impl AttributeValue {
    /// Build a canonical set value
    pub fn set(items: impl IntoIterator<Item = ScalarValue>) -> Self {
        let mut keyed: Vec<(String, ScalarValue)> =
            items.into_iter().map(|v| (v.to_string(), v)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        AttributeValue::Set(keyed.into_iter().map(|(_, v)| v).collect())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeValue::Scalar(_) => "scalar",
            AttributeValue::List(_) => "list",
            AttributeValue::Set(_) => "set",
        }
    }

    /// Elements joined by the list separator (scalars render as themselves)
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::Scalar(v) => v.to_string(),
            AttributeValue::List(items) | AttributeValue::Set(items) => items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(&crate::constants::LIST_SEPARATOR.to_string()),
        }
    }
}

/// Rust type usable as a scalar attribute element
pub trait ScalarType: Sized {
    fn scalar_kind() -> ScalarKind;
    fn to_scalar(&self) -> ScalarValue;
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

/// Rust type usable as an attribute field.
///
/// `to_attribute` returns `None` for unset values and empty collections, which
/// are omitted from saved documents. `from_attribute(None)` yields the type's
/// unset state; `None` from it means the value has the wrong kind.
pub trait AttributeType: Sized {
    fn kind() -> AttributeKind;
    fn to_attribute(&self) -> Option<AttributeValue>;
    fn from_attribute(value: Option<AttributeValue>) -> Option<Self>;
}

macro_rules! scalar_type {
    ($ty:ty, $kind:expr, $variant:ident) => {
        impl ScalarType for $ty {
            fn scalar_kind() -> ScalarKind {
                $kind
            }

            fn to_scalar(&self) -> ScalarValue {
                ScalarValue::$variant(self.clone())
            }

            fn from_scalar(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

scalar_type!(i32, ScalarKind::Int32, Int32);
scalar_type!(i64, ScalarKind::Int64, Int64);
scalar_type!(f32, ScalarKind::Float32, Float32);
scalar_type!(f64, ScalarKind::Float64, Float64);
scalar_type!(bool, ScalarKind::Bool, Bool);
scalar_type!(String, ScalarKind::String, String);
scalar_type!(TriggerTag, ScalarKind::Trigger, Trigger);

/// Resource keys default to the item category; enchantment-like fields
/// override the kind on their descriptor.
impl ScalarType for ResourceKey {
    fn scalar_kind() -> ScalarKind {
        ScalarKind::Resource(ResourceCategory::Item)
    }

    fn to_scalar(&self) -> ScalarValue {
        ScalarValue::Resource(self.clone())
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Resource(v) => Some(v),
            _ => None,
        }
    }
}

/// Implements [`AttributeType`] for a scalar type with a `Default` unset state
#[doc(hidden)]
#[macro_export]
macro_rules! scalar_attribute {
    ($ty:ty) => {
        impl $crate::value::AttributeType for $ty {
            fn kind() -> $crate::value::AttributeKind {
                $crate::value::AttributeKind::Scalar(
                    <$ty as $crate::value::ScalarType>::scalar_kind(),
                )
            }

            fn to_attribute(&self) -> Option<$crate::value::AttributeValue> {
                Some($crate::value::AttributeValue::Scalar(
                    $crate::value::ScalarType::to_scalar(self),
                ))
            }

            fn from_attribute(value: Option<$crate::value::AttributeValue>) -> Option<Self> {
                match value {
                    None => Some(<$ty as Default>::default()),
                    Some($crate::value::AttributeValue::Scalar(v)) => {
                        <$ty as $crate::value::ScalarType>::from_scalar(v)
                    }
                    Some(_) => None,
                }
            }
        }
    };
}

scalar_attribute!(i32);
scalar_attribute!(i64);
scalar_attribute!(f32);
scalar_attribute!(f64);
scalar_attribute!(bool);
scalar_attribute!(String);

impl<T: ScalarType> AttributeType for Option<T> {
    fn kind() -> AttributeKind {
        AttributeKind::Scalar(T::scalar_kind())
    }

    fn to_attribute(&self) -> Option<AttributeValue> {
        self.as_ref().map(|v| AttributeValue::Scalar(v.to_scalar()))
    }

    fn from_attribute(value: Option<AttributeValue>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(AttributeValue::Scalar(v)) => T::from_scalar(v).map(Some),
            Some(_) => None,
        }
    }
}

impl<T: ScalarType> AttributeType for Vec<T> {
    fn kind() -> AttributeKind {
        AttributeKind::List(T::scalar_kind())
    }

    fn to_attribute(&self) -> Option<AttributeValue> {
        if self.is_empty() {
            return None;
        }
        Some(AttributeValue::List(
            self.iter().map(ScalarType::to_scalar).collect(),
        ))
    }

    fn from_attribute(value: Option<AttributeValue>) -> Option<Self> {
        match value {
            None => Some(Vec::new()),
            Some(AttributeValue::List(items)) => items.into_iter().map(T::from_scalar).collect(),
            Some(_) => None,
        }
    }
}

impl<T: ScalarType + Ord> AttributeType for BTreeSet<T> {
    fn kind() -> AttributeKind {
        AttributeKind::Set(T::scalar_kind())
    }

    fn to_attribute(&self) -> Option<AttributeValue> {
        if self.is_empty() {
            return None;
        }
        Some(AttributeValue::set(self.iter().map(ScalarType::to_scalar)))
    }

    fn from_attribute(value: Option<AttributeValue>) -> Option<Self> {
        match value {
            None => Some(BTreeSet::new()),
            Some(AttributeValue::Set(items)) => items.into_iter().map(T::from_scalar).collect(),
            Some(_) => None,
        }
    }
}

impl<T: ScalarType + Eq + Hash> AttributeType for HashSet<T> {
    fn kind() -> AttributeKind {
        AttributeKind::Set(T::scalar_kind())
    }

    fn to_attribute(&self) -> Option<AttributeValue> {
        if self.is_empty() {
            return None;
        }
        Some(AttributeValue::set(self.iter().map(ScalarType::to_scalar)))
    }

    fn from_attribute(value: Option<AttributeValue>) -> Option<Self> {
        match value {
            None => Some(HashSet::new()),
            Some(AttributeValue::Set(items)) => items.into_iter().map(T::from_scalar).collect(),
            Some(_) => None,
        }
    }
}

/// Declare a fieldless enum usable as an attribute.
///
/// Member names are the variant identifiers; the first variant is the
/// default.
///
/// ```
/// power_core::attribute_enum! {
///     pub enum FiringMode { Beam, Cone, Burst }
/// }
/// assert_eq!(FiringMode::from_name("Cone"), Some(FiringMode::Cone));
/// assert_eq!(FiringMode::default(), FiringMode::Beam);
/// ```
#[macro_export]
macro_rules! attribute_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $first:ident $(, $rest:ident)* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $first,
            $($rest),*
        }

        impl $name {
            pub const MEMBERS: &'static [&'static str] =
                &[stringify!($first) $(, stringify!($rest))*];

            pub fn name(&self) -> &'static str {
                match self {
                    Self::$first => stringify!($first),
                    $(Self::$rest => stringify!($rest),)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    stringify!($first) => Some(Self::$first),
                    $(stringify!($rest) => Some(Self::$rest),)*
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$first
            }
        }

        impl $crate::value::ScalarType for $name {
            fn scalar_kind() -> $crate::value::ScalarKind {
                $crate::value::ScalarKind::Enum(Self::MEMBERS)
            }

            fn to_scalar(&self) -> $crate::value::ScalarValue {
                $crate::value::ScalarValue::Enum(self.name())
            }

            fn from_scalar(value: $crate::value::ScalarValue) -> Option<Self> {
                match value {
                    $crate::value::ScalarValue::Enum(name) => Self::from_name(name),
                    _ => None,
                }
            }
        }

        $crate::scalar_attribute!($name);
    };
}
