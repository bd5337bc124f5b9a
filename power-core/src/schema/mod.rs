//! Attribute Schema
//!
//! Each power module type declares its attributes once as a list of
//! [`AttributeDescriptor`]s with typed getters and setters. [`describe`]
//! builds the ordered [`Schema`] on first use and caches it per type, so every
//! later call returns the same table and saves stay byte-stable.
//!
//! Every module carries the base attributes `triggers`, `selectors` and
//! `conditions` ahead of its own.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::cache::accepted_values_cache;
use crate::document::ConfigValue;
use crate::error::SchemaError;
use crate::item::PowerModule;
use crate::trigger::{TriggerRegistry, TriggerTag};
use crate::value::{AttributeKind, AttributeType, AttributeValue};

/// Reads the attribute's current value; `None` means unset
pub type Getter<M> = fn(&M) -> Option<AttributeValue>;

/// Stores a value (or the unset state); returns false on a kind mismatch
pub type Setter<M> = fn(&mut M, Option<AttributeValue>) -> bool;

/// Custom document encoding; `None` omits the attribute
pub type Encoder<M> = fn(&M) -> Option<ConfigValue>;

/// Custom text decoding. `Ok(None)` leaves the attribute unchanged,
/// `Err(message)` is reported as an invalid value.
pub type Decoder<M> = fn(&M, &str) -> Result<Option<AttributeValue>, String>;

/// Source of an allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedValues {
    Fixed(&'static [&'static str]),
    /// Comma separated list, parsed once through the shared memo cache
    Listed(&'static str),
    /// Every trigger the host registry knows
    Triggers,
}

impl AcceptedValues {
    pub fn resolve(&self, triggers: &TriggerRegistry) -> Arc<Vec<String>> {
        match self {
            AcceptedValues::Fixed(values) => Arc::new(values.iter().map(|s| s.to_string()).collect()),
            AcceptedValues::Listed(list) => accepted_values_cache().get(list),
            AcceptedValues::Triggers => Arc::new(triggers.names()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Accepted(AcceptedValues),
    /// Two case-insensitive tokens standing in for true / false
    BooleanChoice {
        true_token: &'static str,
        false_token: &'static str,
    },
}

pub struct AttributeDescriptor<M> {
    name: &'static str,
    kind: AttributeKind,
    order: Option<i32>,
    validator: Option<Validator>,
    encoder: Option<Encoder<M>>,
    decoder: Option<Decoder<M>>,
    getter: Getter<M>,
    setter: Setter<M>,
}

impl<M> AttributeDescriptor<M> {
    pub fn new(name: &'static str, kind: AttributeKind, getter: Getter<M>, setter: Setter<M>) -> Self {
        Self {
            name,
            kind,
            order: None,
            validator: None,
            encoder: None,
            decoder: None,
            getter,
            setter,
        }
    }

    /// Explicit ordering key. Unkeyed attributes follow every keyed one, in
    /// declaration order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Override the inferred kind (e.g. a resource key field holding enchantments)
    pub fn with_kind(mut self, kind: AttributeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn accepted(mut self, values: &'static [&'static str]) -> Self {
        self.validator = Some(Validator::Accepted(AcceptedValues::Fixed(values)));
        self
    }

    pub fn accepted_list(mut self, list: &'static str) -> Self {
        self.validator = Some(Validator::Accepted(AcceptedValues::Listed(list)));
        self
    }

    pub fn accepted_triggers(mut self) -> Self {
        self.validator = Some(Validator::Accepted(AcceptedValues::Triggers));
        self
    }

    pub fn boolean_choice(mut self, true_token: &'static str, false_token: &'static str) -> Self {
        self.validator = Some(Validator::BooleanChoice {
            true_token,
            false_token,
        });
        self
    }

    pub fn encode_with(mut self, encoder: Encoder<M>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn decode_with(mut self, decoder: Decoder<M>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Declared ordering key, if any (resolved keys live on the [`Schema`])
    pub fn declared_order(&self) -> Option<i32> {
        self.order
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn accepted_values(&self) -> Option<AcceptedValues> {
        match self.validator {
            Some(Validator::Accepted(values)) => Some(values),
            _ => None,
        }
    }

    pub fn boolean_tokens(&self) -> Option<(&'static str, &'static str)> {
        match self.validator {
            Some(Validator::BooleanChoice {
                true_token,
                false_token,
            }) => Some((true_token, false_token)),
            _ => None,
        }
    }

    pub fn encoder(&self) -> Option<Encoder<M>> {
        self.encoder
    }

    pub fn decoder(&self) -> Option<Decoder<M>> {
        self.decoder
    }

    pub fn read(&self, instance: &M) -> Option<AttributeValue> {
        (self.getter)(instance)
    }

    pub fn write(&self, instance: &mut M, value: Option<AttributeValue>) -> Result<(), SchemaError> {
        let found = value.as_ref().map_or("unset", AttributeValue::kind_name);
        if (self.setter)(instance, value) {
            Ok(())
        } else {
            Err(SchemaError::KindMismatch {
                attribute: self.name,
                expected: self.kind,
                found,
            })
        }
    }
}

impl<M> fmt::Debug for AttributeDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("order", &self.order)
            .field("validator", &self.validator)
            .field("custom_encoder", &self.encoder.is_some())
            .field("custom_decoder", &self.decoder.is_some())
            .finish()
    }
}

/// Keys below every module-declared key; the base attributes save first
pub const BASE_ORDER: i32 = i32::MIN;

/// Ordered attribute table of one module type
pub struct Schema<M> {
    module: &'static str,
    attributes: Vec<(Option<i32>, AttributeDescriptor<M>)>,
}

impl<M> Schema<M> {
    /// Sort keyed attributes by key, then unkeyed ones by position. Fails on a
    /// repeated name or a repeated explicit key.
    pub fn build(
        module: &'static str,
        declared: Vec<AttributeDescriptor<M>>,
    ) -> Result<Self, SchemaError> {
        let mut names = HashSet::new();
        for d in &declared {
            if !names.insert(d.name) {
                return Err(SchemaError::DuplicateName {
                    module,
                    name: d.name,
                });
            }
        }

        let mut attributes: Vec<(Option<i32>, AttributeDescriptor<M>)> =
            declared.into_iter().map(|d| (d.order, d)).collect();
        // stable, so unkeyed attributes keep their declaration order
        attributes.sort_by_key(|(order, _)| (order.is_none(), *order));

        for pair in attributes.windows(2) {
            if let (Some(first), Some(second)) = (pair[0].0, pair[1].0) {
                if first == second {
                    return Err(SchemaError::DuplicateOrder {
                        module,
                        order: first,
                        first: pair[0].1.name,
                        second: pair[1].1.name,
                    });
                }
            }
        }

        Ok(Self { module, attributes })
    }

    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Descriptors in save order
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDescriptor<M>> {
        self.attributes.iter().map(|(_, d)| d)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDescriptor<M>> {
        self.attributes().find(|d| d.name == name)
    }

    /// Explicit key of `name`; `None` when missing or unkeyed
    pub fn order_of(&self, name: &str) -> Option<i32> {
        self.attributes
            .iter()
            .find(|(_, d)| d.name == name)
            .and_then(|(order, _)| *order)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.attributes().map(|d| d.name).collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<M> fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("module", &self.module)
            .field("attributes", &self.names())
            .finish()
    }
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

fn schema_cache() -> &'static SchemaCache {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Ordered schema of `M`, built on first call and cached for the process
pub fn describe<M: PowerModule>() -> Result<Arc<Schema<M>>, SchemaError> {
    let id = TypeId::of::<M>();
    if let Some(cached) = schema_cache().read().get(&id).cloned() {
        if let Ok(schema) = cached.downcast::<Schema<M>>() {
            return Ok(schema);
        }
    }

    let mut declared = base_attributes::<M>();
    declared.extend(M::attributes());
    let schema = Arc::new(Schema::build(M::NAME, declared)?);
    debug!(module = M::NAME, attributes = schema.len(), "power schema built");

    let stored = schema_cache()
        .write()
        .entry(id)
        .or_insert_with(|| schema.clone() as Arc<dyn Any + Send + Sync>)
        .clone();
    // a racing builder may have won; hand out its table so all callers agree
    Ok(stored.downcast::<Schema<M>>().unwrap_or(schema))
}

/// Field types inferred from an accessor closure; used by [`attribute!`](crate::attribute)
pub fn kind_of<M, T: AttributeType, F: Fn(&M) -> &T>(_field: F) -> AttributeKind {
    T::kind()
}

/// `triggers`, `selectors` and `conditions`, declared by every module
pub fn base_attributes<M: PowerModule>() -> Vec<AttributeDescriptor<M>> {
    vec![
        AttributeDescriptor::new(
            "triggers",
            <BTreeSet<TriggerTag> as AttributeType>::kind(),
            |m: &M| m.base().triggers.to_attribute(),
            |m: &mut M, v| match AttributeType::from_attribute(v) {
                Some(value) => {
                    m.base_mut().triggers = value;
                    true
                }
                None => false,
            },
        )
        .with_order(BASE_ORDER),
        AttributeDescriptor::new(
            "selectors",
            <BTreeSet<String> as AttributeType>::kind(),
            |m: &M| m.base().selectors.to_attribute(),
            |m: &mut M, v| match AttributeType::from_attribute(v) {
                Some(value) => {
                    m.base_mut().selectors = value;
                    true
                }
                None => false,
            },
        )
        .with_order(BASE_ORDER + 1),
        AttributeDescriptor::new(
            "conditions",
            <BTreeSet<String> as AttributeType>::kind(),
            |m: &M| m.base().conditions.to_attribute(),
            |m: &mut M, v| match AttributeType::from_attribute(v) {
                Some(value) => {
                    m.base_mut().conditions = value;
                    true
                }
                None => false,
            },
        )
        .with_order(BASE_ORDER + 2),
    ]
}

/// Declare an attribute bound to a struct field.
///
/// The kind is inferred from the field type; chain builder calls on the
/// result for ordering, validation or custom codecs.
///
/// ```ignore
/// attribute!(Beam, damage).with_order(10)
/// ```
#[macro_export]
macro_rules! attribute {
    ($module:ty, $field:ident) => {
        $crate::schema::AttributeDescriptor::<$module>::new(
            stringify!($field),
            $crate::schema::kind_of(|m: &$module| &m.$field),
            |m: &$module| $crate::value::AttributeType::to_attribute(&m.$field),
            |m: &mut $module, v: Option<$crate::value::AttributeValue>| {
                match $crate::value::AttributeType::from_attribute(v) {
                    Some(value) => {
                        m.$field = value;
                        true
                    }
                    None => false,
                }
            },
        )
    };
}
