//! Items and their Powers
//!
//! An [`Item`] exclusively owns its powers. Powers refer to each other only by
//! identifier: a power's `selectors` set names sibling selector powers on the
//! same item, resolved at query time.
//!
//! Concrete power behaviors implement [`PowerModule`]; the object-safe
//! [`Power`] trait is derived for them so an item can hold mixed types.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use crate::codec::{self, CodecContext, SetOutcome};
use crate::constants::DEFAULT_NAMESPACE;
use crate::document::{ConfigNode, ConfigSection, ConfigValue};
use crate::error::{PowerError, SchemaError};
use crate::logging::TimingSpan;
use crate::resource::ResourceKey;
use crate::schema::{describe, AttributeDescriptor};
use crate::targeting::Selector;
use crate::trigger::TriggerTag;

/// Document key naming the power type of a saved power section
pub const POWER_NAME_KEY: &str = "powerName";

/// Attributes every power carries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerBase {
    pub triggers: BTreeSet<TriggerTag>,
    pub selectors: BTreeSet<String>,
    pub conditions: BTreeSet<String>,
}

/// A power type with a declared attribute table
pub trait PowerModule: Default + Send + Sync + 'static {
    const NAME: &'static str;
    const NAMESPACE: &'static str = DEFAULT_NAMESPACE;

    fn base(&self) -> &PowerBase;
    fn base_mut(&mut self) -> &mut PowerBase;

    /// Module-specific attributes, declared after the base ones
    fn attributes() -> Vec<AttributeDescriptor<Self>>;

    /// Selector powers expose their filter here
    fn as_selector(&self) -> Option<&dyn Selector> {
        None
    }

    fn resource_key() -> ResourceKey {
        ResourceKey::new(Self::NAMESPACE, Self::NAME)
    }
}

/// Object-safe view of a power held by an item
pub trait Power: Send + Sync {
    fn name(&self) -> &'static str;
    fn key(&self) -> ResourceKey;
    fn base(&self) -> &PowerBase;
    fn as_selector(&self) -> Option<&dyn Selector>;
    fn save(&self) -> Result<ConfigSection, PowerError>;
    fn get_attribute(&self, name: &str) -> Result<Option<String>, PowerError>;
    fn set_attribute(
        &mut self,
        name: &str,
        raw: &str,
        ctx: &CodecContext<'_>,
    ) -> Result<SetOutcome, PowerError>;
    fn as_any(&self) -> &dyn Any;
}

impl<M: PowerModule> Power for M {
    fn name(&self) -> &'static str {
        M::NAME
    }

    fn key(&self) -> ResourceKey {
        M::resource_key()
    }

    fn base(&self) -> &PowerBase {
        PowerModule::base(self)
    }

    fn as_selector(&self) -> Option<&dyn Selector> {
        PowerModule::as_selector(self)
    }

    fn save(&self) -> Result<ConfigSection, PowerError> {
        codec::save(self)
    }

    fn get_attribute(&self, name: &str) -> Result<Option<String>, PowerError> {
        codec::get_attribute(self, name)
    }

    fn set_attribute(
        &mut self,
        name: &str,
        raw: &str,
        ctx: &CodecContext<'_>,
    ) -> Result<SetOutcome, PowerError> {
        codec::set_attribute(self, name, raw, ctx)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type PowerLoader = fn(&ConfigSection, &CodecContext<'_>) -> Result<Box<dyn Power>, PowerError>;

fn load_boxed<M: PowerModule>(
    section: &ConfigSection,
    ctx: &CodecContext<'_>,
) -> Result<Box<dyn Power>, PowerError> {
    Ok(Box::new(codec::load::<M>(section, ctx)?))
}

/// Power types an item document may reference, by `namespace:name`
#[derive(Default)]
pub struct PowerRegistry {
    loaders: HashMap<String, PowerLoader>,
}

impl PowerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `M`, building its schema now so declaration errors surface at startup
    pub fn register<M: PowerModule>(&mut self) -> Result<&mut Self, SchemaError> {
        describe::<M>()?;
        self.loaders.insert(M::resource_key().to_string(), load_boxed::<M>);
        info!(power = %M::resource_key(), "power type registered");
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.loaders.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Load one power section; the type comes from its `powerName` entry
    pub fn load(
        &self,
        section: &ConfigSection,
        ctx: &CodecContext<'_>,
    ) -> Result<Box<dyn Power>, PowerError> {
        let name = section.get_string(POWER_NAME_KEY).unwrap_or_default();
        let key = ResourceKey::parse(&name, ctx.default_namespace).to_string();
        let loader = self
            .loaders
            .get(&key)
            .ok_or(SchemaError::UnknownModule { name })?;
        loader(section, ctx)
    }
}

/// Item owning an ordered list of powers
pub struct Item {
    uid: i64,
    name: String,
    powers: Vec<Box<dyn Power>>,
}

impl Item {
    pub fn new(uid: i64, name: impl Into<String>) -> Self {
        Self {
            uid,
            name: name.into(),
            powers: Vec::new(),
        }
    }

    pub fn uid(&self) -> i64 {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a power; returns its index
    pub fn add_power(&mut self, power: impl Power + 'static) -> usize {
        self.powers.push(Box::new(power));
        self.powers.len() - 1
    }

    pub fn remove_power(&mut self, index: usize) -> Option<Box<dyn Power>> {
        (index < self.powers.len()).then(|| self.powers.remove(index))
    }

    pub fn powers(&self) -> impl Iterator<Item = &dyn Power> {
        self.powers.iter().map(|p| p.as_ref())
    }

    pub fn power(&self, index: usize) -> Option<&dyn Power> {
        self.powers.get(index).map(|p| p.as_ref())
    }

    pub fn power_mut(&mut self, index: usize) -> Option<&mut (dyn Power + 'static)> {
        self.powers.get_mut(index).map(|p| p.as_mut())
    }

    /// Typed access to the first power of type `M`
    pub fn find<M: PowerModule>(&self) -> Option<&M> {
        self.powers().find_map(|p| p.as_any().downcast_ref::<M>())
    }

    /// Sibling selectors named by `power`'s `selectors` set, in item order
    pub fn selectors_for<'a>(
        &'a self,
        power: &'a dyn Power,
    ) -> impl Iterator<Item = &'a dyn Selector> + 'a {
        self.powers
            .iter()
            .filter_map(|p| p.as_selector())
            .filter(move |s| power.base().selectors.contains(s.id()))
    }

    /// Item document: `uid`, `name` and a `powers` section keyed by index
    pub fn save(&self) -> Result<ConfigSection, PowerError> {
        let mut section = ConfigSection::new();
        section.set("uid", self.uid);
        section.set("name", self.name.as_str());
        let powers = section.create_section("powers");
        for (idx, power) in self.powers.iter().enumerate() {
            let mut saved = ConfigSection::new();
            saved.set(POWER_NAME_KEY, power.key().to_string());
            let attributes = power.save()?;
            for key in attributes.keys() {
                if let Some(node) = attributes.get_node(key) {
                    saved.set_node(key, node.clone());
                }
            }
            powers.set_node(&idx.to_string(), ConfigNode::Section(saved));
        }
        Ok(section)
    }

    pub fn load(
        section: &ConfigSection,
        registry: &PowerRegistry,
        ctx: &CodecContext<'_>,
    ) -> Result<Self, PowerError> {
        let _span = TimingSpan::new("item_load");
        let uid = match section.get("uid") {
            Some(ConfigValue::Int(uid)) => *uid,
            _ => 0,
        };
        let name = section.get_string("name").unwrap_or_default();
        let mut item = Item::new(uid, name);
        if let Some(powers) = section.section("powers") {
            for key in powers.keys() {
                if let Some(saved) = powers.section(key) {
                    item.powers.push(registry.load(saved, ctx)?);
                }
            }
        }
        debug!(uid = item.uid, powers = item.powers.len(), "item loaded");
        Ok(item)
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field(
                "powers",
                &self.powers.iter().map(|p| p.key().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
