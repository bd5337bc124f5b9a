//! Configuration Document
//!
//! Tree of named sections whose leaves hold a signed 64-bit integer, a
//! double, a boolean or a UTF-8 string. Structured attribute values (enums,
//! collections, resources) are written as strings by the codec.
//!
//! Sections keep insertion order so a saved power serializes byte-identically
//! every time.

use serde::de::{MapAccess, Visitor};
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Leaf value of a document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    /// Text form, as a key/value store's string getter renders any leaf
    pub fn as_text(&self) -> String {
        match self {
            ConfigValue::Bool(v) => v.to_string(),
            ConfigValue::Int(v) => v.to_string(),
            ConfigValue::Float(v) => v.to_string(),
            ConfigValue::String(v) => v.clone(),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Bool(v) => serializer.serialize_bool(*v),
            ConfigValue::Int(v) => serializer.serialize_i64(*v),
            // JSON has no spelling for these and would write `null`
            ConfigValue::Float(v) if !v.is_finite() => {
                Err(S::Error::custom(format!("cannot write non-finite number {v}")))
            }
            ConfigValue::Float(v) => serializer.serialize_f64(*v),
            ConfigValue::String(v) => serializer.serialize_str(v),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Int(i64::from(v))
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

/// Either a leaf or a nested section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigNode {
    Value(ConfigValue),
    Section(ConfigSection),
}

/// Ordered section of named nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    entries: Vec<(String, ConfigNode)>,
}

impl ConfigSection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a leaf, replacing any existing node with the same name in place
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.set_node(key, ConfigNode::Value(value.into()));
    }

    pub fn set_node(&mut self, key: &str, node: ConfigNode) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = node,
            None => self.entries.push((key.to_string(), node)),
        }
    }

    pub fn get_node(&self, key: &str) -> Option<&ConfigNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self.get_node(key)? {
            ConfigNode::Value(v) => Some(v),
            ConfigNode::Section(_) => None,
        }
    }

    /// Leaf rendered as text; sections and missing keys yield `None`
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(ConfigValue::as_text)
    }

    pub fn section(&self, key: &str) -> Option<&ConfigSection> {
        match self.get_node(key)? {
            ConfigNode::Section(s) => Some(s),
            ConfigNode::Value(_) => None,
        }
    }

    /// Get or create a child section; an existing leaf is replaced
    pub fn create_section(&mut self, key: &str) -> &mut ConfigSection {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                if !matches!(self.entries[idx].1, ConfigNode::Section(_)) {
                    self.entries[idx].1 = ConfigNode::Section(ConfigSection::new());
                }
                idx
            }
            None => {
                self.entries
                    .push((key.to_string(), ConfigNode::Section(ConfigSection::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[idx].1 {
            ConfigNode::Section(s) => s,
            ConfigNode::Value(_) => unreachable!("entry was just made a section"),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigNode> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_node(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Serialize for ConfigSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct SectionVisitor;

impl<'de> Visitor<'de> for SectionVisitor {
    type Value = ConfigSection;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of named config nodes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut section = ConfigSection::new();
        while let Some((key, node)) = access.next_entry::<String, ConfigNode>()? {
            section.set_node(&key, node);
        }
        Ok(section)
    }
}

impl<'de> Deserialize<'de> for ConfigSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionVisitor)
    }
}
