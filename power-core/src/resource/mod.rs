//! Namespaced Resource Keys
//!
//! Opaque keyed resources (item types, enchantment-like modifiers) are stored
//! on powers as a [`ResourceKey`] and written to the document as
//! `namespace:key`. Text is resolved through a host-provided
//! [`ResourceResolver`]:
//! 1. strict lowercase key (`[a-z0-9/._-]+`) in the default namespace
//! 2. `namespace:key`, with an empty namespace meaning the default one
//! 3. legacy constant name (`DAMAGE_ALL`, `DIAMOND_SWORD`, ...)

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::constants::is_valid_key;

/// Category of an opaque resource attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    Item,
    Enchantment,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Item => "item",
            ResourceCategory::Enchantment => "enchantment",
        }
    }
}

/// Canonical `namespace:key` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub namespace: String,
    pub key: String,
}

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Split `namespace:key`, falling back to `default_namespace` when the
    /// namespace part is missing or empty
    pub fn parse(text: &str, default_namespace: &str) -> Self {
        match text.split_once(':') {
            Some((ns, key)) if !ns.is_empty() => Self::new(ns, key),
            Some((_, key)) => Self::new(default_namespace, key),
            None => Self::new(default_namespace, text),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

/// Host lookup for keyed resources
pub trait ResourceResolver: Send + Sync {
    fn resolve_by_key(
        &self,
        category: ResourceCategory,
        namespace: &str,
        key: &str,
    ) -> Option<ResourceKey>;

    fn resolve_by_legacy_name(&self, category: ResourceCategory, name: &str)
        -> Option<ResourceKey>;
}

/// Resolve raw text to a resource key using the documented priority order.
///
/// Legacy names are tried last, also when the key forms found nothing.
pub fn resolve(
    resolver: &dyn ResourceResolver,
    category: ResourceCategory,
    text: &str,
    default_namespace: &str,
) -> Option<ResourceKey> {
    let by_key = if is_valid_key(text) {
        resolver.resolve_by_key(category, default_namespace, text)
    } else if text.contains(':') {
        let parsed = ResourceKey::parse(text, default_namespace);
        resolver.resolve_by_key(category, &parsed.namespace, &parsed.key)
    } else {
        None
    };
    by_key.or_else(|| resolver.resolve_by_legacy_name(category, text))
}

/// In-memory resolver backed by registered keys and legacy aliases
#[derive(Debug, Default, Clone)]
pub struct ResourceRegistry {
    keys: HashSet<(ResourceCategory, ResourceKey)>,
    legacy: HashMap<(ResourceCategory, String), ResourceKey>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, category: ResourceCategory, key: ResourceKey) -> &mut Self {
        self.keys.insert((category, key));
        self
    }

    /// Register a key together with its legacy constant name
    pub fn register_legacy(
        &mut self,
        category: ResourceCategory,
        legacy_name: &str,
        key: ResourceKey,
    ) -> &mut Self {
        self.keys.insert((category, key.clone()));
        self.legacy.insert((category, legacy_name.to_string()), key);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl ResourceResolver for ResourceRegistry {
    fn resolve_by_key(
        &self,
        category: ResourceCategory,
        namespace: &str,
        key: &str,
    ) -> Option<ResourceKey> {
        let candidate = ResourceKey::new(namespace, key);
        self.keys
            .contains(&(category, candidate.clone()))
            .then_some(candidate)
    }

    fn resolve_by_legacy_name(
        &self,
        category: ResourceCategory,
        name: &str,
    ) -> Option<ResourceKey> {
        self.legacy.get(&(category, name.to_string())).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ResourceRegistry {
        let mut reg = ResourceRegistry::new();
        reg.register_legacy(
            ResourceCategory::Enchantment,
            "DAMAGE_ALL",
            ResourceKey::new("core", "sharpness"),
        )
        .register(
            ResourceCategory::Enchantment,
            ResourceKey::new("arcana", "soulbind"),
        )
        .register(ResourceCategory::Item, ResourceKey::new("core", "diamond_sword"));
        reg
    }

    #[test]
    fn test_key_display_and_parse() {
        let key = ResourceKey::parse("arcana:soulbind", "core");
        assert_eq!(key.to_string(), "arcana:soulbind");
        assert_eq!(ResourceKey::parse(":stone", "core").to_string(), "core:stone");
        assert_eq!(ResourceKey::parse("stone", "core").to_string(), "core:stone");
    }

    #[test]
    fn test_resolve_plain_key_uses_default_namespace() {
        let reg = registry();
        let found = resolve(&reg, ResourceCategory::Enchantment, "sharpness", "core");
        assert_eq!(found, Some(ResourceKey::new("core", "sharpness")));
    }

    #[test]
    fn test_resolve_namespaced() {
        let reg = registry();
        let found = resolve(&reg, ResourceCategory::Enchantment, "arcana:soulbind", "core");
        assert_eq!(found, Some(ResourceKey::new("arcana", "soulbind")));
    }

    #[test]
    fn test_resolve_legacy_name() {
        let reg = registry();
        let found = resolve(&reg, ResourceCategory::Enchantment, "DAMAGE_ALL", "core");
        assert_eq!(found, Some(ResourceKey::new("core", "sharpness")));
    }

    #[test]
    fn test_resolve_respects_category() {
        let reg = registry();
        assert!(resolve(&reg, ResourceCategory::Item, "sharpness", "core").is_none());
        assert!(resolve(&reg, ResourceCategory::Item, "diamond_sword", "core").is_some());
    }

    #[test]
    fn test_unknown_resource() {
        let reg = registry();
        assert!(resolve(&reg, ResourceCategory::Enchantment, "Nope", "core").is_none());
        assert!(resolve(&reg, ResourceCategory::Enchantment, "x:y", "core").is_none());
    }
}
