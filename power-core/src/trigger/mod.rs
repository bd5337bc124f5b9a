//! Trigger tags
//!
//! A power fires on the triggers it declares. Trigger names are validated
//! against a [`TriggerRegistry`]; unknown names are not fatal and are handed
//! back to the caller as an ignored list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Name of a trigger a power reacts to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerTag(pub String);

impl TriggerTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Standard triggers known to every host
pub const STANDARD_TRIGGERS: &[&str] = &[
    "BEAM_HIT",
    "BEAM_HIT_ENTITY",
    "DYING",
    "HIT",
    "HIT_TAKEN",
    "HURT",
    "KILL",
    "LEFT_CLICK",
    "OFFHAND_CLICK",
    "PROJECTILE_HIT",
    "PROJECTILE_LAUNCH",
    "RIGHT_CLICK",
    "SNEAK",
    "SPRINT",
    "SWAP_TO_MAINHAND",
    "SWAP_TO_OFFHAND",
    "TICK",
];

/// Set of trigger names a host accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRegistry {
    names: BTreeSet<String>,
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TriggerRegistry {
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn standard() -> Self {
        Self {
            names: STANDARD_TRIGGERS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// All known names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    /// Split tokens into known triggers and ignored names.
    ///
    /// Ignored names keep first-seen order without repeats.
    pub fn partition_valid<'a>(
        &self,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> (Vec<TriggerTag>, Vec<String>) {
        let mut valid = Vec::new();
        let mut ignored: Vec<String> = Vec::new();
        for token in tokens {
            if self.contains(token) {
                valid.push(TriggerTag::new(token));
            } else if !ignored.iter().any(|i| i == token) {
                ignored.push(token.to_string());
            }
        }
        (valid, ignored)
    }
}
