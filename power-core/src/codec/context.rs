//! Collaborators a coercion needs: who is editing, how resources resolve,
//! which triggers exist and where warnings go.

use crate::constants::DEFAULT_NAMESPACE;
use crate::notify::Notifier;
use crate::resource::{ResourceKey, ResourceResolver};
use crate::trigger::TriggerRegistry;

/// Originator of an edit (a player or the console)
pub trait CommandSender {
    fn name(&self) -> &str;

    /// Item type currently held, for the `HAND` token
    fn held_item(&self) -> Option<ResourceKey> {
        None
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSender;

impl CommandSender for ConsoleSender {
    fn name(&self) -> &str {
        "CONSOLE"
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    pub held_item: Option<ResourceKey>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            held_item: None,
        }
    }

    pub fn holding(mut self, item: ResourceKey) -> Self {
        self.held_item = Some(item);
        self
    }
}

impl CommandSender for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn held_item(&self) -> Option<ResourceKey> {
        self.held_item.clone()
    }
}

pub struct CodecContext<'a> {
    pub sender: &'a dyn CommandSender,
    pub resolver: &'a dyn ResourceResolver,
    pub triggers: &'a TriggerRegistry,
    pub notifier: &'a dyn Notifier,
    pub default_namespace: &'a str,
}

impl<'a> CodecContext<'a> {
    pub fn new(
        sender: &'a dyn CommandSender,
        resolver: &'a dyn ResourceResolver,
        triggers: &'a TriggerRegistry,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            sender,
            resolver,
            triggers,
            notifier,
            default_namespace: DEFAULT_NAMESPACE,
        }
    }

    pub fn with_namespace(mut self, namespace: &'a str) -> Self {
        self.default_namespace = namespace;
        self
    }
}
