//! Power Core Library
//!
//! Attribute and targeting engine behind item powers (abilities):
//! - Attribute schema declared once per power type, cached per type
//! - Property codec: save/load against a config document, text coercion
//! - Cooldown tracker with atomic check-and-set
//! - Spatial target selection (radius, nearest living, cone)
//! - Swept AABB collision
//! - Bevy plugin wiring the tick clock and cooldowns into an app

pub mod cache;
pub mod codec;
pub mod config;
pub mod constants;
pub mod cooldown;
pub mod document;
pub mod error;
pub mod geometry;
pub mod item;
pub mod logging;
pub mod notify;
pub mod plugin;
pub mod resource;
pub mod schema;
pub mod targeting;
pub mod trigger;
pub mod value;

pub use codec::{get_attribute, load, save, set_attribute, CodecContext, SetOutcome};
pub use config::PowerCoreConfig;
pub use cooldown::{ActorId, CooldownKey, CooldownTracker};
pub use error::{PowerError, SchemaError};
pub use item::{Item, PowerBase, PowerModule, PowerRegistry};
pub use plugin::PowerCorePlugin;
pub use schema::{describe, AttributeDescriptor};
