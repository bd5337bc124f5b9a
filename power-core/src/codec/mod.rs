//! Property Codec
//!
//! Generic save / load / edit of power modules against their [`Schema`]:
//! - `save` walks the schema in order and writes every set attribute
//! - `load` reads each attribute present in a document back through coercion
//! - `set_attribute` validates and applies one attribute from user text
//!
//! Edits are all-or-nothing per attribute: on error the instance is untouched.
//!
//! [`Schema`]: crate::schema::Schema

mod coerce;
mod context;

pub use coerce::{coerce, coerce_scalar, split_tokens, Coercion};
pub use context::{CodecContext, CommandSender, ConsoleSender, Player};

use tracing::{debug, warn};

use crate::constants::{MSG_IGNORED_TRIGGER, MSG_INVALID_VALUE, NULL_TOKEN};
use crate::document::{ConfigSection, ConfigValue};
use crate::error::{PowerError, SchemaError};
use crate::item::PowerModule;
use crate::schema::{describe, AttributeDescriptor};
use crate::value::AttributeValue;
use coerce::{coerce_from, Origin};

/// Outcome of a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// Value stored; `ignored` lists unknown trigger names that were dropped
    Applied { ignored: Vec<String> },
    /// A custom decoder declined to change the value
    Unchanged,
}

/// Default document encoding of a stored value; empty collections are omitted
pub fn encode_value(value: &AttributeValue) -> Option<ConfigValue> {
    match value {
        AttributeValue::Scalar(v) => Some(v.to_config_value()),
        AttributeValue::List(items) | AttributeValue::Set(items) if items.is_empty() => None,
        collection => Some(ConfigValue::String(collection.to_text())),
    }
}

fn encode_attribute<M>(descriptor: &AttributeDescriptor<M>, instance: &M) -> Option<ConfigValue> {
    match descriptor.encoder() {
        Some(encode) => encode(instance),
        None => descriptor.read(instance).as_ref().and_then(encode_value),
    }
}

/// Serialize `instance` into a fresh section, in schema order
pub fn save<M: PowerModule>(instance: &M) -> Result<ConfigSection, PowerError> {
    let mut section = ConfigSection::new();
    save_into(instance, &mut section)?;
    Ok(section)
}

pub fn save_into<M: PowerModule>(instance: &M, section: &mut ConfigSection) -> Result<(), PowerError> {
    let schema = describe::<M>()?;
    for descriptor in schema.attributes() {
        if let Some(value) = encode_attribute(descriptor, instance) {
            section.set(descriptor.name(), value);
        }
    }
    Ok(())
}

/// Build a new instance from a saved section
pub fn load<M: PowerModule>(section: &ConfigSection, ctx: &CodecContext<'_>) -> Result<M, PowerError> {
    let mut instance = M::default();
    load_into(&mut instance, section, ctx)?;
    Ok(instance)
}

/// Apply every attribute present in `section` to `instance`.
///
/// Attributes missing from the document are left as they are. A custom
/// decoder rejecting its text is reported and skipped; any other error aborts.
pub fn load_into<M: PowerModule>(
    instance: &mut M,
    section: &ConfigSection,
    ctx: &CodecContext<'_>,
) -> Result<(), PowerError> {
    let schema = describe::<M>()?;
    for descriptor in schema.attributes() {
        let Some(raw) = section.get_string(descriptor.name()) else {
            continue;
        };
        match apply_text(Origin::Document, instance, descriptor, &raw, ctx) {
            Ok(_) => {}
            Err(PowerError::InvalidValue { attribute, message }) => {
                warn!(module = M::NAME, %attribute, %message, "skipping undecodable attribute");
                ctx.notifier
                    .notify(ctx.sender.name(), MSG_INVALID_VALUE, &[attribute, message]);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Interactive edit of a single attribute from raw user text
pub fn set_attribute<M: PowerModule>(
    instance: &mut M,
    name: &str,
    raw: &str,
    ctx: &CodecContext<'_>,
) -> Result<SetOutcome, PowerError> {
    let schema = describe::<M>()?;
    let descriptor = schema.get(name).ok_or_else(|| SchemaError::UnknownAttribute {
        module: M::NAME,
        name: name.to_string(),
    })?;
    apply_text(Origin::Command, instance, descriptor, raw, ctx)
}

/// Current value of one attribute as text, in its saved encoding
pub fn get_attribute<M: PowerModule>(instance: &M, name: &str) -> Result<Option<String>, PowerError> {
    let schema = describe::<M>()?;
    let descriptor = schema.get(name).ok_or_else(|| SchemaError::UnknownAttribute {
        module: M::NAME,
        name: name.to_string(),
    })?;
    Ok(encode_attribute(descriptor, instance).map(|v| v.as_text()))
}

/// Allow-list check; collection text is checked token by token
pub fn check_accepted<M>(
    descriptor: &AttributeDescriptor<M>,
    raw: &str,
    ctx: &CodecContext<'_>,
) -> Result<(), PowerError> {
    let Some(accepted) = descriptor.accepted_values() else {
        return Ok(());
    };
    let allowed = accepted.resolve(ctx.triggers);
    let reject = |value: &str| PowerError::InvalidOption {
        attribute: descriptor.name().to_string(),
        value: value.to_string(),
        allowed: allowed.to_vec(),
    };
    if descriptor.kind().is_collection() {
        match split_tokens(raw).find(|token| !allowed.iter().any(|a| a == token)) {
            Some(token) => Err(reject(token)),
            None => Ok(()),
        }
    } else if allowed.iter().any(|a| a == raw) {
        Ok(())
    } else {
        Err(reject(raw))
    }
}

fn apply_text<M: PowerModule>(
    origin: Origin,
    instance: &mut M,
    descriptor: &AttributeDescriptor<M>,
    raw: &str,
    ctx: &CodecContext<'_>,
) -> Result<SetOutcome, PowerError> {
    if raw != NULL_TOKEN {
        check_accepted(descriptor, raw, ctx)?;
    }
    match coerce_from(origin, raw, descriptor, instance, ctx)? {
        Coercion::Unchanged => Ok(SetOutcome::Unchanged),
        Coercion::Assign { value, ignored } => {
            descriptor.write(instance, value)?;
            if !ignored.is_empty() {
                warn!(module = M::NAME, ignored = ?ignored, "ignoring unknown triggers");
                ctx.notifier.notify(
                    ctx.sender.name(),
                    MSG_IGNORED_TRIGGER,
                    &[ignored.join(", "), M::NAME.to_string()],
                );
            }
            debug!(module = M::NAME, attribute = descriptor.name(), "attribute applied");
            Ok(SetOutcome::Applied { ignored })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute;
    use crate::item::PowerBase;
    use crate::notify::MessageLog;
    use crate::resource::ResourceRegistry;
    use crate::trigger::{TriggerRegistry, TriggerTag};
    use std::collections::BTreeSet;

    crate::attribute_enum! {
        enum Shape { Line, Arc }
    }

    #[derive(Default, Debug, PartialEq)]
    struct Spark {
        base: PowerBase,
        damage: f64,
        piercing: bool,
        shape: Shape,
        tags: BTreeSet<String>,
        chain: Vec<String>,
        color: String,
        delay: i64,
    }

    fn decode_delay(_: &Spark, raw: &str) -> Result<Option<AttributeValue>, String> {
        match raw {
            "keep" => Ok(None),
            _ => raw
                .strip_suffix('t')
                .and_then(|n| n.parse::<i64>().ok())
                .map(|n| Some(AttributeValue::Scalar(crate::value::ScalarValue::Int64(n))))
                .ok_or_else(|| format!("'{raw}' is not a tick count")),
        }
    }

    fn encode_delay(spark: &Spark) -> Option<ConfigValue> {
        (spark.delay != 0).then(|| ConfigValue::String(format!("{}t", spark.delay)))
    }

    impl PowerModule for Spark {
        const NAME: &'static str = "spark";

        fn base(&self) -> &PowerBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut PowerBase {
            &mut self.base
        }

        fn attributes() -> Vec<AttributeDescriptor<Self>> {
            vec![
                attribute!(Spark, damage),
                attribute!(Spark, piercing).boolean_choice("pierce", "stop"),
                attribute!(Spark, shape),
                attribute!(Spark, tags),
                attribute!(Spark, chain),
                attribute!(Spark, color).accepted(&["red", "blue"]),
                attribute!(Spark, delay)
                    .encode_with(encode_delay)
                    .decode_with(decode_delay),
            ]
        }
    }

    struct Env {
        resources: ResourceRegistry,
        triggers: TriggerRegistry,
        log: MessageLog,
    }

    impl Env {
        fn new() -> Self {
            Self {
                resources: ResourceRegistry::new(),
                triggers: TriggerRegistry::standard(),
                log: MessageLog::new(),
            }
        }

        fn ctx(&self) -> CodecContext<'_> {
            CodecContext::new(&ConsoleSender, &self.resources, &self.triggers, &self.log)
        }
    }

    #[test]
    fn test_save_omits_unset_collections() {
        let spark = Spark {
            damage: 1.5,
            color: "red".into(),
            ..Default::default()
        };
        let saved = save(&spark).unwrap();
        let keys: Vec<&str> = saved.keys().collect();
        assert_eq!(keys, vec!["damage", "piercing", "shape", "color"]);
    }

    #[test]
    fn test_round_trip() {
        let env = Env::new();
        let mut spark = Spark {
            damage: 4.0,
            piercing: true,
            shape: Shape::Arc,
            color: "blue".into(),
            chain: vec!["b".into(), "a".into(), "b".into()],
            delay: 30,
            ..Default::default()
        };
        spark.tags.extend(["z".to_string(), "m".to_string()]);
        spark.base.triggers.insert(TriggerTag::new("HIT"));

        let saved = save(&spark).unwrap();
        assert_eq!(saved.get_string("tags").as_deref(), Some("m,z"));
        assert_eq!(saved.get_string("chain").as_deref(), Some("b,a,b"));
        assert_eq!(saved.get_string("delay").as_deref(), Some("30t"));

        let loaded: Spark = load(&saved, &env.ctx()).unwrap();
        assert_eq!(loaded, spark);
        assert_eq!(save(&loaded).unwrap(), saved);
    }

    #[test]
    fn test_set_collection_parsing() {
        let env = Env::new();
        let mut spark = Spark::default();
        set_attribute(&mut spark, "tags", "a, b,,b", &env.ctx()).unwrap();
        assert_eq!(spark.tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        set_attribute(&mut spark, "chain", "a,b,b", &env.ctx()).unwrap();
        assert_eq!(spark.chain, vec!["a", "b", "b"]);
    }

    #[test]
    fn test_failed_edit_leaves_value() {
        let env = Env::new();
        let mut spark = Spark {
            damage: 2.0,
            ..Default::default()
        };
        let err = set_attribute(&mut spark, "damage", "lots", &env.ctx()).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(spark.damage, 2.0);
    }

    #[test]
    fn test_null_clears_without_validation() {
        let env = Env::new();
        let mut spark = Spark {
            color: "red".into(),
            ..Default::default()
        };
        set_attribute(&mut spark, "color", "null", &env.ctx()).unwrap();
        assert_eq!(spark.color, "");
        assert!(set_attribute(&mut spark, "color", "green", &env.ctx()).is_err());
    }

    #[test]
    fn test_boolean_choice_applies_to_edits_only() {
        let env = Env::new();
        let mut spark = Spark::default();
        set_attribute(&mut spark, "piercing", "PIERCE", &env.ctx()).unwrap();
        assert!(spark.piercing);
        assert!(set_attribute(&mut spark, "piercing", "false", &env.ctx()).is_err());
        assert!(spark.piercing);
    }

    #[test]
    fn test_unknown_triggers_reported() {
        let env = Env::new();
        let mut spark = Spark::default();
        let outcome = set_attribute(&mut spark, "triggers", "HIT,JUMP,SNEAK", &env.ctx()).unwrap();
        assert_eq!(
            outcome,
            SetOutcome::Applied {
                ignored: vec!["JUMP".into()]
            }
        );
        assert_eq!(spark.base.triggers.len(), 2);
        let notices = env.log.take();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].key, MSG_IGNORED_TRIGGER);
        assert_eq!(notices[0].args, vec!["JUMP".to_string(), "spark".to_string()]);
    }

    #[test]
    fn test_custom_decoder() {
        let env = Env::new();
        let mut spark = Spark::default();
        set_attribute(&mut spark, "delay", "40t", &env.ctx()).unwrap();
        assert_eq!(spark.delay, 40);
        assert_eq!(
            set_attribute(&mut spark, "delay", "keep", &env.ctx()),
            Ok(SetOutcome::Unchanged)
        );
        assert_eq!(spark.delay, 40);
        assert!(matches!(
            set_attribute(&mut spark, "delay", "soon", &env.ctx()),
            Err(PowerError::InvalidValue { .. })
        ));
        assert_eq!(get_attribute(&spark, "delay").unwrap().as_deref(), Some("40t"));
    }

    #[test]
    fn test_load_skips_undecodable_values() {
        let env = Env::new();
        let mut section = ConfigSection::new();
        section.set("damage", 3.0);
        section.set("delay", "soon");
        let spark: Spark = load(&section, &env.ctx()).unwrap();
        assert_eq!(spark.damage, 3.0);
        assert_eq!(spark.delay, 0);
        assert_eq!(env.log.take()[0].key, MSG_INVALID_VALUE);
    }

    #[test]
    fn test_load_rejects_bad_number() {
        let env = Env::new();
        let mut section = ConfigSection::new();
        section.set("damage", "heavy");
        assert!(matches!(
            load::<Spark>(&section, &env.ctx()),
            Err(PowerError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        let env = Env::new();
        let mut spark = Spark::default();
        let err = set_attribute(&mut spark, "speed", "1", &env.ctx()).unwrap_err();
        assert!(matches!(
            err,
            PowerError::Schema(SchemaError::UnknownAttribute { .. })
        ));
        assert!(get_attribute(&spark, "speed").is_err());
    }

    #[test]
    fn test_get_attribute_text() {
        let spark = Spark {
            shape: Shape::Arc,
            chain: vec!["x".into(), "y".into()],
            ..Default::default()
        };
        assert_eq!(get_attribute(&spark, "shape").unwrap().as_deref(), Some("Arc"));
        assert_eq!(get_attribute(&spark, "chain").unwrap().as_deref(), Some("x,y"));
        assert_eq!(get_attribute(&spark, "tags").unwrap(), None);
    }
}
