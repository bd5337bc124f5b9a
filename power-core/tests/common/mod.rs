//! Shared fixture powers for integration tests
#![allow(dead_code)]

use std::collections::HashSet;

use power_core::attribute;
use power_core::codec::CodecContext;
use power_core::codec::ConsoleSender;
use power_core::document::ConfigValue;
use power_core::item::{PowerBase, PowerModule};
use power_core::notify::MessageLog;
use power_core::resource::{ResourceCategory, ResourceKey, ResourceRegistry};
use power_core::schema::AttributeDescriptor;
use power_core::targeting::{EntityRef, Selector};
use power_core::trigger::TriggerRegistry;
use power_core::value::{AttributeKind, AttributeValue, ScalarKind, ScalarValue};

power_core::attribute_enum! {
    pub enum FiringMode { Single, Burst, Stream }
}

pub const PARTICLES: &str = "flame, smoke, spell";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Beam {
    pub base: PowerBase,
    pub damage: f64,
    pub speed: f32,
    pub length: i32,
    pub cooldown: i64,
    pub mode: FiringMode,
    pub cone: bool,
    pub tags: HashSet<String>,
    pub hits: Vec<i32>,
    pub enchantment: Option<ResourceKey>,
    pub ammo: Option<ResourceKey>,
    pub particle: Option<String>,
    pub charge_ticks: i64,
}

/// `<n>s` seconds, or plain ticks; `cancel` keeps the current value
fn decode_charge(_: &Beam, raw: &str) -> Result<Option<AttributeValue>, String> {
    if raw == "cancel" {
        return Ok(None);
    }
    let ticks = match raw.strip_suffix('s') {
        Some(seconds) => seconds.parse::<i64>().map(|s| s * 20),
        None => raw.parse::<i64>(),
    }
    .map_err(|_| format!("'{raw}' is not a duration"))?;
    Ok(Some(AttributeValue::Scalar(ScalarValue::Int64(ticks))))
}

fn encode_charge(beam: &Beam) -> Option<ConfigValue> {
    (beam.charge_ticks != 0).then_some(ConfigValue::Int(beam.charge_ticks))
}

impl PowerModule for Beam {
    const NAME: &'static str = "beam";

    fn base(&self) -> &PowerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PowerBase {
        &mut self.base
    }

    fn attributes() -> Vec<AttributeDescriptor<Self>> {
        vec![
            attribute!(Beam, cooldown).with_order(10),
            attribute!(Beam, damage).with_order(20),
            attribute!(Beam, speed).with_order(21),
            attribute!(Beam, length).with_order(22),
            attribute!(Beam, mode).with_order(30),
            attribute!(Beam, cone).with_order(31).boolean_choice("cone", "line"),
            attribute!(Beam, tags).with_order(40),
            attribute!(Beam, hits).with_order(41),
            attribute!(Beam, enchantment)
                .with_order(50)
                .with_kind(AttributeKind::Scalar(ScalarKind::Resource(
                    ResourceCategory::Enchantment,
                ))),
            attribute!(Beam, ammo).with_order(51),
            attribute!(Beam, particle).with_order(60).accepted_list(PARTICLES),
            attribute!(Beam, charge_ticks)
                .with_order(70)
                .encode_with(encode_charge)
                .decode_with(decode_charge),
        ]
    }
}

/// Keeps entities within `radius` of the actor
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RadiusSelector {
    pub base: PowerBase,
    pub id: String,
    pub radius: f64,
}

impl Selector for RadiusSelector {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter_in_place(&self, actor: &EntityRef, entities: &mut Vec<EntityRef>) {
        entities.retain(|e| e.position.distance(actor.position) <= self.radius);
    }
}

impl PowerModule for RadiusSelector {
    const NAME: &'static str = "radius_selector";

    fn base(&self) -> &PowerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PowerBase {
        &mut self.base
    }

    fn attributes() -> Vec<AttributeDescriptor<Self>> {
        vec![attribute!(RadiusSelector, id), attribute!(RadiusSelector, radius)]
    }

    fn as_selector(&self) -> Option<&dyn Selector> {
        Some(self)
    }
}

/// Host-side collaborators a codec call borrows
pub struct Host {
    pub resources: ResourceRegistry,
    pub triggers: TriggerRegistry,
    pub log: MessageLog,
}

impl Host {
    pub fn new() -> Self {
        let mut resources = ResourceRegistry::new();
        resources
            .register_legacy(
                ResourceCategory::Enchantment,
                "DAMAGE_ALL",
                ResourceKey::new("core", "sharpness"),
            )
            .register(ResourceCategory::Enchantment, ResourceKey::new("arcana", "soulbind"))
            .register_legacy(
                ResourceCategory::Item,
                "ARROW",
                ResourceKey::new("core", "arrow"),
            )
            .register(ResourceCategory::Item, ResourceKey::new("core", "fire_charge"));
        Self {
            resources,
            triggers: TriggerRegistry::standard(),
            log: MessageLog::new(),
        }
    }

    pub fn console(&self) -> CodecContext<'_> {
        CodecContext::new(&ConsoleSender, &self.resources, &self.triggers, &self.log)
    }
}

pub fn sample_beam() -> Beam {
    let mut beam = Beam {
        damage: 7.25,
        speed: 0.1,
        length: 12,
        cooldown: 40,
        mode: FiringMode::Burst,
        cone: true,
        hits: vec![3, 1, 3],
        enchantment: Some(ResourceKey::new("arcana", "soulbind")),
        ammo: Some(ResourceKey::new("core", "arrow")),
        particle: Some("smoke".into()),
        charge_ticks: 60,
        ..Default::default()
    };
    beam.tags.extend(["fire".to_string(), "arc".to_string(), "zap".to_string()]);
    beam.base.triggers.insert(power_core::trigger::TriggerTag::new("RIGHT_CLICK"));
    beam.base.selectors.insert("close".into());
    beam
}
