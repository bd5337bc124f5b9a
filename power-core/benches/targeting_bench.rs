use bevy::math::DVec3;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeSet;

use power_core::attribute;
use power_core::codec::{CodecContext, ConsoleSender};
use power_core::cooldown::ManualClock;
use power_core::geometry::{sweep, BoundingBox};
use power_core::item::{PowerBase, PowerModule};
use power_core::notify::MessageLog;
use power_core::resource::ResourceRegistry;
use power_core::schema::AttributeDescriptor;
use power_core::targeting::{
    entities_in_cone, entities_in_cone_sorted, nearest_living, EntityIndex, EntityRef, Selector,
};
use power_core::trigger::TriggerRegistry;
use power_core::{load, save, set_attribute, ActorId, CooldownKey, CooldownTracker};

#[derive(Debug, Default)]
struct Bolt {
    base: PowerBase,
    damage: f64,
    range: i32,
    tags: BTreeSet<String>,
    chain: Vec<i64>,
}

impl PowerModule for Bolt {
    const NAME: &'static str = "bolt";

    fn base(&self) -> &PowerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PowerBase {
        &mut self.base
    }

    fn attributes() -> Vec<AttributeDescriptor<Self>> {
        vec![
            attribute!(Bolt, damage),
            attribute!(Bolt, range),
            attribute!(Bolt, tags),
            attribute!(Bolt, chain),
        ]
    }
}

/// Deterministic ring of entities around the origin
fn crowd(count: u64) -> Vec<EntityRef> {
    (0..count)
        .map(|i| {
            let angle = (i as f64 * 37.0).to_radians();
            let distance = 2.0 + (i % 17) as f64;
            let position = DVec3::new(angle.cos(), (i % 3) as f64, angle.sin()) * distance;
            if i % 5 == 0 {
                EntityRef::object(i, position)
            } else {
                EntityRef::living(i, position).with_eye_height(1.6)
            }
        })
        .collect()
}

fn no_selectors() -> Vec<&'static dyn Selector> {
    Vec::new()
}

fn bench_sweep(c: &mut Criterion) {
    let moving = BoundingBox::new(DVec3::ZERO, DVec3::ONE);
    let target = BoundingBox::new(DVec3::new(2.0, 3.0, 0.0), DVec3::new(3.0, 4.0, 1.0));

    c.bench_function("sweep_hit", |b| {
        b.iter(|| sweep(black_box(&moving), black_box(&target), black_box(DVec3::new(4.0, 4.0, 0.0))))
    });

    c.bench_function("sweep_miss", |b| {
        b.iter(|| sweep(black_box(&moving), black_box(&target), black_box(DVec3::new(-4.0, 0.0, 0.0))))
    });
}

fn bench_targeting(c: &mut Criterion) {
    let entities = crowd(1000);
    let world: EntityIndex = entities.iter().copied().collect();
    let actor = EntityRef::living(u64::MAX, DVec3::ZERO);

    c.bench_function("cone_heuristic_1000", |b| {
        b.iter(|| entities_in_cone(black_box(entities.clone()), DVec3::ZERO, 45.0, DVec3::X))
    });

    c.bench_function("cone_sorted_1000", |b| {
        b.iter(|| entities_in_cone_sorted(black_box(entities.clone()), DVec3::ZERO, 45.0, DVec3::X))
    });

    c.bench_function("nearest_living_1000", |b| {
        b.iter(|| nearest_living(&world, black_box(DVec3::ZERO), &actor, 10.0, 1.0, no_selectors()))
    });
}

fn bench_codec(c: &mut Criterion) {
    let resources = ResourceRegistry::new();
    let triggers = TriggerRegistry::standard();
    let log = MessageLog::new();
    let ctx = CodecContext::new(&ConsoleSender, &resources, &triggers, &log);

    c.bench_function("set_attribute_set_of_strings", |b| {
        let mut bolt = Bolt::default();
        b.iter(|| set_attribute(&mut bolt, "tags", black_box("fire, arc, zap, fire, volt"), &ctx))
    });

    c.bench_function("set_attribute_triggers", |b| {
        let mut bolt = Bolt::default();
        b.iter(|| set_attribute(&mut bolt, "triggers", black_box("HIT, SNEAK, RIGHT_CLICK"), &ctx))
    });

    let mut bolt = Bolt {
        damage: 12.5,
        range: 30,
        chain: vec![4, 8, 15, 16, 23, 42],
        ..Default::default()
    };
    bolt.tags.extend(["fire".to_string(), "arc".to_string()]);
    let saved = save(&bolt).unwrap();

    c.bench_function("save_power", |b| b.iter(|| save(black_box(&bolt))));

    c.bench_function("load_power", |b| b.iter(|| load::<Bolt>(black_box(&saved), &ctx)));
}

fn bench_cooldown(c: &mut Criterion) {
    let tracker = CooldownTracker::new(ManualClock::new(0));
    let key = CooldownKey::new("cooldown.1.core:bolt");

    c.bench_function("cooldown_check_and_set", |b| {
        let mut actor = 0;
        b.iter(|| {
            actor += 1;
            tracker.check_and_set(ActorId(actor % 256), black_box(&key), 20)
        })
    });
}

criterion_group!(benches, bench_sweep, bench_targeting, bench_codec, bench_cooldown);
criterion_main!(benches);
