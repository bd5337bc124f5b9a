//! Spatial Target Selection
//!
//! Entity queries a power runs when it fires:
//! - `nearby_entities`: box enumeration, then a radius check, then the
//!   power's selector filters in item order
//! - `nearest_living`: living entities other than the actor, by distance
//! - `entities_in_cone` / `entities_in_cone_sorted`: angular selection
//!
//! The world is reached through [`EntityWorld`]; [`EntityIndex`] is a plain
//! in-memory implementation.

use bevy::math::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::geometry::{angle_between_degrees, BoundingBox};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Snapshot of an entity as a query sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityRef {
    pub id: EntityId,
    pub position: DVec3,
    /// Reference point for cone checks
    pub eye: DVec3,
    pub living: bool,
}

impl EntityRef {
    /// Living entity with its eye at `position`
    pub fn living(id: u64, position: DVec3) -> Self {
        Self {
            id: EntityId(id),
            position,
            eye: position,
            living: true,
        }
    }

    /// Non-living entity (dropped item, projectile, ...)
    pub fn object(id: u64, position: DVec3) -> Self {
        Self {
            living: false,
            ..Self::living(id, position)
        }
    }

    pub fn with_eye_height(mut self, height: f64) -> Self {
        self.eye = self.position + DVec3::new(0.0, height, 0.0);
        self
    }

    pub fn distance_to(&self, point: DVec3) -> f64 {
        self.position.distance(point)
    }
}

/// Host world lookup
pub trait EntityWorld {
    /// Every entity whose position lies in the box around `center`
    fn entities_in_box(&self, center: DVec3, half_extents: DVec3) -> Vec<EntityRef>;
}

/// Filter capability exposed by selector powers, matched by id
pub trait Selector: Send + Sync {
    fn id(&self) -> &str;

    /// May drop or reorder entries
    fn filter_in_place(&self, actor: &EntityRef, entities: &mut Vec<EntityRef>);
}

#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    entities: Vec<EntityRef>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id
    pub fn insert(&mut self, entity: EntityRef) {
        match self.entities.iter_mut().find(|e| e.id == entity.id) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityRef> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRef> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<EntityRef> for EntityIndex {
    fn from_iter<I: IntoIterator<Item = EntityRef>>(iter: I) -> Self {
        let mut index = EntityIndex::new();
        for entity in iter {
            index.insert(entity);
        }
        index
    }
}

impl EntityWorld for EntityIndex {
    fn entities_in_box(&self, center: DVec3, half_extents: DVec3) -> Vec<EntityRef> {
        let bounds = BoundingBox::from_center(center, half_extents);
        self.entities
            .iter()
            .filter(|e| bounds.contains(e.position))
            .copied()
            .collect()
    }
}

/// Entities in the box around `origin` within `radius` of it, after every
/// selector has filtered the list in turn
pub fn nearby_entities<'s>(
    world: &dyn EntityWorld,
    origin: DVec3,
    radius: f64,
    half_extents: DVec3,
    actor: &EntityRef,
    selectors: impl IntoIterator<Item = &'s dyn Selector>,
) -> Vec<EntityRef> {
    let mut entities: Vec<EntityRef> = world
        .entities_in_box(origin, half_extents)
        .into_iter()
        .filter(|e| e.distance_to(origin) <= radius)
        .collect();
    for selector in selectors {
        selector.filter_in_place(actor, &mut entities);
    }
    entities
}

/// [`nearby_entities`] with a cube of half-size `radius`
pub fn nearby_entities_in_radius<'s>(
    world: &dyn EntityWorld,
    origin: DVec3,
    radius: f64,
    actor: &EntityRef,
    selectors: impl IntoIterator<Item = &'s dyn Selector>,
) -> Vec<EntityRef> {
    nearby_entities(world, origin, radius, DVec3::splat(radius), actor, selectors)
}

/// Living entities other than `actor` with distance in `[min_radius, radius]`,
/// nearest first
pub fn nearest_living<'s>(
    world: &dyn EntityWorld,
    origin: DVec3,
    actor: &EntityRef,
    radius: f64,
    min_radius: f64,
    selectors: impl IntoIterator<Item = &'s dyn Selector>,
) -> Vec<EntityRef> {
    let mut found: Vec<(f64, EntityRef)> =
        nearby_entities_in_radius(world, origin, radius, actor, selectors)
            .into_iter()
            .filter(|e| e.living && e.id != actor.id)
            .map(|e| (e.distance_to(origin), e))
            .filter(|(d, _)| *d <= radius && *d >= min_radius)
            .collect();
    found.sort_by(|a, b| a.0.total_cmp(&b.0));
    found.into_iter().map(|(_, e)| e).collect()
}

/// Entities within `half_angle` degrees of `axis` seen from `apex`.
///
/// Single pass: an entity more centered than every one before it goes to the
/// front, anything else to the back. Not a full sort.
pub fn entities_in_cone(
    entities: impl IntoIterator<Item = EntityRef>,
    apex: DVec3,
    half_angle: f64,
    axis: DVec3,
) -> Vec<EntityRef> {
    let mut selected = VecDeque::new();
    let mut min_angle = 180.0;
    for entity in entities {
        let angle = angle_between_degrees(axis, entity.eye - apex);
        if angle > half_angle {
            continue;
        }
        if angle < min_angle {
            min_angle = angle;
            selected.push_front(entity);
        } else {
            selected.push_back(entity);
        }
    }
    selected.into()
}

/// Entities within `half_angle` degrees of `axis`, most centered first
pub fn entities_in_cone_sorted(
    entities: impl IntoIterator<Item = EntityRef>,
    apex: DVec3,
    half_angle: f64,
    axis: DVec3,
) -> Vec<EntityRef> {
    let mut angled: Vec<(f64, EntityRef)> = entities
        .into_iter()
        .map(|e| (angle_between_degrees(axis, e.eye - apex), e))
        .filter(|(angle, _)| *angle <= half_angle)
        .collect();
    angled.sort_by(|a, b| a.0.total_cmp(&b.0));
    angled.into_iter().map(|(_, e)| e).collect()
}
