//! Cooldown Tracker
//!
//! Per-(actor, power) expiry ticks with an atomic check-and-set. An entry whose
//! expiry is at or before the current tick counts as absent; stale entries are
//! harmless and can be dropped with [`CooldownTracker::purge_expired`].
//!
//! A successful check commits the new expiry immediately. There is no rollback
//! if the gated action is abandoned afterwards.

use bevy::prelude::Resource;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

use crate::constants::{MILLIS_PER_TICK, MSG_COOLDOWN_GENERAL, MSG_COOLDOWN_POWER, TICKS_PER_SECOND};
use crate::notify::Notifier;
use crate::resource::ResourceKey;

/// Source of the current logical tick
pub trait TickClock: Send + Sync + 'static {
    fn now(&self) -> u64;
}

/// Wall clock divided into fixed-length ticks
#[derive(Resource, Debug, Clone, Copy)]
pub struct SystemClock {
    millis_per_tick: u64,
}

impl SystemClock {
    pub fn new(millis_per_tick: u64) -> Self {
        Self {
            millis_per_tick: millis_per_tick.max(1),
        }
    }

    pub fn millis_per_tick(&self) -> u64 {
        self.millis_per_tick
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(MILLIS_PER_TICK)
    }
}

impl TickClock for SystemClock {
    fn now(&self) -> u64 {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        millis / self.millis_per_tick
    }
}

/// Clock moved by hand, for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            tick: AtomicU64::new(start),
        }
    }

    pub fn set(&self, tick: u64) {
        self.tick.store(tick, Ordering::SeqCst);
    }

    pub fn advance(&self, ticks: u64) {
        self.tick.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl TickClock for ManualClock {
    fn now(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }
}

/// Tick counter shared with the app; advanced once per update by the plugin
#[derive(Resource, Debug, Clone, Default)]
pub struct GameClock(Arc<AtomicU64>);

impl GameClock {
    pub fn advance(&self, ticks: u64) -> u64 {
        self.0.fetch_add(ticks, Ordering::SeqCst) + ticks
    }
}

impl TickClock for GameClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Identifies what is cooling down
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CooldownKey(String);

impl CooldownKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `cooldown.<item uid>.<namespace:power>`
    pub fn for_power(item_uid: i64, power: &ResourceKey) -> Self {
        Self(format!("cooldown.{item_uid}.{power}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CooldownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    CoolingDown { remaining_ticks: u64 },
}

/// Who to warn on rejection and how to name the power
#[derive(Debug, Clone, Copy)]
pub struct CooldownWarning<'a> {
    pub target: &'a str,
    /// Shown in the message when set; otherwise the general message is used
    pub power_name: Option<&'a str>,
}

#[derive(Resource)]
pub struct CooldownTracker<C: TickClock> {
    clock: C,
    ticks_per_second: u64,
    entries: Mutex<HashMap<ActorId, HashMap<CooldownKey, u64>>>,
}

impl<C: TickClock> CooldownTracker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            ticks_per_second: TICKS_PER_SECOND,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ticks_per_second(mut self, ticks_per_second: u64) -> Self {
        self.ticks_per_second = ticks_per_second.max(1);
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Arm the cooldown if it has expired; otherwise report what is left.
    /// Read and write happen under one lock so racing callers cannot both win.
    fn try_arm(&self, actor: ActorId, key: &CooldownKey, duration: u64) -> Result<(), u64> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let actor_entries = entries.entry(actor).or_default();
        match actor_entries.get(key) {
            Some(&expiry) if expiry > now => {
                debug!(actor = actor.0, key = %key, remaining = expiry - now, "cooldown active");
                Err(expiry - now)
            }
            _ => {
                let expiry = now.saturating_add(duration);
                actor_entries.insert(key.clone(), expiry);
                trace!(actor = actor.0, key = %key, expiry, "cooldown armed");
                Ok(())
            }
        }
    }

    /// True (and the cooldown re-armed for `duration` ticks) when usable
    pub fn check_and_set(&self, actor: ActorId, key: &CooldownKey, duration: u64) -> bool {
        self.try_arm(actor, key, duration).is_ok()
    }

    /// `check_and_set` that tells `warning.target` how long is left on rejection
    pub fn check_and_set_with_warning(
        &self,
        actor: ActorId,
        key: &CooldownKey,
        duration: u64,
        warning: &CooldownWarning<'_>,
        notifier: &dyn Notifier,
    ) -> bool {
        match self.try_arm(actor, key, duration) {
            Ok(()) => true,
            Err(remaining) => {
                let seconds = format!("{:.1}", self.ticks_to_seconds(remaining));
                match warning.power_name {
                    Some(name) => notifier.notify(
                        warning.target,
                        MSG_COOLDOWN_POWER,
                        &[name.to_string(), seconds],
                    ),
                    None => notifier.notify(warning.target, MSG_COOLDOWN_GENERAL, &[seconds]),
                }
                false
            }
        }
    }

    pub fn check(&self, actor: ActorId, key: &CooldownKey) -> CooldownStatus {
        match self.remaining_ticks(actor, key) {
            0 => CooldownStatus::Ready,
            remaining_ticks => CooldownStatus::CoolingDown { remaining_ticks },
        }
    }

    pub fn remaining_ticks(&self, actor: ActorId, key: &CooldownKey) -> u64 {
        let now = self.clock.now();
        self.entries
            .lock()
            .get(&actor)
            .and_then(|e| e.get(key))
            .map_or(0, |&expiry| expiry.saturating_sub(now))
    }

    pub fn ticks_to_seconds(&self, ticks: u64) -> f64 {
        ticks as f64 / self.ticks_per_second as f64
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let mut removed = 0;
        entries.retain(|_, actor_entries| {
            let before = actor_entries.len();
            actor_entries.retain(|_, expiry| *expiry > now);
            removed += before - actor_entries.len();
            !actor_entries.is_empty()
        });
        removed
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
