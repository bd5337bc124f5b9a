use bevy::prelude::*;
use tracing::debug;

use crate::cache::init_permission_cache;
use crate::codec::{CodecContext, CommandSender};
use crate::config::PowerCoreConfig;
use crate::cooldown::{CooldownTracker, GameClock};
use crate::logging::init_tracing;
use crate::notify::Notifier;
use crate::resource::ResourceResolver;
use crate::trigger::TriggerRegistry;

/// Wires the power core into a bevy app: shared tick clock, cooldown tracker,
/// wall clock and settings. The game clock advances one tick per app update.
#[derive(Default)]
pub struct PowerCorePlugin {
    pub config: PowerCoreConfig,
}

impl PowerCorePlugin {
    pub fn new(config: PowerCoreConfig) -> Self {
        Self { config }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct PowerCoreSettings(pub PowerCoreConfig);

impl PowerCoreSettings {
    /// Codec context resolving bare resource keys in the configured namespace
    pub fn codec_context<'a>(
        &'a self,
        sender: &'a dyn CommandSender,
        resolver: &'a dyn ResourceResolver,
        triggers: &'a TriggerRegistry,
        notifier: &'a dyn Notifier,
    ) -> CodecContext<'a> {
        CodecContext::new(sender, resolver, triggers, notifier)
            .with_namespace(&self.0.default_namespace)
    }
}

impl Plugin for PowerCorePlugin {
    fn build(&self, app: &mut App) {
        init_tracing(&self.config.tracing);
        if !init_permission_cache(self.config.permission_cache_capacity) {
            debug!("permission cache already initialized");
        }

        let clock = GameClock::default();
        let tracker = CooldownTracker::new(clock.clone())
            .with_ticks_per_second(self.config.ticks_per_second);

        app.insert_resource(clock)
            .insert_resource(tracker)
            .insert_resource(self.config.system_clock())
            .insert_resource(PowerCoreSettings(self.config.clone()))
            .add_systems(Update, advance_game_clock);
    }
}

fn advance_game_clock(clock: Res<GameClock>) {
    clock.advance(1);
}
