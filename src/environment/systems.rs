use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, block_on, futures_lite::future};
use bevy::window::{PrimaryWindow, WindowOccluded};

use super::{BatteryPoll, EnvironmentConfig, host};
use crate::backdrop::UserToggles;
use crate::engine::policy::{EnvironmentSignals, PerformancePolicy};

/// Reads the one-off device hints at startup.
pub fn sample_device(
    config: Res<EnvironmentConfig>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut signals: ResMut<EnvironmentSignals>,
) {
    *signals = EnvironmentSignals {
        hardware_concurrency: host::hardware_concurrency(),
        device_memory_gb: host::device_memory_gb(),
        screen_area: window.single().ok().map(|w| w.width() * w.height()),
        battery_level: host::battery_level(),
        connection: config.connection,
        visible: Some(true),
        prefers_reduced_motion: config.prefers_reduced_motion,
    };
    info!("environment: {:?}", *signals);
}

/// Window occlusion is the page-visibility signal.
pub fn track_visibility(
    mut occluded: MessageReader<WindowOccluded>,
    primary: Query<Entity, With<PrimaryWindow>>,
    mut signals: ResMut<EnvironmentSignals>,
) {
    let primary = primary.single().ok();
    let Some(last) = occluded.read().filter(|e| Some(e.window) == primary).last() else {
        return;
    };
    let visible = Some(!last.occluded);
    if signals.visible != visible {
        signals.visible = visible;
    }
}

/// Re-reads the battery off the main thread every poll interval and applies
/// the level once the read completes.
pub fn poll_battery(
    time: Res<Time<Real>>,
    mut poll: ResMut<BatteryPoll>,
    mut signals: ResMut<EnvironmentSignals>,
) {
    let finished = poll
        .task
        .as_mut()
        .and_then(|task| block_on(future::poll_once(task)));
    if let Some(level) = finished {
        poll.task = None;
        if signals.battery_level != level {
            debug!("battery level {level:?}");
            signals.battery_level = level;
        }
    }

    if poll.timer.tick(time.delta()).just_finished() && poll.task.is_none() {
        poll.task = Some(IoTaskPool::get().spawn(async { host::battery_level() }));
    }
}

/// M: reduced motion. H: heavy animations.
pub fn toggle_preferences(
    keys: Res<ButtonInput<KeyCode>>,
    mut signals: ResMut<EnvironmentSignals>,
    mut toggles: ResMut<UserToggles>,
) {
    if keys.just_pressed(KeyCode::KeyM) {
        signals.prefers_reduced_motion = !signals.prefers_reduced_motion;
        info!("reduced motion: {}", signals.prefers_reduced_motion);
    }
    if keys.just_pressed(KeyCode::KeyH) {
        toggles.heavy_animations = !toggles.heavy_animations;
        info!("heavy animations: {}", toggles.heavy_animations);
    }
}

pub fn derive_policy(
    config: Res<EnvironmentConfig>,
    signals: Res<EnvironmentSignals>,
    mut policy: ResMut<PerformancePolicy>,
) {
    let next = PerformancePolicy::from_signals(&signals, &config.thresholds);
    if policy.set_if_neq(next) {
        debug!("performance policy {:?}", next);
    }
}
