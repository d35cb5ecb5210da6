//! Host environment sampling.
//!
//! Collects device hints, window visibility, battery charge and the user's
//! motion preference into [`EnvironmentSignals`], then folds them into the
//! shared [`PerformancePolicy`] whenever they change.

mod host;
mod systems;

use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::backdrop::BackdropSet;
use crate::engine::policy::{ConnectionType, DeviceThresholds, EnvironmentSignals, PerformancePolicy};

/// Overrides and polling settings for environment sampling.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct EnvironmentConfig {
    /// Hints below which the device counts as low-end.
    pub thresholds: DeviceThresholds,
    /// How often the battery is re-read.
    pub battery_poll_interval: Duration,
    /// Initial reduced-motion preference.
    pub prefers_reduced_motion: bool,
    /// Connection class; the desktop host cannot observe one.
    pub connection: Option<ConnectionType>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            thresholds: DeviceThresholds::default(),
            battery_poll_interval: Duration::from_secs(30),
            prefers_reduced_motion: false,
            connection: None,
        }
    }
}

/// Repeating timer for battery reads and the read in flight, if any.
#[derive(Resource)]
struct BatteryPoll {
    timer: Timer,
    task: Option<Task<Option<f32>>>,
}

/// Samples the environment and keeps [`PerformancePolicy`] current.
pub struct EnvironmentPlugin(pub EnvironmentConfig);

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EnvironmentConfig>()
            .register_type::<EnvironmentSignals>()
            .register_type::<PerformancePolicy>()
            .insert_resource(self.0.clone())
            .insert_resource(BatteryPoll {
                timer: Timer::new(self.0.battery_poll_interval, TimerMode::Repeating),
                task: None,
            })
            .init_resource::<EnvironmentSignals>()
            .init_resource::<PerformancePolicy>()
            .add_systems(Startup, systems::sample_device)
            .add_systems(
                Update,
                (
                    (
                        systems::track_visibility,
                        systems::poll_battery,
                        systems::toggle_preferences,
                    ),
                    systems::derive_policy.run_if(resource_changed::<EnvironmentSignals>),
                )
                    .chain()
                    .in_set(BackdropSet::Signals),
            );
    }
}

#[cfg(test)]
mod tests {
    use bevy::tasks::IoTaskPool;
    use bevy::time::TimeUpdateStrategy;
    use bevy::window::{PrimaryWindow, WindowOccluded};

    use super::*;
    use crate::backdrop::UserToggles;

    fn headless_app(config: EnvironmentConfig) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_message::<WindowOccluded>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<UserToggles>()
            .add_plugins(EnvironmentPlugin(config));
        app
    }

    #[test]
    fn startup_reads_window_area_and_preferences() {
        let mut app = headless_app(EnvironmentConfig {
            prefers_reduced_motion: true,
            connection: Some(ConnectionType::TwoG),
            ..default()
        });
        let mut window = Window::default();
        window.resolution.set(300.0, 200.0);
        app.world_mut().spawn((window, PrimaryWindow));
        app.update();

        let signals = app.world().resource::<EnvironmentSignals>();
        assert_eq!(signals.screen_area, Some(60_000.0));
        assert!(signals.hardware_concurrency.is_some());
        assert_eq!(signals.visible, Some(true));

        let policy = app.world().resource::<PerformancePolicy>();
        assert!(policy.prefers_reduced_motion);
        assert!(policy.is_low_end_device);
        assert_eq!(policy.connection_type, ConnectionType::TwoG);
    }

    #[test]
    fn occlusion_hides_and_reveals() {
        let mut app = headless_app(EnvironmentConfig::default());
        let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
        app.update();
        assert!(app.world().resource::<PerformancePolicy>().is_visible);

        app.world_mut().write_message(WindowOccluded {
            window,
            occluded: true,
        });
        app.update();
        assert!(!app.world().resource::<PerformancePolicy>().is_visible);

        app.world_mut().write_message(WindowOccluded {
            window,
            occluded: false,
        });
        app.update();
        assert!(app.world().resource::<PerformancePolicy>().is_visible);
    }

    #[test]
    fn keys_toggle_motion_and_heavy_animations() {
        let mut app = headless_app(EnvironmentConfig::default());
        app.update();
        assert!(!app.world().resource::<PerformancePolicy>().prefers_reduced_motion);

        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.press(KeyCode::KeyM);
        keys.press(KeyCode::KeyH);
        app.update();

        assert!(app.world().resource::<PerformancePolicy>().prefers_reduced_motion);
        assert!(!app.world().resource::<UserToggles>().heavy_animations);
    }

    #[test]
    fn finished_battery_read_reaches_the_policy() {
        let mut app = headless_app(EnvironmentConfig::default());
        app.update();
        let task = IoTaskPool::get().spawn(async { Some(0.1) });
        app.world_mut().resource_mut::<BatteryPoll>().task = Some(task);

        for _ in 0..200 {
            app.update();
            if app.world().resource::<BatteryPoll>().task.is_none() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(app.world().resource::<BatteryPoll>().task.is_none());
        assert_eq!(app.world().resource::<EnvironmentSignals>().battery_level, Some(0.1));
        assert_eq!(app.world().resource::<PerformancePolicy>().battery_level, 0.1);
    }

    #[test]
    fn elapsed_poll_interval_starts_a_read() {
        let mut app = headless_app(EnvironmentConfig {
            battery_poll_interval: Duration::from_millis(50),
            ..default()
        });
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(30)));
        // the first update only starts the clock
        app.update();
        app.update();
        assert!(app.world().resource::<BatteryPoll>().task.is_none());
        app.update();
        assert!(app.world().resource::<BatteryPoll>().task.is_some());
    }

    #[test]
    fn unchanged_signals_leave_policy_untouched() {
        let mut app = headless_app(EnvironmentConfig::default());
        app.update();
        let tick = app
            .world()
            .resource_ref::<PerformancePolicy>()
            .last_changed();
        app.update();
        app.update();
        assert_eq!(
            app.world().resource_ref::<PerformancePolicy>().last_changed(),
            tick
        );
    }
}
