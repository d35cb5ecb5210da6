//! Animated hexagon-wave backdrop.
//!
//! Each mounted backdrop is an entity carrying its own scheduler, viewport
//! adapter, wave field and display list. The Bevy `Update` schedule is the
//! display-synchronized callback: [`FrameCallbacks`] fires every outstanding
//! request once per update, executed frames redraw the display list, and
//! every update replays the display list through gizmos.

mod entities;
mod systems;

pub use entities::{BackdropStats, UserToggles, WaveBackdrop};
pub use systems::{backdrop_bundle, unmount_backdrops};

use std::time::Duration;

use bevy::prelude::*;

use crate::engine::clock::ClockMode;
use crate::engine::policy::PerformancePolicy;
use crate::engine::scheduler::FrameCallbacks;
use crate::engine::surface::{self, DEFAULT_COLOR};
use crate::engine::tiling::{CellOrientation, CellSizing};
use crate::engine::wave::{OpacityEnvelope, WaveVariant};

/// Pipeline ordering for backdrop update systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackdropSet {
    /// Environment signals are folded into the shared policy.
    Signals,
    /// Mounted instances start and re-evaluate run/suspend.
    Lifecycle,
    /// Resizes are coalesced and due frames execute.
    Frame,
    /// Display lists are replayed onto the screen.
    Draw,
}

/// Options of one backdrop instance.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct BackdropOptions {
    /// Floor of the alpha range.
    pub base_opacity: f32,
    /// Ceiling of the alpha range.
    pub pulse_opacity: f32,
    /// Base stroke color as `#rrggbb`.
    pub color: String,
    /// Multiplier on the phase advance.
    pub speed: f32,
    /// Master on/off switch.
    pub enabled: bool,
    /// Wave field strategy.
    pub variant: WaveVariant,
    /// Phase source.
    pub clock: ClockMode,
    /// Draw a marker at every vertex.
    pub vertex_markers: bool,
    /// Also suspend for device, visibility, battery and the user toggle.
    pub gated: bool,
    /// Hexagon orientation.
    pub orientation: CellOrientation,
    /// Cell radius per viewport class.
    pub sizing: CellSizing,
    /// Minimum time between executed frames.
    pub min_frame_interval: Duration,
    /// Quiet interval before a resize applies.
    pub resize_debounce: Duration,
    /// Battery level below which a gated instance suspends.
    pub low_battery_threshold: f32,
    /// Color behind the backdrop.
    pub clear_color: Color,
}

impl Default for BackdropOptions {
    fn default() -> Self {
        Self {
            base_opacity: 0.08,
            pulse_opacity: 0.45,
            color: "#4fc3f7".into(),
            speed: 1.0,
            enabled: true,
            variant: WaveVariant::RadialPulse,
            clock: ClockMode::default(),
            vertex_markers: true,
            gated: true,
            orientation: CellOrientation::PointyTop,
            sizing: CellSizing::default(),
            min_frame_interval: Duration::from_millis(33),
            resize_debounce: Duration::from_millis(100),
            low_battery_threshold: 0.2,
            clear_color: Color::srgb(0.02, 0.04, 0.09),
        }
    }
}

impl BackdropOptions {
    /// Opacity range clamped to `[0, 1]`, with the bounds swapped when
    /// given the wrong way round.
    pub fn envelope(&self) -> OpacityEnvelope {
        let base = self.base_opacity.clamp(0.0, 1.0);
        let pulse = self.pulse_opacity.clamp(0.0, 1.0);
        if pulse < base {
            warn!("pulse opacity {pulse} below base opacity {base}, swapping");
            return OpacityEnvelope {
                base: pulse,
                pulse: base,
            };
        }
        OpacityEnvelope { base, pulse }
    }

    /// Parsed stroke color; unparsable input falls back to the default.
    pub fn stroke_color(&self) -> bevy::color::Srgba {
        surface::parse_color(&self.color).unwrap_or_else(|err| {
            warn!("invalid backdrop color {:?} ({err}), using default", self.color);
            DEFAULT_COLOR
        })
    }
}

/// Backdrop plugin: frame host, lifecycle, frame driving and drawing.
///
/// The options become the default for every backdrop mounted with
/// [`backdrop_bundle`].
pub struct BackdropPlugin(pub BackdropOptions);

impl Plugin for BackdropPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BackdropOptions>()
            .register_type::<UserToggles>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .init_resource::<PerformancePolicy>()
            .init_resource::<FrameCallbacks>()
            .init_resource::<UserToggles>()
            .configure_sets(
                Update,
                (
                    BackdropSet::Signals,
                    BackdropSet::Lifecycle,
                    BackdropSet::Frame,
                    BackdropSet::Draw,
                )
                    .chain(),
            )
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                (
                    systems::start_backdrops,
                    systems::reevaluate_backdrops.run_if(
                        resource_changed::<PerformancePolicy>
                            .or(resource_changed::<UserToggles>),
                    ),
                    systems::cycle_variant,
                )
                    .chain()
                    .in_set(BackdropSet::Lifecycle),
            )
            .add_systems(
                Update,
                (systems::track_viewports, systems::drive_frames)
                    .chain()
                    .in_set(BackdropSet::Frame),
            )
            .add_systems(Update, systems::draw_display_lists.in_set(BackdropSet::Draw));
    }
}
