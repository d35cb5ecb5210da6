use bevy::prelude::*;

use crate::engine::policy::{RunDecision, RunGate};
use crate::engine::surface::FrameStats;
use crate::engine::tiling::{CellOrientation, CellSizing};

/// Root component of one mounted backdrop.
///
/// The sibling components on the same entity are the per-instance state:
/// `FrameScheduler`, `ViewportAdapter`, `WaveStrategy`, `BackdropStyle`,
/// `DisplayList` and [`BackdropStats`].
#[derive(Component, Clone, Debug)]
pub struct WaveBackdrop {
    /// Instance switches fed to the run/suspend reducer.
    pub gate: RunGate,
    /// Hexagon orientation of the tiling.
    pub orientation: CellOrientation,
    /// Cell radius per viewport class.
    pub sizing: CellSizing,
}

/// Last observed decision and frame counts, for the HUD.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct BackdropStats {
    /// Most recent run/suspend decision.
    pub decision: Option<RunDecision>,
    /// Counts from the last executed frame.
    pub last_frame: FrameStats,
}

/// User preferences that apply to every backdrop.
#[derive(Resource, Clone, Copy, Debug, Reflect)]
pub struct UserToggles {
    /// "Heavy animations" switch; off suspends gated backdrops.
    pub heavy_animations: bool,
}

impl Default for UserToggles {
    fn default() -> Self {
        Self {
            heavy_animations: true,
        }
    }
}
