//! Animation phase sources: a stepped per-frame counter and a wall-clock
//! cycle eased through a raised cosine.

use std::f32::consts::TAU;
use std::time::Duration;

use bevy::prelude::*;

use crate::math;

/// Wrap period of the default stepped clock.
pub const STEPPED_PERIOD: f32 = TAU * 100.0;

/// How the animation phase advances.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub enum ClockMode {
    /// Fixed increment per rendered frame, wrapped at `period` when set.
    Stepped {
        /// Phase added per executed frame (before the speed multiplier).
        increment: f32,
        /// Wrap the phase back into `[0, period)`.
        period: Option<f32>,
    },
    /// Wall-clock time eased through a raised cosine of fixed duration.
    Cyclic {
        /// Cycle length.
        cycle: Duration,
        /// Peak phase reached mid-cycle.
        span: f32,
    },
}

impl Default for ClockMode {
    fn default() -> Self {
        Self::Stepped {
            increment: 0.02,
            period: Some(STEPPED_PERIOD),
        }
    }
}

impl ClockMode {
    /// 30-second seamless loop.
    pub fn thirty_second_loop() -> Self {
        Self::Cyclic {
            cycle: Duration::from_secs(30),
            span: 12.0,
        }
    }
}

/// Elapsed animation time fed to the wave field.
#[derive(Clone, Debug)]
pub struct AnimationClock {
    mode: ClockMode,
    speed: f32,
    phase: f32,
    started: Option<Duration>,
}

impl AnimationClock {
    /// Clock at phase zero. Negative speeds are treated as zero.
    pub fn new(mode: ClockMode, speed: f32) -> Self {
        Self {
            mode,
            speed: speed.max(0.0),
            phase: 0.0,
            started: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advances once for a rendered frame at host time `now`.
    pub fn advance(&mut self, now: Duration) -> f32 {
        match self.mode {
            ClockMode::Stepped { increment, period } => {
                self.phase += increment * self.speed;
                if let Some(p) = period.filter(|p| *p > 0.0) {
                    self.phase = self.phase.rem_euclid(p);
                }
            }
            ClockMode::Cyclic { cycle, span } => {
                let start = *self.started.get_or_insert(now);
                let elapsed = now.saturating_sub(start).as_secs_f64() * self.speed as f64;
                self.phase = math::eased_cycle_phase(elapsed, cycle.as_secs_f64(), span);
            }
        }
        self.phase
    }
}
