//! Per-instance frame lifecycle on top of a display-synchronized callback host.
//!
//! At most one frame request is outstanding per instance. Frames arriving
//! sooner than the minimum interval re-request without advancing the clock.

use std::time::Duration;

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::clock::{AnimationClock, ClockMode};
use super::policy::{RunDecision, SuspendReason};

/// Opaque id of one outstanding frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Host mechanism that calls back once per displayed frame.
pub trait FrameHost {
    /// Asks for one callback on the next displayed frame.
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraws a request; cancelling an unknown handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Registry of outstanding frame requests, shared by every backdrop.
///
/// Each host update fires every request made before it, exactly once.
#[derive(Resource, Default, Debug)]
pub struct FrameCallbacks {
    next_id: u64,
    pending: HashSet<FrameHandle>,
}

impl FrameCallbacks {
    /// Consumes `handle` if it is due; `false` for cancelled or unknown handles.
    pub fn take(&mut self, handle: FrameHandle) -> bool {
        self.pending.remove(&handle)
    }

    /// Number of requests waiting for the next host frame.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl FrameHost for FrameCallbacks {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }
}

/// Lifecycle of one backdrop instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum SchedulerState {
    /// Not mounted, or mounted without a drawing surface.
    #[default]
    Idle,
    /// Requesting and executing frames.
    Running,
    /// Policy says pause; no frame is requested.
    Suspended(SuspendReason),
}

/// Result of delivering one host callback to the scheduler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameTick {
    /// Draw now at this phase.
    Render {
        /// Phase after advancing the clock.
        phase: f32,
    },
    /// Too soon since the last executed frame; the next one was requested.
    Throttled,
    /// The callback belongs to a cancelled or superseded request.
    Stale,
}

/// Drives the per-frame render cycle of one backdrop.
#[derive(Component, Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    pending: Option<FrameHandle>,
    min_interval: Duration,
    last_executed: Option<Duration>,
    clock: AnimationClock,
    executed: u64,
    throttled: u64,
}

impl FrameScheduler {
    /// Idle scheduler throttled to `min_interval` between executed frames.
    pub fn new(min_interval: Duration, clock: ClockMode, speed: f32) -> Self {
        Self {
            state: SchedulerState::Idle,
            pending: None,
            min_interval,
            last_executed: None,
            clock: AnimationClock::new(clock, speed),
            executed: 0,
            throttled: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Outstanding frame request, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Frames that rendered.
    pub fn executed_frames(&self) -> u64 {
        self.executed
    }

    /// Callbacks skipped by the throttle.
    pub fn throttled_frames(&self) -> u64 {
        self.throttled
    }

    /// Current animation phase.
    pub fn phase(&self) -> f32 {
        self.clock.phase()
    }

    /// Mounts the instance. Without a surface nothing is scheduled and the
    /// scheduler stays idle.
    pub fn start(
        &mut self,
        host: &mut impl FrameHost,
        decision: RunDecision,
        surface_ready: bool,
    ) -> SchedulerState {
        if self.state != SchedulerState::Idle || !surface_ready {
            return self.state;
        }
        self.state = match decision {
            RunDecision::Run => {
                self.last_executed = None;
                self.pending = Some(host.request_frame());
                SchedulerState::Running
            }
            RunDecision::Suspend(reason) => SchedulerState::Suspended(reason),
        };
        self.state
    }

    /// Re-evaluates a mounted instance against a fresh decision.
    pub fn apply(&mut self, host: &mut impl FrameHost, decision: RunDecision) -> SchedulerState {
        match (self.state, decision) {
            (SchedulerState::Idle, _) => {}
            (SchedulerState::Running, RunDecision::Run) => {}
            (SchedulerState::Suspended(_), RunDecision::Run) => {
                self.state = SchedulerState::Running;
                self.last_executed = None;
                self.pending = Some(host.request_frame());
            }
            (_, RunDecision::Suspend(reason)) => {
                self.cancel(host);
                self.state = SchedulerState::Suspended(reason);
            }
        }
        self.state
    }

    /// Unmounts: cancels the outstanding request and returns to idle.
    pub fn stop(&mut self, host: &mut impl FrameHost) {
        self.cancel(host);
        self.state = SchedulerState::Idle;
    }

    fn cancel(&mut self, host: &mut impl FrameHost) {
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
    }

    /// Delivers the host callback for `handle` at host time `now`.
    ///
    /// While running, the next frame is always requested; the clock only
    /// advances when at least the minimum interval has passed since the last
    /// executed frame.
    pub fn on_frame(
        &mut self,
        host: &mut impl FrameHost,
        handle: FrameHandle,
        now: Duration,
    ) -> FrameTick {
        if self.state != SchedulerState::Running || self.pending != Some(handle) {
            return FrameTick::Stale;
        }
        self.pending = Some(host.request_frame());

        if let Some(last) = self.last_executed
            && now.saturating_sub(last) < self.min_interval
        {
            self.throttled += 1;
            return FrameTick::Throttled;
        }
        self.last_executed = Some(now);
        self.executed += 1;
        FrameTick::Render {
            phase: self.clock.advance(now),
        }
    }
}
