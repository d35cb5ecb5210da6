//! Viewport size tracking with debounced resizes.

use std::time::Duration;

use bevy::prelude::*;

/// Pixel dimensions of the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct ViewportState {
    /// Surface width in logical pixels.
    pub width: f32,
    /// Surface height in logical pixels.
    pub height: f32,
}

impl ViewportState {
    /// Builds a state, clamping negative or non-finite sizes to zero.
    pub fn new(width: f32, height: f32) -> Self {
        let sane = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: sane(width),
            height: sane(height),
        }
    }

    /// Center point of the surface.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// What the caller should do after feeding the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizeAction {
    /// Nothing changed.
    None,
    /// A resize is waiting for the quiet interval to elapse.
    Coalescing,
    /// The viewport now has these dimensions.
    Applied(ViewportState),
}

/// Keeps [`ViewportState`] in sync with surface resizes, debounced.
///
/// Resizes only register while the adapter is attached. Bursts coalesce:
/// the latest size wins and is applied once no new resize has arrived for
/// the debounce interval. The adapter never redraws; the next frame reads
/// the updated state.
#[derive(Component, Clone, Debug)]
pub struct ViewportAdapter {
    state: ViewportState,
    debounce: Duration,
    pending: Option<ViewportState>,
    last_event: Option<Duration>,
    listening: bool,
}

impl ViewportAdapter {
    /// Detached adapter with the given quiet interval.
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: ViewportState::default(),
            debounce,
            pending: None,
            last_event: None,
            listening: false,
        }
    }

    /// Starts listening, seeded with the current surface measurement.
    pub fn attach(&mut self, initial: ViewportState) {
        self.state = initial;
        self.pending = None;
        self.last_event = None;
        self.listening = true;
    }

    /// Stops listening and drops any pending resize.
    pub fn detach(&mut self) {
        self.listening = false;
        self.pending = None;
        self.last_event = None;
    }

    /// Whether a resize listener is currently registered.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Most recently applied dimensions.
    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Whether a resize is waiting to be applied.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feeds one resize notification observed at `now`.
    pub fn handle_resize_at(&mut self, width: f32, height: f32, now: Duration) -> ResizeAction {
        if !self.listening {
            return ResizeAction::None;
        }
        let size = ViewportState::new(width, height);
        if self.pending.is_none() && size == self.state {
            return ResizeAction::None;
        }
        self.pending = Some(size);
        self.last_event = Some(now);
        if self.debounce.is_zero() {
            return self.apply_pending();
        }
        ResizeAction::Coalescing
    }

    /// Applies the pending resize once the quiet interval has elapsed.
    pub fn tick_at(&mut self, now: Duration) -> ResizeAction {
        if !self.listening || self.pending.is_none() {
            return ResizeAction::None;
        }
        match self.time_until_apply(now) {
            Some(wait) if wait.is_zero() => self.apply_pending(),
            _ => ResizeAction::Coalescing,
        }
    }

    /// Time left before the pending resize applies.
    pub fn time_until_apply(&self, now: Duration) -> Option<Duration> {
        let _pending = self.pending?;
        let last = self.last_event?;
        let elapsed = now.saturating_sub(last);
        Some(self.debounce.saturating_sub(elapsed))
    }

    fn apply_pending(&mut self) -> ResizeAction {
        let Some(size) = self.pending.take() else {
            return ResizeAction::None;
        };
        self.last_event = None;
        self.state = size;
        ResizeAction::Applied(size)
    }
}
