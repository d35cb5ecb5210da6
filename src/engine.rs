//! Procedural background animation engine.
//!
//! Free of ECS systems: every type here can be driven from plain code and is
//! unit-tested that way. The Bevy-facing glue lives in [`crate::backdrop`].
//!
//! - [`wave`]: wave field sampler (radial pulse, ocean swell, noise drift).
//! - [`tiling`]: hexagonal tiling of the viewport.
//! - [`viewport`]: debounced viewport tracking.
//! - [`clock`]: animation phase sources.
//! - [`policy`]: environment signals and the run/suspend reducer.
//! - [`scheduler`]: per-instance frame lifecycle and throttling.
//! - [`surface`]: drawing surface, display list, per-frame rendering.

pub mod clock;
pub mod policy;
pub mod scheduler;
pub mod surface;
pub mod tiling;
pub mod viewport;
pub mod wave;
