//! Scalar helpers shared by the wave fields and the animation clock.
//!
//! Plain `f32`/`Vec2` in, plain values out; nothing here touches the ECS.

use std::f32::consts::TAU;

use bevy::prelude::Vec2;

/// Rescales a noise sample into `[min, max]`.
///
/// Fractal noise drifts slightly past `[-1, 1]`; the sample is clamped to
/// that range before the linear map.
///
/// # Examples
/// ```
/// # use vodeco_backdrop::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, -20.0, 20.0), -20.0);
/// assert_eq!(map_noise_to_range(1.4, -20.0, 20.0), 20.0);
/// assert_eq!(map_noise_to_range(0.0, 2.0, 6.0), 4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    let n = noise_val.clamp(-1.0, 1.0) as f32;
    min + ((n + 1.0) / 2.0) * (max - min)
}

/// Rescales a sinusoid output in `[-1, 1]` to `[0, 1]`.
pub fn unit_wave(s: f32) -> f32 {
    (s.clamp(-1.0, 1.0) + 1.0) * 0.5
}

/// Linear interpolation from `a` to `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Raised-cosine easing over one full cycle.
///
/// `t` is the cycle progress in `[0, 1]`. Rises from 0 to 1 at `t = 0.5` and
/// falls back to 0 at `t = 1`, with zero slope at both ends, so consecutive
/// cycles join without a visible jump.
pub fn raised_cosine(t: f32) -> f32 {
    (1.0 - (TAU * t).cos()) * 0.5
}

/// Phase value of a fixed-duration repeating cycle.
///
/// `elapsed` and `cycle` are in seconds. Returns `span * raised_cosine(progress)`
/// where `progress = (elapsed mod cycle) / cycle`. A non-positive `cycle`
/// yields `0.0`.
///
/// # Examples
/// ```
/// # use vodeco_backdrop::math::eased_cycle_phase;
/// let start = eased_cycle_phase(0.0, 30.0, 10.0);
/// let wrap = eased_cycle_phase(30.0, 30.0, 10.0);
/// assert!((start - wrap).abs() < 1e-4);
/// ```
pub fn eased_cycle_phase(elapsed: f64, cycle: f64, span: f32) -> f32 {
    if cycle <= 0.0 || !cycle.is_finite() {
        return 0.0;
    }
    let progress = (elapsed.rem_euclid(cycle) / cycle) as f32;
    span * raised_cosine(progress)
}

/// Converts a canvas position (origin top-left, y down) to a 2D world
/// position (origin at the viewport center, y up).
pub fn canvas_to_world(p: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(p.x - viewport.x * 0.5, viewport.y * 0.5 - p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_extremes_map_to_bounds() {
        assert_eq!(map_noise_to_range(-1.0, 0.1, 0.6), 0.1);
        assert!((map_noise_to_range(1.0, 0.1, 0.6) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn noise_overshoot_is_clamped() {
        assert_eq!(map_noise_to_range(1.3, 0.0, 1.0), 1.0);
        assert_eq!(map_noise_to_range(-1.3, 0.0, 1.0), 0.0);
    }

    // ── unit_wave / lerp ────────────────────────────────────────────

    #[test]
    fn unit_wave_spans_zero_to_one() {
        assert_eq!(unit_wave(-1.0), 0.0);
        assert_eq!(unit_wave(1.0), 1.0);
        assert!((unit_wave(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(0.2, 0.8, 0.0), 0.2);
        assert!((lerp(0.2, 0.8, 1.0) - 0.8).abs() < 1e-6);
    }

    // ── raised_cosine / eased_cycle_phase ───────────────────────────

    #[test]
    fn raised_cosine_peaks_mid_cycle() {
        assert!(raised_cosine(0.0).abs() < 1e-6);
        assert!((raised_cosine(0.5) - 1.0).abs() < 1e-6);
        assert!(raised_cosine(1.0).abs() < 1e-5);
    }

    #[test]
    fn cycle_is_seamless_at_wrap() {
        let a = eased_cycle_phase(0.0, 30.0, 12.0);
        let b = eased_cycle_phase(30.0, 30.0, 12.0);
        assert!((a - b).abs() < 1e-4, "jump at wrap: {a} vs {b}");
    }

    #[test]
    fn cycle_is_continuous_across_wrap() {
        let before = eased_cycle_phase(29.999, 30.0, 12.0);
        let after = eased_cycle_phase(30.001, 30.0, 12.0);
        assert!((before - after).abs() < 1e-3);
    }

    #[test]
    fn cycle_repeats_every_period() {
        let a = eased_cycle_phase(7.25, 30.0, 5.0);
        let b = eased_cycle_phase(37.25, 30.0, 5.0);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn degenerate_cycle_is_zero() {
        assert_eq!(eased_cycle_phase(3.0, 0.0, 5.0), 0.0);
        assert_eq!(eased_cycle_phase(3.0, -1.0, 5.0), 0.0);
    }

    // ── canvas_to_world ─────────────────────────────────────────────

    #[test]
    fn canvas_origin_maps_to_top_left() {
        let w = canvas_to_world(Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert_eq!(w, Vec2::new(-400.0, 300.0));
    }

    #[test]
    fn canvas_center_maps_to_world_origin() {
        let w = canvas_to_world(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        assert_eq!(w, Vec2::ZERO);
    }
}
