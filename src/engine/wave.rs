//! Wave fields sampled at every cell vertex.

use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::clock::STEPPED_PERIOD;
use crate::math;

/// Result of sampling the wave field at one position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSample {
    /// Vertical offset in pixels applied to a vertex.
    pub displacement: f32,
    /// Stroke/marker opacity in `[0, 1]`.
    pub alpha: f32,
}

/// A time-varying field evaluated at every cell vertex.
///
/// Implementations must be pure: identical `(pos, phase)` always yields the
/// identical sample.
pub trait WaveField {
    /// Samples the field at canvas position `pos` for animation `phase`.
    fn sample(&self, pos: Vec2, phase: f32) -> WaveSample;

    /// Moves the field's reference point (the viewport center).
    fn set_origin(&mut self, _origin: Vec2) {}
}

/// Opacity range shared by all variants.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct OpacityEnvelope {
    /// Floor of the alpha range.
    pub base: f32,
    /// Ceiling of the alpha range.
    pub pulse: f32,
}

impl OpacityEnvelope {
    fn at(&self, t: f32) -> f32 {
        math::lerp(self.base, self.pulse, t).clamp(0.0, 1.0)
    }
}

// ── Radial pulse ───────────────────────────────────────────────────

/// Sonar rings travelling outwards from the viewport center.
#[derive(Clone, Debug)]
pub struct RadialPulse {
    /// Alpha range the rings oscillate across.
    pub envelope: OpacityEnvelope,
    /// Center the rings radiate from.
    pub origin: Vec2,
    /// Spatial frequency of the main ring (radians per pixel).
    pub ring_frequency: f32,
    /// Phase velocity of the main ring.
    pub ring_speed: f32,
    /// Spatial frequency of the slower secondary swell.
    pub swell_frequency: f32,
    /// Phase velocity of the secondary swell.
    pub swell_speed: f32,
}

impl RadialPulse {
    /// Rings with the default frequencies for the given envelope.
    pub fn new(envelope: OpacityEnvelope) -> Self {
        Self {
            envelope,
            origin: Vec2::ZERO,
            ring_frequency: 0.02,
            ring_speed: 2.0,
            swell_frequency: 0.0053,
            swell_speed: 0.7,
        }
    }
}

impl WaveField for RadialPulse {
    fn sample(&self, pos: Vec2, phase: f32) -> WaveSample {
        let d = pos.distance(self.origin);
        let ring = (d * self.ring_frequency - phase * self.ring_speed).sin();
        let swell = (d * self.swell_frequency - phase * self.swell_speed + 1.3).cos();
        let s = 0.7 * ring + 0.3 * swell;
        WaveSample {
            displacement: 0.0,
            alpha: self.envelope.at(math::unit_wave(s)),
        }
    }

    fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }
}

// ── Ocean swell ────────────────────────────────────────────────────

/// One sinusoid of the swell: `amplitude * sin(k · dir·pos + ω·phase + offset)`.
#[derive(Clone, Copy, Debug, Reflect)]
pub struct SwellTerm {
    /// Peak displacement in pixels.
    pub amplitude: f32,
    /// Spatial direction; its length is the spatial frequency.
    pub wave_vector: Vec2,
    /// Phase velocity.
    pub speed: f32,
    /// Constant phase offset.
    pub offset: f32,
}

/// Multi-axis vertex displacement that reads as rolling water.
#[derive(Clone, Debug)]
pub struct OceanSwell {
    /// Alpha range following the normalized displacement.
    pub envelope: OpacityEnvelope,
    /// Superposed terms along x, y, and the diagonal.
    pub terms: [SwellTerm; 3],
}

impl OceanSwell {
    /// Three-term swell with incommensurate frequencies, ~20 px peak.
    pub fn new(envelope: OpacityEnvelope) -> Self {
        Self {
            envelope,
            terms: [
                SwellTerm {
                    amplitude: 10.0,
                    wave_vector: Vec2::new(0.011, 0.0),
                    speed: 1.0,
                    offset: 0.0,
                },
                SwellTerm {
                    amplitude: 6.0,
                    wave_vector: Vec2::new(0.0, 0.017),
                    speed: 1.37,
                    offset: 0.9,
                },
                SwellTerm {
                    amplitude: 4.0,
                    wave_vector: Vec2::new(0.0071, 0.0071),
                    speed: 0.61,
                    offset: 2.3,
                },
            ],
        }
    }

    /// Largest possible absolute displacement.
    pub fn peak(&self) -> f32 {
        self.terms.iter().map(|t| t.amplitude.abs()).sum()
    }
}

impl WaveField for OceanSwell {
    fn sample(&self, pos: Vec2, phase: f32) -> WaveSample {
        let displacement: f32 = self
            .terms
            .iter()
            .map(|t| t.amplitude * (t.wave_vector.dot(pos) + t.speed * phase + t.offset).sin())
            .sum();
        let peak = self.peak();
        let t = if peak > 0.0 {
            math::unit_wave(displacement / peak)
        } else {
            0.5
        };
        WaveSample {
            displacement,
            alpha: self.envelope.at(t),
        }
    }
}

// ── Noise drift ────────────────────────────────────────────────────

/// Fractal Perlin noise drifting through time.
///
/// The phase walks a circle through the last two noise axes, one turn per
/// [`STEPPED_PERIOD`], so the stepped clock's wrap back to zero lands on
/// the same sample.
#[derive(Clone, Debug)]
pub struct NoiseDrift {
    /// Alpha range mapped from the noise value.
    pub envelope: OpacityEnvelope,
    /// Peak displacement in pixels.
    pub amplitude: f32,
    /// Spatial scale divisor for noise sampling.
    pub spatial_scale: f64,
    /// Noise-space distance travelled per unit of phase.
    pub temporal_scale: f64,
    loop_period: f32,
    fbm: Fbm<Perlin>,
}

impl NoiseDrift {
    /// Seeded noise field with the given envelope.
    pub fn new(envelope: OpacityEnvelope, seed: u32) -> Self {
        Self {
            envelope,
            amplitude: 14.0,
            spatial_scale: 220.0,
            temporal_scale: 0.35,
            loop_period: STEPPED_PERIOD,
            fbm: Fbm::<Perlin>::new(seed).set_octaves(3),
        }
    }
}

impl WaveField for NoiseDrift {
    fn sample(&self, pos: Vec2, phase: f32) -> WaveSample {
        let turn = f64::from(phase / self.loop_period) * std::f64::consts::TAU;
        let loop_radius = self.temporal_scale * f64::from(self.loop_period) / std::f64::consts::TAU;
        let n = self.fbm.get([
            pos.x as f64 / self.spatial_scale,
            pos.y as f64 / self.spatial_scale,
            loop_radius * turn.cos(),
            loop_radius * turn.sin(),
        ]);
        WaveSample {
            displacement: math::map_noise_to_range(n, -self.amplitude, self.amplitude),
            alpha: self.envelope.at(math::map_noise_to_range(n, 0.0, 1.0)),
        }
    }
}

// ── Strategy selection ─────────────────────────────────────────────

/// Selectable wave variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum WaveVariant {
    /// Radial alpha rings.
    #[default]
    RadialPulse,
    /// Vertex displacement swell.
    OceanSwell,
    /// Seeded fractal noise.
    NoiseDrift,
}

impl WaveVariant {
    /// All variants, in cycling order.
    pub const ALL: [WaveVariant; 3] = [
        WaveVariant::RadialPulse,
        WaveVariant::OceanSwell,
        WaveVariant::NoiseDrift,
    ];

    /// Parses a short identifier (`"radial"`, `"ocean"`, `"noise"`).
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "radial" | "pulse" | "sonar" => Some(Self::RadialPulse),
            "ocean" | "swell" => Some(Self::OceanSwell),
            "noise" | "drift" => Some(Self::NoiseDrift),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn name(self) -> &'static str {
        match self {
            Self::RadialPulse => "Radial pulse",
            Self::OceanSwell => "Ocean swell",
            Self::NoiseDrift => "Noise drift",
        }
    }

    /// The variant after this one, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

const NOISE_SEED: u32 = 42;

/// Owned wave field of one backdrop instance.
#[derive(Component, Clone, Debug)]
pub enum WaveStrategy {
    /// See [`RadialPulse`].
    Radial(RadialPulse),
    /// See [`OceanSwell`].
    Ocean(OceanSwell),
    /// See [`NoiseDrift`].
    Noise(NoiseDrift),
}

impl WaveStrategy {
    /// Builds the field for `variant` with the given opacity envelope.
    pub fn new(variant: WaveVariant, envelope: OpacityEnvelope) -> Self {
        match variant {
            WaveVariant::RadialPulse => Self::Radial(RadialPulse::new(envelope)),
            WaveVariant::OceanSwell => Self::Ocean(OceanSwell::new(envelope)),
            WaveVariant::NoiseDrift => Self::Noise(NoiseDrift::new(envelope, NOISE_SEED)),
        }
    }

    /// Which variant this strategy implements.
    pub fn variant(&self) -> WaveVariant {
        match self {
            Self::Radial(_) => WaveVariant::RadialPulse,
            Self::Ocean(_) => WaveVariant::OceanSwell,
            Self::Noise(_) => WaveVariant::NoiseDrift,
        }
    }
}

impl WaveField for WaveStrategy {
    fn sample(&self, pos: Vec2, phase: f32) -> WaveSample {
        match self {
            Self::Radial(f) => f.sample(pos, phase),
            Self::Ocean(f) => f.sample(pos, phase),
            Self::Noise(f) => f.sample(pos, phase),
        }
    }

    fn set_origin(&mut self, origin: Vec2) {
        match self {
            Self::Radial(f) => f.set_origin(origin),
            Self::Ocean(f) => f.set_origin(origin),
            Self::Noise(f) => f.set_origin(origin),
        }
    }
}
