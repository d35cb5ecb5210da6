//! Environment signals, the performance policy derived from them, and the
//! reducer deciding whether an instance runs.

use bevy::prelude::*;

/// Network connection class, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ConnectionType {
    /// Effective type `slow-2g`.
    Slow2g,
    /// Effective type `2g`.
    TwoG,
    /// Effective type `3g`.
    ThreeG,
    /// Effective type `4g`.
    FourG,
    /// Wireless LAN.
    Wifi,
    /// Wired LAN.
    Ethernet,
    /// Reported but unclassified.
    #[default]
    Unknown,
}

impl ConnectionType {
    /// Parses an effective-type identifier such as `"3g"` or `"wifi"`.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "slow-2g" | "slow2g" => Some(Self::Slow2g),
            "2g" => Some(Self::TwoG),
            "3g" => Some(Self::ThreeG),
            "4g" => Some(Self::FourG),
            "wifi" => Some(Self::Wifi),
            "ethernet" => Some(Self::Ethernet),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Connections too slow to afford a heavy background.
    pub fn is_slow(self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

/// Raw environment readings. Every capability is optional; `None` means the
/// host does not expose it.
#[derive(Resource, Clone, Debug, Default, PartialEq, Reflect)]
pub struct EnvironmentSignals {
    /// Logical CPU count.
    pub hardware_concurrency: Option<usize>,
    /// Device memory in gigabytes.
    pub device_memory_gb: Option<f32>,
    /// Screen area in square logical pixels.
    pub screen_area: Option<f32>,
    /// Battery charge in `[0, 1]`.
    pub battery_level: Option<f32>,
    /// Network connection class.
    pub connection: Option<ConnectionType>,
    /// Whether the surface is currently visible.
    pub visible: Option<bool>,
    /// Accessibility request to minimize motion.
    pub prefers_reduced_motion: bool,
}

/// Hints below which a device counts as low-end.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct DeviceThresholds {
    /// Fewer logical CPUs than this is low-end.
    pub min_cores: usize,
    /// Less memory than this (GB) is low-end.
    pub min_memory_gb: f32,
    /// Smaller screens than this (square pixels) are low-end.
    pub min_screen_area: f32,
}

impl Default for DeviceThresholds {
    fn default() -> Self {
        Self {
            min_cores: 4,
            min_memory_gb: 4.0,
            min_screen_area: 320.0 * 480.0,
        }
    }
}

/// Aggregated inputs to the run/suspend decision.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct PerformancePolicy {
    /// Derived from hardware, screen and connection hints.
    pub is_low_end_device: bool,
    /// Accessibility request to minimize motion.
    pub prefers_reduced_motion: bool,
    /// Whether the surface is visible.
    pub is_visible: bool,
    /// Battery charge in `[0, 1]`.
    pub battery_level: f32,
    /// Network connection class.
    pub connection_type: ConnectionType,
}

impl Default for PerformancePolicy {
    fn default() -> Self {
        Self::from_signals(&EnvironmentSignals::default(), &DeviceThresholds::default())
    }
}

impl PerformancePolicy {
    /// Derives the policy, substituting a permissive value for every absent
    /// capability.
    pub fn from_signals(signals: &EnvironmentSignals, thresholds: &DeviceThresholds) -> Self {
        let few_cores = signals
            .hardware_concurrency
            .is_some_and(|n| n < thresholds.min_cores);
        let low_memory = signals
            .device_memory_gb
            .is_some_and(|gb| gb < thresholds.min_memory_gb);
        let tiny_screen = signals
            .screen_area
            .is_some_and(|a| a < thresholds.min_screen_area);
        let connection_type = signals.connection.unwrap_or_default();

        Self {
            is_low_end_device: few_cores || low_memory || tiny_screen || connection_type.is_slow(),
            prefers_reduced_motion: signals.prefers_reduced_motion,
            is_visible: signals.visible.unwrap_or(true),
            battery_level: signals.battery_level.map_or(1.0, |b| b.clamp(0.0, 1.0)),
            connection_type,
        }
    }
}

/// Per-instance switches combined with the shared policy.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct RunGate {
    /// Master on/off option of the instance.
    pub enabled: bool,
    /// User toggle for heavy animations.
    pub heavy_animations: bool,
    /// Whether device, visibility, battery and the user toggle are consulted.
    pub gated: bool,
    /// Battery level below which a gated instance suspends.
    pub low_battery_threshold: f32,
}

impl Default for RunGate {
    fn default() -> Self {
        Self {
            enabled: true,
            heavy_animations: true,
            gated: true,
            low_battery_threshold: 0.2,
        }
    }
}

/// Why an instance is not animating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum SuspendReason {
    /// The reduced-motion preference is set.
    ReducedMotion,
    /// The instance was configured off.
    Disabled,
    /// The user switched heavy animations off.
    HeavyAnimationsOff,
    /// The surface is hidden.
    Hidden,
    /// Battery is below the threshold.
    LowBattery,
    /// The device looks too weak.
    LowEndDevice,
}

/// Outcome of [`decide`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum RunDecision {
    /// Frames should be rendered.
    Run,
    /// No frames should be requested.
    Suspend(SuspendReason),
}

impl RunDecision {
    /// Whether this is [`RunDecision::Run`].
    pub fn is_run(self) -> bool {
        self == Self::Run
    }
}

/// Single reducer from signals to run/suspend. The first unfavorable signal
/// found determines the reason.
pub fn decide(policy: &PerformancePolicy, gate: &RunGate) -> RunDecision {
    use SuspendReason::*;

    if policy.prefers_reduced_motion {
        return RunDecision::Suspend(ReducedMotion);
    }
    if !gate.enabled {
        return RunDecision::Suspend(Disabled);
    }
    if !gate.gated {
        return RunDecision::Run;
    }
    if !gate.heavy_animations {
        return RunDecision::Suspend(HeavyAnimationsOff);
    }
    if !policy.is_visible {
        return RunDecision::Suspend(Hidden);
    }
    if policy.battery_level < gate.low_battery_threshold {
        return RunDecision::Suspend(LowBattery);
    }
    if policy.is_low_end_device {
        return RunDecision::Suspend(LowEndDevice);
    }
    RunDecision::Run
}
