//! Runtime configuration for the executor, drive sides, and dispatcher.
//!
//! These are separate from the TOML-deserialized config in `mprofile_config`;
//! see `conversions` for the mapping.

use mprofile_traits::DeviceSettings;

/// Executor streaming limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorCfg {
    /// Upper bound on points pushed per `control()` call. Must be >= 1.
    pub max_points_per_cycle: usize,
    /// Warn after this many Firing cycles without device progress; 0 disables.
    pub no_progress_cycles: u32,
    /// Filling ends once this many points are buffered; 0 waits for a full
    /// buffer or the last point. The remainder streams while Firing.
    pub min_points_to_fire: usize,
}

impl Default for ExecutorCfg {
    fn default() -> Self {
        Self {
            max_points_per_cycle: 16,
            no_progress_cycles: 10,
            min_points_to_fire: 5,
        }
    }
}

/// Per-side drive settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SideCfg {
    /// Volts at full stick deflection. Finite and > 0.
    pub voltage_scale: f64,
    /// Applied to the device once at build time.
    pub device: DeviceSettings,
}

impl Default for SideCfg {
    fn default() -> Self {
        Self {
            voltage_scale: 12.0,
            device: DeviceSettings::default(),
        }
    }
}

/// Which buttons and axes drive the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMap {
    pub mode_button: usize,
    pub fire_button: usize,
    pub arm_button: usize,
    pub left_axis: usize,
    pub right_axis: usize,
    /// Negate axes so forward on the stick drives forward.
    pub invert_axes: bool,
}

impl Default for InputMap {
    fn default() -> Self {
        Self {
            mode_button: 5,
            fire_button: 6,
            arm_button: 4,
            left_axis: 1,
            right_axis: 5,
            invert_axes: true,
        }
    }
}
