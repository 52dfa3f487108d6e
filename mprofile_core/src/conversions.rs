//! `From` implementations bridging `mprofile_config` types to `mprofile_core` types.

use mprofile_traits::{DeviceSettings, Gains, TrajectoryPoint};

use crate::config::{ExecutorCfg, InputMap, SideCfg};
use crate::runner::RunParams;
use crate::trajectory::Trajectory;

// ── SideCfg ──────────────────────────────────────────────────────────────────

impl From<&mprofile_config::SideCfg> for SideCfg {
    fn from(c: &mprofile_config::SideCfg) -> Self {
        Self {
            voltage_scale: c.voltage_scale,
            device: DeviceSettings {
                encoder_codes_per_rev: c.encoder_codes_per_rev,
                invert_output: c.invert_output,
                invert_sensor: c.invert_sensor,
                gains: Gains {
                    f: c.gains.f,
                    p: c.gains.p,
                    i: c.gains.i,
                    d: c.gains.d,
                },
                follower_id: c.follower_id,
            },
        }
    }
}

// ── ExecutorCfg ──────────────────────────────────────────────────────────────

impl From<&mprofile_config::ProfileCfg> for ExecutorCfg {
    fn from(c: &mprofile_config::ProfileCfg) -> Self {
        Self {
            max_points_per_cycle: c.max_points_per_cycle,
            no_progress_cycles: c.no_progress_cycles,
            min_points_to_fire: c.min_points_to_fire,
        }
    }
}

// ── InputMap ─────────────────────────────────────────────────────────────────

impl From<&mprofile_config::Config> for InputMap {
    fn from(c: &mprofile_config::Config) -> Self {
        Self {
            mode_button: c.buttons.mode,
            fire_button: c.buttons.fire,
            arm_button: c.buttons.arm,
            left_axis: c.left.axis,
            right_axis: c.right.axis,
            invert_axes: c.input.invert_axes,
        }
    }
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl From<&mprofile_config::RunnerCfg> for RunParams {
    fn from(c: &mprofile_config::RunnerCfg) -> Self {
        Self {
            period_hz: c.period_hz,
            max_cycles: None,
        }
    }
}

// ── Trajectory ───────────────────────────────────────────────────────────────

/// The first row zeroes the sensor and the final row ends the profile.
impl From<&mprofile_config::TrajectoryTable> for Trajectory {
    fn from(t: &mprofile_config::TrajectoryTable) -> Self {
        let last = t.len().saturating_sub(1);
        let points = t
            .rows()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut p = TrajectoryPoint::new(r.position, r.velocity, r.duration_ms);
                p.zero_position = i == 0;
                p.is_last_point = i == last;
                p
            })
            .collect();
        Self::new(points)
    }
}
