#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, trajectory tables, and input scripts for the drivetrain.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `trajectory` loads stored point tables from CSV with strict headers.
//! - `script` describes scripted operator input for simulation runs.
use serde::Deserialize;
use std::path::PathBuf;

pub mod script;
pub mod trajectory;

pub use script::{InputScript, ScriptStep, load_script_toml};
pub use trajectory::{TrajectoryRow, TrajectoryTable, load_trajectory_csv};

/// Highest joystick button id the controller reads (ids are 1-based).
pub const MAX_BUTTON_ID: usize = 11;
/// Highest joystick axis id.
pub const MAX_AXIS_ID: usize = 11;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Gains {
    pub f: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            f: 0.34,
            p: 0.2,
            i: 0.0,
            d: 0.0,
        }
    }
}

/// One drivetrain side: its lead controller and how the operator drives it.
#[derive(Debug, Deserialize)]
pub struct SideCfg {
    /// Bus id of the lead controller.
    pub device_id: u8,
    /// Optional follower controller slaved to the lead.
    #[serde(default)]
    pub follower_id: Option<u8>,
    #[serde(default)]
    pub invert_output: bool,
    #[serde(default)]
    pub invert_sensor: bool,
    #[serde(default = "default_codes_per_rev")]
    pub encoder_codes_per_rev: u32,
    #[serde(default)]
    pub gains: Gains,
    /// Volts commanded at full stick deflection.
    #[serde(default = "default_voltage_scale")]
    pub voltage_scale: f64,
    /// Joystick axis that drives this side manually.
    pub axis: usize,
}

fn default_codes_per_rev() -> u32 {
    1024
}

fn default_voltage_scale() -> f64 {
    12.0
}

impl SideCfg {
    /// Side-local checks. A failure here disables only this side.
    pub fn validate(&self, name: &str) -> eyre::Result<()> {
        if self.encoder_codes_per_rev == 0 {
            eyre::bail!("{name}.encoder_codes_per_rev must be > 0");
        }
        if !(self.voltage_scale.is_finite() && self.voltage_scale > 0.0) {
            eyre::bail!("{name}.voltage_scale must be finite and > 0");
        }
        if self.voltage_scale > 24.0 {
            eyre::bail!("{name}.voltage_scale is unreasonably large (>24 V)");
        }
        let g = &self.gains;
        if !(g.f.is_finite() && g.p.is_finite() && g.i.is_finite() && g.d.is_finite()) {
            eyre::bail!("{name}.gains must be finite");
        }
        if self.follower_id == Some(self.device_id) {
            eyre::bail!("{name}.follower_id must differ from device_id");
        }
        if self.axis > MAX_AXIS_ID {
            eyre::bail!("{name}.axis must be in 0..={MAX_AXIS_ID}");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProfileCfg {
    /// Trajectory CSV; relative paths resolve against the config file.
    pub trajectory: Option<PathBuf>,
    /// Upper bound on points streamed per side per cycle.
    pub max_points_per_cycle: usize,
    /// Points buffered before a profile may be fired (0: wait for a full buffer).
    pub min_points_to_fire: usize,
    /// Stream buffer depth of the simulated controllers.
    pub stream_capacity: usize,
    /// Warn after this many Firing cycles without playback progress (0 disables).
    pub no_progress_cycles: u32,
}

impl Default for ProfileCfg {
    fn default() -> Self {
        Self {
            trajectory: None,
            max_points_per_cycle: 16,
            min_points_to_fire: 5,
            stream_capacity: 128,
            no_progress_cycles: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Buttons {
    /// Held: motion-profile mode. Released: manual voltage drive.
    pub mode: usize,
    /// Pressed while the profile is buffered: start playback.
    pub fire: usize,
    /// Pressed while in profile mode: load and start streaming the profile.
    pub arm: usize,
}

impl Default for Buttons {
    fn default() -> Self {
        Self {
            mode: 5,
            fire: 6,
            arm: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    /// Negate stick axes so pushing forward reads positive.
    pub invert_axes: bool,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self { invert_axes: true }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Control loop rate.
    pub period_hz: u32,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { period_hz: 50 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub left: SideCfg,
    pub right: SideCfg,
    #[serde(default)]
    pub profile: ProfileCfg,
    #[serde(default)]
    pub buttons: Buttons,
    #[serde(default)]
    pub input: InputCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Checks shared by both sides. Per-side checks live in [`SideCfg::validate`]
    /// so a bad side can be disabled without taking the other one down.
    pub fn validate(&self) -> eyre::Result<()> {
        // Buttons
        for (name, id) in [
            ("buttons.mode", self.buttons.mode),
            ("buttons.fire", self.buttons.fire),
            ("buttons.arm", self.buttons.arm),
        ] {
            if !(1..=MAX_BUTTON_ID).contains(&id) {
                eyre::bail!("{name} must be in 1..={MAX_BUTTON_ID}");
            }
        }
        if self.buttons.mode == self.buttons.fire
            || self.buttons.mode == self.buttons.arm
            || self.buttons.fire == self.buttons.arm
        {
            eyre::bail!("buttons.mode, buttons.fire and buttons.arm must be distinct");
        }

        // Profile
        if self.profile.max_points_per_cycle == 0 {
            eyre::bail!("profile.max_points_per_cycle must be >= 1");
        }
        if self.profile.stream_capacity == 0 {
            eyre::bail!("profile.stream_capacity must be >= 1");
        }

        // Runner
        if self.runner.period_hz == 0 {
            eyre::bail!("runner.period_hz must be > 0");
        }
        if self.runner.period_hz > 1000 {
            eyre::bail!("runner.period_hz is unreasonably large (>1000)");
        }

        // Devices on the bus must not collide across sides
        if self.left.device_id == self.right.device_id {
            eyre::bail!("left.device_id and right.device_id must differ");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }

    /// Global checks plus both sides.
    pub fn validate_all(&self) -> eyre::Result<()> {
        self.validate()?;
        self.left.validate("left")?;
        self.right.validate("right")?;
        Ok(())
    }
}
