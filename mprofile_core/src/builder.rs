//! Type-state builder for `DriveSide` and generic `build_side` constructor.
//!
//! The builder enforces at compile time that a device and a trajectory are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks. Both paths configure the device before returning, so a
//! built side is ready to drive.

use std::marker::PhantomData;

use mprofile_traits::ProfileDevice;

use crate::config::{ExecutorCfg, SideCfg};
use crate::error::{BuildError, Result};
use crate::executor::ProfileExecutor;
use crate::hw_error::map_hw_error;
use crate::side::{DriveSide, Side};
use crate::trajectory::TrajectorySource;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `DriveSide`. All fields are validated on `build()`.
pub struct DriveSideBuilder<D, DS, TS> {
    side: Side,
    device: Option<D>,
    trajectory: Option<Box<dyn TrajectorySource + Send>>,
    side_cfg: Option<SideCfg>,
    executor_cfg: Option<ExecutorCfg>,
    _d: PhantomData<DS>,
    _t: PhantomData<TS>,
}

impl<D: ProfileDevice> DriveSide<D> {
    /// Start building one side.
    pub fn builder(side: Side) -> DriveSideBuilder<D, Missing, Missing> {
        DriveSideBuilder {
            side,
            device: None,
            trajectory: None,
            side_cfg: None,
            executor_cfg: None,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

/// Validate configuration, configure the device, and assemble the side.
///
/// This is the single source of truth for validation and construction,
/// used by both `DriveSideBuilder::try_build()` and `build_side()`.
fn validate_and_build<D: ProfileDevice>(
    mut device: D,
    source: Box<dyn TrajectorySource + Send>,
    side: Side,
    side_cfg: SideCfg,
    executor_cfg: ExecutorCfg,
) -> Result<DriveSide<D>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if !(side_cfg.voltage_scale.is_finite() && side_cfg.voltage_scale > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "voltage_scale must be finite and > 0",
        )));
    }
    if executor_cfg.max_points_per_cycle == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "max_points_per_cycle must be >= 1",
        )));
    }
    if side_cfg.device.encoder_codes_per_rev == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "encoder_codes_per_rev must be > 0",
        )));
    }
    if !side_cfg.device.gains.is_finite() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "gains must be finite",
        )));
    }

    // ── Device setup ─────────────────────────────────────────────────────────
    device.configure(&side_cfg.device).map_err(|e| {
        eyre::Report::new(BuildError::DeviceConfig {
            side: side.name(),
            reason: map_hw_error(&*e).to_string(),
        })
    })?;
    tracing::info!(
        side = %side,
        codes_per_rev = side_cfg.device.encoder_codes_per_rev,
        follower = ?side_cfg.device.follower_id,
        "device configured"
    );

    let executor = ProfileExecutor::with_source(device, source, executor_cfg, side.name());
    Ok(DriveSide::from_parts(executor, side, side_cfg.voltage_scale))
}

impl<D: ProfileDevice, DS, TS> DriveSideBuilder<D, DS, TS> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<DriveSide<D>> {
        let device = self
            .device
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDevice))?;
        let trajectory = self
            .trajectory
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTrajectory))?;

        validate_and_build(
            device,
            trajectory,
            self.side,
            self.side_cfg.unwrap_or_default(),
            self.executor_cfg.unwrap_or_default(),
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<D, DS, TS> DriveSideBuilder<D, DS, TS> {
    pub fn with_side_cfg(mut self, cfg: SideCfg) -> Self {
        self.side_cfg = Some(cfg);
        self
    }
    pub fn with_executor_cfg(mut self, cfg: ExecutorCfg) -> Self {
        self.executor_cfg = Some(cfg);
        self
    }
    pub fn with_voltage_scale(mut self, volts: f64) -> Self {
        let mut c = self.side_cfg.unwrap_or_default();
        c.voltage_scale = volts;
        self.side_cfg = Some(c);
        self
    }
}

// Setters that advance type-state
impl<D, TS> DriveSideBuilder<D, Missing, TS> {
    pub fn with_device(self, device: D) -> DriveSideBuilder<D, Set, TS> {
        DriveSideBuilder {
            side: self.side,
            device: Some(device),
            trajectory: self.trajectory,
            side_cfg: self.side_cfg,
            executor_cfg: self.executor_cfg,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<D, DS> DriveSideBuilder<D, DS, Missing> {
    pub fn with_trajectory(
        self,
        source: impl TrajectorySource + Send + 'static,
    ) -> DriveSideBuilder<D, DS, Set> {
        DriveSideBuilder {
            side: self.side,
            device: self.device,
            trajectory: Some(Box::new(source)),
            side_cfg: self.side_cfg,
            executor_cfg: self.executor_cfg,
            _d: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<D: ProfileDevice> DriveSideBuilder<D, Set, Set> {
    /// Validate and build. Only available when device and trajectory are set.
    pub fn build(self) -> Result<DriveSide<D>> {
        self.try_build()
    }
}

/// Build a side from concrete parts without the builder.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_side<D>(
    device: D,
    source: impl TrajectorySource + Send + 'static,
    side: Side,
    side_cfg: SideCfg,
    executor_cfg: ExecutorCfg,
) -> Result<DriveSide<D>>
where
    D: ProfileDevice,
{
    validate_and_build(device, Box::new(source), side, side_cfg, executor_cfg)
}
