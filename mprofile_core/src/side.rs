//! Drivetrain side controller: manual voltage drive or profile playback.

use mprofile_traits::ProfileDevice;

use crate::error::ProfileError;
use crate::executor::ProfileExecutor;
use crate::hw_error::map_hw_error;
use crate::status::{ExecutorState, OutputCommand};
use crate::util::sanitize_axis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl core::fmt::Display for Side {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One side of the drivetrain. Built through [`crate::builder`], which
/// configures the device first.
#[derive(Debug)]
pub struct DriveSide<D: ProfileDevice> {
    executor: ProfileExecutor<D>,
    side: Side,
    voltage_scale: f64,
}

impl<D: ProfileDevice> DriveSide<D> {
    pub(crate) fn from_parts(
        executor: ProfileExecutor<D>,
        side: Side,
        voltage_scale: f64,
    ) -> Self {
        Self {
            executor,
            side,
            voltage_scale,
        }
    }

    /// Per-cycle arbitration between manual drive and the executor.
    ///
    /// With the mode button released the executor is reset and the axis drives
    /// the side directly. With it held the executor advances, takes the fire
    /// edge if there is one, and its set value is returned.
    pub fn update(&mut self, mode_held: bool, fire_edge: bool, axis: f64) -> OutputCommand {
        if !mode_held {
            self.executor.reset();
            return OutputCommand::Voltage(self.voltage_scale * sanitize_axis(axis));
        }
        self.executor.control();
        if fire_edge && self.executor.fire().is_ok() {
            tracing::info!(side = %self.side, "profile fired");
        }
        self.executor.output()
    }

    /// Arm the executor with a fresh copy of the trajectory.
    pub fn start_motion_profile(&mut self) -> Result<(), ProfileError> {
        self.executor.start_motion_profile()
    }

    /// Hardware-write step for this cycle's command.
    pub fn apply(&mut self, cmd: &OutputCommand) {
        let res = match *cmd {
            OutputCommand::Voltage(v) => self.executor.device_mut().write_output(v),
            OutputCommand::ProfileValue { output, .. } => {
                self.executor.device_mut().set_output_enum(output)
            }
        };
        if let Err(e) = res {
            tracing::warn!(side = %self.side, error = %map_hw_error(&*e), "output write failed");
        }
    }

    /// Neutral output and a reset executor.
    pub fn disable(&mut self) {
        if let Err(e) = self.executor.device_mut().write_output(0.0) {
            tracing::warn!(side = %self.side, error = %map_hw_error(&*e), "neutral write failed");
        }
        self.executor.reset();
    }

    pub const fn side(&self) -> Side {
        self.side
    }

    pub const fn voltage_scale(&self) -> f64 {
        self.voltage_scale
    }

    pub const fn state(&self) -> ExecutorState {
        self.executor.state()
    }

    pub const fn executor(&self) -> &ProfileExecutor<D> {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut ProfileExecutor<D> {
        &mut self.executor
    }
}
