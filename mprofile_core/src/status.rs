//! Executor state and the per-cycle output command.

use mprofile_traits::SetValue;

/// Where a side's executor is in the arm/fill/fire/hold sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExecutorState {
    /// No points loaded.
    #[default]
    Idle,
    /// Streaming points into the device until the last point is pushed, the
    /// device buffer is full, or enough points are buffered to start.
    Filling,
    /// Enough of the profile is buffered; waiting for the fire signal.
    ReadyToFire,
    /// Device is executing the profile while the remainder streams in.
    Firing,
    /// Last point consumed; the final setpoint is held until reset.
    Holding,
}

impl ExecutorState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Filling => "filling",
            Self::ReadyToFire => "ready_to_fire",
            Self::Firing => "firing",
            Self::Holding => "holding",
        }
    }
}

impl core::fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// What one side asks of its device this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputCommand {
    /// Direct teleoperated drive, in volts.
    Voltage(f64),
    /// Motion-profile output. `value` is the numeric code of `output`.
    ProfileValue { value: f64, output: SetValue },
}

impl OutputCommand {
    pub fn profile(output: SetValue) -> Self {
        Self::ProfileValue {
            value: f64::from(output.code()),
            output,
        }
    }

    /// The profile output enum, if this is a profile command.
    pub const fn output_enum(&self) -> Option<SetValue> {
        match self {
            Self::Voltage(_) => None,
            Self::ProfileValue { output, .. } => Some(*output),
        }
    }

    pub const fn is_voltage(&self) -> bool {
        matches!(self, Self::Voltage(_))
    }
}

impl Default for OutputCommand {
    fn default() -> Self {
        Self::profile(SetValue::Disable)
    }
}
