//! Both drivetrain sides, operated in lockstep.
//!
//! A side whose device failed to configure stays faulted for the life of the
//! drivetrain and is never commanded; the healthy side keeps running.

use mprofile_traits::ProfileDevice;

use crate::error::Result;
use crate::side::{DriveSide, Side};
use crate::status::{ExecutorState, OutputCommand};

#[derive(Debug)]
pub enum SideSlot<D: ProfileDevice> {
    Active(DriveSide<D>),
    Faulted { reason: String },
}

impl<D: ProfileDevice> SideSlot<D> {
    pub const fn active(&self) -> Option<&DriveSide<D>> {
        match self {
            Self::Active(s) => Some(s),
            Self::Faulted { .. } => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut DriveSide<D>> {
        match self {
            Self::Active(s) => Some(s),
            Self::Faulted { .. } => None,
        }
    }
}

/// Commands for one cycle; `None` for a faulted side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveOutputs {
    pub left: Option<OutputCommand>,
    pub right: Option<OutputCommand>,
}

#[derive(Debug)]
pub struct Drivetrain<D: ProfileDevice> {
    left: SideSlot<D>,
    right: SideSlot<D>,
}

impl<D: ProfileDevice> Drivetrain<D> {
    pub fn new(left: DriveSide<D>, right: DriveSide<D>) -> Self {
        Self {
            left: SideSlot::Active(left),
            right: SideSlot::Active(right),
        }
    }

    /// Assemble from per-side build results. Fails only when neither side
    /// could be built.
    pub fn from_results(left: Result<DriveSide<D>>, right: Result<DriveSide<D>>) -> Result<Self> {
        match (left, right) {
            (Err(l), Err(r)) => Err(l.wrap_err(format!(
                "both drivetrain sides failed to build (right: {r})"
            ))),
            (l, r) => Ok(Self {
                left: Self::slot(Side::Left, l),
                right: Self::slot(Side::Right, r),
            }),
        }
    }

    fn slot(side: Side, res: Result<DriveSide<D>>) -> SideSlot<D> {
        match res {
            Ok(s) => SideSlot::Active(s),
            Err(e) => {
                tracing::error!(side = %side, error = %e, "side disabled: configuration failed");
                SideSlot::Faulted {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn update(
        &mut self,
        mode_held: bool,
        fire_edge: bool,
        left_axis: f64,
        right_axis: f64,
    ) -> DriveOutputs {
        DriveOutputs {
            left: self
                .left
                .active_mut()
                .map(|s| s.update(mode_held, fire_edge, left_axis)),
            right: self
                .right
                .active_mut()
                .map(|s| s.update(mode_held, fire_edge, right_axis)),
        }
    }

    pub fn apply(&mut self, outputs: &DriveOutputs) {
        if let (Some(s), Some(cmd)) = (self.left.active_mut(), outputs.left.as_ref()) {
            s.apply(cmd);
        }
        if let (Some(s), Some(cmd)) = (self.right.active_mut(), outputs.right.as_ref()) {
            s.apply(cmd);
        }
    }

    /// Arm every healthy side. Returns how many accepted.
    pub fn start_motion_profiles(&mut self) -> usize {
        [&mut self.left, &mut self.right]
            .into_iter()
            .filter_map(SideSlot::active_mut)
            .map(DriveSide::start_motion_profile)
            .filter(std::result::Result::is_ok)
            .count()
    }

    /// Disable hook: neutral output and reset on every healthy side.
    pub fn disable(&mut self) {
        for s in [&mut self.left, &mut self.right]
            .into_iter()
            .filter_map(SideSlot::active_mut)
        {
            s.disable();
        }
    }

    pub const fn slot_of(&self, side: Side) -> &SideSlot<D> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub const fn side(&self, side: Side) -> Option<&DriveSide<D>> {
        self.slot_of(side).active()
    }

    pub fn side_mut(&mut self, side: Side) -> Option<&mut DriveSide<D>> {
        match side {
            Side::Left => self.left.active_mut(),
            Side::Right => self.right.active_mut(),
        }
    }

    pub const fn is_faulted(&self, side: Side) -> bool {
        matches!(self.slot_of(side), SideSlot::Faulted { .. })
    }

    pub fn fault_reason(&self, side: Side) -> Option<&str> {
        match self.slot_of(side) {
            SideSlot::Faulted { reason } => Some(reason.as_str()),
            SideSlot::Active(_) => None,
        }
    }

    /// Executor state per side; `None` when faulted.
    pub fn state(&self, side: Side) -> Option<ExecutorState> {
        self.side(side).map(DriveSide::state)
    }
}
