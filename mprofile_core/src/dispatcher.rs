//! One control cycle: read inputs, arbitrate both sides, write outputs.

use mprofile_traits::{InputSource, ProfileDevice};

use crate::config::InputMap;
use crate::drivetrain::{DriveOutputs, Drivetrain};
use crate::edge::{ButtonEdges, read_snapshot};
use crate::side::Side;
use crate::status::ExecutorState;
use crate::util::sanitize_axis;

/// What happened in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleReport {
    /// Zero-based cycle index.
    pub cycle: u64,
    pub mode_held: bool,
    /// At least one side accepted an arm request this cycle.
    pub armed: bool,
    /// At least one side went from ReadyToFire to Firing this cycle.
    pub fired: bool,
    pub left_axis: f64,
    pub right_axis: f64,
    pub outputs: DriveOutputs,
    pub left_state: Option<ExecutorState>,
    pub right_state: Option<ExecutorState>,
}

#[derive(Debug)]
pub struct Dispatcher<D: ProfileDevice> {
    drivetrain: Drivetrain<D>,
    edges: ButtonEdges,
    map: InputMap,
    cycles: u64,
}

impl<D: ProfileDevice> Dispatcher<D> {
    pub fn new(drivetrain: Drivetrain<D>, map: InputMap) -> Self {
        Self {
            drivetrain,
            edges: ButtonEdges::new(),
            map,
            cycles: 0,
        }
    }

    /// Run one cycle against a freshly polled input sample.
    ///
    /// Both sides share the mode and fire buttons. Pressing the arm button
    /// while mode is held starts both profiles; the edge snapshot is committed
    /// only after every edge query for this cycle.
    pub fn cycle<I: InputSource + ?Sized>(&mut self, input: &mut I) -> CycleReport {
        input.poll();
        let snap = read_snapshot(input);
        let mode_held = snap.get(self.map.mode_button).copied().unwrap_or(false);
        let fire_edge = self.edges.rising(&snap, self.map.fire_button);
        let arm_edge = self.edges.rising(&snap, self.map.arm_button);

        let sign = if self.map.invert_axes { -1.0 } else { 1.0 };
        let left_axis = sign * sanitize_axis(input.raw_axis(self.map.left_axis));
        let right_axis = sign * sanitize_axis(input.raw_axis(self.map.right_axis));

        let armed = mode_held && arm_edge && self.drivetrain.start_motion_profiles() > 0;

        let before = [
            self.drivetrain.state(Side::Left),
            self.drivetrain.state(Side::Right),
        ];
        let outputs = self
            .drivetrain
            .update(mode_held, fire_edge, left_axis, right_axis);
        self.drivetrain.apply(&outputs);
        let left_state = self.drivetrain.state(Side::Left);
        let right_state = self.drivetrain.state(Side::Right);
        let fired = [(before[0], left_state), (before[1], right_state)]
            .iter()
            .any(|&(b, a)| {
                b == Some(ExecutorState::ReadyToFire) && a == Some(ExecutorState::Firing)
            });

        self.edges.commit(snap);
        let cycle = self.cycles;
        self.cycles += 1;

        tracing::trace!(
            cycle,
            mode_held,
            armed,
            fired,
            left = ?left_state,
            right = ?right_state,
            "cycle"
        );

        CycleReport {
            cycle,
            mode_held,
            armed,
            fired,
            left_axis,
            right_axis,
            outputs,
            left_state,
            right_state,
        }
    }

    /// Disable hook for both sides.
    pub fn disable(&mut self) {
        tracing::info!("drivetrain disabled");
        self.drivetrain.disable();
    }

    pub const fn drivetrain(&self) -> &Drivetrain<D> {
        &self.drivetrain
    }

    pub fn drivetrain_mut(&mut self) -> &mut Drivetrain<D> {
        &mut self.drivetrain
    }

    pub const fn input_map(&self) -> &InputMap {
        &self.map
    }

    /// Cycles run so far.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }
}
