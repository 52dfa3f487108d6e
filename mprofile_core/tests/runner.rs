//! End-to-end loop against simulated controllers on a simulated clock.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use mprofile_core::{
    Dispatcher, DriveSide, Drivetrain, ExecutorState, InputMap, RunParams, Side, StopReason,
    Trajectory, run,
};
use mprofile_hardware::{InputFrame, OutputMode, ScriptedGamepad, SimulatedDevice};
use mprofile_traits::{Clock, SetValue, SimClock, TrajectoryPoint};

fn rig(clock: &SimClock) -> Dispatcher<SimulatedDevice> {
    let shared: Arc<dyn Clock + Send + Sync> = Arc::new(clock.clone());
    let traj = Trajectory::new(vec![
        TrajectoryPoint::new(0.0, 0.0, 10).zeroing(),
        TrajectoryPoint::new(0.5, 30.0, 10),
        TrajectoryPoint::new(1.0, 0.0, 10).last(),
    ]);
    let build = |side, id| {
        DriveSide::builder(side)
            .with_device(SimulatedDevice::new(id, 8, Arc::clone(&shared)))
            .with_trajectory(traj.clone())
            .build()
    };
    let dt = Drivetrain::from_results(build(Side::Left, 3), build(Side::Right, 1)).unwrap();
    Dispatcher::new(dt, InputMap::default())
}

fn frame(cycles: u32, buttons: &[usize]) -> InputFrame {
    InputFrame {
        cycles,
        buttons: buttons.to_vec(),
        axes: Vec::new(),
    }
}

#[test]
fn scripted_run_reaches_hold_on_both_sides() {
    let clock = SimClock::new();
    let mut d = rig(&clock);
    let mut pad = ScriptedGamepad::new(vec![
        frame(1, &[5, 4]),
        frame(2, &[5]),
        frame(1, &[5, 6]),
        frame(10, &[5]),
    ]);
    let params = RunParams {
        period_hz: 50,
        max_cycles: Some(pad.total_cycles()),
    };
    let stop = AtomicBool::new(false);
    let mut fired_at = None;
    let summary = run(&mut d, &mut pad, &clock, params, &stop, |r| {
        if r.fired {
            fired_at = Some(r.cycle);
        }
    });

    assert_eq!(summary.stopped_by, StopReason::MaxCycles);
    assert_eq!(summary.cycles, 14);
    assert_eq!(fired_at, Some(3));
    assert_eq!(summary.left_state, Some(ExecutorState::Holding));
    assert_eq!(summary.right_state, Some(ExecutorState::Holding));
    assert_eq!(summary.missed_deadlines, 0);

    // Disable hook ran after the last cycle
    let left = d.drivetrain().side(Side::Left).unwrap();
    assert_eq!(left.state(), ExecutorState::Idle);
    assert_eq!(left.executor().device().output_mode(), OutputMode::Voltage(0.0));
    assert_eq!(left.executor().device().position(), 1.0);
    assert_eq!(left.executor().device().pushed_total(), 3);
}

#[test]
fn hold_output_reaches_the_device() {
    let clock = SimClock::new();
    let mut d = rig(&clock);
    let mut pad = ScriptedGamepad::new(vec![frame(1, &[5, 4]), frame(1, &[5, 6]), frame(5, &[5])]);
    let stop = AtomicBool::new(false);
    let mut last_mode = None;
    run(
        &mut d,
        &mut pad,
        &clock,
        RunParams {
            period_hz: 50,
            max_cycles: Some(7),
        },
        &stop,
        |r| last_mode = r.outputs.right.and_then(|c| c.output_enum()),
    );
    assert_eq!(last_mode, Some(SetValue::Hold));
}

#[test]
fn shutdown_flag_stops_before_first_cycle() {
    let clock = SimClock::new();
    let mut d = rig(&clock);
    let mut pad = ScriptedGamepad::new(vec![frame(5, &[5, 4])]);
    let stop = AtomicBool::new(true);
    let summary = run(&mut d, &mut pad, &clock, RunParams::default(), &stop, |_| {});
    assert_eq!(summary.stopped_by, StopReason::Shutdown);
    assert_eq!(summary.cycles, 0);
    assert!(summary.last_cycle.is_none());
    let right = d.drivetrain().side(Side::Right).unwrap();
    assert_eq!(right.executor().device().output_mode(), OutputMode::Voltage(0.0));
}

#[test]
fn long_profile_streams_through_a_small_buffer() {
    let clock = SimClock::new();
    let shared: Arc<dyn Clock + Send + Sync> = Arc::new(clock.clone());
    let traj = Trajectory::new(
        (0..40)
            .map(|i| TrajectoryPoint::new(f64::from(i), 0.0, 10))
            .collect(),
    );
    let build = |side, id| {
        DriveSide::builder(side)
            .with_device(SimulatedDevice::new(id, 8, Arc::clone(&shared)))
            .with_trajectory(traj.clone())
            .build()
    };
    let dt = Drivetrain::from_results(build(Side::Left, 3), build(Side::Right, 1)).unwrap();
    let mut d = Dispatcher::new(dt, InputMap::default());
    let mut pad = ScriptedGamepad::new(vec![
        frame(1, &[5, 4]),
        frame(1, &[5]),
        frame(1, &[5, 6]),
        frame(40, &[5]),
    ]);
    let params = RunParams {
        period_hz: 50,
        max_cycles: Some(pad.total_cycles()),
    };
    let stop = AtomicBool::new(false);
    let mut ready_after_arm = false;
    let mut holding_at = None;
    let summary = run(&mut d, &mut pad, &clock, params, &stop, |r| {
        if r.cycle == 0 {
            ready_after_arm = r.left_state == Some(ExecutorState::ReadyToFire);
        }
        if holding_at.is_none() && r.left_state == Some(ExecutorState::Holding) {
            holding_at = Some(r.cycle);
        }
    });

    assert!(ready_after_arm);
    assert!(holding_at.is_some());
    assert_eq!(summary.left_state, Some(ExecutorState::Holding));
    assert_eq!(summary.right_state, Some(ExecutorState::Holding));

    let left = d.drivetrain().side(Side::Left).unwrap();
    assert_eq!(left.executor().device().pushed_total(), 40);
    assert_eq!(left.executor().device().position(), 39.0);
}
