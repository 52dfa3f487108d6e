//! State machine scenarios for a single executor against the in-memory device.

use mprofile_core::mocks::FakeDevice;
use mprofile_core::{ExecutorCfg, ExecutorState, OutputCommand, ProfileError, ProfileExecutor, Trajectory};
use mprofile_traits::{ProfileDevice, SetValue, TrajectoryPoint};
use rstest::rstest;

fn three_points() -> Vec<TrajectoryPoint> {
    vec![
        TrajectoryPoint::new(0.0, 0.0, 10).zeroing(),
        TrajectoryPoint::new(0.5, 30.0, 10),
        TrajectoryPoint::new(1.0, 0.0, 10).last(),
    ]
}

fn executor(points: Vec<TrajectoryPoint>, capacity: usize) -> ProfileExecutor<FakeDevice> {
    executor_with(points, capacity, ExecutorCfg::default())
}

fn executor_with(
    points: Vec<TrajectoryPoint>,
    capacity: usize,
    cfg: ExecutorCfg,
) -> ProfileExecutor<FakeDevice> {
    ProfileExecutor::new(FakeDevice::new(capacity), Trajectory::new(points), cfg, "left")
}

fn two_per_cycle() -> ExecutorCfg {
    ExecutorCfg {
        max_points_per_cycle: 2,
        ..ExecutorCfg::default()
    }
}

fn ramp(n: usize) -> Vec<TrajectoryPoint> {
    (0..n)
        .map(|i| TrajectoryPoint::new(i as f64, 0.0, 10))
        .collect()
}

/// Write the executor's set value to the device, as the side controller does.
fn apply(ex: &mut ProfileExecutor<FakeDevice>) {
    let value = ex.output().output_enum().unwrap_or(SetValue::Disable);
    ex.device_mut().set_output_enum(value).unwrap();
}

fn disable() -> OutputCommand {
    OutputCommand::profile(SetValue::Disable)
}

#[test]
fn three_points_two_per_cycle() {
    let mut ex = executor_with(three_points(), 8, two_per_cycle());
    ex.start_motion_profile().unwrap();
    assert_eq!(ex.state(), ExecutorState::Filling);

    // cycle 1: P1, P2
    ex.control();
    apply(&mut ex);
    assert_eq!(ex.device().pushed().len(), 2);
    assert_eq!(ex.state(), ExecutorState::Filling);
    assert_eq!(ex.output(), disable());

    // A disabled device executes nothing
    assert_eq!(ex.device_mut().drain(1), 0);
    assert_eq!(ex.device().buffered(), 2);

    // cycle 2: P3 (last)
    ex.control();
    apply(&mut ex);
    assert_eq!(ex.device().pushed().len(), 3);
    assert_eq!(ex.state(), ExecutorState::ReadyToFire);
    assert_eq!(ex.output(), disable());

    ex.fire().unwrap();
    assert_eq!(ex.state(), ExecutorState::Firing);
    assert_eq!(ex.output(), OutputCommand::profile(SetValue::Enable));
    apply(&mut ex);

    ex.control();
    assert_eq!(ex.state(), ExecutorState::Firing);

    assert_eq!(ex.device_mut().drain(3), 3);
    ex.control();
    assert_eq!(ex.state(), ExecutorState::Holding);
    assert_eq!(ex.output(), OutputCommand::profile(SetValue::Hold));

    // Hold sticks, and a second fire does nothing
    for _ in 0..5 {
        ex.control();
    }
    assert!(matches!(
        ex.fire(),
        Err(ProfileError::StaleFire(ExecutorState::Holding))
    ));
    assert_eq!(ex.state(), ExecutorState::Holding);
    assert_eq!(ex.output().output_enum(), Some(SetValue::Hold));
}

#[test]
fn full_buffer_ends_filling() {
    let mut ex = executor(ramp(5), 2);
    ex.start_motion_profile().unwrap();
    ex.control();
    assert_eq!(ex.state(), ExecutorState::ReadyToFire);
    assert_eq!(ex.cursor(), 2);
    assert_eq!(ex.remaining(), 3);

    // Nothing more is streamed until the profile fires
    ex.control();
    assert_eq!(ex.cursor(), 2);
}

#[test]
fn profile_longer_than_the_buffer_streams_while_firing() {
    let mut ex = executor(ramp(40), 8);
    ex.start_motion_profile().unwrap();
    ex.control();
    apply(&mut ex);
    assert_eq!(ex.state(), ExecutorState::ReadyToFire);
    assert!(ex.top_buffer_len() > 8);
    assert_eq!(ex.remaining(), 32);

    ex.fire().unwrap();
    apply(&mut ex);
    let mut cycles = 0;
    while ex.state() == ExecutorState::Firing && cycles < 100 {
        ex.device_mut().drain(3);
        ex.control();
        apply(&mut ex);
        assert!(ex.device().buffered() <= 8);
        cycles += 1;
    }

    assert_eq!(ex.state(), ExecutorState::Holding);
    assert_eq!(ex.remaining(), 0);
    let positions: Vec<f64> = ex.device().pushed().iter().map(|p| p.position).collect();
    let expected: Vec<f64> = (0..40).map(f64::from).collect();
    assert_eq!(positions, expected);
    assert!(ex.device().pushed()[39].is_last_point);
    assert_eq!(ex.device().last_set_value(), Some(SetValue::Hold));
}

#[rstest]
#[case::threshold_reached(5, ExecutorState::ReadyToFire)]
#[case::threshold_disabled(0, ExecutorState::Filling)]
fn minimum_buffered_points_gate_readiness(
    #[case] min_points_to_fire: usize,
    #[case] after_two_cycles: ExecutorState,
) {
    let mut ex = executor_with(
        ramp(10),
        64,
        ExecutorCfg {
            max_points_per_cycle: 3,
            no_progress_cycles: 0,
            min_points_to_fire,
        },
    );
    ex.start_motion_profile().unwrap();
    ex.control();
    assert_eq!(ex.device().pushed().len(), 3);
    assert_eq!(ex.state(), ExecutorState::Filling);
    ex.control();
    assert_eq!(ex.device().pushed().len(), 6);
    assert_eq!(ex.state(), after_two_cycles);
}

#[test]
fn fire_while_filling_is_stale() {
    let mut ex = executor_with(three_points(), 8, two_per_cycle());
    ex.start_motion_profile().unwrap();
    ex.control();
    assert!(matches!(
        ex.fire(),
        Err(ProfileError::StaleFire(ExecutorState::Filling))
    ));
    assert_eq!(ex.state(), ExecutorState::Filling);
}

#[test]
fn fire_while_idle_is_stale() {
    let mut ex = executor(three_points(), 2);
    assert!(ex.fire().is_err());
    ex.control();
    assert_eq!(ex.state(), ExecutorState::Idle);
    assert!(ex.device().pushed().is_empty());
}

#[test]
fn empty_source_stays_idle() {
    let mut ex = executor(Vec::new(), 4);
    assert_eq!(ex.start_motion_profile(), Err(ProfileError::EmptyProfile));
    assert_eq!(ex.state(), ExecutorState::Idle);
    ex.control();
    assert_eq!(ex.state(), ExecutorState::Idle);
    assert_eq!(ex.device().clears(), 0);
}

#[test]
fn closure_sources_are_loaded_on_every_arm() {
    let mut ex = ProfileExecutor::new(
        FakeDevice::new(4),
        || vec![TrajectoryPoint::new(0.0, 0.0, 10).last()],
        ExecutorCfg::default(),
        "right",
    );
    for _ in 0..2 {
        ex.start_motion_profile().unwrap();
        ex.control();
        assert_eq!(ex.state(), ExecutorState::ReadyToFire);
        ex.reset();
    }
    assert_eq!(ex.points_pushed(), 2);
}

#[rstest]
#[case::idle(0)]
#[case::filling(1)]
#[case::ready(2)]
#[case::firing(3)]
#[case::holding(4)]
fn reset_from_any_state(#[case] steps: usize) {
    let mut ex = executor_with(three_points(), 8, two_per_cycle());
    let drive: [fn(&mut ProfileExecutor<FakeDevice>); 4] = [
        |ex: &mut ProfileExecutor<FakeDevice>| {
            ex.start_motion_profile().unwrap();
            ex.control();
        },
        |ex: &mut ProfileExecutor<FakeDevice>| {
            ex.control();
        },
        |ex: &mut ProfileExecutor<FakeDevice>| {
            ex.fire().unwrap();
            apply(ex);
        },
        |ex: &mut ProfileExecutor<FakeDevice>| {
            ex.device_mut().drain(3);
            ex.control();
        },
    ];
    for step in drive.iter().take(steps) {
        step(&mut ex);
    }
    let expected = [
        ExecutorState::Idle,
        ExecutorState::Filling,
        ExecutorState::ReadyToFire,
        ExecutorState::Firing,
        ExecutorState::Holding,
    ][steps];
    assert_eq!(ex.state(), expected);

    ex.reset();
    assert_eq!(ex.state(), ExecutorState::Idle);
    assert_eq!(ex.cursor(), 0);
    assert_eq!(ex.top_buffer_len(), 0);
    assert_eq!(ex.device().buffered(), 0);
    assert_eq!(ex.output(), disable());

    // Idempotent
    ex.reset();
    assert_eq!(ex.state(), ExecutorState::Idle);
}

#[test]
fn push_failure_retries_the_same_point() {
    let mut ex = executor(three_points(), 8);
    ex.start_motion_profile().unwrap();
    ex.device_mut().set_fail_pushes(true);
    ex.control();
    assert_eq!(ex.cursor(), 0);
    assert_eq!(ex.state(), ExecutorState::Filling);

    ex.device_mut().set_fail_pushes(false);
    ex.control();
    assert_eq!(ex.cursor(), 3);
    let positions: Vec<f64> = ex.device().pushed().iter().map(|p| p.position).collect();
    assert_eq!(positions, vec![0.0, 0.5, 1.0]);
}

#[test]
fn full_buffer_is_retried_next_cycle() {
    let mut ex = executor(three_points(), 1);
    ex.start_motion_profile().unwrap();
    ex.control();
    assert_eq!(ex.state(), ExecutorState::ReadyToFire);
    ex.fire().unwrap();
    apply(&mut ex);
    ex.control();
    assert_eq!(ex.cursor(), 1, "no room, nothing pushed");
    ex.device_mut().drain(1);
    ex.control();
    assert_eq!(ex.cursor(), 2);
    assert_eq!(ex.device().pushed()[1].position, 0.5);
}

#[test]
fn rearm_requires_reset() {
    let mut ex = executor(three_points(), 4);
    ex.start_motion_profile().unwrap();
    ex.control();
    assert!(matches!(
        ex.start_motion_profile(),
        Err(ProfileError::State(_))
    ));
    ex.reset();
    ex.start_motion_profile().unwrap();
    assert_eq!(ex.state(), ExecutorState::Filling);
}
