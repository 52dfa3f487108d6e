use std::sync::Arc;
use std::time::Duration;

use mprofile_hardware::error::HwError;
use mprofile_hardware::{OutputMode, SimulatedDevice};
use mprofile_traits::{Clock, DeviceSettings, Gains, ProfileDevice, SetValue, SimClock, TrajectoryPoint};
use rstest::rstest;

fn sim(capacity: usize) -> (SimulatedDevice, SimClock) {
    let clock = SimClock::new();
    let shared: Arc<dyn Clock + Send + Sync> = Arc::new(clock.clone());
    (SimulatedDevice::new(4, capacity, shared), clock)
}

#[rstest]
#[case(0, 0, true)]
#[case(1024, 0, false)]
#[case(4096, 3, false)]
fn configure_validates_settings(
    #[case] codes: u32,
    #[case] follower: u8,
    #[case] expect_err: bool,
) {
    let (mut dev, _clock) = sim(8);
    let settings = DeviceSettings {
        encoder_codes_per_rev: codes,
        follower_id: (follower > 0).then_some(follower),
        ..DeviceSettings::default()
    };
    assert_eq!(dev.configure(&settings).is_err(), expect_err);
}

#[test]
fn configure_rejects_non_finite_gains() {
    let (mut dev, _clock) = sim(8);
    let settings = DeviceSettings {
        gains: Gains {
            p: f64::NAN,
            ..Gains::default()
        },
        ..DeviceSettings::default()
    };
    let err = dev.configure(&settings).expect_err("NaN gain must be rejected");
    match err.downcast_ref::<HwError>() {
        Some(HwError::InvalidSettings(msg)) => assert!(msg.contains("gains")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn full_buffer_error_is_typed() {
    let (mut dev, _clock) = sim(1);
    let p = TrajectoryPoint::new(0.0, 0.0, 10);
    dev.push_trajectory_point(&p).unwrap();
    let err = dev.push_trajectory_point(&p).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HwError>(),
        Some(HwError::BufferFull { capacity: 1 })
    ));
}

#[test]
fn hold_keeps_last_position_and_stops_draining() {
    let (mut dev, clock) = sim(8);
    for i in 0..3 {
        let mut p = TrajectoryPoint::new(f64::from(i), 10.0, 10);
        if i == 2 {
            p = p.last();
        }
        dev.push_trajectory_point(&p).unwrap();
    }
    dev.set_output_enum(SetValue::Enable).unwrap();
    clock.advance(Duration::from_millis(30));
    assert!(dev.has_consumed_last_point().unwrap());
    dev.set_output_enum(SetValue::Hold).unwrap();
    clock.advance(Duration::from_millis(100));
    assert_eq!(dev.position(), 2.0);
    assert_eq!(dev.output_mode(), OutputMode::Profile(SetValue::Hold));
    assert_eq!(dev.pushed_total(), 3);
}

#[test]
fn clear_resets_consumption_state() {
    let (mut dev, clock) = sim(8);
    dev.push_trajectory_point(&TrajectoryPoint::new(1.0, 0.0, 5).last())
        .unwrap();
    dev.set_output_enum(SetValue::Enable).unwrap();
    clock.advance(Duration::from_millis(5));
    assert!(dev.has_consumed_last_point().unwrap());
    dev.clear_stream_buffer().unwrap();
    assert!(!dev.has_consumed_last_point().unwrap());
    assert_eq!(dev.buffered(), 0);
}

#[test]
fn voltage_mode_is_reported() {
    let (mut dev, _clock) = sim(8);
    dev.write_output(-6.0).unwrap();
    assert_eq!(dev.output_mode(), OutputMode::Voltage(-6.0));
}
