use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use mprofile_core::mocks::FakeDevice;
use mprofile_core::{ExecutorCfg, ExecutorState, ProfileExecutor, Trajectory};
use mprofile_traits::{ProfileDevice, SetValue, TrajectoryPoint};

fn ramp(n: usize) -> Trajectory {
    Trajectory::new(
        (0..n)
            .map(|i| TrajectoryPoint::new(i as f64 * 0.01, 10.0, 10))
            .collect(),
    )
}

// Arm, fire, and stream a full profile through a small buffer, draining a few
// points per cycle until the device holds.
pub fn bench_stream(c: &mut Criterion) {
    let mut g = c.benchmark_group("stream");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p mprofile_core --bench executor
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE")
        && let Ok(n) = ss.parse::<usize>()
    {
        g.sample_size(n.max(1));
    } else {
        g.sample_size(50);
    }

    for &len in &[64usize, 512, 2048] {
        let traj = ramp(len);
        g.bench_function(format!("points_{len}"), |b| {
            b.iter_batched(
                || {
                    ProfileExecutor::new(
                        FakeDevice::new(32),
                        traj.clone(),
                        ExecutorCfg::default(),
                        "bench",
                    )
                },
                |mut ex| {
                    ex.start_motion_profile().ok();
                    while ex.state() != ExecutorState::Holding {
                        ex.control();
                        if ex.fire().is_ok() {
                            ex.device_mut().set_output_enum(SetValue::Enable).ok();
                        }
                        ex.device_mut().drain(8);
                    }
                    black_box(ex.points_pushed())
                },
                BatchSize::SmallInput,
            );
        });
    }
    g.finish();
}

criterion_group!(benches, bench_stream);
criterion_main!(benches);
