//! Simulation commands: `check`, `run`, and `self-check`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::{Result, WrapErr};
use mprofile_config::{Config, InputScript, TrajectoryTable};
use mprofile_core::{
    CycleReport, Dispatcher, DriveSide, Drivetrain, ExecutorCfg, ExecutorState, InputMap,
    OutputCommand, RunParams, RunSummary, Side, SideCfg, Trajectory, run,
};
use mprofile_hardware::{InputFrame, ScriptedGamepad, SimulatedDevice};
use mprofile_traits::{Clock, MonotonicClock, SimClock, TrajectoryPoint};
use serde_json::{Value, json};

use crate::error_fmt::Stage;

/// Read, parse, and globally validate the config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))
        .wrap_err(Stage::Config)?;
    let cfg = mprofile_config::load_toml(&text).wrap_err(Stage::Config)?;
    cfg.validate().wrap_err(Stage::Config)?;
    Ok(cfg)
}

/// CLI override first, then `[profile].trajectory` relative to the config file.
fn resolve_trajectory_path(
    cfg: &Config,
    config_path: &Path,
    cli: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(p) = cli {
        return Some(p.to_path_buf());
    }
    let p = cfg.profile.trajectory.as_deref()?;
    if p.is_absolute() {
        return Some(p.to_path_buf());
    }
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    Some(base.join(p))
}

fn load_trajectory(path: &Path) -> Result<TrajectoryTable> {
    mprofile_config::load_trajectory_csv(path).wrap_err(Stage::Trajectory)
}

fn load_script(path: &Path) -> Result<InputScript> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read script {}", path.display()))
        .wrap_err(Stage::Script)?;
    let script = mprofile_config::load_script_toml(&text).wrap_err(Stage::Script)?;
    script.validate().wrap_err(Stage::Script)?;
    Ok(script)
}

fn frames_from(script: &InputScript) -> Vec<InputFrame> {
    script
        .steps
        .iter()
        .map(|s| InputFrame {
            cycles: s.cycles,
            buttons: s.buttons.clone(),
            axes: s.axes.clone(),
        })
        .collect()
}

fn build_one(
    side: Side,
    raw: &mprofile_config::SideCfg,
    executor_cfg: ExecutorCfg,
    capacity: usize,
    trajectory: &Trajectory,
    clock: &Arc<dyn Clock + Send + Sync>,
) -> Result<DriveSide<SimulatedDevice>> {
    raw.validate(side.name()).wrap_err(Stage::Config)?;
    DriveSide::builder(side)
        .with_device(SimulatedDevice::new(
            raw.device_id,
            capacity,
            Arc::clone(clock),
        ))
        .with_trajectory(trajectory.clone())
        .with_side_cfg(SideCfg::from(raw))
        .with_executor_cfg(executor_cfg)
        .build()
}

/// Build both sides; a side that fails stays faulted and the other runs.
fn build_drivetrain(
    cfg: &Config,
    trajectory: &Trajectory,
    clock: &Arc<dyn Clock + Send + Sync>,
) -> Result<Drivetrain<SimulatedDevice>> {
    let executor_cfg = ExecutorCfg::from(&cfg.profile);
    let capacity = cfg.profile.stream_capacity;
    let left = build_one(Side::Left, &cfg.left, executor_cfg, capacity, trajectory, clock);
    let right = build_one(Side::Right, &cfg.right, executor_cfg, capacity, trajectory, clock);
    Drivetrain::from_results(left, right)
}

fn state_name(s: Option<ExecutorState>) -> Value {
    s.map_or(Value::Null, |s| Value::from(s.name()))
}

fn output_json(cmd: Option<OutputCommand>) -> Value {
    match cmd {
        None => Value::Null,
        Some(OutputCommand::Voltage(v)) => json!({ "kind": "voltage", "value": v }),
        Some(OutputCommand::ProfileValue { value, output }) => {
            json!({ "kind": "profile", "value": value, "enum": output.name() })
        }
    }
}

fn side_json(state: Option<ExecutorState>, cmd: Option<OutputCommand>) -> Value {
    if state.is_none() {
        return Value::Null;
    }
    json!({ "state": state_name(state), "output": output_json(cmd) })
}

fn cycle_json(r: &CycleReport) -> Value {
    json!({
        "cycle": r.cycle,
        "mode": r.mode_held,
        "armed": r.armed,
        "fired": r.fired,
        "left": side_json(r.left_state, r.outputs.left),
        "right": side_json(r.right_state, r.outputs.right),
    })
}

fn summary_json(s: &RunSummary) -> Value {
    json!({
        "summary": {
            "cycles": s.cycles,
            "missed_deadlines": s.missed_deadlines,
            "stopped_by": s.stopped_by.name(),
            "left": state_name(s.left_state),
            "right": state_name(s.right_state),
        }
    })
}

fn fmt_state(s: Option<ExecutorState>) -> &'static str {
    s.map_or("faulted", ExecutorState::name)
}

/// Prints human lines when something noteworthy happens in a cycle.
struct TextReporter {
    last: (Option<ExecutorState>, Option<ExecutorState>),
}

impl TextReporter {
    const fn new() -> Self {
        Self { last: (None, None) }
    }

    fn report(&mut self, r: &CycleReport) {
        if r.armed {
            println!("cycle {}: profile armed", r.cycle);
        }
        if r.fired {
            println!("cycle {}: profile fired", r.cycle);
        }
        let now = (r.left_state, r.right_state);
        if now != self.last {
            println!(
                "cycle {}: left={} right={}",
                r.cycle,
                fmt_state(r.left_state),
                fmt_state(r.right_state)
            );
            self.last = now;
        }
    }
}

fn print_summary(s: &RunSummary, json_mode: bool) {
    if json_mode {
        println!("{}", summary_json(s));
    } else {
        println!(
            "run complete: {} cycles ({} missed), stopped by {}; left={} right={}",
            s.cycles,
            s.missed_deadlines,
            s.stopped_by.name(),
            fmt_state(s.left_state),
            fmt_state(s.right_state)
        );
    }
}

fn drive(
    dispatcher: &mut Dispatcher<SimulatedDevice>,
    pad: &mut ScriptedGamepad,
    clock: &dyn Clock,
    params: RunParams,
    shutdown: &AtomicBool,
    json_mode: bool,
) -> RunSummary {
    let mut text = TextReporter::new();
    run(dispatcher, pad, clock, params, shutdown, |r| {
        if json_mode {
            println!("{}", cycle_json(r));
        } else {
            text.report(r);
        }
    })
}

/// Options for [`run_sim`].
pub struct SimOpts<'a> {
    pub config_path: &'a Path,
    pub script: &'a Path,
    pub trajectory: Option<&'a Path>,
    pub realtime: bool,
    pub max_cycles: Option<u64>,
    pub json: bool,
}

/// Drive simulated controllers with a scripted gamepad.
pub fn run_sim(opts: &SimOpts<'_>, shutdown: &AtomicBool) -> Result<RunSummary> {
    let cfg = load_config(opts.config_path)?;
    let traj_path = resolve_trajectory_path(&cfg, opts.config_path, opts.trajectory)
        .ok_or_else(|| eyre::eyre!("no trajectory: set [profile].trajectory or pass --trajectory"))
        .wrap_err(Stage::Trajectory)?;
    let table = load_trajectory(&traj_path)?;
    let trajectory = Trajectory::from(&table);
    let script = load_script(opts.script)?;

    let clock: Arc<dyn Clock + Send + Sync> = if opts.realtime {
        Arc::new(MonotonicClock::new())
    } else {
        Arc::new(SimClock::new())
    };

    let drivetrain = build_drivetrain(&cfg, &trajectory, &clock)?;
    let mut dispatcher = Dispatcher::new(drivetrain, InputMap::from(&cfg));
    let mut pad = ScriptedGamepad::new(frames_from(&script));

    let mut params = RunParams::from(&cfg.runner);
    params.max_cycles = Some(opts.max_cycles.unwrap_or_else(|| pad.total_cycles()));

    tracing::info!(
        trajectory = %traj_path.display(),
        points = table.len(),
        realtime = opts.realtime,
        "simulation starting"
    );
    let summary = drive(&mut dispatcher, &mut pad, &*clock, params, shutdown, opts.json);
    print_summary(&summary, opts.json);
    Ok(summary)
}

/// Full config validation, plus the trajectory when one is configured.
pub fn check(config_path: &Path, json_mode: bool) -> Result<()> {
    let cfg = load_config(config_path)?;
    cfg.validate_all().wrap_err(Stage::Config)?;
    let points = match resolve_trajectory_path(&cfg, config_path, None) {
        Some(p) => Some(load_trajectory(&p)?.len()),
        None => None,
    };
    if json_mode {
        println!(
            "{}",
            json!({
                "ok": true,
                "trajectory_points": points,
                "stream_capacity": cfg.profile.stream_capacity,
            })
        );
    } else {
        match points {
            Some(n) => println!("config OK ({n} trajectory points)"),
            None => println!("config OK (no trajectory configured)"),
        }
    }
    Ok(())
}

/// Arm, fire, and hold a short built-in profile on both simulated sides.
pub fn self_check(json_mode: bool) -> Result<()> {
    let map = InputMap::default();
    let trajectory = Trajectory::new(vec![
        TrajectoryPoint::new(0.0, 0.0, 10).zeroing(),
        TrajectoryPoint::new(0.5, 30.0, 10),
        TrajectoryPoint::new(1.0, 0.0, 10).last(),
    ]);
    let sim = SimClock::new();
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(sim.clone());
    let build = |side, id| {
        DriveSide::builder(side)
            .with_device(SimulatedDevice::new(id, 8, Arc::clone(&clock)))
            .with_trajectory(trajectory.clone())
            .build()
    };
    let drivetrain = Drivetrain::from_results(build(Side::Left, 1), build(Side::Right, 2))?;
    let mut dispatcher = Dispatcher::new(drivetrain, map);

    let frame = |cycles, buttons: &[usize]| InputFrame {
        cycles,
        buttons: buttons.to_vec(),
        axes: Vec::new(),
    };
    let mut pad = ScriptedGamepad::new(vec![
        frame(1, &[map.mode_button, map.arm_button]),
        frame(2, &[map.mode_button]),
        frame(1, &[map.mode_button, map.fire_button]),
        frame(10, &[map.mode_button]),
    ]);
    let params = RunParams {
        period_hz: 50,
        max_cycles: Some(pad.total_cycles()),
    };
    let stop = AtomicBool::new(false);
    let summary = run(&mut dispatcher, &mut pad, &sim, params, &stop, |_| {});

    let holding = summary.left_state == Some(ExecutorState::Holding)
        && summary.right_state == Some(ExecutorState::Holding);
    if !holding {
        eyre::bail!(
            "self-check failed: expected both sides holding, got left={} right={}",
            fmt_state(summary.left_state),
            fmt_state(summary.right_state)
        );
    }
    if json_mode {
        println!("{}", json!({ "self_check": "ok", "cycles": summary.cycles }));
    } else {
        println!("self-check OK");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_trajectory_resolves_against_config_dir() {
        let cfg = mprofile_config::load_toml(
            "[left]\ndevice_id = 3\naxis = 1\n[right]\ndevice_id = 1\naxis = 5\n[profile]\ntrajectory = \"path.csv\"\n",
        )
        .unwrap();
        let p = resolve_trajectory_path(&cfg, Path::new("/etc/mp/robot.toml"), None).unwrap();
        assert_eq!(p, Path::new("/etc/mp/path.csv"));
        let o = resolve_trajectory_path(&cfg, Path::new("robot.toml"), Some(Path::new("x.csv")));
        assert_eq!(o.unwrap(), Path::new("x.csv"));
    }

    #[test]
    fn cycle_json_marks_faulted_side_null() {
        let r = CycleReport {
            cycle: 2,
            mode_held: true,
            armed: false,
            fired: false,
            left_axis: 0.0,
            right_axis: 0.0,
            outputs: mprofile_core::DriveOutputs {
                left: Some(OutputCommand::Voltage(1.5)),
                right: None,
            },
            left_state: Some(ExecutorState::Idle),
            right_state: None,
        };
        let v = cycle_json(&r);
        assert_eq!(v["left"]["state"], "idle");
        assert_eq!(v["left"]["output"]["kind"], "voltage");
        assert!(v["right"].is_null());
    }

    #[test]
    fn self_check_passes() {
        self_check(false).unwrap();
    }
}
