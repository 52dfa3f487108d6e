#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core motion-profile logic (hardware-agnostic).
//!
//! All device interactions go through `mprofile_traits::ProfileDevice` and
//! operator input through `mprofile_traits::InputSource`.
//!
//! ## Architecture
//!
//! - **Edges**: press/release detection over polled snapshots (`edge`)
//! - **Executor**: per-side Idle → Filling → ReadyToFire → Firing → Holding
//!   state machine streaming a trajectory into the device (`executor`)
//! - **Side**: manual voltage drive vs. profile playback arbitration (`side`)
//! - **Drivetrain / Dispatcher**: both sides in lockstep, one cycle per call
//! - **Runner**: fixed-rate loop with shutdown flag and disable hook
//!
//! Per-cycle operations never return errors; device trouble is logged with
//! `tracing` and retried on the next cycle. Only construction can fail.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod dispatcher;
pub mod drivetrain;
pub mod edge;
pub mod error;
pub mod executor;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod side;
pub mod status;
pub mod trajectory;
pub mod util;

pub use builder::{DriveSideBuilder, Missing, Set, build_side};
pub use config::{ExecutorCfg, InputMap, SideCfg};
pub use dispatcher::{CycleReport, Dispatcher};
pub use drivetrain::{DriveOutputs, Drivetrain, SideSlot};
pub use edge::{ButtonEdges, ButtonSnapshot, MAX_BUTTONS, falling_edge, rising_edge};
pub use error::{BuildError, ProfileError, Result};
pub use executor::ProfileExecutor;
pub use hw_error::map_hw_error;
pub use runner::{RunParams, RunSummary, StopReason, run};
pub use side::{DriveSide, Side};
pub use status::{ExecutorState, OutputCommand};
pub use trajectory::{Trajectory, TrajectorySource};
