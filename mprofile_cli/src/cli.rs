//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "mprofile", version, about = "Two-sided drivetrain motion-profile controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/mprofile.toml")]
    pub config: PathBuf,

    /// Emit JSON lines (cycle reports, summaries, errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the config and the trajectory it points at
    Check,
    /// Drive simulated controllers from a scripted gamepad
    Run {
        /// Input script TOML ([[step]] cycles/buttons/axes)
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Trajectory CSV; overrides [profile].trajectory
        #[arg(long, value_name = "FILE")]
        trajectory: Option<PathBuf>,
        /// Pace cycles on the wall clock instead of simulated time
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Stop after this many cycles (default: length of the script)
        #[arg(long, value_name = "N")]
        max_cycles: Option<u64>,
    },
    /// Arm, fire, and hold a built-in profile on simulated controllers
    SelfCheck,
}
