//! Host-side stand-ins for the motor controllers and the driver gamepad.
//!
//! Real controllers sit behind the same `mprofile_traits` contracts; this crate
//! only provides the simulated backends used by the CLI and the test suites.

pub mod error;
pub mod gamepad;
pub mod sim;

pub use gamepad::{InputFrame, ScriptedGamepad};
pub use sim::{OutputMode, SimulatedDevice};
