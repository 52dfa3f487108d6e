use thiserror::Error;

use crate::status::ExecutorState;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("device stream buffer cannot accept more points")]
    Backpressure,
    #[error("trajectory source is empty")]
    EmptyProfile,
    #[error("fire ignored in state {0}")]
    StaleFire(ExecutorState),
    #[error("invalid state: {0}")]
    State(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing device")]
    MissingDevice,
    #[error("missing trajectory")]
    MissingTrajectory,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("{side} device configuration failed: {reason}")]
    DeviceConfig { side: &'static str, reason: String },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
