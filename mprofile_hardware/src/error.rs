use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("stream buffer full (capacity {capacity})")]
    BufferFull { capacity: usize },
    #[error("invalid device settings: {0}")]
    InvalidSettings(String),
    #[error("device fault: {0}")]
    Fault(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
