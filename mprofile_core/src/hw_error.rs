//! Maps `Box<dyn Error>` from trait boundaries to typed `ProfileError`.
//!
//! The traits in `mprofile_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our typed error enum, with an optional
//! feature-gated path for `mprofile_hardware::HwError` downcasting.

use crate::error::ProfileError;

/// Map a trait-boundary error to a typed `ProfileError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> ProfileError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<mprofile_hardware::error::HwError>() {
            return match hw {
                mprofile_hardware::error::HwError::BufferFull { .. } => ProfileError::Backpressure,
                other => ProfileError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("full") || lower.contains("capacity") {
        ProfileError::Backpressure
    } else {
        ProfileError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_fall_back_to_message() {
        let e = std::io::Error::other("bus timeout");
        assert_eq!(
            map_hw_error(&e),
            ProfileError::Hardware("bus timeout".into())
        );
        let e = std::io::Error::other("queue full");
        assert_eq!(map_hw_error(&e), ProfileError::Backpressure);
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_are_downcast() {
        use mprofile_hardware::error::HwError;
        assert_eq!(
            map_hw_error(&HwError::BufferFull { capacity: 4 }),
            ProfileError::Backpressure
        );
        assert!(matches!(
            map_hw_error(&HwError::Fault("overcurrent".into())),
            ProfileError::HardwareFault(_)
        ));
    }
}
