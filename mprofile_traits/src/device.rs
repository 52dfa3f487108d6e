//! Command/status contract of a motion-profile capable motor controller.

use crate::point::{SetValue, TrajectoryPoint};

/// Closed-loop gains loaded into the controller's profile slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub f: f64,
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            f: 0.34,
            p: 0.2,
            i: 0.0,
            d: 0.0,
        }
    }
}

impl Gains {
    pub fn is_finite(&self) -> bool {
        self.f.is_finite() && self.p.is_finite() && self.i.is_finite() && self.d.is_finite()
    }
}

/// Construction-time device setup, applied once when a drive side is built.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSettings {
    /// Quadrature encoder resolution.
    pub encoder_codes_per_rev: u32,
    pub invert_output: bool,
    /// Keep the sensor in phase with the motor.
    pub invert_sensor: bool,
    pub gains: Gains,
    /// A second controller slaved to this one, if any.
    pub follower_id: Option<u8>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            encoder_codes_per_rev: 1024,
            invert_output: false,
            invert_sensor: false,
            gains: Gains::default(),
            follower_id: None,
        }
    }
}

/// The device's half of motion-profile streaming.
///
/// The device owns the bounded stream (bottom) buffer and drains it on its own
/// schedule, so callers must re-query capacity every cycle.
pub trait ProfileDevice {
    fn configure(
        &mut self,
        settings: &DeviceSettings,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Append one point to the stream buffer. Fails when the buffer is full.
    fn push_trajectory_point(
        &mut self,
        point: &TrajectoryPoint,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn stream_buffer_free_slots(
        &mut self,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// True once the point flagged `is_last_point` has been executed.
    fn has_consumed_last_point(
        &mut self,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    fn clear_stream_buffer(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Motion-profile mode: select the profile output state.
    fn set_output_enum(
        &mut self,
        value: SetValue,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Voltage mode: drive the output directly.
    fn write_output(&mut self, volts: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Latched when the device ran out of points before the last one.
    fn has_underrun(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(false)
    }

    fn clear_underrun(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

impl<T: ProfileDevice + ?Sized> ProfileDevice for Box<T> {
    fn configure(
        &mut self,
        settings: &DeviceSettings,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).configure(settings)
    }
    fn push_trajectory_point(
        &mut self,
        point: &TrajectoryPoint,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).push_trajectory_point(point)
    }
    fn stream_buffer_free_slots(
        &mut self,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        (**self).stream_buffer_free_slots()
    }
    fn has_consumed_last_point(
        &mut self,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).has_consumed_last_point()
    }
    fn clear_stream_buffer(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).clear_stream_buffer()
    }
    fn set_output_enum(
        &mut self,
        value: SetValue,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_output_enum(value)
    }
    fn write_output(&mut self, volts: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_output(volts)
    }
    fn has_underrun(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).has_underrun()
    }
    fn clear_underrun(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).clear_underrun()
    }
}
