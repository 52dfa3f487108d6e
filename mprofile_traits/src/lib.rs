pub mod clock;
pub mod device;
pub mod point;

pub use clock::{Clock, MonotonicClock, SimClock};
pub use device::{DeviceSettings, Gains, ProfileDevice};
pub use point::{SetValue, TrajectoryPoint};

/// Polled operator input (gamepad / joystick).
///
/// Button ids are 1-based like the driver-station numbering; id 0 is never
/// pressed.
pub trait InputSource {
    /// Latch a fresh sample; called once at the start of every cycle.
    fn poll(&mut self) {}
    fn raw_button(&mut self, id: usize) -> bool;
    /// Axis value in `[-1.0, 1.0]`.
    fn raw_axis(&mut self, id: usize) -> f64;
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn poll(&mut self) {
        (**self).poll();
    }
    fn raw_button(&mut self, id: usize) -> bool {
        (**self).raw_button(id)
    }
    fn raw_axis(&mut self, id: usize) -> f64 {
        (**self).raw_axis(id)
    }
}
