//! Test and helper mocks for mprofile_core

use std::collections::VecDeque;

use mprofile_traits::{DeviceSettings, ProfileDevice, SetValue, TrajectoryPoint};

type DevResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Deterministic in-memory device. Nothing drains on its own; call
/// [`FakeDevice::drain`] to model the device executing points between cycles.
/// Like real controllers it only executes points while the last output enum
/// written was `Enable`.
#[derive(Debug, Clone)]
pub struct FakeDevice {
    capacity: usize,
    buffer: VecDeque<TrajectoryPoint>,
    pushed: Vec<TrajectoryPoint>,
    consumed_last: bool,
    underrun: bool,
    fail_pushes: bool,
    fail_status: bool,
    reject_configure: bool,
    set_value: Option<SetValue>,
    voltage: Option<f64>,
    settings: Option<DeviceSettings>,
    clears: usize,
}

impl FakeDevice {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            pushed: Vec::new(),
            consumed_last: false,
            underrun: false,
            fail_pushes: false,
            fail_status: false,
            reject_configure: false,
            set_value: None,
            voltage: None,
            settings: None,
            clears: 0,
        }
    }

    /// Execute up to `n` buffered points if playback is enabled. Returns the
    /// number executed.
    pub fn drain(&mut self, n: usize) -> usize {
        if self.set_value != Some(SetValue::Enable) {
            return 0;
        }
        let mut done = 0;
        for _ in 0..n {
            match self.buffer.pop_front() {
                Some(p) if p.is_last_point => self.consumed_last = true,
                Some(_) => {}
                None => break,
            }
            done += 1;
        }
        done
    }

    /// Every point ever accepted, in push order.
    pub fn pushed(&self) -> &[TrajectoryPoint] {
        &self.pushed
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub const fn last_set_value(&self) -> Option<SetValue> {
        self.set_value
    }

    pub const fn last_voltage(&self) -> Option<f64> {
        self.voltage
    }

    pub const fn settings(&self) -> Option<&DeviceSettings> {
        self.settings.as_ref()
    }

    /// Number of `clear_stream_buffer` calls.
    pub const fn clears(&self) -> usize {
        self.clears
    }

    pub fn set_fail_pushes(&mut self, fail: bool) {
        self.fail_pushes = fail;
    }

    pub fn set_fail_status(&mut self, fail: bool) {
        self.fail_status = fail;
    }

    pub fn set_reject_configure(&mut self, reject: bool) {
        self.reject_configure = reject;
    }

    pub fn latch_underrun(&mut self) {
        self.underrun = true;
    }

    pub const fn underrun(&self) -> bool {
        self.underrun
    }
}

impl ProfileDevice for FakeDevice {
    fn configure(&mut self, settings: &DeviceSettings) -> DevResult<()> {
        if self.reject_configure {
            return Err(Box::new(std::io::Error::other("device not responding")));
        }
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn push_trajectory_point(&mut self, point: &TrajectoryPoint) -> DevResult<()> {
        if self.fail_pushes {
            return Err(Box::new(std::io::Error::other("bus write failed")));
        }
        if self.buffer.len() >= self.capacity {
            return Err(Box::new(std::io::Error::other("stream buffer full")));
        }
        self.buffer.push_back(*point);
        self.pushed.push(*point);
        Ok(())
    }

    fn stream_buffer_free_slots(&mut self) -> DevResult<usize> {
        if self.fail_status {
            return Err(Box::new(std::io::Error::other("status frame missing")));
        }
        Ok(self.capacity.saturating_sub(self.buffer.len()))
    }

    fn has_consumed_last_point(&mut self) -> DevResult<bool> {
        if self.fail_status {
            return Err(Box::new(std::io::Error::other("status frame missing")));
        }
        Ok(self.consumed_last)
    }

    fn clear_stream_buffer(&mut self) -> DevResult<()> {
        self.buffer.clear();
        self.consumed_last = false;
        self.clears += 1;
        Ok(())
    }

    fn set_output_enum(&mut self, value: SetValue) -> DevResult<()> {
        self.set_value = Some(value);
        self.voltage = None;
        Ok(())
    }

    fn write_output(&mut self, volts: f64) -> DevResult<()> {
        self.voltage = Some(volts);
        self.set_value = None;
        Ok(())
    }

    fn has_underrun(&mut self) -> DevResult<bool> {
        Ok(self.underrun)
    }

    fn clear_underrun(&mut self) -> DevResult<()> {
        self.underrun = false;
        Ok(())
    }
}
