//! Simulated motion-profile motor controller.
//!
//! The stream buffer drains against a shared [`Clock`]: while the output is
//! `Enable`, each buffered point is executed for its `duration_ms` and then
//! popped. Every trait call first catches the simulation up to `clock.now()`,
//! which models the controller consuming points between control cycles.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use mprofile_traits::{Clock, DeviceSettings, ProfileDevice, SetValue, TrajectoryPoint};

use crate::error::HwError;

/// Output the simulated controller is currently producing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Voltage(f64),
    Profile(SetValue),
}

pub struct SimulatedDevice {
    id: u8,
    capacity: usize,
    buffer: VecDeque<TrajectoryPoint>,
    clock: Arc<dyn Clock + Send + Sync>,
    last_tick: Instant,
    // Time already spent executing the front point.
    carry_ms: u64,
    mode: OutputMode,
    position: f64,
    consumed_last: bool,
    underrun: bool,
    settings: Option<DeviceSettings>,
    pushed_total: u64,
    fault: Option<String>,
}

impl core::fmt::Debug for SimulatedDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulatedDevice")
            .field("id", &self.id)
            .field("buffered", &self.buffer.len())
            .field("capacity", &self.capacity)
            .field("mode", &self.mode)
            .field("position", &self.position)
            .finish()
    }
}

impl SimulatedDevice {
    pub fn new(id: u8, capacity: usize, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let last_tick = clock.now();
        Self {
            id,
            capacity: capacity.max(1),
            buffer: VecDeque::with_capacity(capacity.max(1)),
            clock,
            last_tick,
            carry_ms: 0,
            mode: OutputMode::Voltage(0.0),
            position: 0.0,
            consumed_last: false,
            underrun: false,
            settings: None,
            pushed_total: 0,
            fault: None,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Points waiting in the stream buffer.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Position of the most recently executed point.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn output_mode(&self) -> OutputMode {
        self.mode
    }

    pub fn settings(&self) -> Option<&DeviceSettings> {
        self.settings.as_ref()
    }

    /// Total points accepted since construction.
    pub fn pushed_total(&self) -> u64 {
        self.pushed_total
    }

    /// Make every subsequent call fail until [`Self::clear_fault`].
    pub fn inject_fault(&mut self, msg: impl Into<String>) {
        self.fault = Some(msg.into());
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    fn check_fault(&self) -> Result<(), HwError> {
        match &self.fault {
            Some(msg) => Err(HwError::Fault(msg.clone())),
            None => Ok(()),
        }
    }

    /// Execute buffered points for the time elapsed since the last call.
    fn tick(&mut self) {
        let now = self.clock.now();
        let dt = u64::try_from(now.saturating_duration_since(self.last_tick).as_millis())
            .unwrap_or(u64::MAX);
        self.last_tick = now;

        if self.mode != OutputMode::Profile(SetValue::Enable) {
            self.carry_ms = 0;
            return;
        }
        self.carry_ms = self.carry_ms.saturating_add(dt);
        while let Some(front) = self.buffer.front() {
            let dur = u64::from(front.duration_ms.max(1));
            if self.carry_ms < dur {
                break;
            }
            self.carry_ms -= dur;
            if let Some(p) = self.buffer.pop_front() {
                self.position = p.position;
                if p.is_last_point {
                    self.consumed_last = true;
                }
            }
        }
        if self.buffer.is_empty() && !self.consumed_last {
            if !self.underrun {
                tracing::warn!(device = self.id, "stream buffer underrun");
            }
            self.underrun = true;
            self.carry_ms = 0;
        }
    }
}

impl ProfileDevice for SimulatedDevice {
    fn configure(
        &mut self,
        settings: &DeviceSettings,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check_fault()?;
        if settings.encoder_codes_per_rev == 0 {
            return Err(Box::new(HwError::InvalidSettings(
                "encoder_codes_per_rev must be > 0".into(),
            )));
        }
        if !settings.gains.is_finite() {
            return Err(Box::new(HwError::InvalidSettings(
                "gains must be finite".into(),
            )));
        }
        if settings.follower_id == Some(self.id) {
            return Err(Box::new(HwError::InvalidSettings(
                "device cannot follow itself".into(),
            )));
        }
        tracing::debug!(
            device = self.id,
            codes_per_rev = settings.encoder_codes_per_rev,
            invert_output = settings.invert_output,
            follower = ?settings.follower_id,
            "device configured"
        );
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn push_trajectory_point(
        &mut self,
        point: &TrajectoryPoint,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.tick();
        self.check_fault()?;
        if self.buffer.len() >= self.capacity {
            return Err(Box::new(HwError::BufferFull {
                capacity: self.capacity,
            }));
        }
        if point.zero_position {
            self.position = 0.0;
        }
        self.buffer.push_back(*point);
        self.pushed_total += 1;
        Ok(())
    }

    fn stream_buffer_free_slots(
        &mut self,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        self.tick();
        self.check_fault()?;
        Ok(self.capacity - self.buffer.len())
    }

    fn has_consumed_last_point(
        &mut self,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        self.tick();
        self.check_fault()?;
        Ok(self.consumed_last)
    }

    fn clear_stream_buffer(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.tick();
        self.check_fault()?;
        self.buffer.clear();
        self.carry_ms = 0;
        self.consumed_last = false;
        Ok(())
    }

    fn set_output_enum(
        &mut self,
        value: SetValue,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Account elapsed time under the previous mode first.
        self.tick();
        self.check_fault()?;
        self.mode = OutputMode::Profile(value);
        Ok(())
    }

    fn write_output(&mut self, volts: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.tick();
        self.check_fault()?;
        self.mode = OutputMode::Voltage(volts);
        Ok(())
    }

    fn has_underrun(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        self.tick();
        self.check_fault()?;
        Ok(self.underrun)
    }

    fn clear_underrun(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.check_fault()?;
        self.underrun = false;
        Ok(())
    }
}
