//! Motion-profile executor: one per drivetrain side.
//!
//! Owns the top buffer (the whole trajectory) and streams it into the device's
//! bounded stream buffer a few points per cycle. Nothing here blocks; a device
//! that cannot take points this cycle is simply retried on the next one.

use mprofile_traits::{ProfileDevice, SetValue, TrajectoryPoint};

use crate::config::ExecutorCfg;
use crate::error::ProfileError;
use crate::hw_error::map_hw_error;
use crate::status::{ExecutorState, OutputCommand};
use crate::trajectory::{TrajectorySource, normalize};

pub struct ProfileExecutor<D: ProfileDevice> {
    device: D,
    source: Box<dyn TrajectorySource + Send>,
    cfg: ExecutorCfg,
    label: &'static str,
    state: ExecutorState,
    top: Vec<TrajectoryPoint>,
    cursor: usize,
    set_value: SetValue,
    points_pushed: u64,
    // No-progress watchdog
    progress_marker: Option<u64>,
    stalled_cycles: u32,
    stall_reported: bool,
}

impl<D: ProfileDevice> core::fmt::Debug for ProfileExecutor<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProfileExecutor")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("top_len", &self.top.len())
            .field("set_value", &self.set_value)
            .finish_non_exhaustive()
    }
}

impl<D: ProfileDevice> ProfileExecutor<D> {
    /// `label` names the side in log events.
    pub fn new(
        device: D,
        source: impl TrajectorySource + Send + 'static,
        cfg: ExecutorCfg,
        label: &'static str,
    ) -> Self {
        Self::with_source(device, Box::new(source), cfg, label)
    }

    pub fn with_source(
        device: D,
        source: Box<dyn TrajectorySource + Send>,
        mut cfg: ExecutorCfg,
        label: &'static str,
    ) -> Self {
        cfg.max_points_per_cycle = cfg.max_points_per_cycle.max(1);
        Self {
            device,
            source,
            cfg,
            label,
            state: ExecutorState::Idle,
            top: Vec::new(),
            cursor: 0,
            set_value: SetValue::Disable,
            points_pushed: 0,
            progress_marker: None,
            stalled_cycles: 0,
            stall_reported: false,
        }
    }

    /// Arm: load the trajectory and start streaming it.
    ///
    /// Only valid from Idle. An empty source leaves the executor Idle.
    pub fn start_motion_profile(&mut self) -> Result<(), ProfileError> {
        if self.state != ExecutorState::Idle {
            tracing::info!(
                side = self.label,
                state = %self.state,
                "start ignored: profile already armed; reset first"
            );
            return Err(ProfileError::State(format!(
                "cannot start a profile while {}",
                self.state
            )));
        }

        let mut points = self.source.load();
        if points.is_empty() {
            tracing::warn!(side = self.label, "trajectory source is empty; staying idle");
            return Err(ProfileError::EmptyProfile);
        }
        let dropped = normalize(&mut points);
        if dropped > 0 {
            tracing::warn!(
                side = self.label,
                dropped,
                "points after the last point were discarded"
            );
        }

        if let Err(e) = self.device.clear_stream_buffer() {
            let err = map_hw_error(&*e);
            tracing::warn!(side = self.label, error = %err, "could not clear stream buffer; staying idle");
            return Err(err);
        }
        if let Err(e) = self.device.clear_underrun() {
            tracing::debug!(side = self.label, error = %map_hw_error(&*e), "clear underrun failed");
        }

        tracing::info!(side = self.label, points = points.len(), "profile armed");
        self.top = points;
        self.cursor = 0;
        self.set_value = SetValue::Disable;
        self.reset_watchdog();
        self.transition(ExecutorState::Filling);
        Ok(())
    }

    /// One periodic step. Never blocks and never fails; device trouble is
    /// logged and retried next cycle.
    pub fn control(&mut self) {
        match self.state {
            ExecutorState::Idle | ExecutorState::ReadyToFire | ExecutorState::Holding => {}
            ExecutorState::Filling => self.fill(),
            ExecutorState::Firing => {
                self.fill();
                match self.device.has_consumed_last_point() {
                    Ok(true) => {
                        self.set_value = SetValue::Hold;
                        self.transition(ExecutorState::Holding);
                    }
                    Ok(false) => {
                        self.check_underrun();
                        self.watch_progress();
                    }
                    Err(e) => {
                        tracing::warn!(
                            side = self.label,
                            error = %map_hw_error(&*e),
                            "last-point status query failed"
                        );
                    }
                }
            }
        }
    }

    /// Start playback. Accepted only in ReadyToFire.
    pub fn fire(&mut self) -> Result<(), ProfileError> {
        if self.state != ExecutorState::ReadyToFire {
            tracing::debug!(side = self.label, state = %self.state, "stale fire ignored");
            return Err(ProfileError::StaleFire(self.state));
        }
        self.set_value = SetValue::Enable;
        self.reset_watchdog();
        self.transition(ExecutorState::Firing);
        Ok(())
    }

    /// Back to Idle with an empty stream buffer. Idempotent.
    pub fn reset(&mut self) {
        self.set_value = SetValue::Disable;
        if self.state == ExecutorState::Idle {
            return;
        }
        if let Err(e) = self.device.clear_stream_buffer() {
            tracing::warn!(side = self.label, error = %map_hw_error(&*e), "clear stream buffer failed during reset");
        }
        self.top.clear();
        self.cursor = 0;
        self.reset_watchdog();
        self.transition(ExecutorState::Idle);
    }

    /// Current set value as an output command. Does not touch the device.
    pub fn output(&self) -> OutputCommand {
        OutputCommand::profile(self.set_value)
    }

    pub const fn state(&self) -> ExecutorState {
        self.state
    }

    /// Index of the next top-buffer point to stream.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn top_buffer_len(&self) -> usize {
        self.top.len()
    }

    /// Points not yet handed to the device.
    pub fn remaining(&self) -> usize {
        self.top.len().saturating_sub(self.cursor)
    }

    /// Total points accepted by the device over this executor's lifetime.
    pub const fn points_pushed(&self) -> u64 {
        self.points_pushed
    }

    pub const fn label(&self) -> &'static str {
        self.label
    }

    pub const fn cfg(&self) -> &ExecutorCfg {
        &self.cfg
    }

    pub const fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    fn fill(&mut self) {
        let remaining = self.remaining();
        if remaining == 0 {
            return;
        }
        let free = match self.device.stream_buffer_free_slots() {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(side = self.label, error = %map_hw_error(&*e), "free-slot query failed");
                return;
            }
        };
        let budget = free.min(self.cfg.max_points_per_cycle).min(remaining);
        if budget == 0 {
            tracing::trace!(side = self.label, remaining, "stream buffer full; retry next cycle");
        }

        let mut pushed_now = 0;
        let mut refused = false;
        for _ in 0..budget {
            let Some(point) = self.top.get(self.cursor).copied() else {
                break;
            };
            if let Err(e) = self.device.push_trajectory_point(&point) {
                match map_hw_error(&*e) {
                    ProfileError::Backpressure => {
                        refused = true;
                        tracing::debug!(
                            side = self.label,
                            cursor = self.cursor,
                            "device refused point; retry next cycle"
                        );
                    }
                    err => tracing::warn!(
                        side = self.label,
                        cursor = self.cursor,
                        error = %err,
                        "push failed; retry next cycle"
                    ),
                }
                break;
            }
            self.cursor += 1;
            self.points_pushed += 1;
            pushed_now += 1;
            if point.is_last_point && self.state == ExecutorState::Filling {
                self.transition(ExecutorState::ReadyToFire);
                return;
            }
        }

        if self.state != ExecutorState::Filling {
            return;
        }
        // Nothing drains while Disabled, so the cursor is the buffered count.
        let full = refused || pushed_now == free;
        let primed =
            self.cfg.min_points_to_fire > 0 && self.cursor >= self.cfg.min_points_to_fire;
        if full || primed {
            tracing::debug!(
                side = self.label,
                buffered = self.cursor,
                remaining = self.remaining(),
                full,
                "enough points buffered to fire"
            );
            self.transition(ExecutorState::ReadyToFire);
        }
    }

    fn check_underrun(&mut self) {
        match self.device.has_underrun() {
            Ok(true) => {
                tracing::warn!(
                    side = self.label,
                    cursor = self.cursor,
                    remaining = self.remaining(),
                    "stream buffer underrun"
                );
                if let Err(e) = self.device.clear_underrun() {
                    tracing::warn!(side = self.label, error = %map_hw_error(&*e), "clear underrun failed");
                }
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(side = self.label, error = %map_hw_error(&*e), "underrun query failed");
            }
        }
    }

    // pushed + free only moves when the device consumes a point.
    fn watch_progress(&mut self) {
        if self.cfg.no_progress_cycles == 0 {
            return;
        }
        let Ok(free) = self.device.stream_buffer_free_slots() else {
            return;
        };
        let marker = self
            .points_pushed
            .saturating_add(u64::try_from(free).unwrap_or(u64::MAX));
        if self.progress_marker == Some(marker) {
            self.stalled_cycles = self.stalled_cycles.saturating_add(1);
            if self.stalled_cycles >= self.cfg.no_progress_cycles && !self.stall_reported {
                tracing::warn!(
                    side = self.label,
                    cycles = self.stalled_cycles,
                    cursor = self.cursor,
                    "no playback progress while firing"
                );
                self.stall_reported = true;
            }
        } else {
            self.progress_marker = Some(marker);
            self.stalled_cycles = 0;
            self.stall_reported = false;
        }
    }

    fn reset_watchdog(&mut self) {
        self.progress_marker = None;
        self.stalled_cycles = 0;
        self.stall_reported = false;
    }

    fn transition(&mut self, to: ExecutorState) {
        if self.state != to {
            tracing::debug!(side = self.label, from = %self.state, to = %to, "executor transition");
            self.state = to;
        }
    }

    #[cfg(test)]
    pub(crate) const fn stall_reported(&self) -> bool {
        self.stall_reported
    }
}
