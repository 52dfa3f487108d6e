//! Fixed-rate control loop around a [`Dispatcher`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mprofile_traits::{Clock, InputSource, ProfileDevice};

use crate::dispatcher::{CycleReport, Dispatcher};
use crate::side::Side;
use crate::status::ExecutorState;
use crate::util::period_us;

/// Loop cadence and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub period_hz: u32,
    /// Stop after this many cycles; `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            period_hz: 50,
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxCycles,
    Shutdown,
}

impl StopReason {
    pub const fn name(self) -> &'static str {
        match self {
            Self::MaxCycles => "max_cycles",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub cycles: u64,
    /// Cycles whose work took longer than one period.
    pub missed_deadlines: u64,
    pub stopped_by: StopReason,
    /// States just before the disable hook ran; `None` for a faulted side.
    pub left_state: Option<ExecutorState>,
    pub right_state: Option<ExecutorState>,
    pub last_cycle: Option<CycleReport>,
}

/// Run cycles at `params.period_hz` until `max_cycles` or `shutdown`.
///
/// `shutdown` is checked once per cycle. The disable hook always runs before
/// returning, leaving both devices neutral.
pub fn run<D, I, F>(
    dispatcher: &mut Dispatcher<D>,
    input: &mut I,
    clock: &dyn Clock,
    params: RunParams,
    shutdown: &AtomicBool,
    mut on_cycle: F,
) -> RunSummary
where
    D: ProfileDevice,
    I: InputSource + ?Sized,
    F: FnMut(&CycleReport),
{
    let period = Duration::from_micros(period_us(params.period_hz));
    let mut cycles = 0u64;
    let mut missed = 0u64;
    let mut last_cycle = None;

    tracing::info!(
        period_hz = params.period_hz,
        max_cycles = ?params.max_cycles,
        "control loop started"
    );

    let stopped_by = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if let Some(max) = params.max_cycles
            && cycles >= max
        {
            break StopReason::MaxCycles;
        }

        let started = clock.now();
        let report = dispatcher.cycle(input);
        on_cycle(&report);
        last_cycle = Some(report);
        cycles += 1;

        let elapsed = clock.now().saturating_duration_since(started);
        match period.checked_sub(elapsed) {
            Some(rest) => clock.sleep(rest),
            None => {
                missed += 1;
                tracing::debug!(
                    cycle = report.cycle,
                    elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                    "cycle overran its period"
                );
            }
        }
    };

    let left_state = dispatcher.drivetrain().state(Side::Left);
    let right_state = dispatcher.drivetrain().state(Side::Right);
    dispatcher.disable();

    tracing::info!(
        cycles,
        missed_deadlines = missed,
        stopped_by = stopped_by.name(),
        "control loop stopped"
    );

    RunSummary {
        cycles,
        missed_deadlines: missed,
        stopped_by,
        left_state,
        right_state,
        last_cycle,
    }
}
