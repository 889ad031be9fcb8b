//! Session state, the decomposition recurrence, and observables.
//!
//! [`TimerSession`] holds the multi-word bookkeeping for one cycle and is
//! only ever read or written whole inside a critical section. The steps in
//! here are pure arithmetic over that state; the timer wires them to the
//! hardware. [`TimerState`] mirrors the single-word values a polling caller
//! wants to see without masking interrupts.

use portable_atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use crate::config::TimerMode;
use crate::hal::elapsed_ms;
use crate::period::{PeriodSelection, select_period};

/// Timer operational status.
///
/// ```text
///          start()/restart()
///   Idle ─────────────────────► Armed ◄──┐ interrupt, time left
///    ▲                            │  └───┘
///    │                 interrupt, │
///    │                 time is up ▼
///    │    OneShot, or      Completing
///    └──── Repeat with  ◄─────┤
///          nothing left       │ Repeat
///                             ▼
///                           Armed
/// ```
///
/// `stop()` returns to `Idle` from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TimerStatus {
    /// Nothing armed.
    #[default]
    Idle = 0,
    /// Watchdog counting down a sub-interval.
    Armed = 1,
    /// Cycle complete, bookkeeping for the callback in progress.
    Completing = 2,
}

impl TimerStatus {
    /// Convert from raw u8 value.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Idle),
            1 => Some(Self::Armed),
            2 => Some(Self::Completing),
            _ => None,
        }
    }

    /// Convert to raw u8 value.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Whether a cycle is in flight.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Armed | Self::Completing)
    }

    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Armed => "Armed",
            Self::Completing => "Completing",
        }
    }
}

impl core::fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping for the cycle in flight.
///
/// Timestamps are raw [`MonotonicClock`](crate::MonotonicClock) readings and
/// every difference between them is taken with wrapping subtraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSession {
    /// Total delay requested for one cycle.
    pub desired_delay_ms: i32,
    /// Delay still to cover; negative once the cycle has overshot.
    pub remaining_delay_ms: i32,
    /// When the current cycle began (re-anchored in repeat mode).
    pub start_timestamp_ms: u32,
    /// When the last cycle was detected complete.
    pub end_timestamp_ms: u32,
    /// `end - start` of the last completed cycle.
    pub actual_delay_ms: i32,
    /// One-shot or repeating.
    pub mode: TimerMode,
    /// Period chosen for the next arm.
    pub current_period: PeriodSelection,
}

impl TimerSession {
    /// A zeroed session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            desired_delay_ms: 0,
            remaining_delay_ms: 0,
            start_timestamp_ms: 0,
            end_timestamp_ms: 0,
            actual_delay_ms: 0,
            mode: TimerMode::OneShot,
            current_period: PeriodSelection::TooShort,
        }
    }

    /// Seed a fresh cycle starting at `now_ms` and select its first period.
    pub fn begin(&mut self, now_ms: u32, desired_delay_ms: i32, mode: TimerMode) -> PeriodSelection {
        self.start_timestamp_ms = now_ms;
        self.desired_delay_ms = desired_delay_ms;
        self.remaining_delay_ms = desired_delay_ms;
        self.mode = mode;
        self.current_period = select_period(self.remaining_delay_ms);
        self.current_period
    }

    /// Milliseconds since the current cycle began.
    #[must_use]
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        elapsed_ms(self.start_timestamp_ms, now_ms)
    }

    /// Delay left at `now_ms`, without updating the session.
    ///
    /// Both steps wrap in 32 bits. A re-anchored start can lie slightly ahead
    /// of `now_ms` after an undershoot, which reads as a small negative
    /// elapsed time. A delay near `i32::MAX` that overruns past `2^31`
    /// elapsed wraps to a small negative remainder and completes.
    #[must_use]
    pub fn remaining_at(&self, now_ms: u32) -> i32 {
        let elapsed = self.elapsed_ms(now_ms).cast_signed();
        self.desired_delay_ms.wrapping_sub(elapsed)
    }

    /// Recompute the remaining delay at `now_ms` and select the next period.
    pub fn update_remaining(&mut self, now_ms: u32) -> PeriodSelection {
        self.remaining_delay_ms = self.remaining_at(now_ms);
        self.current_period = select_period(self.remaining_delay_ms);
        self.current_period
    }

    /// Record completion at `end_ms`; returns the actual delay of the cycle.
    pub fn complete(&mut self, end_ms: u32) -> i32 {
        self.end_timestamp_ms = end_ms;
        self.actual_delay_ms = elapsed_ms(self.start_timestamp_ms, end_ms).cast_signed();
        self.actual_delay_ms
    }

    /// How far the last cycle overshot (negative if it undershot).
    #[must_use]
    pub fn excess_ms(&self) -> i32 {
        self.actual_delay_ms.saturating_sub(self.desired_delay_ms)
    }

    /// Start the next cycle as if it had begun `excess_ms()` before the last
    /// one ended, so overshoot does not accumulate across cycles.
    ///
    /// Returns the new start timestamp. The caller follows up with
    /// [`update_remaining`](Self::update_remaining).
    pub fn reanchor(&mut self) -> u32 {
        self.start_timestamp_ms = self
            .end_timestamp_ms
            .wrapping_sub(self.excess_ms().cast_unsigned());
        self.start_timestamp_ms
    }
}

impl Default for TimerSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock-free observables for polling callers.
///
/// Written by the timer inside its critical sections; readable from any
/// context without masking interrupts.
#[derive(Debug)]
pub struct TimerState {
    status: AtomicU8,
    callback_pending: AtomicBool,
    actual_delay_ms: AtomicI32,
}

impl TimerState {
    /// Create a new state in the `Idle` status.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: AtomicU8::new(0),
            callback_pending: AtomicBool::new(false),
            actual_delay_ms: AtomicI32::new(0),
        }
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> TimerStatus {
        let raw = self.status.load(Ordering::Acquire);
        TimerStatus::from_raw(raw).unwrap_or(TimerStatus::Idle)
    }

    /// Set the current status.
    pub fn set_status(&self, status: TimerStatus) {
        self.status.store(status.to_raw(), Ordering::Release);
    }

    /// Whether a callback has fired since the flag was last cleared.
    #[must_use]
    pub fn is_callback_pending(&self) -> bool {
        self.callback_pending.load(Ordering::Acquire)
    }

    /// Latch the callback-pending flag.
    pub fn mark_callback_pending(&self) {
        self.callback_pending.store(true, Ordering::Release);
    }

    /// Clear the callback-pending flag, returning its previous value.
    pub fn take_callback_pending(&self) -> bool {
        self.callback_pending.swap(false, Ordering::AcqRel)
    }

    /// Actual delay of the last completed cycle.
    #[must_use]
    pub fn actual_delay_ms(&self) -> i32 {
        self.actual_delay_ms.load(Ordering::Acquire)
    }

    /// Publish the actual delay of a completed cycle.
    pub fn set_actual_delay_ms(&self, actual_delay_ms: i32) {
        self.actual_delay_ms.store(actual_delay_ms, Ordering::Release);
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer metrics for monitoring and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerMetrics {
    /// Cycles that ran to completion and invoked the callback.
    pub cycles_completed: u32,
    /// Watchdog arms, including the first one of each cycle.
    pub sub_intervals: u32,
    /// Repeat cycles that could not be re-armed because nothing was left.
    pub skipped_rearms: u32,
    /// Interrupts delivered while no cycle was in flight.
    pub spurious_interrupts: u32,
    /// `start`/`restart` calls rejected for a too-short delay.
    pub rejected_starts: u32,
    /// Overshoot of the last completed cycle.
    pub last_excess_ms: i32,
    /// Largest overshoot seen.
    pub max_excess_ms: i32,
}

impl TimerMetrics {
    /// Create a new metrics instance with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cycles_completed: 0,
            sub_intervals: 0,
            skipped_rearms: 0,
            spurious_interrupts: 0,
            rejected_starts: 0,
            last_excess_ms: 0,
            max_excess_ms: 0,
        }
    }

    /// Record a watchdog arm.
    pub fn record_sub_interval(&mut self) {
        self.sub_intervals = self.sub_intervals.saturating_add(1);
    }

    /// Record a completed cycle and its overshoot.
    pub fn record_completion(&mut self, excess_ms: i32) {
        self.cycles_completed = self.cycles_completed.saturating_add(1);
        self.last_excess_ms = excess_ms;
        if excess_ms > self.max_excess_ms {
            self.max_excess_ms = excess_ms;
        }
    }

    /// Record a repeat cycle that could not be re-armed.
    pub fn record_skipped_rearm(&mut self) {
        self.skipped_rearms = self.skipped_rearms.saturating_add(1);
    }

    /// Record an interrupt that arrived with nothing in flight.
    pub fn record_spurious_interrupt(&mut self) {
        self.spurious_interrupts = self.spurious_interrupts.saturating_add(1);
    }

    /// Record a rejected start.
    pub fn record_rejected_start(&mut self) {
        self.rejected_starts = self.rejected_starts.saturating_add(1);
    }

    /// Reset all metrics.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Mean number of watchdog arms per completed cycle.
    #[must_use]
    pub fn sub_intervals_per_cycle(&self) -> Option<u32> {
        self.sub_intervals.checked_div(self.cycles_completed)
    }
}

impl Default for TimerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
