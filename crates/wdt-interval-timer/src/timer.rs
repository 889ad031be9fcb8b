//! The interval timer.
//!
//! [`IntervalTimer`] chains watchdog periods until a desired delay has
//! elapsed, then runs a callback. It is meant to live in a `static` shared
//! by the application and the watchdog interrupt vector:
//!
//! ```ignore
//! static TIMER: IntervalTimer<AvrWatchdog, Millis> =
//!     IntervalTimer::new(AvrWatchdog::new(), Millis);
//!
//! #[avr_device::interrupt(atmega328p)]
//! fn WDT() {
//!     TIMER.on_interrupt();
//! }
//! ```

use alloc::boxed::Box;
use core::cell::{Cell, RefCell};

use critical_section::{CriticalSection, Mutex};

use crate::config::{TimerConfig, TimerMode};
use crate::error::{TimerError, TimerResult};
use crate::hal::{MonotonicClock, WatchdogHardware};
use crate::period::WatchdogPeriod;
use crate::session::{TimerMetrics, TimerSession, TimerState, TimerStatus};

/// User callback invoked from interrupt context once per completed cycle.
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// Where the attached callback currently lives.
enum CallbackSlot {
    Empty,
    Attached(Callback),
    /// Taken out by the interrupt handler while it runs.
    Running,
}

impl CallbackSlot {
    fn is_attached(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Attach `callback`, handing back whatever it displaced.
    fn attach(&mut self, callback: Callback) -> Option<Callback> {
        match core::mem::replace(self, Self::Attached(callback)) {
            Self::Attached(previous) => Some(previous),
            Self::Empty | Self::Running => None,
        }
    }

    fn begin_run(&mut self) -> Option<Callback> {
        match core::mem::replace(self, Self::Running) {
            Self::Attached(callback) => Some(callback),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Put `callback` back unless it was replaced while running.
    fn finish_run(&mut self, callback: Callback) -> Option<Callback> {
        if matches!(self, Self::Running) {
            *self = Self::Attached(callback);
            None
        } else {
            Some(callback)
        }
    }
}

impl core::fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Empty => "Empty",
            Self::Attached(_) => "Attached",
            Self::Running => "Running",
        })
    }
}

/// What one pass of the interrupt handler did.
enum Step {
    Spurious,
    Rearmed {
        period: WatchdogPeriod,
        remaining_delay_ms: i32,
    },
    Completed {
        actual_delay_ms: i32,
        excess_ms: i32,
        next: Option<WatchdogPeriod>,
        mode: TimerMode,
    },
}

/// Software-extended interval timer on top of a coarse watchdog.
///
/// # Interrupt Safety
///
/// Every multi-word access to the session happens inside
/// `critical_section::with`. The callback runs outside any critical section,
/// so it may call [`stop`](Self::stop), [`restart`](Self::restart) or
/// [`start`](Self::start).
///
/// # Example
///
/// ```rust
/// use wdt_interval_timer::prelude::*;
///
/// let clock = SoftwareClock::new(0);
/// let timer = IntervalTimer::new(SoftwareWatchdog::new(), &clock);
///
/// timer.start(|| {}, 1500, TimerMode::OneShot).expect("valid delay");
/// assert_eq!(timer.status(), TimerStatus::Armed);
///
/// // Let the simulated watchdog expire until the cycle completes.
/// while timer.expire_pending(InterruptLatency::NONE).is_some() {}
/// assert!(timer.take_callback_pending());
/// assert_eq!(timer.actual_delay_ms(), 1504);
/// ```
pub struct IntervalTimer<H, C> {
    hardware: Mutex<RefCell<H>>,
    clock: C,
    session: Mutex<Cell<TimerSession>>,
    metrics: Mutex<Cell<TimerMetrics>>,
    callback: Mutex<RefCell<CallbackSlot>>,
    state: TimerState,
}

impl<H, C> IntervalTimer<H, C> {
    /// Create an idle timer over `hardware` and `clock`.
    #[must_use]
    pub const fn new(hardware: H, clock: C) -> Self {
        Self {
            hardware: Mutex::new(RefCell::new(hardware)),
            clock,
            session: Mutex::new(Cell::new(TimerSession::new())),
            metrics: Mutex::new(Cell::new(TimerMetrics::new())),
            callback: Mutex::new(RefCell::new(CallbackSlot::Empty)),
            state: TimerState::new(),
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> TimerStatus {
        self.state.status()
    }

    /// Whether the callback has fired since the flag was last cleared.
    #[must_use]
    pub fn is_callback_pending(&self) -> bool {
        self.state.is_callback_pending()
    }

    /// Clear the callback-pending flag.
    pub fn clear_callback_pending(&self) {
        self.state.take_callback_pending();
    }

    /// Clear the callback-pending flag, returning whether it was set.
    #[must_use]
    pub fn take_callback_pending(&self) -> bool {
        self.state.take_callback_pending()
    }

    /// Actual delay of the last completed cycle, in milliseconds.
    #[must_use]
    pub fn actual_delay_ms(&self) -> i32 {
        self.state.actual_delay_ms()
    }

    /// Snapshot of the session bookkeeping.
    #[must_use]
    pub fn session(&self) -> TimerSession {
        critical_section::with(|cs| self.session.borrow(cs).get())
    }

    /// Snapshot of the metrics.
    #[must_use]
    pub fn metrics(&self) -> TimerMetrics {
        critical_section::with(|cs| self.metrics.borrow(cs).get())
    }

    /// Reset all metrics.
    pub fn reset_metrics(&self) {
        critical_section::with(|cs| self.metrics.borrow(cs).set(TimerMetrics::new()));
    }

    /// Whether a callback is attached.
    #[must_use]
    pub fn has_callback(&self) -> bool {
        critical_section::with(|cs| self.callback.borrow_ref(cs).is_attached())
    }

    /// Run `f` against the hardware inside a critical section.
    pub fn with_hardware<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        critical_section::with(|cs| f(&mut self.hardware.borrow_ref_mut(cs)))
    }

    /// The clock the timer reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn update_metrics(&self, cs: CriticalSection<'_>, f: impl FnOnce(&mut TimerMetrics)) {
        let cell = self.metrics.borrow(cs);
        let mut metrics = cell.get();
        f(&mut metrics);
        cell.set(metrics);
    }
}

impl<H: WatchdogHardware, C: MonotonicClock> IntervalTimer<H, C> {
    /// Attach `callback` and start a cycle of `desired_delay_ms`.
    ///
    /// Any cycle already in flight is disarmed first, even if the new delay
    /// is then rejected. The callback is only attached on success.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if `desired_delay_ms` is below
    /// 8ms; nothing is armed in that case.
    pub fn start<F>(&self, callback: F, desired_delay_ms: i32, mode: TimerMode) -> TimerResult<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();
        let config = self.validated(desired_delay_ms, mode)?;
        let displaced = critical_section::with(|cs| {
            self.callback.borrow_ref_mut(cs).attach(Box::new(callback))
        });
        drop(displaced);
        self.begin_cycle(config);
        Ok(())
    }

    /// [`start`](Self::start) with a prepared configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if the configuration was built
    /// by hand with a delay below 8ms.
    pub fn start_with_config<F>(&self, callback: F, config: TimerConfig) -> TimerResult<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.start(callback, config.desired_delay_ms, config.mode)
    }

    /// Start a new cycle with the callback already attached.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoCallback`] if nothing was ever attached, or
    /// [`TimerError::DelayTooShort`] if `desired_delay_ms` is below 8ms.
    pub fn restart(&self, desired_delay_ms: i32, mode: TimerMode) -> TimerResult<()> {
        self.stop();
        if !self.has_callback() {
            return Err(TimerError::NoCallback);
        }
        let config = self.validated(desired_delay_ms, mode)?;
        self.begin_cycle(config);
        Ok(())
    }

    /// Cancel the cycle in flight, if any.
    ///
    /// Disarms the watchdog and masks its interrupt. The pending callback is
    /// not invoked. Safe to call repeatedly and from inside the callback.
    pub fn stop(&self) {
        let was_active = critical_section::with(|cs| {
            let mut hardware = self.hardware.borrow_ref_mut(cs);
            hardware.disarm();
            hardware.disable_interrupt();
            let was_active = self.state.status().is_active();
            self.state.set_status(TimerStatus::Idle);
            was_active
        });
        if was_active {
            tracing::debug!("interval timer stopped");
        }
    }

    /// Alias for [`stop`](Self::stop).
    pub fn detach_interrupt(&self) {
        self.stop();
    }

    /// Watchdog interrupt handler.
    ///
    /// Call this from the platform's watchdog interrupt vector. It re-arms
    /// the watchdog while time is left; once the delay has elapsed it
    /// records the cycle, schedules the next one in repeat mode, and then
    /// invokes the callback.
    pub fn on_interrupt(&self) {
        let step = critical_section::with(|cs| {
            let mut hardware = self.hardware.borrow_ref_mut(cs);
            // Must come first: a watchdog still armed when this handler
            // returns resets the host.
            hardware.disarm();

            if self.state.status() != TimerStatus::Armed {
                hardware.disable_interrupt();
                self.update_metrics(cs, TimerMetrics::record_spurious_interrupt);
                return Step::Spurious;
            }

            let cell = self.session.borrow(cs);
            let mut session = cell.get();

            if let Some(period) = session.update_remaining(self.clock.now_ms()).period() {
                cell.set(session);
                self.arm(cs, &mut *hardware, period);
                return Step::Rearmed {
                    period,
                    remaining_delay_ms: session.remaining_delay_ms,
                };
            }

            hardware.disable_interrupt();
            self.state.set_status(TimerStatus::Completing);
            let actual_delay_ms = session.complete(self.clock.now_ms());
            let excess_ms = session.excess_ms();
            self.state.set_actual_delay_ms(actual_delay_ms);
            self.state.mark_callback_pending();
            self.update_metrics(cs, |m| m.record_completion(excess_ms));

            let next = if session.mode.is_repeating() {
                session.reanchor();
                let next = session.update_remaining(self.clock.now_ms()).period();
                if next.is_none() {
                    self.update_metrics(cs, TimerMetrics::record_skipped_rearm);
                }
                next
            } else {
                None
            };
            cell.set(session);

            match next {
                Some(period) => self.arm(cs, &mut *hardware, period),
                None => self.state.set_status(TimerStatus::Idle),
            }

            Step::Completed {
                actual_delay_ms,
                excess_ms,
                next,
                mode: session.mode,
            }
        });

        match step {
            Step::Spurious => {
                tracing::trace!("watchdog interrupt with no cycle in flight");
            }
            Step::Rearmed {
                period,
                remaining_delay_ms,
            } => {
                tracing::trace!(%period, remaining_delay_ms, "watchdog re-armed");
            }
            Step::Completed {
                actual_delay_ms,
                excess_ms,
                next,
                mode,
            } => {
                if mode.is_repeating() && next.is_none() {
                    tracing::debug!(
                        actual_delay_ms,
                        excess_ms,
                        "repeat cycle left nothing to wait for; not re-armed"
                    );
                } else {
                    tracing::debug!(actual_delay_ms, excess_ms, %mode, "cycle complete");
                }
                self.invoke_callback();
            }
        }
    }

    fn validated(&self, desired_delay_ms: i32, mode: TimerMode) -> TimerResult<TimerConfig> {
        TimerConfig::with_mode(desired_delay_ms, mode).inspect_err(|err| {
            critical_section::with(|cs| {
                self.update_metrics(cs, TimerMetrics::record_rejected_start);
            });
            tracing::warn!(desired_delay_ms, %err, "desired delay too short");
        })
    }

    /// Seed the session and arm the first period of `config`.
    fn begin_cycle(&self, config: TimerConfig) {
        let now_ms = self.clock.now_ms();
        let first = critical_section::with(|cs| {
            let cell = self.session.borrow(cs);
            let mut session = cell.get();
            let first = session
                .begin(now_ms, config.desired_delay_ms, config.mode)
                .period();
            cell.set(session);
            if let Some(period) = first {
                self.arm(cs, &mut *self.hardware.borrow_ref_mut(cs), period);
            }
            first
        });
        if let Some(period) = first {
            tracing::debug!(
                desired_delay_ms = config.desired_delay_ms,
                mode = %config.mode,
                first_period = %period,
                "interval timer started"
            );
        }
    }

    fn arm(&self, cs: CriticalSection<'_>, hardware: &mut H, period: WatchdogPeriod) {
        hardware.arm(period);
        hardware.enable_interrupt();
        self.update_metrics(cs, TimerMetrics::record_sub_interval);
        self.state.set_status(TimerStatus::Armed);
    }

    fn invoke_callback(&self) {
        let taken = critical_section::with(|cs| self.callback.borrow_ref_mut(cs).begin_run());
        let Some(mut callback) = taken else {
            return;
        };
        callback();
        let displaced =
            critical_section::with(|cs| self.callback.borrow_ref_mut(cs).finish_run(callback));
        drop(displaced);
    }
}

impl<H, C> core::fmt::Debug for IntervalTimer<H, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let callback = critical_section::with(|cs| self.callback.borrow_ref(cs).is_attached());
        f.debug_struct("IntervalTimer")
            .field("status", &self.status())
            .field("session", &self.session())
            .field("metrics", &self.metrics())
            .field("callback_attached", &callback)
            .finish_non_exhaustive()
    }
}
