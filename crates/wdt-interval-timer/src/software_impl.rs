//! Software watchdog and clock.
//!
//! This module provides [`SoftwareWatchdog`] and [`SoftwareClock`], in-memory
//! implementations of the platform traits for host testing and simulation.
//! Nothing here fires interrupts on its own: a driver reads
//! [`SoftwareWatchdog::pending_period`], advances the clock by that much, and
//! calls [`IntervalTimer::on_interrupt`](crate::IntervalTimer::on_interrupt).

use crate::hal::{MonotonicClock, WatchdogHardware};
use crate::period::{WatchdogPeriod, select_period};
use crate::timer::IntervalTimer;
use portable_atomic::{AtomicU32, Ordering};

/// Counters kept by [`SoftwareWatchdog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftwareWatchdogMetrics {
    /// Calls to `arm()`.
    pub arm_count: u32,
    /// Calls to `disarm()`.
    pub disarm_count: u32,
    /// `arm()` calls made while a countdown was already running.
    pub overlapping_arms: u32,
}

/// Software stand-in for a watchdog peripheral.
///
/// # Example
///
/// ```rust
/// use wdt_interval_timer::{SoftwareWatchdog, WatchdogHardware, WatchdogPeriod};
///
/// let mut watchdog = SoftwareWatchdog::new();
/// watchdog.arm(WatchdogPeriod::Ms64);
/// assert_eq!(watchdog.pending_period(), None);
///
/// watchdog.enable_interrupt();
/// assert_eq!(watchdog.pending_period(), Some(WatchdogPeriod::Ms64));
///
/// watchdog.disarm();
/// assert!(!watchdog.is_armed());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareWatchdog {
    armed: Option<WatchdogPeriod>,
    interrupt_enabled: bool,
    metrics: SoftwareWatchdogMetrics,
}

impl SoftwareWatchdog {
    /// Create a disarmed watchdog with its interrupt masked.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: None,
            interrupt_enabled: false,
            metrics: SoftwareWatchdogMetrics {
                arm_count: 0,
                disarm_count: 0,
                overlapping_arms: 0,
            },
        }
    }

    /// Whether a countdown is running.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// The period currently counting down, if any.
    #[must_use]
    pub fn armed_period(&self) -> Option<WatchdogPeriod> {
        self.armed
    }

    /// Whether the completion interrupt is enabled.
    #[must_use]
    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    /// The period whose expiry would raise an interrupt.
    ///
    /// `None` unless the watchdog is armed with its interrupt enabled.
    #[must_use]
    pub fn pending_period(&self) -> Option<WatchdogPeriod> {
        self.armed.filter(|_| self.interrupt_enabled)
    }

    /// Hardware-side counters.
    #[must_use]
    pub fn metrics(&self) -> SoftwareWatchdogMetrics {
        self.metrics
    }
}

impl WatchdogHardware for SoftwareWatchdog {
    fn arm(&mut self, period: WatchdogPeriod) {
        if self.armed.is_some() {
            self.metrics.overlapping_arms = self.metrics.overlapping_arms.saturating_add(1);
        }
        self.metrics.arm_count = self.metrics.arm_count.saturating_add(1);
        self.armed = Some(period);
    }

    fn disarm(&mut self) {
        self.metrics.disarm_count = self.metrics.disarm_count.saturating_add(1);
        self.armed = None;
    }

    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
    }

    fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
    }
}

/// Manually advanced millisecond clock.
///
/// Interior-mutable so a single `static` can be shared by the timer and the
/// code driving it.
#[derive(Debug, Default)]
pub struct SoftwareClock {
    now_ms: AtomicU32,
}

impl SoftwareClock {
    /// Create a clock reading `start_ms`.
    #[must_use]
    pub const fn new(start_ms: u32) -> Self {
        Self {
            now_ms: AtomicU32::new(start_ms),
        }
    }

    /// Move the clock forward by `ms`, wrapping at `u32::MAX`.
    pub fn advance(&self, ms: u32) {
        self.now_ms.fetch_add(ms, Ordering::AcqRel);
    }

    /// Set the clock to `now_ms`.
    pub fn set(&self, now_ms: u32) {
        self.now_ms.store(now_ms, Ordering::Release);
    }
}

impl MonotonicClock for SoftwareClock {
    fn now_ms(&self) -> u32 {
        self.now_ms.load(Ordering::Acquire)
    }
}

/// Time the simulated interrupt path takes on top of the nominal period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptLatency {
    /// Added after every expiry.
    pub per_interrupt_ms: u32,
    /// Added once more on the expiry that completes a cycle.
    pub completion_ms: u32,
}

impl InterruptLatency {
    /// Interrupts are serviced instantly.
    pub const NONE: Self = Self {
        per_interrupt_ms: 0,
        completion_ms: 0,
    };

    /// Only the completing interrupt is late.
    #[must_use]
    pub const fn on_completion(completion_ms: u32) -> Self {
        Self {
            per_interrupt_ms: 0,
            completion_ms,
        }
    }
}

impl IntervalTimer<SoftwareWatchdog, &SoftwareClock> {
    /// Let the pending period run out and deliver its interrupt.
    ///
    /// Advances the clock by the period plus `latency`, then calls
    /// [`on_interrupt`](IntervalTimer::on_interrupt). Returns the period that
    /// expired, or `None` if nothing would raise an interrupt.
    pub fn expire_pending(&self, latency: InterruptLatency) -> Option<WatchdogPeriod> {
        let period = self.with_hardware(|hw| hw.pending_period())?;
        let clock = *self.clock();
        clock.advance(
            period
                .as_ms()
                .unsigned_abs()
                .saturating_add(latency.per_interrupt_ms),
        );

        if select_period(self.session().remaining_at(clock.now_ms())).is_too_short() {
            clock.advance(latency.completion_ms);
        }

        self.on_interrupt();
        Some(period)
    }
}
