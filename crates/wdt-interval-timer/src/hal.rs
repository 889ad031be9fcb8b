//! Platform collaborator traits.
//!
//! The timer never touches registers or reads a clock directly. A platform
//! crate implements [`WatchdogHardware`] for its watchdog peripheral and
//! [`MonotonicClock`] for its millisecond counter, and calls
//! [`IntervalTimer::on_interrupt`](crate::IntervalTimer::on_interrupt) from
//! the watchdog interrupt vector.

use crate::period::WatchdogPeriod;

/// Register-level control of a watchdog peripheral.
///
/// All methods are called with interrupts masked and must not block.
///
/// # Contract
///
/// 1. `arm()` starts a countdown for `period`; the completion interrupt is
///    only delivered once `enable_interrupt()` has also been called
/// 2. `disarm()` stops the countdown, resets the counter and clears any
///    pending completion so the peripheral cannot reset the host
/// 3. `arm()` and `disarm()` are idempotent
pub trait WatchdogHardware {
    /// Start counting down `period`.
    fn arm(&mut self, period: WatchdogPeriod);

    /// Cancel any countdown and clear pending completion state.
    fn disarm(&mut self);

    /// Set the completion interrupt enable bit.
    fn enable_interrupt(&mut self);

    /// Clear the completion interrupt enable bit.
    fn disable_interrupt(&mut self);
}

/// Monotonic millisecond clock.
///
/// The counter wraps at `u32::MAX`; callers compute elapsed time as
/// `later.wrapping_sub(earlier)`, which is correct across one wrap.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary epoch.
    fn now_ms(&self) -> u32;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Milliseconds from `earlier` to `later`, tolerant of one counter wrap.
#[inline]
#[must_use]
pub fn elapsed_ms(earlier: u32, later: u32) -> u32 {
    later.wrapping_sub(earlier)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl MonotonicClock for Fixed {
        fn now_ms(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_clock_by_reference() {
        let clock = Fixed(42);
        let by_ref = &clock;
        assert_eq!(by_ref.now_ms(), 42);
        assert_eq!((&by_ref).now_ms(), 42);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed_ms(100, 250), 150);
        assert_eq!(elapsed_ms(u32::MAX - 9, 5), 15);
        assert_eq!(elapsed_ms(7, 7), 0);
    }
}
