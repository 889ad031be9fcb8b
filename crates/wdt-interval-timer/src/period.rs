//! Watchdog periods and the period selector.
//!
//! The watchdog can only count down one of ten fixed timeouts. A longer
//! delay is covered by chaining them, always picking the largest period that
//! still fits in what is left, which keeps the number of interrupts (and the
//! latency they add) as low as possible.

/// Shortest period the watchdog supports, in milliseconds.
pub const SHORTEST_PERIOD_MS: i32 = 16;

/// Longest period the watchdog supports, in milliseconds.
pub const LONGEST_PERIOD_MS: i32 = 8192;

/// Smallest remaining delay that still arms the watchdog.
///
/// Remainders in `[8, 16)` round up to one 16ms period; anything below is
/// treated as already elapsed. This bounds the error of a single cycle to
/// +8/-7ms.
pub const MIN_DELAY_MS: i32 = SHORTEST_PERIOD_MS / 2;

/// One of the discrete timeouts the watchdog can be armed for.
///
/// Discriminants are the watchdog prescaler codes (`WDP3..0`) so a HAL can
/// write them straight into the control register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WatchdogPeriod {
    /// 16ms (nominally "15ms" in vendor headers).
    Ms16 = 0,
    /// 32ms.
    Ms32 = 1,
    /// 64ms.
    Ms64 = 2,
    /// 128ms.
    Ms128 = 3,
    /// 256ms.
    Ms256 = 4,
    /// 512ms.
    Ms512 = 5,
    /// 1024ms.
    Ms1024 = 6,
    /// 2048ms.
    Ms2048 = 7,
    /// 4096ms.
    Ms4096 = 8,
    /// 8192ms.
    Ms8192 = 9,
}

impl WatchdogPeriod {
    /// All periods, shortest first.
    pub const ALL: [Self; 10] = [
        Self::Ms16,
        Self::Ms32,
        Self::Ms64,
        Self::Ms128,
        Self::Ms256,
        Self::Ms512,
        Self::Ms1024,
        Self::Ms2048,
        Self::Ms4096,
        Self::Ms8192,
    ];

    /// Nominal duration in milliseconds.
    #[must_use]
    pub const fn as_ms(self) -> i32 {
        SHORTEST_PERIOD_MS << (self as u8)
    }

    /// Prescaler code for the watchdog control register.
    #[must_use]
    pub const fn register_code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`register_code`](Self::register_code).
    #[must_use]
    pub fn from_register_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.register_code() == code)
    }

    /// Get the period as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ms16 => "16ms",
            Self::Ms32 => "32ms",
            Self::Ms64 => "64ms",
            Self::Ms128 => "128ms",
            Self::Ms256 => "256ms",
            Self::Ms512 => "512ms",
            Self::Ms1024 => "1024ms",
            Self::Ms2048 => "2048ms",
            Self::Ms4096 => "4096ms",
            Self::Ms8192 => "8192ms",
        }
    }
}

impl core::fmt::Display for WatchdogPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`select_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PeriodSelection {
    /// Arm the watchdog for this period.
    Period(WatchdogPeriod),
    /// Nothing left worth waiting for; the cycle is complete.
    #[default]
    TooShort,
}

impl PeriodSelection {
    /// The selected period, if any.
    #[must_use]
    pub fn period(self) -> Option<WatchdogPeriod> {
        match self {
            Self::Period(period) => Some(period),
            Self::TooShort => None,
        }
    }

    /// Whether the watchdog must stay disarmed.
    #[must_use]
    pub fn is_too_short(self) -> bool {
        matches!(self, Self::TooShort)
    }
}

/// Pick the largest watchdog period not exceeding `remaining_delay_ms`.
///
/// Negative and zero inputs mean the delay has already overshot and yield
/// [`PeriodSelection::TooShort`], as does anything below [`MIN_DELAY_MS`].
/// A remainder in `[8, 16)` selects [`WatchdogPeriod::Ms16`].
///
/// # Examples
///
/// ```
/// use wdt_interval_timer::{select_period, PeriodSelection, WatchdogPeriod};
///
/// assert_eq!(select_period(1500), PeriodSelection::Period(WatchdogPeriod::Ms1024));
/// assert_eq!(select_period(1024), PeriodSelection::Period(WatchdogPeriod::Ms1024));
/// assert_eq!(select_period(9), PeriodSelection::Period(WatchdogPeriod::Ms16));
/// assert_eq!(select_period(7), PeriodSelection::TooShort);
/// ```
#[must_use]
pub fn select_period(remaining_delay_ms: i32) -> PeriodSelection {
    if remaining_delay_ms < MIN_DELAY_MS {
        return PeriodSelection::TooShort;
    }
    let period = WatchdogPeriod::ALL
        .iter()
        .rev()
        .copied()
        .find(|p| remaining_delay_ms >= p.as_ms())
        .unwrap_or(WatchdogPeriod::Ms16);
    PeriodSelection::Period(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_durations_double() {
        let mut expected = 16;
        for period in WatchdogPeriod::ALL {
            assert_eq!(period.as_ms(), expected);
            expected *= 2;
        }
        assert_eq!(WatchdogPeriod::Ms8192.as_ms(), LONGEST_PERIOD_MS);
    }

    #[test]
    fn test_register_codes() {
        assert_eq!(WatchdogPeriod::Ms16.register_code(), 0);
        assert_eq!(WatchdogPeriod::Ms8192.register_code(), 9);
        for period in WatchdogPeriod::ALL {
            assert_eq!(
                WatchdogPeriod::from_register_code(period.register_code()),
                Some(period)
            );
        }
        assert_eq!(WatchdogPeriod::from_register_code(10), None);
        assert_eq!(WatchdogPeriod::from_register_code(0xFF), None);
    }

    #[test]
    fn test_select_boundaries() {
        assert_eq!(select_period(i32::MIN), PeriodSelection::TooShort);
        assert_eq!(select_period(-4), PeriodSelection::TooShort);
        assert_eq!(select_period(0), PeriodSelection::TooShort);
        assert_eq!(select_period(7), PeriodSelection::TooShort);
        assert_eq!(select_period(8), PeriodSelection::Period(WatchdogPeriod::Ms16));
        assert_eq!(select_period(15), PeriodSelection::Period(WatchdogPeriod::Ms16));
        assert_eq!(select_period(16), PeriodSelection::Period(WatchdogPeriod::Ms16));
        assert_eq!(select_period(31), PeriodSelection::Period(WatchdogPeriod::Ms16));
        assert_eq!(select_period(32), PeriodSelection::Period(WatchdogPeriod::Ms32));
        assert_eq!(select_period(1023), PeriodSelection::Period(WatchdogPeriod::Ms512));
        assert_eq!(select_period(1024), PeriodSelection::Period(WatchdogPeriod::Ms1024));
        assert_eq!(select_period(8192), PeriodSelection::Period(WatchdogPeriod::Ms8192));
        assert_eq!(select_period(i32::MAX), PeriodSelection::Period(WatchdogPeriod::Ms8192));
    }

    #[test]
    fn test_selection_accessors() {
        let selection = select_period(300);
        assert_eq!(selection.period(), Some(WatchdogPeriod::Ms256));
        assert!(!selection.is_too_short());
        assert_eq!(PeriodSelection::TooShort.period(), None);
        assert!(PeriodSelection::default().is_too_short());
    }
}
