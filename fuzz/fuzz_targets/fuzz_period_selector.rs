//! Fuzzes the period selector across the whole `i32` range.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_period_selector

#![deny(static_mut_refs)]
#![no_main]

use libfuzzer_sys::fuzz_target;
use wdt_interval_timer::{MIN_DELAY_MS, PeriodSelection, WatchdogPeriod, select_period};

fuzz_target!(|remaining: i32| {
    match select_period(remaining) {
        PeriodSelection::TooShort => assert!(remaining < MIN_DELAY_MS),
        PeriodSelection::Period(period) => {
            assert!(remaining >= MIN_DELAY_MS);
            if remaining >= WatchdogPeriod::Ms16.as_ms() {
                assert!(period.as_ms() <= remaining);
            }
            if period != WatchdogPeriod::Ms8192 {
                assert!(remaining < period.as_ms() * 2);
            }
        }
    }
});
