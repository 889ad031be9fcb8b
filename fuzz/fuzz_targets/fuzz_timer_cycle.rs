//! Drives a simulated timer through arbitrary start/stop/expiry sequences.
//!
//! Each input byte is one step: start, restart, stop, or a watchdog expiry
//! with some interrupt latency. The timer must never panic, never arm the
//! watchdog on top of a running countdown, and keep every completed cycle
//! within its accuracy window.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_timer_cycle

#![deny(static_mut_refs)]
#![no_main]

use libfuzzer_sys::fuzz_target;
use wdt_interval_timer::prelude::*;

fuzz_target!(|data: &[u8]| {
    let Some((&seed, steps)) = data.split_first() else {
        return;
    };
    let clock = SoftwareClock::new(u32::from(seed).wrapping_mul(0x0101_0101));
    let timer = IntervalTimer::new(SoftwareWatchdog::new(), &clock);

    for &step in steps.iter().take(512) {
        let desired = i32::from(step >> 2) * 37;
        match step & 0b11 {
            0 => {
                let mode = if step & 0x80 == 0 {
                    TimerMode::OneShot
                } else {
                    TimerMode::Repeat
                };
                let started = timer.start(|| {}, desired, mode);
                assert_eq!(started.is_ok(), desired >= 8);
            }
            1 => {
                if timer.restart(desired, TimerMode::Repeat).is_ok() {
                    assert_eq!(timer.status(), TimerStatus::Armed);
                }
            }
            2 => {
                timer.stop();
                assert_eq!(timer.status(), TimerStatus::Idle);
            }
            _ => {
                let latency = InterruptLatency {
                    per_interrupt_ms: u32::from(step >> 6),
                    completion_ms: u32::from((step >> 2) & 0x0F),
                };
                timer.expire_pending(latency);
                if timer.take_callback_pending() {
                    let session = timer.session();
                    let error = session.actual_delay_ms - session.desired_delay_ms;
                    assert!((-7..=8 + 3 + 15).contains(&error));
                }
            }
        }
    }

    assert_eq!(timer.with_hardware(|hw| hw.metrics().overlapping_arms), 0);
});
