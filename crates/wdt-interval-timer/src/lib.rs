//! # wdt-interval-timer
//!
//! Arbitrary-length interval timer built on a coarse hardware watchdog.
//!
//! A watchdog in interrupt mode can only count down one of ten fixed periods
//! (16ms to 8192ms). This crate chains those periods to cover any delay from
//! 8ms upward:
//! - `select_period` picks the largest period that fits in what is left
//! - `IntervalTimer` re-arms the watchdog from its interrupt until the delay
//!   has elapsed, then invokes a callback
//! - In repeat mode each cycle is re-anchored by its overshoot, so error does
//!   not accumulate across cycles
//!
//! ## Accuracy
//!
//! A single cycle lands within -7ms/+8ms of the desired delay plus interrupt
//! latency. Repeat cycles stay within the same window of their ideal
//! schedule `start + n * desired`.
//!
//! ## State Machine
//!
//! ```text
//! ┌──────┐  start()   ┌───────┐  time left   ┌───────┐
//! │ Idle │───────────►│ Armed │─────────────►│ Armed │ (re-armed)
//! └──────┘            └───────┘              └───────┘
//!    ▲                    │ delay elapsed
//!    │ one-shot /         ▼
//!    │ stop()       ┌────────────┐  repeat
//!    └──────────────│ Completing │─────────► Armed (re-anchored)
//!                   └────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use wdt_interval_timer::prelude::*;
//!
//! let clock = SoftwareClock::new(0);
//! let timer = IntervalTimer::new(SoftwareWatchdog::new(), &clock);
//!
//! timer.start(|| {}, 1000, TimerMode::Repeat).expect("valid delay");
//!
//! while !timer.is_callback_pending() {
//!     if timer.expire_pending(InterruptLatency::NONE).is_none() {
//!         break;
//!     }
//! }
//!
//! assert_eq!(timer.actual_delay_ms(), 1008);
//! assert_eq!(timer.status(), TimerStatus::Armed);
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod config;
pub mod error;
pub mod hal;
pub mod period;
pub mod prelude;
pub mod session;
pub mod software_impl;
pub mod timer;

pub use config::{TimerConfig, TimerConfigBuilder, TimerMode};
pub use error::{TimerError, TimerResult};
pub use hal::{MonotonicClock, WatchdogHardware, elapsed_ms};
pub use period::{
    LONGEST_PERIOD_MS, MIN_DELAY_MS, PeriodSelection, SHORTEST_PERIOD_MS, WatchdogPeriod,
    select_period,
};
pub use session::{TimerMetrics, TimerSession, TimerState, TimerStatus};
pub use software_impl::{
    InterruptLatency, SoftwareClock, SoftwareWatchdog, SoftwareWatchdogMetrics,
};
pub use timer::{Callback, IntervalTimer};
