//! Prelude for wdt-interval-timer.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use wdt_interval_timer::prelude::*;
//!
//! let config = TimerConfig::repeating(250).expect("valid delay");
//! assert_eq!(config.initial_period(), PeriodSelection::Period(WatchdogPeriod::Ms128));
//! ```

pub use crate::config::{TimerConfig, TimerConfigBuilder, TimerMode};
pub use crate::error::{TimerError, TimerResult};
pub use crate::hal::{MonotonicClock, WatchdogHardware};
pub use crate::period::{PeriodSelection, WatchdogPeriod, select_period};
pub use crate::session::{TimerMetrics, TimerSession, TimerStatus};
pub use crate::software_impl::{InterruptLatency, SoftwareClock, SoftwareWatchdog};
pub use crate::timer::IntervalTimer;
