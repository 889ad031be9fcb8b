//! Configuration types for the interval timer.

use crate::error::{TimerError, TimerResult};
use crate::period::{PeriodSelection, select_period};

/// What happens once a cycle's delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TimerMode {
    /// Invoke the callback once, then go idle.
    #[default]
    OneShot = 0,
    /// Invoke the callback every cycle, re-anchoring each cycle to absorb overshoot.
    Repeat = 1,
}

impl TimerMode {
    /// Whether a completed cycle schedules the next one.
    #[must_use]
    pub fn is_repeating(self) -> bool {
        matches!(self, Self::Repeat)
    }

    /// Get the mode as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneShot => "OneShot",
            Self::Repeat => "Repeat",
        }
    }
}

impl core::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated timer configuration.
///
/// Holding a `TimerConfig` means the delay selects at least one watchdog
/// period, so starting a cycle with it cannot be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Desired delay for one cycle, in milliseconds.
    pub desired_delay_ms: i32,
    /// One-shot or repeating.
    pub mode: TimerMode,
}

impl TimerConfig {
    /// Create a configuration for `desired_delay_ms` in [`TimerMode::OneShot`].
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if the delay is below 8ms.
    pub fn new(desired_delay_ms: i32) -> TimerResult<Self> {
        Self::with_mode(desired_delay_ms, TimerMode::OneShot)
    }

    /// Create a configuration with an explicit mode.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if the delay is below 8ms.
    pub fn with_mode(desired_delay_ms: i32, mode: TimerMode) -> TimerResult<Self> {
        let config = Self {
            desired_delay_ms,
            mode,
        };
        config.validate()?;
        Ok(config)
    }

    /// Shorthand for a one-shot configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if the delay is below 8ms.
    pub fn one_shot(desired_delay_ms: i32) -> TimerResult<Self> {
        Self::with_mode(desired_delay_ms, TimerMode::OneShot)
    }

    /// Shorthand for a repeating configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if the delay is below 8ms.
    pub fn repeating(desired_delay_ms: i32) -> TimerResult<Self> {
        Self::with_mode(desired_delay_ms, TimerMode::Repeat)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> TimerConfigBuilder {
        TimerConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::DelayTooShort`] if the first period selection
    /// for the desired delay is [`PeriodSelection::TooShort`].
    pub fn validate(&self) -> TimerResult<()> {
        if self.initial_period().is_too_short() {
            return Err(TimerError::delay_too_short(self.desired_delay_ms));
        }
        Ok(())
    }

    /// The period the watchdog is first armed for.
    #[must_use]
    pub fn initial_period(&self) -> PeriodSelection {
        select_period(self.desired_delay_ms)
    }
}

/// Builder for `TimerConfig`.
#[derive(Debug, Default)]
pub struct TimerConfigBuilder {
    desired_delay_ms: Option<i32>,
    mode: TimerMode,
}

impl TimerConfigBuilder {
    /// Set the desired delay in milliseconds.
    #[must_use]
    pub fn desired_delay_ms(mut self, ms: i32) -> Self {
        self.desired_delay_ms = Some(ms);
        self
    }

    /// Set the mode.
    #[must_use]
    pub fn mode(mut self, mode: TimerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no delay was set or the delay is too short.
    pub fn build(self) -> TimerResult<TimerConfig> {
        let desired_delay_ms = self
            .desired_delay_ms
            .ok_or(TimerError::invalid_configuration("desired_delay_ms is required"))?;
        TimerConfig::with_mode(desired_delay_ms, self.mode)
    }
}
