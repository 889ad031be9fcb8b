//! Error types for interval timer operations.

use crate::period::MIN_DELAY_MS;

/// Errors reported synchronously by the timer's public API.
///
/// Nothing that happens inside the interrupt handler is surfaced here; a
/// short remainder during a repeating cycle is absorbed by skipping the
/// re-arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The desired delay selects no watchdog period at cycle start.
    #[error("desired delay of {desired_delay_ms}ms is too short (minimum {minimum_ms}ms)")]
    DelayTooShort {
        /// Delay the caller asked for.
        desired_delay_ms: i32,
        /// Smallest delay that is accepted.
        minimum_ms: i32,
    },
    /// `restart` was called before any callback was attached.
    #[error("no callback attached")]
    NoCallback,
    /// Configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

impl TimerError {
    /// Create a delay-too-short error for `desired_delay_ms`.
    #[must_use]
    pub fn delay_too_short(desired_delay_ms: i32) -> Self {
        Self::DelayTooShort {
            desired_delay_ms,
            minimum_ms: MIN_DELAY_MS,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: &'static str) -> Self {
        Self::InvalidConfiguration(msg)
    }

    /// Whether this error comes from the caller's configuration rather than timer state.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DelayTooShort { .. } | Self::InvalidConfiguration(_)
        )
    }
}

/// A specialized `Result` type for interval timer operations.
pub type TimerResult<T> = core::result::Result<T, TimerError>;
