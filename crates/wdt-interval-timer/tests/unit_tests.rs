//! Unit tests for the public building blocks.

#![cfg(test)]

use wdt_interval_timer::prelude::*;
use wdt_interval_timer::{LONGEST_PERIOD_MS, MIN_DELAY_MS, SHORTEST_PERIOD_MS, TimerState};

type TestResult = Result<(), Box<dyn std::error::Error>>;

mod period_tests {
    use super::*;

    #[test]
    fn test_period_constants() {
        assert_eq!(SHORTEST_PERIOD_MS, 16);
        assert_eq!(LONGEST_PERIOD_MS, 8192);
        assert_eq!(MIN_DELAY_MS, 8);
        assert_eq!(WatchdogPeriod::ALL.len(), 10);
    }

    #[test]
    fn test_periods_sorted_ascending() {
        for pair in WatchdogPeriod::ALL.windows(2) {
            if let [shorter, longer] = pair {
                assert!(shorter < longer);
                assert_eq!(shorter.as_ms() * 2, longer.as_ms());
            }
        }
    }

    #[test]
    fn test_selection_band_edges() {
        for period in WatchdogPeriod::ALL {
            let ms = period.as_ms();
            assert_eq!(select_period(ms), PeriodSelection::Period(period));
            assert_eq!(select_period(ms * 2 - 1), PeriodSelection::Period(period));
        }
    }

    #[test]
    fn test_selection_below_shortest() {
        for remaining in 8..16 {
            assert_eq!(
                select_period(remaining),
                PeriodSelection::Period(WatchdogPeriod::Ms16)
            );
        }
        for remaining in -16..8 {
            assert_eq!(select_period(remaining), PeriodSelection::TooShort);
        }
    }

    #[test]
    fn test_period_display() {
        assert_eq!(WatchdogPeriod::Ms16.to_string(), "16ms");
        assert_eq!(WatchdogPeriod::Ms8192.to_string(), "8192ms");
    }
}

mod config_tests {
    use super::*;

    #[test]
    fn test_config_constructors() -> TestResult {
        let one_shot = TimerConfig::one_shot(100)?;
        assert_eq!(one_shot.mode, TimerMode::OneShot);

        let repeating = TimerConfig::repeating(100)?;
        assert_eq!(repeating.mode, TimerMode::Repeat);
        assert_eq!(repeating.desired_delay_ms, 100);
        Ok(())
    }

    #[test]
    fn test_config_minimum() {
        assert_eq!(
            TimerConfig::new(MIN_DELAY_MS - 1),
            Err(TimerError::delay_too_short(MIN_DELAY_MS - 1))
        );
        assert_eq!(
            TimerConfig::new(MIN_DELAY_MS).map(|c| c.initial_period()),
            Ok(PeriodSelection::Period(WatchdogPeriod::Ms16))
        );
    }

    #[test]
    fn test_hand_built_config_validation() {
        let config = TimerConfig {
            desired_delay_ms: 4,
            mode: TimerMode::Repeat,
        };
        assert_eq!(config.validate(), Err(TimerError::delay_too_short(4)));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(TimerMode::OneShot.to_string(), "OneShot");
        assert_eq!(TimerMode::Repeat.to_string(), "Repeat");
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TimerError::delay_too_short(5).to_string(),
            "desired delay of 5ms is too short (minimum 8ms)"
        );
        assert_eq!(TimerError::NoCallback.to_string(), "no callback attached");
        assert_eq!(
            TimerError::invalid_configuration("bad").to_string(),
            "invalid configuration: bad"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(TimerError::delay_too_short(0).is_configuration_error());
        assert!(TimerError::invalid_configuration("x").is_configuration_error());
        assert!(!TimerError::NoCallback.is_configuration_error());
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(TimerError::NoCallback);
        assert_eq!(err.to_string(), "no callback attached");
    }
}

mod state_tests {
    use super::*;

    #[test]
    fn test_status_raw_values() {
        for status in [
            TimerStatus::Idle,
            TimerStatus::Armed,
            TimerStatus::Completing,
        ] {
            assert_eq!(TimerStatus::from_raw(status.to_raw()), Some(status));
        }
        assert_eq!(TimerStatus::from_raw(3), None);
        assert!(TimerStatus::Armed.is_active());
        assert!(!TimerStatus::Idle.is_active());
    }

    #[test]
    fn test_state_observables() {
        let state = TimerState::new();
        assert_eq!(state.status(), TimerStatus::Idle);
        assert!(!state.take_callback_pending());

        state.mark_callback_pending();
        state.set_actual_delay_ms(1016);
        assert!(state.is_callback_pending());
        assert!(state.take_callback_pending());
        assert!(!state.is_callback_pending());
        assert_eq!(state.actual_delay_ms(), 1016);
    }

    #[test]
    fn test_metrics_accumulate() {
        let mut metrics = TimerMetrics::new();
        assert_eq!(metrics.sub_intervals_per_cycle(), None);

        for _ in 0..6 {
            metrics.record_sub_interval();
        }
        metrics.record_completion(4);
        metrics.record_completion(-3);

        assert_eq!(metrics.cycles_completed, 2);
        assert_eq!(metrics.last_excess_ms, -3);
        assert_eq!(metrics.max_excess_ms, 4);
        assert_eq!(metrics.sub_intervals_per_cycle(), Some(3));

        metrics.reset();
        assert_eq!(metrics, TimerMetrics::default());
    }
}

mod clock_tests {
    use super::*;
    use wdt_interval_timer::elapsed_ms;

    #[test]
    fn test_software_clock_wraps() {
        let clock = SoftwareClock::new(u32::MAX);
        clock.advance(1);
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(elapsed_ms(u32::MAX, clock.now_ms()), 1);
    }
}
