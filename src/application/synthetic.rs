// Degraded-mode telemetry: placeholder series shown when the feed is unavailable
use crate::domain::telemetry::{ProcessedSample, Series, TimeWindow};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// One point per hour across the window.
pub const SYNTHETIC_POINTS: usize = 24;

pub trait FallbackGenerator: Send + Sync {
    fn generate(&self, window: &TimeWindow) -> Series;
}

/// Sinusoid plus uniform noise per channel, ending at `window.end`.
pub struct SyntheticTelemetry {
    rng: Mutex<StdRng>,
}

impl SyntheticTelemetry {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SyntheticTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackGenerator for SyntheticTelemetry {
    fn generate(&self, window: &TimeWindow) -> Series {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // `i` counts hours back from the end of the window.
        let mut point = |i: usize| {
            let h = i as f64;
            ProcessedSample::new(
                window.end - Duration::hours(i as i64),
                25.0 + rng.gen_range(0.0..10.0) + (h * 0.5).sin() * 3.0,
                22.0 + rng.gen_range(0.0..5.0) + (h * 0.3).sin() * 2.0,
                2.5 + rng.gen_range(0.0..1.5) + (h * 0.7).sin() * 0.5,
                (0.5 + rng.gen_range(0.0..2.0) + (h * 0.4).sin()).max(0.0),
            )
        };

        let history: Vec<ProcessedSample> = (1..SYNTHETIC_POINTS).rev().map(&mut point).collect();
        let latest = point(0);
        Series::with_latest(history, latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_synthetic_series_covers_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap();
        let window = TimeWindow::last_day(now);
        let series = SyntheticTelemetry::seeded(1).generate(&window);

        assert_eq!(series.len(), SYNTHETIC_POINTS);
        assert!(series.samples().iter().all(|s| s.timestamp > window.start && s.timestamp <= window.end));
        assert_eq!(series.last().timestamp, now);
        assert_eq!(series.samples()[0].timestamp, now - Duration::hours(23));
        assert_eq!(series.last().time, "15:30");
    }

    #[test]
    fn test_synthetic_values_in_expected_bands() {
        let window = TimeWindow::last_day(Utc::now());
        let series = SyntheticTelemetry::seeded(99).generate(&window);
        for s in series.samples() {
            assert!((22.0..=38.0).contains(&s.temperature));
            assert!((20.0..=29.0).contains(&s.ambient_temperature));
            assert!((2.0..=4.5).contains(&s.motor_current));
            assert!(s.vibration_amplitude >= 0.0);
        }
    }

    #[test]
    fn test_seeded_generators_agree() {
        let window = TimeWindow::last_day(Utc::now());
        let a = SyntheticTelemetry::seeded(5).generate(&window);
        let b = SyntheticTelemetry::seeded(5).generate(&window);
        assert_eq!(a, b);
    }
}
