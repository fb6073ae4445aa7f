//! Demo sample series
//!
//! Generates placeholder readings for charts when no device feed is connected.
//! Only two things are guaranteed: every value lies inside the kind's valid
//! range, and the same seed always produces the same series.

use chrono::{NaiveDateTime, TimeDelta};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::types::{MetricKind, MetricPoint};

/// Default number of points in a generated series
pub const DEFAULT_SAMPLE_POINTS: usize = 12;

/// Default spacing between generated points (minutes)
pub const DEFAULT_STEP_MINUTES: i64 = 5;

/// Largest spacing the CLI accepts (one day)
pub const MAX_STEP_MINUTES: i64 = 24 * 60;

/// Seeded generator for demo series
pub struct SampleSeriesGenerator {
    rng: ChaCha8Rng,
}

impl SampleSeriesGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate up to `count` points starting at `start`, `step_minutes` apart.
    ///
    /// The series stops early at the first time that cannot be represented.
    pub fn generate(
        &mut self,
        kind: MetricKind,
        count: usize,
        start: NaiveDateTime,
        step_minutes: i64,
    ) -> Vec<MetricPoint> {
        (0..count)
            .map_while(|i| {
                let offset = i64::try_from(i).ok()?.checked_mul(step_minutes)?;
                let at = start.checked_add_signed(TimeDelta::try_minutes(offset)?)?;
                Some(MetricPoint::new(at.format("%H:%M").to_string(), self.next_value(kind)))
            })
            .collect()
    }

    fn next_value(&mut self, kind: MetricKind) -> f64 {
        let range = kind.valid_range();
        match kind {
            MetricKind::Temperature => {
                // one decimal, endpoints are already one-decimal values
                let tenths = self
                    .rng
                    .gen_range((range.low * 10.0) as i64..=(range.high * 10.0) as i64);
                tenths as f64 / 10.0
            }
            _ => self.rng.gen_range(range.low as i64..=range.high as i64) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_values_within_valid_range() {
        let mut generator = SampleSeriesGenerator::new(7);
        for kind in MetricKind::ALL {
            let points = generator.generate(kind, 200, start(), 1);
            let range = kind.valid_range();
            assert_eq!(points.len(), 200);
            assert!(points.iter().all(|p| range.contains(p.value)), "{kind} out of range");
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = SampleSeriesGenerator::new(42).generate(MetricKind::HeartRate, 20, start(), 5);
        let b = SampleSeriesGenerator::new(42).generate(MetricKind::HeartRate, 20, start(), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_oversized_step_stops_series() {
        let points =
            SampleSeriesGenerator::new(3).generate(MetricKind::HeartRate, 3, start(), i64::MAX / 2);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].time_label, "09:00");

        let points = SampleSeriesGenerator::new(3).generate(
            MetricKind::HeartRate,
            5,
            NaiveDateTime::MAX - TimeDelta::minutes(10),
            5,
        );
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_time_labels() {
        let points =
            SampleSeriesGenerator::new(1).generate(MetricKind::Contraction, 3, start(), DEFAULT_STEP_MINUTES);
        let labels: Vec<&str> = points.iter().map(|p| p.time_label.as_str()).collect();
        assert_eq!(labels, vec!["09:00", "09:05", "09:10"]);
        assert!(points.iter().all(|p| p.value.fract() == 0.0));
    }
}
