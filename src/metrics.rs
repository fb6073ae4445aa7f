//! Metric series summarization
//!
//! Turns an ordered series of readings into what a dashboard card or chart
//! needs: the latest value formatted for its kind, plus the fixed display
//! range used for axis scaling.

use crate::types::{MetricKind, MetricPoint, MetricSummary};

/// Display string for a series with nothing to show
pub const NO_DATA: &str = "No data";

/// Summarizer for metric series
pub struct MetricSeriesSummarizer;

impl MetricSeriesSummarizer {
    /// Summarize `series` for display. The input is never modified.
    pub fn summarize(kind: MetricKind, series: &[MetricPoint]) -> MetricSummary {
        let latest_value = series.last().map(|p| p.value).filter(|v| v.is_finite());

        let latest_display = match latest_value {
            Some(value) => kind.format_value(value),
            None => NO_DATA.to_string(),
        };

        let (observed_min, observed_max) = observed_bounds(series);

        tracing::debug!(
            kind = kind.as_str(),
            points = series.len(),
            latest = %latest_display,
            "summarized metric series"
        );

        MetricSummary {
            kind,
            latest_display,
            latest_value,
            valid_range: kind.valid_range(),
            point_count: series.len(),
            observed_min,
            observed_max,
        }
    }
}

/// Min and max over the finite values of a series
fn observed_bounds(series: &[MetricPoint]) -> (Option<f64>, Option<f64>) {
    series
        .iter()
        .map(|p| p.value)
        .filter(|v| v.is_finite())
        .fold((None, None), |(min, max), v| {
            (
                Some(min.map_or(v, |m: f64| m.min(v))),
                Some(max.map_or(v, |m: f64| m.max(v))),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValidRange;
    use pretty_assertions::assert_eq;

    fn series(values: &[f64]) -> Vec<MetricPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricPoint::new(format!("10:{:02}", i * 5), *v))
            .collect()
    }

    #[test]
    fn test_empty_temperature_series() {
        let summary = MetricSeriesSummarizer::summarize(MetricKind::Temperature, &[]);

        assert_eq!(summary.latest_display, "No data");
        assert_eq!(summary.valid_range.as_tuple(), (36.5, 38.0));
        assert_eq!(summary.latest_value, None);
        assert_eq!(summary.point_count, 0);
        assert_eq!(summary.observed_min, None);
    }

    #[test]
    fn test_heart_rate_truncates() {
        let summary =
            MetricSeriesSummarizer::summarize(MetricKind::HeartRate, &series(&[75.0, 90.1, 82.7]));

        assert_eq!(summary.latest_display, "82 bpm");
        assert_eq!(summary.latest_value, Some(82.7));
        assert_eq!(summary.point_count, 3);
        assert_eq!(summary.observed_min, Some(75.0));
        assert_eq!(summary.observed_max, Some(90.1));
    }

    #[test]
    fn test_each_kind_format() {
        let cases = [
            (MetricKind::Contraction, 9.6, "9 intensity"),
            (MetricKind::Temperature, 37.0, "37.0°C"),
            (MetricKind::HeartRate, 100.0, "100 bpm"),
            (MetricKind::SpO2, 98.4, "98%"),
        ];

        for (kind, value, expected) in cases {
            let summary = MetricSeriesSummarizer::summarize(kind, &series(&[value]));
            assert_eq!(summary.latest_display, expected);
        }
    }

    #[test]
    fn test_valid_ranges() {
        assert_eq!(MetricKind::Contraction.valid_range(), ValidRange::new(0.0, 15.0));
        assert_eq!(MetricKind::Temperature.valid_range(), ValidRange::new(36.5, 38.0));
        assert_eq!(MetricKind::HeartRate.valid_range(), ValidRange::new(60.0, 100.0));
        assert_eq!(MetricKind::SpO2.valid_range(), ValidRange::new(90.0, 100.0));
    }

    #[test]
    fn test_out_of_range_value_still_displayed() {
        let summary = MetricSeriesSummarizer::summarize(MetricKind::HeartRate, &series(&[130.2]));
        assert_eq!(summary.latest_display, "130 bpm");
        assert!(!summary.valid_range.contains(130.2));
    }

    #[test]
    fn test_non_finite_latest_is_no_data() {
        let summary =
            MetricSeriesSummarizer::summarize(MetricKind::SpO2, &series(&[97.0, f64::NAN]));
        assert_eq!(summary.latest_display, "No data");
        assert_eq!(summary.point_count, 2);
        assert_eq!(summary.observed_max, Some(97.0));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let input = series(&[36.8, 37.1]);
        let before = input.clone();
        let first = MetricSeriesSummarizer::summarize(MetricKind::Temperature, &input);
        let second = MetricSeriesSummarizer::summarize(MetricKind::Temperature, &input);

        assert_eq!(first, second);
        assert_eq!(input, before);
        assert_eq!(first.latest_display, "37.1°C");
    }
}
