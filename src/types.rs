//! Core types for Maternity Flux
//!
//! Value objects returned by the calculator and summarizer, plus the metric
//! vocabulary shared by the dashboard, the sample generator and the FFI layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ComputeError;

/// Pregnancy trimester
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trimester {
    #[default]
    First,
    Second,
    Third,
}

impl Trimester {
    /// Trimester for a gestational week. Boundaries are inclusive of the upper week.
    pub fn from_week(week: u32) -> Self {
        if week <= crate::pregnancy::FIRST_TRIMESTER_LAST_WEEK {
            Trimester::First
        } else if week <= crate::pregnancy::SECOND_TRIMESTER_LAST_WEEK {
            Trimester::Second
        } else {
            Trimester::Third
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trimester::First => "first",
            Trimester::Second => "second",
            Trimester::Third => "third",
        }
    }

    /// Human-readable label for dashboard cards
    pub fn label(&self) -> &'static str {
        match self {
            Trimester::First => "First Trimester",
            Trimester::Second => "Second Trimester",
            Trimester::Third => "Third Trimester",
        }
    }
}

impl fmt::Display for Trimester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived pregnancy status. Never stored; recomputed per render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationalStatus {
    /// Completed weeks since LMP (0 when LMP is missing or in the future)
    pub current_week: u32,
    /// Days into the current week (0-6)
    pub day_of_week: u32,
    pub trimester: Trimester,
    /// LMP + 280 days; `None` only for the "no data" status
    pub due_date: Option<NaiveDate>,
    /// Days from `now` until the due date, negative when overdue
    pub days_until_due: i64,
    /// Progress towards 40 weeks (0-100)
    pub progress_percent: u8,
}

impl GestationalStatus {
    /// True when this status was derived from a real LMP date
    pub fn has_data(&self) -> bool {
        self.due_date.is_some()
    }

    pub fn is_overdue(&self) -> bool {
        self.has_data() && self.days_until_due < 0
    }
}

/// Vital-sign or contraction metric tracked by the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Contraction,
    Temperature,
    HeartRate,
    #[serde(rename = "spo2")]
    SpO2,
}

impl MetricKind {
    /// All kinds, in dashboard order
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Contraction,
        MetricKind::Temperature,
        MetricKind::HeartRate,
        MetricKind::SpO2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Contraction => "contraction",
            MetricKind::Temperature => "temperature",
            MetricKind::HeartRate => "heart_rate",
            MetricKind::SpO2 => "spo2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Contraction => "Contractions",
            MetricKind::Temperature => "Body Temperature",
            MetricKind::HeartRate => "Heart Rate",
            MetricKind::SpO2 => "Blood Oxygen",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Contraction => "intensity",
            MetricKind::Temperature => "°C",
            MetricKind::HeartRate => "bpm",
            MetricKind::SpO2 => "%",
        }
    }

    /// Fixed chart display range. Used for scaling only, never for validation.
    pub fn valid_range(&self) -> ValidRange {
        match self {
            MetricKind::Contraction => ValidRange::new(0.0, 15.0),
            MetricKind::Temperature => ValidRange::new(36.5, 38.0),
            MetricKind::HeartRate => ValidRange::new(60.0, 100.0),
            MetricKind::SpO2 => ValidRange::new(90.0, 100.0),
        }
    }

    /// Format a single reading. Integer kinds truncate, they do not round.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            MetricKind::Contraction => format!("{} intensity", value.trunc() as i64),
            MetricKind::Temperature => format!("{value:.1}°C"),
            MetricKind::HeartRate => format!("{} bpm", value.trunc() as i64),
            MetricKind::SpO2 => format!("{}%", value.trunc() as i64),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "contraction" | "contractions" => Ok(MetricKind::Contraction),
            "temperature" | "temp" => Ok(MetricKind::Temperature),
            "heart_rate" | "heartrate" | "hr" => Ok(MetricKind::HeartRate),
            "spo2" | "sp_o2" | "oxygen" => Ok(MetricKind::SpO2),
            _ => Err(ComputeError::UnknownMetricKind(s.to_string())),
        }
    }
}

/// Closed display interval for a metric kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub low: f64,
    pub high: f64,
}

impl ValidRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

/// A single timestamped reading. Series order is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    #[serde(alias = "timeLabel", alias = "time")]
    pub time_label: String,
    pub value: f64,
}

impl MetricPoint {
    pub fn new(time_label: impl Into<String>, value: f64) -> Self {
        Self {
            time_label: time_label.into(),
            value,
        }
    }
}

/// Display summary of one metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub kind: MetricKind,
    /// Formatted latest reading, or "No data"
    pub latest_display: String,
    pub latest_value: Option<f64>,
    pub valid_range: ValidRange,
    pub point_count: usize,
    pub observed_min: Option<f64>,
    pub observed_max: Option<f64>,
}
