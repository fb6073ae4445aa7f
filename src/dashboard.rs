//! Dashboard composition
//!
//! One explicit call from an immutable snapshot (profile + readings) to the
//! complete value a dashboard screen renders. The host fetches the snapshot
//! from its store and re-invokes this whenever the snapshot changes.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ComputeError;
use crate::metrics::MetricSeriesSummarizer;
use crate::pregnancy::PregnancyStageCalculator;
use crate::profile::UserProfile;
use crate::types::{GestationalStatus, MetricKind, MetricPoint, MetricSummary};
use crate::{FLUX_VERSION, PRODUCER_NAME};

/// Snapshot handed in by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardInput {
    #[serde(default)]
    pub profile: UserProfile,
    /// Readings per kind, each in chronological order
    #[serde(default)]
    pub readings: BTreeMap<MetricKind, Vec<MetricPoint>>,
}

impl DashboardInput {
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Producer metadata stamped on every snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Everything the dashboard screen renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub producer: Producer,
    pub computed_at_utc: String,
    /// Reference date the status was computed for
    pub as_of: NaiveDate,
    pub display_name: String,
    pub profile_complete: bool,
    pub status: GestationalStatus,
    /// One entry per kind, in `MetricKind::ALL` order
    pub summaries: Vec<MetricSummary>,
}

impl DashboardSnapshot {
    pub fn summary(&self, kind: MetricKind) -> Option<&MetricSummary> {
        self.summaries.iter().find(|s| s.kind == kind)
    }
}

/// Builder for dashboard snapshots
pub struct DashboardBuilder {
    instance_id: String,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardBuilder {
    /// Create a builder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a builder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the dashboard for `input` as of `now`
    pub fn build(&self, input: &DashboardInput, now: NaiveDate) -> DashboardSnapshot {
        let status = PregnancyStageCalculator::compute_for_profile(&input.profile, now);

        let summaries = MetricKind::ALL
            .iter()
            .map(|kind| {
                let series = input.readings.get(kind).map(Vec::as_slice).unwrap_or(&[]);
                MetricSeriesSummarizer::summarize(*kind, series)
            })
            .collect();

        tracing::debug!(
            instance_id = %self.instance_id,
            %now,
            has_status = status.has_data(),
            "built dashboard snapshot"
        );

        DashboardSnapshot {
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: FLUX_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            as_of: now,
            display_name: input.profile.display_name(),
            profile_complete: input.profile.profile_complete,
            status,
            summaries,
        }
    }

    /// Build and encode to a JSON string
    pub fn build_to_json(&self, input: &DashboardInput, now: NaiveDate) -> Result<String, ComputeError> {
        let snapshot = self.build(input, now);
        serde_json::to_string(&snapshot).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

/// Convert a raw dashboard input JSON document into a dashboard snapshot JSON.
///
/// # Arguments
/// * `raw_json` - `{"profile": {...}, "readings": {"heart_rate": [...], ...}}`
/// * `now` - Reference date for the gestational status
///
/// # Example
/// ```ignore
/// let snapshot = dashboard_to_json(input_json, today)?;
/// ```
pub fn dashboard_to_json(raw_json: String, now: NaiveDate) -> Result<String, ComputeError> {
    let input = DashboardInput::from_json(&raw_json)?;
    DashboardBuilder::new().build_to_json(&input, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trimester;
    use pretty_assertions::assert_eq;

    fn sample_input_json() -> &'static str {
        r#"{
            "profile": {
                "fullName": "Grace Hopper",
                "lastPeriodDate": "2024-02-22",
                "isProfileComplete": true
            },
            "readings": {
                "heart_rate": [
                    { "time_label": "08:00", "value": 78.0 },
                    { "time_label": "08:05", "value": 82.7 }
                ],
                "spo2": [
                    { "timeLabel": "08:00", "value": 97.2 }
                ]
            }
        }"#
    }

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_build_dashboard() {
        let input = DashboardInput::from_json(sample_input_json()).unwrap();
        let snapshot = DashboardBuilder::with_instance_id("test".to_string()).build(&input, now());

        assert_eq!(snapshot.producer.name, PRODUCER_NAME);
        assert_eq!(snapshot.producer.instance_id, "test");
        assert_eq!(snapshot.display_name, "Grace");
        assert!(snapshot.profile_complete);

        // 2024-02-22 -> 2024-06-01 is 100 days
        assert_eq!(snapshot.status.current_week, 14);
        assert_eq!(snapshot.status.trimester, Trimester::Second);
        assert_eq!(snapshot.status.progress_percent, 35);

        let kinds: Vec<MetricKind> = snapshot.summaries.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, MetricKind::ALL.to_vec());

        assert_eq!(snapshot.summary(MetricKind::HeartRate).unwrap().latest_display, "82 bpm");
        assert_eq!(snapshot.summary(MetricKind::SpO2).unwrap().latest_display, "97%");
        assert_eq!(snapshot.summary(MetricKind::Temperature).unwrap().latest_display, "No data");
        assert_eq!(snapshot.summary(MetricKind::Contraction).unwrap().latest_display, "No data");
    }

    #[test]
    fn test_malformed_date_gives_no_data_status() {
        let json = r#"{ "profile": { "lastPeriodDate": "not a date" } }"#;
        let input = DashboardInput::from_json(json).unwrap();
        let snapshot = DashboardBuilder::new().build(&input, now());

        assert_eq!(snapshot.status, GestationalStatus::default());
        assert_eq!(snapshot.summaries.len(), 4);
    }

    #[test]
    fn test_dashboard_to_json() {
        let json = dashboard_to_json(sample_input_json().to_string(), now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"]["trimester"], "second");
        assert_eq!(value["status"]["due_date"], "2024-11-28");
        assert_eq!(value["summaries"][2]["kind"], "heart_rate");
        assert_eq!(value["as_of"], "2024-06-01");
    }

    #[test]
    fn test_end_of_calendar_lmp_gives_no_data_status() {
        let near_end = (NaiveDate::MAX - chrono::Duration::days(30)).format("%Y-%m-%d");
        let json = format!(r#"{{"profile":{{"lastPeriodDate":"{near_end}"}}}}"#);

        let snapshot: serde_json::Value =
            serde_json::from_str(&dashboard_to_json(json, now()).unwrap()).unwrap();
        assert_eq!(snapshot["status"]["current_week"], 0);
        assert!(snapshot["status"]["due_date"].is_null());
    }

    #[test]
    fn test_empty_input() {
        let json = dashboard_to_json("{}".to_string(), now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["display_name"], "Mom");
        assert_eq!(value["status"]["current_week"], 0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(dashboard_to_json("[1, 2".to_string(), now()).is_err());
    }
}
