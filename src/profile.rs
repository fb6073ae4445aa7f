//! User profile snapshot
//!
//! The host app owns the profile document and hands the core a snapshot of it
//! as JSON. Parsing is lenient: a malformed date or number becomes `None`
//! instead of rejecting the whole document, so the dashboard can still render
//! its "no data yet" state.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ComputeError;
use crate::pregnancy::due_date_for;

/// Shortest cycle length treated as typical (days)
pub const MIN_TYPICAL_CYCLE_DAYS: u32 = 21;

/// Longest cycle length treated as typical (days)
pub const MAX_TYPICAL_CYCLE_DAYS: u32 = 35;

/// Youngest age accepted without a warning
pub const MIN_PLAUSIBLE_AGE: u32 = 12;

/// Oldest age accepted without a warning
pub const MAX_PLAUSIBLE_AGE: u32 = 60;

/// An LMP older than this is almost certainly stale
pub const MAX_PLAUSIBLE_GESTATION_DAYS: i64 = 300;

/// Read-only snapshot of the user's profile document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub partner_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_period_date: Option<NaiveDate>,
    #[serde(default, rename = "cycleLength", alias = "cycleLengthDays", deserialize_with = "lenient_u32")]
    pub cycle_length_days: Option<u32>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, rename = "isProfileComplete", alias = "profileComplete")]
    pub profile_complete: bool,
}

impl UserProfile {
    /// Parse a profile snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// First name for greetings, falling back to "Mom"
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
            .map(str::to_string)
            .unwrap_or_else(|| "Mom".to_string())
    }
}

/// Parse a date string in any of the formats the app has been seen to store.
///
/// Accepts `YYYY-MM-DD`, RFC 3339, naive ISO 8601 timestamps and `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok())
}

/// Like [`parse_date`] but reports failures as errors
pub fn parse_date_strict(raw: &str) -> Result<NaiveDate, ComputeError> {
    parse_date(raw).ok_or_else(|| ComputeError::DateParseError(raw.to_string()))
}

fn date_from_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date(s),
        // Document-store timestamps: {"seconds": ..} or {"_seconds": ..}
        Value::Object(map) => map
            .get("seconds")
            .or_else(|| map.get("_seconds"))
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = date_from_value(&value);
            if parsed.is_none() {
                tracing::warn!(%value, "ignoring unparseable profile date");
            }
            parsed
        }
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Severity of a profile issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// What is wrong with a profile snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MissingLastPeriodDate,
    LastPeriodInFuture,
    LastPeriodTooOld,
    AtypicalCycleLength,
    ImplausibleAge,
    DueDateMismatch,
    IncompleteButFlaggedComplete,
}

/// A single finding from [`ProfileValidator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileIssue {
    pub code: IssueCode,
    pub severity: IssueSeverity,
    pub message: String,
}

impl ProfileIssue {
    fn new(code: IssueCode, severity: IssueSeverity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
        }
    }
}

/// Sanity checks over a profile snapshot
pub struct ProfileValidator;

impl ProfileValidator {
    /// Report everything questionable about `profile` as of `now`
    pub fn validate(profile: &UserProfile, now: NaiveDate) -> Vec<ProfileIssue> {
        let mut issues = Vec::new();

        match profile.last_period_date {
            None => {
                issues.push(ProfileIssue::new(
                    IssueCode::MissingLastPeriodDate,
                    IssueSeverity::Warning,
                    "last period date is not set",
                ));
                if profile.profile_complete {
                    issues.push(ProfileIssue::new(
                        IssueCode::IncompleteButFlaggedComplete,
                        IssueSeverity::Error,
                        "profile is flagged complete but has no last period date",
                    ));
                }
            }
            Some(lmp) => {
                let days_since = (now - lmp).num_days();
                if days_since < 0 {
                    issues.push(ProfileIssue::new(
                        IssueCode::LastPeriodInFuture,
                        IssueSeverity::Error,
                        format!("last period date {lmp} is after {now}"),
                    ));
                } else if days_since > MAX_PLAUSIBLE_GESTATION_DAYS {
                    issues.push(ProfileIssue::new(
                        IssueCode::LastPeriodTooOld,
                        IssueSeverity::Warning,
                        format!("last period date {lmp} is {days_since} days ago"),
                    ));
                }

                if let Some(stored) = profile.due_date {
                    let derived = due_date_for(lmp);
                    if derived != Some(stored) {
                        issues.push(ProfileIssue::new(
                            IssueCode::DueDateMismatch,
                            IssueSeverity::Warning,
                            match derived {
                                Some(derived) => format!("stored due date {stored} differs from derived {derived}"),
                                None => format!("stored due date {stored} but last period date {lmp} has no representable due date"),
                            },
                        ));
                    }
                }
            }
        }

        if let Some(cycle) = profile.cycle_length_days {
            if !(MIN_TYPICAL_CYCLE_DAYS..=MAX_TYPICAL_CYCLE_DAYS).contains(&cycle) {
                issues.push(ProfileIssue::new(
                    IssueCode::AtypicalCycleLength,
                    IssueSeverity::Warning,
                    format!("cycle length of {cycle} days is outside {MIN_TYPICAL_CYCLE_DAYS}-{MAX_TYPICAL_CYCLE_DAYS}"),
                ));
            }
        }

        if let Some(age) = profile.age {
            if !(MIN_PLAUSIBLE_AGE..=MAX_PLAUSIBLE_AGE).contains(&age) {
                issues.push(ProfileIssue::new(
                    IssueCode::ImplausibleAge,
                    IssueSeverity::Warning,
                    format!("age {age} is outside {MIN_PLAUSIBLE_AGE}-{MAX_PLAUSIBLE_AGE}"),
                ));
            }
        }

        issues
    }
}
