//! Maternity Flux - On-device pregnancy stage and vital-sign summary engine
//!
//! Flux is the computation core behind a maternal-health tracking app. The app
//! hands it immutable snapshots (a profile document, ordered readings) and gets
//! back plain values to render:
//!
//! - **Pregnancy**: gestational week, trimester, due date and progress from an LMP date
//! - **Metrics**: latest-reading display strings and chart ranges per metric kind
//! - **Dashboard**: both of the above composed from a single snapshot
//!
//! Persistence, rendering and network access stay with the host.

pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod pregnancy;
pub mod profile;
#[cfg(feature = "sample")]
pub mod sample;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use dashboard::{dashboard_to_json, DashboardBuilder, DashboardInput, DashboardSnapshot};
pub use error::ComputeError;
pub use metrics::MetricSeriesSummarizer;
pub use pregnancy::PregnancyStageCalculator;
pub use profile::{ProfileValidator, UserProfile};
pub use types::{GestationalStatus, MetricKind, MetricPoint, MetricSummary, Trimester, ValidRange};

#[cfg(feature = "sample")]
pub use sample::SampleSeriesGenerator;

/// Flux version embedded in all dashboard snapshots
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for dashboard snapshots
pub const PRODUCER_NAME: &str = "maternity-flux";
