//! mflux - Command-line interface for Maternity Flux
//!
//! Commands:
//! - status: Gestational status for a last-period date
//! - summarize: Summarize a metric series
//! - dashboard: Build a dashboard snapshot from a profile + readings document
//! - sample: Generate a demo metric series
//! - validate: Check a profile snapshot for problems
//! - doctor: Diagnose configuration and inputs

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveTime};
use tracing_subscriber::EnvFilter;

use maternity_flux::dashboard::{DashboardBuilder, DashboardInput, DashboardSnapshot};
use maternity_flux::profile::{parse_date_strict, IssueSeverity, ProfileIssue, ProfileValidator};
use maternity_flux::sample::{
    SampleSeriesGenerator, DEFAULT_SAMPLE_POINTS, DEFAULT_STEP_MINUTES, MAX_STEP_MINUTES,
};
use maternity_flux::{
    GestationalStatus, MetricKind, MetricPoint, MetricSeriesSummarizer, MetricSummary,
    PregnancyStageCalculator, UserProfile, FLUX_VERSION, PRODUCER_NAME,
};

/// mflux - Pregnancy stage and vital-sign summaries for maternal-health apps
#[derive(Parser)]
#[command(name = "mflux")]
#[command(version = FLUX_VERSION)]
#[command(about = "Compute pregnancy status and metric summaries", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gestational status for a last-period date
    Status {
        /// Last menstrual period (YYYY-MM-DD); an unreadable date reports no data
        #[arg(long)]
        lmp: String,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        now: Option<String>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Summarize a metric series (JSON array of {time_label, value})
    Summarize {
        /// Metric kind (contraction, temperature, heart_rate, spo2)
        #[arg(short, long)]
        kind: String,

        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Build a dashboard snapshot from {profile, readings}
    Dashboard {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        now: Option<String>,

        /// Producer instance ID stamped on the snapshot
        #[arg(long)]
        instance_id: Option<String>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Generate a demo metric series
    Sample {
        /// Metric kind (contraction, temperature, heart_rate, spo2)
        #[arg(short, long)]
        kind: String,

        /// Number of points
        #[arg(long, default_value_t = DEFAULT_SAMPLE_POINTS)]
        count: usize,

        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Time of the first point (HH:MM)
        #[arg(long, default_value = "08:00")]
        start: String,

        /// Minutes between points (1-1440)
        #[arg(long, default_value_t = DEFAULT_STEP_MINUTES)]
        step_minutes: i64,
    },

    /// Check a profile snapshot for problems
    Validate {
        /// Profile JSON file (use - for stdin)
        #[arg(short, long)]
        profile: PathBuf,

        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        now: Option<String>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and inputs
    Doctor {
        /// Profile file to check
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable text
    Text,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), FluxCliError> {
    match cli.command {
        Commands::Status { lmp, now, format } => cmd_status(&lmp, now.as_deref(), format),

        Commands::Summarize {
            kind,
            input,
            format,
        } => cmd_summarize(&kind, &input, format),

        Commands::Dashboard {
            input,
            now,
            instance_id,
            format,
        } => cmd_dashboard(&input, now.as_deref(), instance_id, format),

        Commands::Sample {
            kind,
            count,
            seed,
            start,
            step_minutes,
        } => cmd_sample(&kind, count, seed, &start, step_minutes),

        Commands::Validate { profile, now, json } => cmd_validate(&profile, now.as_deref(), json),

        Commands::Doctor { profile, json } => cmd_doctor(profile.as_deref(), json),
    }
}

fn cmd_status(lmp: &str, now: Option<&str>, format: OutputFormat) -> Result<(), FluxCliError> {
    let now = resolve_now(now)?;
    let status = PregnancyStageCalculator::compute_from_str(lmp, now);

    let output = match format {
        OutputFormat::Text => render_status(&status),
        _ => to_json(&status, &format)?,
    };
    println!("{output}");
    Ok(())
}

fn cmd_summarize(kind: &str, input: &Path, format: OutputFormat) -> Result<(), FluxCliError> {
    let kind: MetricKind = kind.parse()?;
    let input_data = read_input(input)?;
    let series: Vec<MetricPoint> = serde_json::from_str(&input_data)?;

    let summary = MetricSeriesSummarizer::summarize(kind, &series);

    let output = match format {
        OutputFormat::Text => render_summary(&summary),
        _ => to_json(&summary, &format)?,
    };
    println!("{output}");
    Ok(())
}

fn cmd_dashboard(
    input: &Path,
    now: Option<&str>,
    instance_id: Option<String>,
    format: OutputFormat,
) -> Result<(), FluxCliError> {
    let now = resolve_now(now)?;
    let input_data = read_input(input)?;
    if input_data.trim().is_empty() {
        return Err(FluxCliError::EmptyInput);
    }

    let dashboard_input = DashboardInput::from_json(&input_data)?;
    let builder = match instance_id {
        Some(id) => DashboardBuilder::with_instance_id(id),
        None => DashboardBuilder::new(),
    };
    let snapshot = builder.build(&dashboard_input, now);

    let output = match format {
        OutputFormat::Text => render_dashboard(&snapshot),
        _ => to_json(&snapshot, &format)?,
    };
    println!("{output}");
    Ok(())
}

fn cmd_sample(
    kind: &str,
    count: usize,
    seed: u64,
    start: &str,
    step_minutes: i64,
) -> Result<(), FluxCliError> {
    let kind: MetricKind = kind.parse()?;
    if !(1..=MAX_STEP_MINUTES).contains(&step_minutes) {
        return Err(FluxCliError::Usage(format!(
            "--step-minutes must be between 1 and {MAX_STEP_MINUTES}, got {step_minutes}"
        )));
    }
    let start_time = NaiveTime::parse_from_str(start, "%H:%M")
        .map_err(|e| FluxCliError::Usage(format!("invalid --start '{start}': {e}")))?;
    let start = Local::now().date_naive().and_time(start_time);

    let points = SampleSeriesGenerator::new(seed).generate(kind, count, start, step_minutes);
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

fn cmd_validate(profile: &Path, now: Option<&str>, json: bool) -> Result<(), FluxCliError> {
    let now = resolve_now(now)?;
    let input_data = read_input(profile)?;
    let profile = UserProfile::from_json(&input_data)?;

    let issues = ProfileValidator::validate(&profile, now);
    let errors = issues
        .iter()
        .filter(|issue| issue.severity == IssueSeverity::Error)
        .count();

    let report = ValidationReport {
        as_of: now,
        valid: errors == 0,
        errors,
        warnings: issues.len() - errors,
        issues,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Profile validation as of {}", report.as_of);
        if report.issues.is_empty() {
            println!("  ✓ no issues");
        }
        for issue in &report.issues {
            println!("  {} {}", severity_marker(issue), issue.message);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(FluxCliError::ValidationFailed(report.errors))
    }
}

fn cmd_doctor(profile: Option<&Path>, json: bool) -> Result<(), FluxCliError> {
    let mut checks = vec![
        DoctorCheck {
            name: "version".to_string(),
            status: CheckStatus::Ok,
            message: format!("{PRODUCER_NAME} {FLUX_VERSION}"),
        },
        DoctorCheck {
            name: "clock".to_string(),
            status: CheckStatus::Ok,
            message: format!("today is {}", Local::now().date_naive()),
        },
    ];

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is piped (can read - inputs)".to_string(),
        }
    };
    checks.push(stdin_check);

    if let Some(path) = profile {
        checks.push(check_profile(path));
    }

    let healthy = !checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: FLUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} {}", report.producer, report.version);
        for check in &report.checks {
            let marker = match check.status {
                CheckStatus::Ok => "✓",
                CheckStatus::Warning => "!",
                CheckStatus::Error => "✗",
            };
            println!("  {marker} {}: {}", check.name, check.message);
        }
    }

    if healthy {
        Ok(())
    } else {
        Err(FluxCliError::DoctorFailed)
    }
}

fn check_profile(path: &Path) -> DoctorCheck {
    let name = "profile".to_string();
    let parsed = fs::read_to_string(path)
        .map_err(FluxCliError::from)
        .and_then(|data| UserProfile::from_json(&data).map_err(FluxCliError::from));

    match parsed {
        Ok(profile) => {
            let issues = ProfileValidator::validate(&profile, Local::now().date_naive());
            if issues.is_empty() {
                DoctorCheck {
                    name,
                    status: CheckStatus::Ok,
                    message: format!("{} parsed cleanly", path.display()),
                }
            } else {
                DoctorCheck {
                    name,
                    status: CheckStatus::Warning,
                    message: format!("{} has {} issue(s); run 'mflux validate'", path.display(), issues.len()),
                }
            }
        }
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("{}: {}", path.display(), CliError::from(e).message),
        },
    }
}

fn resolve_now(now: Option<&str>) -> Result<NaiveDate, FluxCliError> {
    match now {
        Some(raw) => Ok(parse_date_strict(raw)?),
        None => Ok(Local::now().date_naive()),
    }
}

fn read_input(input: &Path) -> Result<String, FluxCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn to_json<T: serde::Serialize>(value: &T, format: &OutputFormat) -> Result<String, FluxCliError> {
    Ok(match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
        _ => serde_json::to_string(value)?,
    })
}

fn render_status(status: &GestationalStatus) -> String {
    let Some(due) = status.due_date else {
        return "No pregnancy data yet".to_string();
    };

    let due_note = if status.is_overdue() {
        format!("{} days overdue", -status.days_until_due)
    } else {
        format!("{} days to go", status.days_until_due)
    };

    format!(
        "Week {} (+{}d) · {} · {}% · due {} ({})",
        status.current_week,
        status.day_of_week,
        status.trimester,
        status.progress_percent,
        due,
        due_note
    )
}

fn render_summary(summary: &MetricSummary) -> String {
    let range = summary.valid_range;
    format!(
        "{}: {} (display range {}-{} {}, {} points)",
        summary.kind.label(),
        summary.latest_display,
        range.low,
        range.high,
        summary.kind.unit(),
        summary.point_count
    )
}

fn render_dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut lines = vec![
        format!("Hello, {}", snapshot.display_name),
        render_status(&snapshot.status),
    ];
    if !snapshot.profile_complete {
        lines.push("Profile incomplete".to_string());
    }
    lines.extend(snapshot.summaries.iter().map(render_summary));
    lines.join("\n")
}

fn severity_marker(issue: &ProfileIssue) -> &'static str {
    match issue.severity {
        IssueSeverity::Warning => "!",
        IssueSeverity::Error => "✗",
    }
}

// Error types

#[derive(Debug)]
enum FluxCliError {
    Io(io::Error),
    Compute(maternity_flux::ComputeError),
    Json(serde_json::Error),
    Usage(String),
    EmptyInput,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for FluxCliError {
    fn from(e: io::Error) -> Self {
        FluxCliError::Io(e)
    }
}

impl From<maternity_flux::ComputeError> for FluxCliError {
    fn from(e: maternity_flux::ComputeError) -> Self {
        FluxCliError::Compute(e)
    }
}

impl From<serde_json::Error> for FluxCliError {
    fn from(e: serde_json::Error) -> Self {
        FluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FluxCliError> for CliError {
    fn from(e: FluxCliError) -> Self {
        match e {
            FluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FluxCliError::Compute(e) => CliError {
                code: "INPUT_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Dates are YYYY-MM-DD; kinds are contraction, temperature, heart_rate, spo2".to_string()),
            },
            FluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FluxCliError::Usage(msg) => CliError {
                code: "USAGE_ERROR".to_string(),
                message: msg,
                hint: Some("Run with --help for usage".to_string()),
            },
            FluxCliError::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "Input is empty".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            FluxCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} profile error(s)", count),
                hint: Some("Fix the reported profile fields and retry".to_string()),
            },
            FluxCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    as_of: NaiveDate,
    valid: bool,
    errors: usize,
    warnings: usize,
    issues: Vec<ProfileIssue>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
