//! Moodlens CLI - Command-line interface for the Moodlens engine
//!
//! Commands:
//! - score: Score one instrument from item responses
//! - report: Build a dashboard report from a snapshot document
//! - validate: Validate a snapshot's records
//! - instruments: Print the instrument catalog
//! - doctor: Run startup-style configuration checks

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use moodlens::dashboard::{DashboardBuilder, Snapshot};
use moodlens::instruments::{InstrumentCatalog, InstrumentId};
use moodlens::report::ReportEncoder;
use moodlens::scale::MoodScale;
use moodlens::scorer::AssessmentScorer;
use moodlens::trend::DEFAULT_DEADBAND;
use moodlens::{EngineError, ENGINE_VERSION, PRODUCER_NAME};

/// Moodlens - scoring and aggregation engine for local-first mental-health tracking
#[derive(Parser)]
#[command(name = "moodlens")]
#[command(author = "Moodlens Project")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score assessments and build mood dashboards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one instrument from item responses
    Score {
        /// Instrument id (phq9, gad7, cesd, oasis)
        #[arg(short, long)]
        instrument: String,

        /// Comma-separated item responses in questionnaire order
        #[arg(short, long)]
        responses: String,

        /// Output the score as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a dashboard report from a snapshot document
    Report {
        /// Input snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Reference time, RFC 3339 (defaults to now)
        #[arg(long)]
        as_of: Option<String>,

        /// Dashboard window length in days
        #[arg(long, default_value = "14")]
        window_days: u32,

        /// Trend deadband magnitude
        #[arg(long, default_value_t = DEFAULT_DEADBAND)]
        deadband: f64,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate a snapshot's records
    Validate {
        /// Input snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the instrument catalog
    Instruments {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run startup-style configuration checks
    Doctor {
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
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MoodlensCliError> {
    match cli.command {
        Commands::Score {
            instrument,
            responses,
            json,
        } => cmd_score(&instrument, &responses, json),

        Commands::Report {
            input,
            output,
            as_of,
            window_days,
            deadband,
            output_format,
        } => cmd_report(
            &input,
            &output,
            as_of.as_deref(),
            window_days,
            deadband,
            output_format,
        ),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Instruments { json } => cmd_instruments(json),

        Commands::Doctor { json } => cmd_doctor(json),
    }
}

fn cmd_score(instrument: &str, responses: &str, json: bool) -> Result<(), MoodlensCliError> {
    let id = InstrumentId::from_str(instrument)?;

    let items: Vec<u32> = responses
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| MoodlensCliError::ParseError(format!("bad item score: {part:?}")))
        })
        .collect::<Result<_, _>>()?;

    let catalog = InstrumentCatalog::builtin();
    let def = catalog
        .get(id)
        .ok_or_else(|| EngineError::UnknownInstrument(instrument.to_string()))?;
    let score = AssessmentScorer::score(def, &items)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        println!(
            "{}: total {} ({})",
            def.name,
            score.total,
            score.band.severity.as_str()
        );
        println!(
            "band {}..={} of 0..={}",
            score.band.low,
            score.band.high,
            def.max_total()
        );
    }

    Ok(())
}

fn cmd_report(
    input: &Path,
    output: &Path,
    as_of: Option<&str>,
    window_days: u32,
    deadband: f64,
    output_format: OutputFormat,
) -> Result<(), MoodlensCliError> {
    let snapshot = read_snapshot(input)?;

    let as_of = match as_of {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| MoodlensCliError::ParseError(format!("invalid --as-of: {e}")))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let builder = DashboardBuilder::with_deadband(deadband);
    let dashboard = builder.build(&snapshot, as_of, window_days)?;
    let report = ReportEncoder::new().encode(dashboard);

    let output_data = match output_format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{output_data}");
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), MoodlensCliError> {
    let snapshot = read_snapshot(input)?;
    let catalog = InstrumentCatalog::builtin();
    let scale = MoodScale::seven_point();

    let mut errors: Vec<ValidationErrorDetail> = Vec::new();

    for response in &snapshot.assessments {
        if let Err(e) = AssessmentScorer::score_response(&catalog, response) {
            errors.push(ValidationErrorDetail {
                record: "assessment".to_string(),
                id: response.id.to_string(),
                error: e.to_string(),
            });
        }
    }

    for checkin in &snapshot.checkins {
        if let Err(e) = checkin.validate(scale) {
            errors.push(ValidationErrorDetail {
                record: "checkin".to_string(),
                id: checkin.id.to_string(),
                error: e.to_string(),
            });
        }
    }

    for goal in &snapshot.goals {
        if goal.period_days == 0 {
            errors.push(ValidationErrorDetail {
                record: "goal".to_string(),
                id: goal.id.to_string(),
                error: EngineError::EmptyGoalPeriod.to_string(),
            });
        }
    }

    let total_records =
        snapshot.assessments.len() + snapshot.checkins.len() + snapshot.goals.len();
    let report = ValidationReport {
        total_records,
        valid_records: total_records - errors.len(),
        invalid_records: errors.len(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {} {}: {}", err.record, err.id, err.error);
            }
        }
    }

    if report.invalid_records > 0 {
        Err(MoodlensCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_instruments(json: bool) -> Result<(), MoodlensCliError> {
    let catalog = InstrumentCatalog::builtin();

    if json {
        let defs: Vec<_> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&defs)?);
    } else {
        for def in catalog.iter() {
            println!("{} - {}", def.id, def.name);
            println!(
                "  {} items, each {}..={}, total 0..={}",
                def.item_count,
                def.item_min,
                def.item_max,
                def.max_total()
            );
            for band in &def.bands {
                println!(
                    "  {:>2}..={:<2} {}",
                    band.low,
                    band.high,
                    band.severity.as_str()
                );
            }
            println!();
        }
    }

    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), MoodlensCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Moodlens version {ENGINE_VERSION}"),
    });

    // Catalog validation is the startup gate: a malformed band table must
    // fail here, not during a scoring call.
    let catalog = InstrumentCatalog::builtin();
    match catalog.validate() {
        Ok(()) => {
            let count = catalog.iter().count();
            checks.push(DoctorCheck {
                name: "instrument_catalog".to_string(),
                status: CheckStatus::Ok,
                message: format!("{count} instruments, band tables contiguous"),
            });
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "instrument_catalog".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            });
        }
    }

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
            message: "stdin is a pipe (snapshot input ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Moodlens Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MoodlensCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_snapshot(input: &Path) -> Result<Snapshot, MoodlensCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    Ok(serde_json::from_str(&input_data)?)
}

// Error types

#[derive(Debug)]
enum MoodlensCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    ParseError(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for MoodlensCliError {
    fn from(e: io::Error) -> Self {
        MoodlensCliError::Io(e)
    }
}

impl From<EngineError> for MoodlensCliError {
    fn from(e: EngineError) -> Self {
        MoodlensCliError::Engine(e)
    }
}

impl From<serde_json::Error> for MoodlensCliError {
    fn from(e: serde_json::Error) -> Self {
        MoodlensCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MoodlensCliError> for CliError {
    fn from(e: MoodlensCliError) -> Self {
        match e {
            MoodlensCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MoodlensCliError::Engine(e) => CliError {
                code: if e.is_configuration() {
                    "CONFIGURATION_ERROR".to_string()
                } else {
                    "INVALID_INPUT".to_string()
                },
                message: e.to_string(),
                hint: Some("Run 'moodlens instruments' for expected shapes".to_string()),
            },
            MoodlensCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MoodlensCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check argument format".to_string()),
            },
            MoodlensCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} records failed validation"),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            MoodlensCliError::DoctorFailed => CliError {
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
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    record: String,
    id: String,
    error: String,
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
    Error,
}
