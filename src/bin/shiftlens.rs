//! Shiftlens CLI - Command-line interface for Shiftlens
//!
//! Commands:
//! - analyze: Score an attendance snapshot against a classifier model bundle
//! - validate: Validate a model bundle file
//! - working-days: Count working days in a date range

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shiftlens::model::{FileModelProvider, ModelBundle, ModelProvider};
use shiftlens::pipeline::PerformanceAnalyzer;
use shiftlens::report::ReportBuilder;
use shiftlens::source::{AttendanceSource, SnapshotSource};
use shiftlens::{AnalysisError, AnalysisWindow, ENGINE_VERSION};

/// Shiftlens - Attendance analytics and performance classification engine
#[derive(Parser)]
#[command(name = "shiftlens")]
#[command(author = "Shiftlens Team")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score worker attendance behavior against a trained classifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an attendance snapshot against a model bundle
    Analyze {
        /// Snapshot file with users and attendance (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the report (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Model bundle file; uses the built-in trained bundle when omitted
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Window start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Window end date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Validate a model bundle file
    Validate {
        /// Model bundle file (use - for stdin)
        #[arg(short, long)]
        model: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count working days (weekdays) in an inclusive date range
    WorkingDays {
        /// Window start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Window end date (YYYY-MM-DD)
        #[arg(long)]
        end: String,

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
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

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

fn run(cli: Cli) -> Result<(), ShiftlensCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            model,
            start,
            end,
            format,
        } => cmd_analyze(&input, &output, model.as_deref(), &start, &end, format),

        Commands::Validate { model, json } => cmd_validate(&model, json),

        Commands::WorkingDays { start, end, json } => cmd_working_days(&start, &end, json),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    model: Option<&Path>,
    start: &str,
    end: &str,
    format: OutputFormat,
) -> Result<(), ShiftlensCliError> {
    let window = AnalysisWindow::parse(start, end)?;

    // Acquire the model once, before any scoring
    let bundle = match model {
        Some(path) => FileModelProvider::new(path).load()?,
        None => ModelBundle::bundled(),
    };
    let analyzer = PerformanceAnalyzer::from_bundle(&bundle)?;

    // Read the snapshot
    let input_data = read_input(input)?;
    let source = SnapshotSource::from_json(&input_data)?;

    let workers = source.list_workers()?;
    if workers.is_empty() {
        return Err(ShiftlensCliError::NoWorkers);
    }

    let attendance = source.list_approved_attendance(&window)?;
    let results = analyzer.analyze(&workers, &attendance, &window)?;

    let report = ReportBuilder::new().build(results, &window);
    let output_data = match format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };

    write_output(output, &output_data)
}

fn cmd_validate(model: &Path, json: bool) -> Result<(), ShiftlensCliError> {
    let input_data = read_input(model)?;

    let report = match ModelBundle::from_json(&input_data) {
        Ok(bundle) => ModelValidationReport {
            path: model.display().to_string(),
            valid: true,
            clusters: Some(bundle.cluster_centers.len()),
            labels: bundle.performance_mapping.values().cloned().collect(),
            error: None,
        },
        Err(e) => ModelValidationReport {
            path: model.display().to_string(),
            valid: false,
            clusters: None,
            labels: Vec::new(),
            error: Some(e.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Model Validation Report");
        println!("=======================");
        println!("File:     {}", report.path);
        println!("Status:   {}", if report.valid { "valid" } else { "invalid" });

        if let Some(clusters) = report.clusters {
            println!("Clusters: {}", clusters);
            println!("Labels:   {}", report.labels.join(", "));
        }

        if let Some(error) = &report.error {
            println!("Error:    {}", error);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(ShiftlensCliError::ValidationFailed)
    }
}

fn cmd_working_days(start: &str, end: &str, json: bool) -> Result<(), ShiftlensCliError> {
    let window = AnalysisWindow::parse(start, end)?;
    let working_days = window.working_days();

    if json {
        println!(
            "{}",
            serde_json::json!({
                "start": start,
                "end": end,
                "workingDays": working_days,
            })
        );
    } else {
        println!("{}", working_days);
    }

    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, ShiftlensCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn write_output(path: &Path, data: &str) -> Result<(), ShiftlensCliError> {
    if path.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(path, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum ShiftlensCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    NoWorkers,
    ValidationFailed,
}

impl From<io::Error> for ShiftlensCliError {
    fn from(e: io::Error) -> Self {
        ShiftlensCliError::Io(e)
    }
}

impl From<AnalysisError> for ShiftlensCliError {
    fn from(e: AnalysisError) -> Self {
        ShiftlensCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for ShiftlensCliError {
    fn from(e: serde_json::Error) -> Self {
        ShiftlensCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ShiftlensCliError> for CliError {
    fn from(e: ShiftlensCliError) -> Self {
        match e {
            ShiftlensCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ShiftlensCliError::Analysis(AnalysisError::InvalidDate(d)) => CliError {
                code: "INVALID_DATE".to_string(),
                message: format!("Invalid date '{}'", d),
                hint: Some("Dates must be in YYYY-MM-DD form".to_string()),
            },
            ShiftlensCliError::Analysis(AnalysisError::ModelUnavailable(msg)) => CliError {
                code: "MODEL_UNAVAILABLE".to_string(),
                message: msg,
                hint: Some("Check the model bundle path".to_string()),
            },
            ShiftlensCliError::Analysis(AnalysisError::MalformedModel(msg)) => CliError {
                code: "MALFORMED_MODEL".to_string(),
                message: msg,
                hint: Some("Run 'shiftlens validate' for details".to_string()),
            },
            ShiftlensCliError::Analysis(e) => CliError {
                code: "ANALYSIS_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ShiftlensCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ShiftlensCliError::NoWorkers => CliError {
                code: "NO_WORKERS".to_string(),
                message: "No worker profiles found in the snapshot".to_string(),
                hint: Some("Ensure the snapshot contains users with a worker role".to_string()),
            },
            ShiftlensCliError::ValidationFailed => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: "Model bundle failed validation".to_string(),
                hint: Some("Fix the reported issues and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ModelValidationReport {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    clusters: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
