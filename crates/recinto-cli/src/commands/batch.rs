//! Batch analysis of a measurement campaign directory.

use crate::discovery::{Classifier, Recording, RecordingSource, discover};
use crate::pool::{JobOutcome, WorkerPool};
use crate::report::{self, RecordingFailure, ResultRow};
use anyhow::Context;
use clap::{Args, ValueEnum};
use recinto_analysis::{AnalysisError, DrIntegrationLimit, analyze_a_format, analyze_omni};
use recinto_config::{
    BatchConfig, OutputFormat, default_config_path, ensure_user_config_dir, find_config,
};
use recinto_io::{read_aformat, read_omni};
use std::path::{Path, PathBuf};

/// Results format for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliOutputFormat {
    Tsv,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Tsv => OutputFormat::Tsv,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Args)]
pub struct BatchArgs {
    /// Root directory of the measurement campaign
    pub input: PathBuf,

    /// Results file (default: <INPUT>/results.tsv or results.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Batch configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Worker threads (0 = available parallelism minus two)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-recording timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// DR reverberant window length in seconds after the arrival
    #[arg(long, conflicts_with = "no_dr_limit")]
    pub dr_limit: Option<f64>,

    /// Integrate DR reverberant energy to the end of the signal
    #[arg(long)]
    pub no_dr_limit: bool,

    /// Results format
    #[arg(long, value_enum)]
    pub format: Option<CliOutputFormat>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Save the effective settings as the user default and exit
    #[arg(long)]
    pub save_config: bool,
}

/// A successfully analysed recording and its per-parameter failures.
struct Analysed {
    row: ResultRow,
    failures: Vec<RecordingFailure>,
}

fn load_config(args: &BatchArgs) -> anyhow::Result<BatchConfig> {
    if let Some(path) = &args.config
        && !path.is_file()
    {
        anyhow::bail!("config file not found: {}", path.display());
    }

    let mut config = match find_config(args.config.as_deref()) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading batch config");
            BatchConfig::load(&path)?
        }
        None => BatchConfig::default(),
    };

    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = timeout;
    }
    if let Some(limit) = args.dr_limit {
        config.dr_integration_limit_seconds = limit;
        config.dr_unbounded = false;
    }
    if args.no_dr_limit {
        config.dr_unbounded = true;
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }

    config.validate()?;
    Ok(config)
}

fn analyse(recording: &Recording, limit: DrIntegrationLimit) -> Result<Analysed, RecordingFailure> {
    let id = recording.id();
    tracing::debug!(recording = %id, position = ?recording.position, "analysing");
    let params = match &recording.source {
        RecordingSource::Omni(path) => {
            let (rir, sample_rate) =
                read_omni(path).map_err(|e| RecordingFailure::new(&id, "load", e))?;
            analyze_omni(&rir, sample_rate, limit)
        }
        RecordingSource::Ambi(source) => {
            let capture = read_aformat(source).map_err(|e| RecordingFailure::new(&id, "load", e))?;
            analyze_a_format(&capture, limit)
        }
    }
    .map_err(|e| {
        let stage = match e {
            AnalysisError::NoPeakFound { .. } => "arrival",
            _ => "analysis",
        };
        RecordingFailure::new(&id, stage, e)
    })?;

    let failures = params
        .failures()
        .into_iter()
        .map(|(parameter, e)| {
            tracing::warn!(recording = %id, %parameter, error = %e, "parameter undefined");
            RecordingFailure::new(&id, parameter.name(), e)
        })
        .collect();

    Ok(Analysed {
        row: ResultRow::new(
            &recording.measurement,
            recording.files.join(","),
            recording
                .file_paths()
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(","),
            &params,
        ),
        failures,
    })
}

fn default_output(input: &Path, format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Tsv => input.join("results.tsv"),
        OutputFormat::Json => input.join("results.json"),
    }
}

/// Run the batch command.
pub fn run(args: BatchArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    if args.save_config {
        ensure_user_config_dir()?;
        let path = default_config_path();
        config.save(&path)?;
        println!("Saved batch settings to {}", path.display());
        return Ok(());
    }

    if !args.input.is_dir() {
        anyhow::bail!("input is not a directory: {}", args.input.display());
    }
    let classifier = Classifier::new(&config.omni_marker, &config.ambisonic_marker)?;

    let recordings = discover(&args.input, &classifier)
        .with_context(|| format!("failed to scan {}", args.input.display()))?;
    let ids: Vec<String> = recordings.iter().map(Recording::id).collect();

    let pool = WorkerPool::new(config.worker_count(), config.timeout());
    println!(
        "Found {} recordings, analysing with {} workers",
        recordings.len(),
        pool.workers()
    );
    tracing::info!(
        recordings = recordings.len(),
        workers = pool.workers(),
        timeout = ?config.timeout(),
        limit = ?config.dr_limit(),
        "starting batch"
    );

    let pb = if args.no_progress {
        indicatif::ProgressBar::hidden()
    } else {
        super::common::progress_bar(recordings.len())?
    };

    let limit = config.dr_limit();
    let outcomes = pool.run(
        recordings,
        move |recording: Recording| analyse(&recording, limit),
        |_| pb.inc(1),
    )?;
    pb.finish_and_clear();

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for (id, outcome) in ids.iter().zip(outcomes) {
        match outcome {
            JobOutcome::Done(Ok(analysed)) => {
                rows.push(analysed.row);
                failures.extend(analysed.failures);
            }
            JobOutcome::Done(Err(failure)) => {
                tracing::warn!(recording = %failure.recording, stage = %failure.stage, error = %failure.message, "recording failed");
                failures.push(failure);
            }
            JobOutcome::TimedOut => failures.push(RecordingFailure::new(
                id.as_str(),
                "timeout",
                format!("no result within {:?}", config.timeout()),
            )),
        }
    }
    report::sort_rows(&mut rows);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input, config.output_format));
    let content = match config.output_format {
        OutputFormat::Tsv => report::to_tsv(&rows),
        OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
    };
    std::fs::write(&output, content)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {} rows to {}", rows.len(), output.display());

    if !failures.is_empty() {
        let failures_path = output
            .parent()
            .map_or_else(|| PathBuf::from("failures.tsv"), |dir| dir.join("failures.tsv"));
        std::fs::write(&failures_path, report::failures_to_tsv(&failures))
            .with_context(|| format!("failed to write {}", failures_path.display()))?;

        println!();
        println!("{} failures:", failures.len());
        for f in &failures {
            println!("  {} [{}]: {}", f.recording, f.stage, f.message);
        }
        println!("Failure list written to {}", failures_path.display());
    }

    Ok(())
}
