//! evrlock CLI - EVR timing-lock log analysis.
//!
//! Decodes a lock monitor sample log and reports the calibrated drift, or
//! exports the plot-ready sequences as JSON for an external plotter.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use evrlock_analysis::{
    try_analyze, AnalysisConfig, DriftFits, FitConfig, FitWindow, Histogram, LinearFit,
    LockAnalysis, PipelineStatistics, ScaleFactors,
};
use evrlock_core::BitWidth;
use evrlock_io::{ReaderStatistics, SampleLogReader};
use log::{debug, info};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Log(#[from] evrlock_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] evrlock_core::Error),

    #[error("Analysis error: {0}")]
    Analysis(#[from] evrlock_analysis::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// EVR timing-lock sample analysis.
#[derive(Parser)]
#[command(name = "evrlock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a log.
#[derive(Args, Debug)]
struct InputArgs {
    /// Sample log written by the lock monitor
    #[arg(short, long, default_value = "evrlock.dat")]
    file: PathBuf,

    /// Picoseconds per phase-shifter step
    #[arg(long, default_value = "15.0")]
    ps_per_step: f64,

    /// Picoseconds per clock counter tick
    #[arg(long, default_value = "0.0084")]
    ps_per_clk: f64,

    /// Picoseconds per unit normalized phase
    #[arg(long, default_value = "7.0e6")]
    ps_per_ph: f64,

    /// Width of the phase detector registers in bits
    #[arg(long, default_value = "27")]
    bit_width: u32,
}

/// Drift fit options.
#[derive(Args, Debug)]
struct FitArgs {
    /// Fit clock drift and phase against time
    #[arg(long)]
    fit: bool,

    /// First sample index included in the fits
    #[arg(long, default_value = "0", requires = "fit")]
    fit_start: usize,

    /// First sample index excluded from the fits (default: all samples)
    #[arg(long, requires = "fit")]
    fit_end: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a sample log and report drift
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        fit: FitArgs,
    },

    /// Print the plot-ready sequences as JSON on stdout
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        fit: FitArgs,

        /// Pretty-print the JSON document
        #[arg(long)]
        pretty: bool,
    },
}

/// Everything a plotter needs, fully computed.
#[derive(Serialize)]
struct PresenterOutput<'a> {
    time: &'a [f64],
    phase_a: &'a [f64],
    phase_b: &'a [f64],
    phase_a_centered: Vec<f64>,
    phase_b_centered: Vec<f64>,
    clock_drift: &'a [f64],
    phase_a_raw: &'a [f64],
    phase_histogram: Histogram,
    fits: Option<DriftFits>,
    statistics: PipelineStatistics,
}

impl<'a> PresenterOutput<'a> {
    fn new(analysis: &'a LockAnalysis) -> Self {
        Self {
            time: &analysis.series.time,
            phase_a: &analysis.series.phase_a,
            phase_b: &analysis.series.phase_b,
            phase_a_centered: analysis.centered_phase_a(),
            phase_b_centered: analysis.centered_phase_b(),
            clock_drift: &analysis.series.clock_drift,
            phase_a_raw: &analysis.decoded.phase_a,
            phase_histogram: analysis.phase_histogram(),
            fits: analysis.fits,
            statistics: analysis.statistics,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_config(input: &InputArgs, fit: &FitArgs) -> Result<AnalysisConfig> {
    let scale = ScaleFactors::new()
        .with_ps_per_step(input.ps_per_step)
        .with_ps_per_clock(input.ps_per_clk)
        .with_ps_per_phase(input.ps_per_ph);
    scale.validate()?;

    let fit = FitConfig::new()
        .with_enabled(fit.fit)
        .with_window(FitWindow::new(fit.fit_start, fit.fit_end));

    Ok(AnalysisConfig::new()
        .with_bit_width(BitWidth::new(input.bit_width)?)
        .with_scale(scale)
        .with_fit(fit))
}

fn run_pipeline(input: &InputArgs, config: &AnalysisConfig) -> Result<LockAnalysis> {
    info!("Reading: {}", input.file.display());
    let start = Instant::now();

    let mut reader = SampleLogReader::open(&input.file)?;
    let analysis = try_analyze(reader.by_ref().map(|r| r.map_err(CliError::from)), config)?;

    let ReaderStatistics {
        lines_read,
        lines_skipped,
        samples,
    } = reader.statistics();
    debug!(
        "{} lines read, {} skipped, {} samples in {:.2?}",
        lines_read,
        lines_skipped,
        samples,
        start.elapsed()
    );
    Ok(analysis)
}

fn print_fit(name: &str, fit: Option<LinearFit>) {
    match fit {
        Some(fit) => println!(
            "  {:<12} slope {:>14.6e}  intercept {:>14.6e}  ({} points)",
            name, fit.slope, fit.intercept, fit.points
        ),
        None => println!("  {:<12} not enough points", name),
    }
}

fn print_range(name: &str, values: &[f64]) {
    if values.is_empty() {
        return;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    println!(
        "{:<12} min {:>14.3}  max {:>14.3}  mean {:>14.3}",
        name, min, max, mean
    );
}

fn print_summary(input: &InputArgs, analysis: &LockAnalysis) {
    let stats = analysis.statistics;
    println!("File: {}", input.file.display());
    println!(
        "Samples: {} decoded, {} dropped (invalid divisor)",
        stats.samples_out, stats.samples_dropped
    );
    println!(
        "Scale: {} ps/step, {} ps/clk, {:e} ps/phase",
        input.ps_per_step, input.ps_per_clk, input.ps_per_ph
    );

    print_range("time (ps)", &analysis.series.time);
    print_range("phase A (ps)", &analysis.series.phase_a);
    print_range("phase B (ps)", &analysis.series.phase_b);
    print_range("clock (ps)", &analysis.series.clock_drift);

    let histogram = analysis.phase_histogram();
    if !histogram.is_empty() {
        println!("Phase A histogram: {} bins", histogram.n_bins());
    }

    if let Some(fits) = analysis.fits {
        println!("Drift fits vs time:");
        print_fit("clock", fits.clock_drift);
        print_fit("phase A", fits.phase_a);
        print_fit("phase B", fits.phase_b);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze { input, fit } => {
            let config = build_config(&input, &fit)?;
            let analysis = run_pipeline(&input, &config)?;
            print_summary(&input, &analysis);
        }

        Commands::Export { input, fit, pretty } => {
            let config = build_config(&input, &fit)?;
            let analysis = run_pipeline(&input, &config)?;
            let document = PresenterOutput::new(&analysis);

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            if pretty {
                serde_json::to_writer_pretty(&mut out, &document)?;
            } else {
                serde_json::to_writer(&mut out, &document)?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}
