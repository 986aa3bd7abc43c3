//! Standalone inferencing harness.
//!
//! Runs the configured impulse over a fixed block of samples in a loop and
//! prints timing and per-label scores after every invocation.
//!
//! Usage:
//!   ei-standalone [--config harness.json] [--features raw.txt] [--iterations 5]

use clap::Parser;
use edge_impulse_standalone::config::ConfigOverrides;
use edge_impulse_standalone::{
    create_engine, ClassificationDriver, HarnessConfig, HarnessError, RunSummary,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON harness configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw features file (comma-separated values, as copied from the Studio)
    #[arg(short, long)]
    features: Option<PathBuf>,

    /// JSON fixture for the replay engine
    #[arg(long, conflicts_with = "ffi")]
    fixture: Option<PathBuf>,

    /// Use the impulse linked into this binary (requires the 'ffi' feature)
    #[arg(long, default_value_t = false)]
    ffi: bool,

    /// Stop after this many classifications
    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    /// Pause between classifications in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Abort a classification that is still reading samples after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Slide a frame-sized window over the features by this many values per iteration
    #[arg(long)]
    stride: Option<usize>,

    /// Target name shown in the banner
    #[arg(long)]
    target: Option<String>,

    /// Do not pass the debug flag to the classifier
    #[arg(long, default_value_t = false)]
    no_debug: bool,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            features: args.features,
            fixture: args.fixture,
            ffi: args.ffi,
            max_iterations: args.iterations,
            interval_ms: args.interval_ms,
            invocation_deadline_ms: args.deadline_ms,
            stride: args.stride,
            target: args.target,
            no_debug: args.no_debug,
        }
    }
}

fn run(args: Args) -> Result<RunSummary, HarnessError> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    config.apply_overrides(args.into());
    config.validate()?;

    let engine = create_engine(&config.engine)?;
    let source = config.build_source(engine.parameters().input_frame_size)?;

    let stdout = io::stdout();
    let mut driver =
        ClassificationDriver::new(engine, source, stdout.lock(), config.run_options());
    driver.run()
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(summary) => {
            info!(
                "Stopped after {} iterations ({:?})",
                summary.iterations, summary.stop_reason
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
