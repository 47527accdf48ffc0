//! FilterLab CLI: compute a configured indicator set over OHLCV data.
//!
//! Commands:
//! - `compute`: load bars from CSV, compute every configured indicator, write CSV or JSON
//! - `check`: normalize a config file and report each indicator and any replaced parameters
//! - `kinds`: list the indicator kinds a config may name

mod bars;
mod output;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filterlab_core::{compute_frame, create_indicator, FilterlabConfig, KINDS};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "filterlab",
    about = "FilterLab CLI: recursive filters, adaptive smoothers and trailing stops"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the indicators of a TOML config over a bar CSV file.
    Compute {
        /// OHLCV CSV with a date/timestamp column.
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a config file and show the normalized indicator set.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// List supported indicator kinds.
    Kinds,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            data,
            config,
            format,
            output,
        } => run_compute(&data, &config, format, output.as_deref()),
        Commands::Check { config } => run_check(&config),
        Commands::Kinds => {
            for kind in KINDS {
                println!("{kind}");
            }
            Ok(())
        }
    }
}

fn run_compute(
    data: &Path,
    config_path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let config = FilterlabConfig::from_file(config_path)?;
    let plan = config.plan()?;
    let caps = config.resolve_capabilities(&[]);
    let bars = bars::load_bars(data)?;

    let frame = compute_frame(&bars, &plan, &caps);
    tracing::info!(
        rows = frame.len(),
        columns = frame.width(),
        indicators = plan.len(),
        "frame computed"
    );

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            output::write_frame(&frame, format, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            output::write_frame(&frame, format, stdout.lock())?;
        }
    }
    Ok(())
}

fn run_check(config_path: &Path) -> Result<()> {
    let config = FilterlabConfig::from_file(config_path)?;

    println!(
        "{:<28} {:<12} {:>8}  adjustments",
        "indicator", "category", "lookback"
    );
    for entry in &config.indicators {
        let built = create_indicator(entry)?;
        let indicator = &built.params;
        let adjustments: Vec<String> = built.adjustments.iter().map(|a| a.to_string()).collect();
        println!(
            "{:<28} {:<12} {:>8}  {}",
            indicator.name(),
            indicator.category().as_str(),
            indicator.lookback(),
            if adjustments.is_empty() {
                "-".to_string()
            } else {
                adjustments.join("; ")
            }
        );
    }
    Ok(())
}
