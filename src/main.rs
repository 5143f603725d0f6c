use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use rusty_2dcos::config::{OutputFormat, RunConfig};
use rusty_2dcos::data::prepare::Reference;
use rusty_2dcos::state::AnalysisState;

/// Compute synchronous and asynchronous 2D correlation maps from a
/// perturbation series of spectra.
#[derive(Parser, Debug)]
#[command(name = "rusty-2dcos", version)]
struct Args {
    /// Data file (.parquet, .json, .csv) or directory of measurement files.
    input: Option<PathBuf>,

    /// JSON run configuration; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep only spectra whose metadata matches, e.g. `sample=A` (repeatable).
    #[arg(long = "select", value_name = "COLUMN=VALUE")]
    select: Vec<String>,

    /// Metadata column giving the perturbation order.
    #[arg(long)]
    order_by: Option<String>,

    /// Spectral-axis window, e.g. `--range 1500 1800`.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    range: Option<Vec<f64>>,

    /// Reference spectrum: `none`, `mean`, or a sample position.
    #[arg(long)]
    reference: Option<String>,

    /// Directory receiving the maps.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Skip the extremum report.
    #[arg(long)]
    no_extrema: bool,

    /// Debug logging when RUST_LOG is unset.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_reference(s: &str) -> Result<Reference> {
    match s {
        "none" => Ok(Reference::None),
        "mean" => Ok(Reference::Mean),
        other => other
            .parse::<usize>()
            .map(Reference::Spectrum)
            .map_err(|_| anyhow::anyhow!("reference must be 'none', 'mean' or an index, got '{other}'")),
    }
}

fn build_config(args: Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if !args.select.is_empty() {
        config.select = args.select;
    }
    if args.order_by.is_some() {
        config.order_by = args.order_by;
    }
    if let Some(range) = args.range {
        config.range = Some((range[0], range[1]));
    }
    if let Some(reference) = &args.reference {
        config.reference = parse_reference(reference)?;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.no_extrema {
        config.extrema = false;
    }
    if config.input.as_os_str().is_empty() {
        anyhow::bail!("no input given (positional argument or `input` in the config file)");
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(args)?;
    log::debug!("run configuration: {config:?}");
    let analysis = AnalysisState::run(&config)?;
    analysis.export(&config)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
