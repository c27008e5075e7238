//! Dataset Export Tool
//!
//! Configuration-driven tool that builds a windowed dataset from a wide CSV of
//! closing prices and writes it as NumPy arrays plus JSON metadata.
//!
//! ## Output Format
//!
//! - **Features**: `{name}_features.npy` - Shape `[N, W·k]`
//! - **Targets**: `{name}_targets.npy` - Shape `[N]` (f64 prices or i8 labels)
//! - **Origins**: `{name}_origins.npy` - Shape `[N]` window start rows
//! - **Metadata**: `{name}_metadata.json`
//!
//! # Usage
//!
//! ```bash
//! # Generate sample config
//! cargo run --release --bin export_dataset -- generate-config btc.toml
//!
//! # Export from TOML config
//! cargo run --release --bin export_dataset -- export \
//!     --config btc.toml --prices closes.csv --output-dir datasets/
//!
//! # List the built-in instrument catalog
//! cargo run --release --bin export_dataset -- assets
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{prelude::*, EnvFilter};
use window_dataset::catalog;
use window_dataset::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "export_dataset",
    about = "Build sliding-window price datasets and export them to NumPy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a dataset from a config file and a price CSV
    Export(ExportArgs),

    /// Write a sample configuration file
    #[command(name = "generate-config")]
    GenerateConfig {
        /// Destination path (.toml or .json)
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Print the built-in instrument catalog
    Assets,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Dataset configuration (.toml or .json)
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    config: PathBuf,

    /// Wide CSV of closing prices: `date,<id1>,<id2>,...`
    #[arg(long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    prices: PathBuf,

    /// Output directory for exported arrays
    #[arg(long = "output-dir", value_hint = clap::ValueHint::DirPath)]
    output_dir: PathBuf,

    /// File prefix for exported arrays (defaults to the experiment name or
    /// `{target}_w{W}_h{H}`)
    #[arg(long)]
    name: Option<String>,

    /// Override the configured target mode
    #[arg(long)]
    mode: Option<ModeValue>,

    /// Export even when validation reports errors
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeValue {
    Continuous,
    Binary,
}

impl From<ModeValue> for TargetMode {
    fn from(value: ModeValue) -> Self {
        match value {
            ModeValue::Continuous => TargetMode::Continuous,
            ModeValue::Binary => TargetMode::Binary,
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| anyhow!("failed to initialize tracing: {err}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::GenerateConfig { path } => generate_sample_config(&path),
        Commands::Assets => {
            print_catalog();
            Ok(())
        }
    }
}

fn is_json(path: &std::path::Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn load_config(path: &std::path::Path) -> Result<DatasetConfig> {
    let config = if is_json(path) {
        DatasetConfig::load_json(path)
    } else {
        DatasetConfig::load_toml(path)
    };
    config.with_context(|| format!("failed to load config {}", path.display()))
}

fn generate_sample_config(path: &std::path::Path) -> Result<()> {
    let sample = DatasetConfig::new("BTC-USD", 20, 5)
        .with_auxiliary(vec!["ETH-USD".to_string(), "^GSPC".to_string(), "GC=F".to_string()])
        .with_metadata(ExperimentMetadata {
            name: "btc_w20_h5".to_string(),
            description: Some("BTC next-week close with crypto, equity and gold context".to_string()),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            tags: Some(vec!["btc".to_string(), "daily".to_string()]),
        });

    if is_json(path) {
        sample.save_json(path)
    } else {
        sample.save_toml(path)
    }
    .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Generated sample config: {}", path.display());
    println!("\nEdit the following fields before running:");
    println!("  - instruments.target / auxiliary: ids present in your price CSV");
    println!("  - window_size (1..={MAX_WINDOW_SIZE}) and horizon {SUPPORTED_HORIZONS:?}");
    println!("  - date_range.start / end");
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    print_config_summary(&config);

    let provider = CsvProvider::new(&args.prices);
    let missing = provider
        .missing_instruments(&config.instruments.ordered_ids())
        .with_context(|| format!("failed to read header of {}", args.prices.display()))?;
    if !missing.is_empty() {
        bail!(
            "{} not in {} (available: {})",
            missing.join(", "),
            args.prices.display(),
            provider.available_instruments()?.join(", ")
        );
    }

    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let outcome = pipeline
        .run(&provider)
        .with_context(|| format!("failed to build dataset from {}", args.prices.display()))?;

    println!("Panel rows:  {}", outcome.panel_rows);
    print_preview(&outcome.preview);
    println!("Status:      {}", outcome.status);
    if !outcome.status.is_ready() {
        bail!("no dataset to export: {}", outcome.status);
    }

    let stats = outcome.reconcile_stats;
    println!(
        "Samples:     {} ({} feature rows dropped, {} target rows dropped, {} unmatched)",
        outcome.n_samples(),
        stats.features_dropped,
        stats.targets_dropped,
        stats.unmatched
    );

    let validation = validate_dataset(&outcome.dataset);
    print!("{validation}");
    if validation.has_errors() && !args.force {
        bail!("dataset failed validation (use --force to export anyway)");
    }

    let config = pipeline.config();
    let name = args.name.unwrap_or_else(|| default_name(config));
    let result = NumpyExporter::new(&args.output_dir)
        .export(&name, &outcome, config)
        .with_context(|| format!("failed to export to {}", args.output_dir.display()))?;

    println!("\nExported '{}': {} × {}", result.name, result.n_samples, result.n_features);
    if let Some(dist) = &result.label_distribution {
        let (up, down) = dist.class_balance();
        println!(
            "Labels:      Up={} ({:.1}%), Down={} ({:.1}%)",
            dist.up_count,
            up * 100.0,
            dist.down_count,
            down * 100.0
        );
    }
    for file in &result.files {
        println!("  {}", file.display());
    }
    Ok(())
}

fn default_name(config: &DatasetConfig) -> String {
    match &config.metadata {
        Some(meta) if !meta.name.trim().is_empty() => meta.name.clone(),
        _ => format!(
            "{}_w{}_h{}",
            sanitize(&config.instruments.target),
            config.window_size,
            config.horizon
        ),
    }
}

/// Tickers like `^GSPC` or `GC=F` are not friendly file prefixes.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_lowercase()
}

fn print_config_summary(config: &DatasetConfig) {
    println!("Configuration:");
    if let Some(meta) = &config.metadata {
        println!("  Experiment:  {}", meta.name);
    }
    println!("  Target:      {}", config.instruments.target);
    if !config.instruments.auxiliary.is_empty() {
        println!("  Auxiliary:   {}", config.instruments.auxiliary.join(", "));
    }
    println!("  Window:      {}", config.window_size);
    println!("  Horizon:     {}", config.horizon);
    println!("  Mode:        {}", config.mode);
    println!(
        "  Dates:       {} to {}",
        config.date_range.start, config.date_range.end
    );
    println!();
}

/// Last rows of the loaded panel, one line per date.
fn print_preview(preview: &Panel) {
    if preview.is_empty() {
        return;
    }
    print!("\n{:<12}", "date");
    for id in preview.instruments() {
        print!(" {id:>12}");
    }
    println!();
    for (i, date) in preview.dates().iter().enumerate() {
        print!("{date:<12}");
        for value in preview.row(i).unwrap_or_default() {
            print!(" {value:>12.2}");
        }
        println!();
    }
    println!();
}

fn print_catalog() {
    for asset in catalog::default_catalog() {
        println!("{:<10} {:<24} {:?}", asset.ticker, asset.name, asset.class);
    }
}
