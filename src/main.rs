//! PhaseChart - grouped bar charts for sequential vs. parallel benchmarks
//!
//! A CLI tool that reduces embedded AOO/OOA benchmark timing tables to
//! sequential, parallel-AOO and parallel-OOA phases and renders them as an
//! annotated SVG bar chart.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (arguments, config, aggregation, rendering or I/O)

mod analysis;
mod cli;
mod config;
mod dataset;
mod error;
mod models;
mod report;

use analysis::{AggregationMode, Aggregator};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dataset::Dataset;
use models::{PhaseSummary, Report, ReportMetadata};
use report::ChartStyle;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config and --list-datasets early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if args.list_datasets {
        handle_list_datasets();
        return Ok(());
    }

    // Config comes first so `[general] verbose` can set the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("PhaseChart v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(args, config) {
        error!("Chart generation failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .phasechart.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize output paths, aggregation mode and chart styling.");
    Ok(())
}

/// Handle --list-datasets: print the embedded dataset catalogue.
fn handle_list_datasets() {
    println!("Embedded datasets:\n");
    for dataset in Dataset::all() {
        println!(
            "  {:<10} {} (default mode: {})",
            dataset.name(),
            dataset.description(),
            dataset.default_mode()
        );
    }
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber is already installed");
    }
}

/// Load data, summarize, render, report.
fn run(args: Args, config: Config) -> Result<()> {
    config.chart.validate().context("Invalid chart configuration")?;

    let mode = resolve_mode(&config, args.dataset);
    println!("📊 Dataset: {} ({})", args.dataset.name(), args.dataset.description());
    println!("   Mode: {}", mode);

    let set = args
        .dataset
        .load()
        .with_context(|| format!("Failed to load dataset `{}`", args.dataset.name()))?;
    info!(tasks = set.len(), "Loaded benchmark set");
    debug!("Tasks: {:?}", set.task_names());
    if set.is_empty() {
        warn!("Dataset has no tasks; the chart will be empty");
    }

    let aggregator = Aggregator::for_mode(mode);
    let summaries = aggregator
        .summarize(&set)
        .context("Failed to summarize benchmark phases")?;
    let phases = aggregator.phase_names();

    print_summaries(&summaries, config.chart.decimals);

    if args.dry_run {
        println!("\n✅ Dry run complete. No chart was written.");
        return Ok(());
    }

    let style = ChartStyle::from_config(&config.chart).context("Invalid chart configuration")?;
    let output = Path::new(&config.general.output);
    report::write_chart(output, &phases, &summaries, &style)?;
    info!("Chart written to {}", output.display());

    if let Some(ref report_path) = config.general.report {
        let report = Report {
            metadata: ReportMetadata {
                dataset: args.dataset.name().to_string(),
                mode,
                generated_at: Utc::now(),
                tasks: summaries.len(),
            },
            phases,
            summaries,
        };

        let content = match args.format {
            OutputFormat::Json => report::generate_json_report(&report)?,
            OutputFormat::Markdown => {
                report::generate_markdown_report(&report, config.chart.decimals)
            }
        };
        report::write_report(Path::new(report_path), &content)?;
        println!("📝 Report saved to: {}", report_path);
    }

    println!("\n✅ Chart saved to: {}", output.display());
    Ok(())
}

/// CLI and config override the dataset's own reduction mode.
fn resolve_mode(config: &Config, dataset: Dataset) -> AggregationMode {
    config
        .aggregation
        .mode
        .unwrap_or_else(|| dataset.default_mode())
}

/// Print one line per task and phase.
fn print_summaries(summaries: &[PhaseSummary], decimals: usize) {
    for summary in summaries {
        println!("\n   {}", summary.task);
        for (index, value) in summary.phases.iter().enumerate() {
            let mut line = format!("     {:<14} {:.*} s", value.phase, decimals, value.seconds);
            if let Some(ref selected) = value.selected {
                line.push_str(&format!("  [{}]", selected.label));
            }
            if index > 0 {
                if let Some(ratio) = summary.speedup(index) {
                    line.push_str(&format!("  {:.2}x", ratio));
                }
            }
            println!("{}", line);
        }
    }
}

/// Where the active configuration came from, reported once logging is up.
#[derive(Debug)]
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    /// The default file exists but failed to load.
    Fallback(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_resolve_mode_prefers_config() {
        let mut config = Config::default();
        assert_eq!(resolve_mode(&config, Dataset::Search), AggregationMode::SelectMin);
        assert_eq!(resolve_mode(&config, Dataset::Threaded), AggregationMode::Mean);

        config.aggregation.mode = Some(AggregationMode::Mean);
        assert_eq!(resolve_mode(&config, Dataset::Search), AggregationMode::Mean);
    }

    #[test]
    fn test_config_verbose_sets_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phasechart.toml");
        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();
        let path_arg = path.display().to_string();

        let args = Args::parse_from(["phasechart", "--config", path_arg.as_str()]);
        let (mut config, source) = load_config(&args).unwrap();
        config.merge_with_args(&args);
        assert!(matches!(source, ConfigSource::Explicit(_)));
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);

        let args = Args::parse_from(["phasechart", "--config", path_arg.as_str(), "--quiet"]);
        let (mut config, _) = load_config(&args).unwrap();
        config.merge_with_args(&args);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::ERROR);
    }

    #[test]
    fn test_explicit_config_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml").display().to_string();
        let args = Args::parse_from(["phasechart", "--config", missing.as_str()]);
        assert!(load_config(&args).is_err());
    }
}
