//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::AggregationMode;
use crate::config::MAX_DECIMALS;
use crate::dataset::Dataset;
use clap::Parser;
use std::path::PathBuf;

/// PhaseChart - grouped bar charts for sequential vs. parallel benchmarks
///
/// Summarizes embedded AOO/OOA benchmark tables into sequential, parallel AOO
/// and parallel OOA phases, then renders an annotated SVG bar chart.
///
/// Examples:
///   phasechart
///   phasechart --dataset threaded --output threaded.svg
///   phasechart --mode mean --report summary.md
///   phasechart --report summary.json --format json
///   phasechart --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Embedded dataset to chart
    #[arg(short, long, default_value = "search", env = "PHASECHART_DATASET")]
    pub dataset: Dataset,

    /// Reduction used for the parallel phases
    ///
    /// Defaults to the mode the dataset was originally charted with.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<AggregationMode>,

    /// Output path for the SVG chart
    ///
    /// Default: from config or benchmark_chart.svg
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write a summary report to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Summary report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .phasechart.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Chart title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Chart width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Chart height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Decimal places shown on bar annotations
    #[arg(long, value_name = "N")]
    pub decimals: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Compute and print the phase summaries without rendering the chart
    #[arg(long)]
    pub dry_run: bool,

    /// List the embedded datasets and exit
    #[arg(long)]
    pub list_datasets: bool,

    /// Generate a default .phasechart.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.list_datasets {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            let is_svg = output
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("svg"))
                .unwrap_or(false);
            if !is_svg {
                return Err(format!(
                    "Chart output must be an .svg file: {}",
                    output.display()
                ));
            }
        }

        if self.width == Some(0) || self.height == Some(0) {
            return Err("Chart width and height must be at least 1 pixel".to_string());
        }

        if let Some(decimals) = self.decimals {
            if decimals > MAX_DECIMALS {
                return Err(format!("Decimals must be at most {}", MAX_DECIMALS));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general] verbose` from the config file;
    /// `--quiet` still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args::parse_from(["phasechart"])
    }

    #[test]
    fn test_defaults() {
        let args = make_args();
        assert_eq!(args.dataset, Dataset::Search);
        assert_eq!(args.mode, None);
        assert_eq!(args.format, OutputFormat::Markdown);
        assert!(args.output.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_mode_and_dataset() {
        let args = Args::parse_from([
            "phasechart",
            "--dataset",
            "threaded",
            "--mode",
            "select-min",
            "--format",
            "json",
        ]);
        assert_eq!(args.dataset, Dataset::Threaded);
        assert_eq!(args.mode, Some(AggregationMode::SelectMin));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_output_extension() {
        let mut args = make_args();
        args.output = Some(PathBuf::from("chart.png"));
        assert!(args.validate().is_err());

        args.output = Some(PathBuf::from("out/chart.SVG"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_dimensions_and_decimals() {
        let mut args = make_args();
        args.width = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.decimals = Some(MAX_DECIMALS + 1);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
