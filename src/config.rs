//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.phasechart.toml` files.

use crate::analysis::AggregationMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".phasechart.toml";

/// Highest accepted number of annotation decimals.
pub const MAX_DECIMALS: usize = 9;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Chart output path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Summary report path; no report is written when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            report: None,
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "benchmark_chart.svg".to_string()
}

/// Aggregation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Reduction mode for parallel phases. Falls back to the dataset's own
    /// mode when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AggregationMode>,
}

/// Chart appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_x_label")]
    pub x_label: String,

    #[serde(default = "default_y_label")]
    pub y_label: String,

    /// Width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Decimal places of the value annotations.
    #[serde(default = "default_decimals")]
    pub decimals: usize,

    /// Bar colors per phase as `#rrggbb`; cycled when there are more phases.
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            width: default_width(),
            height: default_height(),
            decimals: default_decimals(),
            colors: default_colors(),
        }
    }
}

fn default_title() -> String {
    "Efficient Benchmark Comparison by Task".to_string()
}

fn default_x_label() -> String {
    "API Task".to_string()
}

fn default_y_label() -> String {
    "Time (s)".to_string()
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    700
}

fn default_decimals() -> usize {
    3
}

fn default_colors() -> Vec<String> {
    // sky blue, sea green, salmon
    vec!["#87ceeb", "#2e8b57", "#fa8072"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl ChartConfig {
    /// Checks dimensions and precision, whether they came from a file or the CLI.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "chart size must be at least 1x1 pixels, got {}x{}",
                self.width,
                self.height
            );
        }
        if self.decimals > MAX_DECIMALS {
            bail!(
                "chart.decimals must be at most {}, got {}",
                MAX_DECIMALS,
                self.decimals
            );
        }
        Ok(())
    }

    /// Parses the configured colors into RGB triples.
    pub fn rgb_colors(&self) -> Result<Vec<(u8, u8, u8)>> {
        if self.colors.is_empty() {
            bail!("chart.colors must list at least one color");
        }
        self.colors.iter().map(|c| parse_hex_color(c)).collect()
    }
}

/// Parses `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Result<(u8, u8, u8)> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid color `{}`: expected #rrggbb", value);
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .with_context(|| format!("invalid color `{}`", value))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.phasechart.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(ref report) = args.report {
            self.general.report = Some(report.display().to_string());
        }
        if let Some(mode) = args.mode {
            self.aggregation.mode = Some(mode);
        }

        if let Some(ref title) = args.title {
            self.chart.title = title.clone();
        }
        if let Some(width) = args.width {
            self.chart.width = width;
        }
        if let Some(height) = args.height {
            self.chart.height = height;
        }
        if let Some(decimals) = args.decimals {
            self.chart.decimals = decimals;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
