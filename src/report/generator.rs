//! Summary report generation.
//!
//! Renders the phase summaries behind a chart as a Markdown table or as
//! JSON, for readers who need the exact numbers.

use crate::models::{PhaseSummary, PhaseValue, Report, ReportMetadata};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, decimals: usize) -> String {
    let mut output = String::new();

    output.push_str("# Benchmark Phase Summary\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_table(
        &report.phases,
        &report.summaries,
        decimals,
    ));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset));
    section.push_str(&format!("- **Mode:** `{}`\n", metadata.mode));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Tasks:** {}\n", metadata.tasks));
    section.push('\n');

    section
}

/// Generate the per-task table: one column per phase.
fn generate_summary_table(phases: &[String], summaries: &[PhaseSummary], decimals: usize) -> String {
    let mut section = String::new();

    section.push_str("## Phases\n\n");

    if summaries.is_empty() {
        section.push_str("No tasks in this dataset.\n\n");
        return section;
    }

    section.push_str("| Task |");
    for phase in phases {
        section.push_str(&format!(" {} |", phase));
    }
    section.push('\n');

    section.push_str("|:---|");
    for _ in phases {
        section.push_str("---:|");
    }
    section.push('\n');

    for summary in summaries {
        section.push_str(&format!("| {} |", summary.task));
        for (index, value) in summary.phases.iter().enumerate() {
            section.push_str(&format!(
                " {} |",
                format_cell(value, summary.speedup(index), index, decimals)
            ));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Formats one table cell, e.g. `0.130 s (8 threads, 0.64x)`.
fn format_cell(value: &PhaseValue, speedup: Option<f64>, index: usize, decimals: usize) -> String {
    let mut notes = Vec::new();
    if let Some(threads) = value.threads() {
        notes.push(format!("{} threads", threads));
    }
    // The baseline column would always read 1.00x.
    if index > 0 {
        if let Some(ratio) = speedup {
            notes.push(format!("{:.2}x", ratio));
        }
    }

    let mut cell = format!("{:.*} s", decimals, value.seconds);
    if !notes.is_empty() {
        cell.push_str(&format!(" ({})", notes.join(", ")));
    }
    cell
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Speedup is the sequential time divided by the phase time.*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file, creating parent directories.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
