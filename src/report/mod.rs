//! Chart and summary report output.

pub mod chart;
pub mod generator;

pub use chart::{write_chart, ChartStyle};
pub use generator::{generate_json_report, generate_markdown_report, write_report};
