//! Grouped bar chart rendering.
//!
//! One cluster per task, one bar per phase. Every bar carries its value and,
//! for select-min phases, a second line with the winning thread count.

use crate::config::ChartConfig;
use crate::models::PhaseSummary;
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::debug;

/// Share of a cluster slot covered by bars.
const CLUSTER_WIDTH: f64 = 0.75;
/// Vertical room above the tallest bar for its annotations.
const HEADROOM: f64 = 1.25;
/// Pixel gap between a bar top and its lowest annotation line.
const ANNOTATION_GAP: i32 = 3;
const LINE_HEIGHT: i32 = 15;

const FONT: &str = "sans-serif";

/// Resolved chart appearance.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub decimals: usize,
    pub colors: Vec<RGBColor>,
}

impl ChartStyle {
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        config.validate()?;
        let colors = config
            .rgb_colors()?
            .into_iter()
            .map(|(r, g, b)| RGBColor(r, g, b))
            .collect();

        Ok(Self {
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            width: config.width,
            height: config.height,
            decimals: config.decimals,
            colors,
        })
    }

    fn color(&self, phase: usize) -> RGBColor {
        if self.colors.is_empty() {
            return BLACK;
        }
        self.colors[phase % self.colors.len()]
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        let config = ChartConfig::default();
        Self {
            title: config.title,
            x_label: config.x_label,
            y_label: config.y_label,
            width: config.width,
            height: config.height,
            decimals: config.decimals,
            colors: vec![
                RGBColor(135, 206, 235),
                RGBColor(46, 139, 87),
                RGBColor(250, 128, 114),
            ],
        }
    }
}

/// Renders the chart as an SVG document.
pub fn render_svg(phases: &[String], summaries: &[PhaseSummary], style: &ChartStyle) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width, style.height)).into_drawing_area();
        draw(&root, phases, summaries, style)?;
        root.present()?;
    }
    Ok(svg)
}

/// Renders the chart and writes it to `path`, creating parent directories.
pub fn write_chart(
    path: &Path,
    phases: &[String],
    summaries: &[PhaseSummary],
    style: &ChartStyle,
) -> Result<()> {
    let svg = render_svg(phases, summaries, style)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, svg)
        .with_context(|| format!("Failed to write chart to {}", path.display()))?;

    Ok(())
}

/// Left edge of the bar for `phase` in the cluster of `task`.
fn bar_left(task: usize, phase: usize, bar_width: f64) -> f64 {
    task as f64 - CLUSTER_WIDTH / 2.0 + phase as f64 * bar_width
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    phases: &[String],
    summaries: &[PhaseSummary],
    style: &ChartStyle,
) -> Result<()> {
    root.fill(&WHITE)?;

    let clusters = summaries.len().max(1) as f64;
    let tallest = summaries
        .iter()
        .flat_map(|s| s.phases.iter().map(|p| p.seconds))
        .fold(0.0f64, f64::max);
    let y_top = if tallest > 0.0 { tallest * HEADROOM } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(&style.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(clusters - 0.5), 0.0f64..y_top)?;

    let names: Vec<&str> = summaries.iter().map(|s| s.task.as_str()).collect();
    let task_label = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        names
            .get(index as usize)
            .map(|name| name.to_string())
            .unwrap_or_default()
    };
    let seconds_label = |y: &f64| format!("{:.2}", y);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(names.len() + 1)
        .x_label_formatter(&task_label)
        .y_label_formatter(&seconds_label)
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .label_style((FONT, 14))
        .draw()?;

    let bar_width = CLUSTER_WIDTH / phases.len().max(1) as f64;
    let annotation = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));

    for (j, phase) in phases.iter().enumerate() {
        let color = style.color(j);
        let bars: Vec<(f64, f64, Option<u32>)> = summaries
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.phases
                    .get(j)
                    .map(|p| (bar_left(i, j, bar_width), p.seconds, p.threads()))
            })
            .collect();

        chart
            .draw_series(bars.iter().map(|&(left, value, _)| {
                Rectangle::new([(left, 0.0), (left + bar_width, value)], color.filled())
            }))?
            .label(phase.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));

        chart.draw_series(bars.iter().map(|&(left, value, threads)| {
            let lift = match threads {
                Some(_) => ANNOTATION_GAP + LINE_HEIGHT,
                None => ANNOTATION_GAP,
            };
            EmptyElement::at((left + bar_width / 2.0, value))
                + Text::new(
                    format!("{:.*}", style.decimals, value),
                    (0, -lift),
                    annotation.clone(),
                )
        }))?;

        chart.draw_series(bars.iter().filter_map(|&(left, value, threads)| {
            threads.map(|count| {
                EmptyElement::at((left + bar_width / 2.0, value))
                    + Text::new(
                        format!("({} threads)", count),
                        (0, -ANNOTATION_GAP),
                        annotation.clone(),
                    )
            })
        }))?;

        debug!(phase = %phase, bars = bars.len(), "Drew phase series");
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font((FONT, 14))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
