//! Markdown and JSON rendering of dashboard views.

use crate::view::{ChartKind, ChartSpec, DashboardView, InsightLine, StatCard, TableSpec};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Width of the inline bars drawn next to single-series charts.
const BAR_WIDTH: usize = 20;

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Include data tables (they can be long on the admin page).
    pub include_tables: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_tables: true,
        }
    }
}

/// Generate a complete Markdown page.
pub fn generate_markdown_report(
    view: &DashboardView,
    generated_at: DateTime<Utc>,
    options: RenderOptions,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", view.title));
    if let Some(ref greeting) = view.greeting {
        output.push_str(&format!("*{}*\n\n", greeting));
    }
    output.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&generate_cards_section(&view.cards));

    for chart in &view.charts {
        output.push_str(&generate_chart_section(chart));
    }

    if options.include_tables {
        for table in &view.tables {
            output.push_str(&generate_table_section(table));
        }
    }

    output.push_str(&generate_insights_section(&view.insights));

    output.push_str("---\n\n");
    output.push_str("*Report generated by TrustBoard*\n");

    output
}

/// Escape characters that would break a Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn generate_cards_section(cards: &[StatCard]) -> String {
    if cards.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "| {} |\n",
        cards
            .iter()
            .map(|c| escape_cell(&c.label))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    section.push_str(&format!("|{}\n", ":---:|".repeat(cards.len())));
    section.push_str(&format!(
        "| {} |\n\n",
        cards
            .iter()
            .map(|c| format!("**{}**", escape_cell(&c.value)))
            .collect::<Vec<_>>()
            .join(" | ")
    ));

    section
}

/// Text bar proportional to `value / max`.
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled.clamp(1, BAR_WIDTH))
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn generate_chart_section(chart: &ChartSpec) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", chart.title));

    if chart.labels.is_empty() {
        section.push_str("*No data.*\n\n");
        return section;
    }

    let single = chart.datasets.len() == 1;
    let draws_bars = single
        && matches!(
            chart.kind,
            ChartKind::Bar | ChartKind::HorizontalBar | ChartKind::Doughnut
        );

    let mut header = vec!["Label".to_string()];
    header.extend(chart.datasets.iter().map(|d| escape_cell(&d.label)));
    if draws_bars {
        header.push(String::new());
    }
    section.push_str(&format!("| {} |\n", header.join(" | ")));
    section.push_str(&format!("|:---|{}\n", ":---:|".repeat(header.len() - 1)));

    let scale = chart.max.unwrap_or_else(|| {
        chart
            .datasets
            .iter()
            .flat_map(|d| d.data.iter().copied())
            .fold(0.0, f64::max)
    });

    for (i, label) in chart.labels.iter().enumerate() {
        let mut row = vec![escape_cell(label)];
        for dataset in &chart.datasets {
            row.push(
                dataset
                    .data
                    .get(i)
                    .map_or_else(|| "-".to_string(), |v| format_value(*v)),
            );
        }
        if draws_bars {
            let value = chart.datasets[0].data.get(i).copied().unwrap_or(0.0);
            row.push(bar(value, scale));
        }
        section.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    section.push('\n');

    section
}

fn generate_table_section(table: &TableSpec) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", table.title));

    if table.rows.is_empty() {
        section.push_str(&format!("{}\n\n", table.empty_message));
        return section;
    }

    section.push_str(&format!(
        "| {} |\n",
        table
            .headers
            .iter()
            .map(|h| escape_cell(h))
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    section.push_str(&format!("|{}\n", ":---|".repeat(table.headers.len())));

    for row in &table.rows {
        section.push_str(&format!(
            "| {} |\n",
            row.iter()
                .map(|c| escape_cell(c))
                .collect::<Vec<_>>()
                .join(" | ")
        ));
    }
    section.push('\n');

    section
}

fn generate_insights_section(insights: &[InsightLine]) -> String {
    if insights.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Insights\n\n");

    for insight in insights {
        section.push_str(&format!("- {} {}\n", insight.kind.emoji(), insight.text));
    }
    section.push('\n');

    section
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    view: &'a DashboardView,
}

/// Generate a JSON document for the view.
pub fn generate_json_report(view: &DashboardView, generated_at: DateTime<Utc>) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport { generated_at, view }).map_err(Into::into)
}

/// Write rendered content to a file, creating missing parent directories.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
