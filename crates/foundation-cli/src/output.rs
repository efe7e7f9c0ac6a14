//! Output formatting for query results.
//!
//! Supports JSON, log-line, table, CSV, and summary renderings of a
//! [`SearchResponse`]. Every renderer returns text without a trailing newline.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat};
use foundation_format::{format_duration, format_number, truncate};
use foundation_query::builder::{LEVEL_COLUMN, SERVICE_COLUMN, TIMESTAMP_COLUMN, TRACE_ID_COLUMN};
use foundation_query::search::UNKNOWN_LEVEL;
use foundation_query::{Hit, SearchResponse};
use serde_json::Value;

use crate::cli::Format;
use crate::error::CliError;

/// Column holding the log message.
pub const MESSAGE_COLUMN: &str = "message";

/// Widest cell a table will print.
pub const MAX_CELL_WIDTH: usize = 40;

/// Columns that lead a table or CSV when present.
const PREFERRED_COLUMNS: [&str; 4] = [TIMESTAMP_COLUMN, LEVEL_COLUMN, SERVICE_COLUMN, MESSAGE_COLUMN];

const UNKNOWN_SERVICE: &str = "-";

/// Output formatter for search results.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if the summary format is selected.
    #[must_use]
    pub const fn is_summary(&self) -> bool {
        matches!(self.format, Format::Summary)
    }

    /// Render the hits of `response`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Format` if a row cannot be serialized.
    pub fn render(&self, response: &SearchResponse) -> Result<String, CliError> {
        let hits = &response.hits;
        Ok(match self.format {
            Format::Json => render_json(hits)?,
            Format::Log => render_log(hits),
            Format::Table => render_table(hits),
            Format::Csv => render_csv(hits),
            Format::Summary => render_summary(response),
        })
    }
}

/// Render `response` in `format`.
///
/// # Errors
///
/// Returns `CliError::Format` if a row cannot be serialized.
pub fn format_output(response: &SearchResponse, format: Format) -> Result<String, CliError> {
    OutputFormat::new(format).render(response)
}

fn render_json(hits: &[Hit]) -> Result<String, CliError> {
    let rows = hits
        .iter()
        .map(serde_json::to_string_pretty)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
    Ok(rows.join("\n"))
}

fn render_log(hits: &[Hit]) -> String {
    hits.iter().map(log_line).collect::<Vec<_>>().join("\n")
}

/// `{timestamp} [{LEVEL}] {service}: {message}` plus the trace id when set.
fn log_line(hit: &Hit) -> String {
    let timestamp = format_timestamp(hit.get(TIMESTAMP_COLUMN));
    let level = text_or(hit.get(LEVEL_COLUMN), UNKNOWN_LEVEL);
    let service = text_or(hit.get(SERVICE_COLUMN), UNKNOWN_SERVICE);
    let message = cell_text(hit.get(MESSAGE_COLUMN));

    let mut line = format!("{timestamp} [{level}] {service}: {message}");
    let trace_id = cell_text(hit.get(TRACE_ID_COLUMN));
    if !trace_id.is_empty() {
        line.push_str(&format!(" [trace_id={trace_id}]"));
    }
    line
}

fn render_table(hits: &[Hit]) -> String {
    let columns = columns(hits);
    if columns.is_empty() {
        return String::new();
    }

    let rows: Vec<Vec<String>> = hits
        .iter()
        .map(|hit| {
            columns
                .iter()
                .map(|column| truncate(&display_cell(hit, column), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .fold(column.chars().count(), usize::max)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(table_row(columns.iter().copied(), &widths));
    let rule_width = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
    lines.push("─".repeat(rule_width));
    for row in &rows {
        lines.push(table_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn table_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn render_csv(hits: &[Hit]) -> String {
    let columns = columns(hits);
    if columns.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(hits.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|column| csv_field(column))
            .collect::<Vec<_>>()
            .join(","),
    );
    for hit in hits {
        lines.push(
            columns
                .iter()
                .map(|column| csv_field(&cell_text(hit.get(*column))))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_summary(response: &SearchResponse) -> String {
    let mut levels: BTreeMap<String, i64> = BTreeMap::new();
    let mut services: BTreeMap<String, i64> = BTreeMap::new();
    for hit in &response.hits {
        *levels
            .entry(text_or(hit.get(LEVEL_COLUMN), UNKNOWN_LEVEL))
            .or_default() += 1;
        *services
            .entry(text_or(hit.get(SERVICE_COLUMN), UNKNOWN_SERVICE))
            .or_default() += 1;
    }

    let total = i64::try_from(response.total).unwrap_or(i64::MAX);
    let shown = i64::try_from(response.hits.len()).unwrap_or(i64::MAX);

    let mut lines = vec![
        format!("Total logs:  {}", format_number(total)),
        format!("Shown:       {}", format_number(shown)),
    ];
    if let Some(took) = response.took {
        lines.push(format!("Query time:  {}", format_duration(took as f64 / 1000.0)));
    }
    push_counts(&mut lines, "By level:", &levels);
    push_counts(&mut lines, "By service:", &services);
    lines.join("\n")
}

fn push_counts(lines: &mut Vec<String>, heading: &str, counts: &BTreeMap<String, i64>) {
    if counts.is_empty() {
        return;
    }
    let width = counts.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    lines.push(String::new());
    lines.push(heading.to_string());
    for (name, count) in counts {
        lines.push(format!("  {name:<width$}  {}", format_number(*count)));
    }
}

/// Union of hit keys, preferred columns first, the rest in first-seen order.
fn columns(hits: &[Hit]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for key in hits.iter().flat_map(|hit| hit.keys()) {
        if !seen.contains(&key.as_str()) {
            seen.push(key);
        }
    }

    let mut ordered: Vec<&str> = PREFERRED_COLUMNS
        .into_iter()
        .filter(|column| seen.contains(column))
        .collect();
    ordered.extend(
        seen.into_iter()
            .filter(|column| !PREFERRED_COLUMNS.iter().any(|preferred| preferred == column)),
    );
    ordered
}

fn display_cell(hit: &Hit, column: &str) -> String {
    if column == TIMESTAMP_COLUMN {
        format_timestamp(hit.get(column))
    } else {
        cell_text(hit.get(column))
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    let text = cell_text(value);
    if text.is_empty() { default.to_string() } else { text }
}

/// RFC 3339 with milliseconds for microsecond epochs; other values as-is.
fn format_timestamp(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_micros)
            .map_or_else(|| n.to_string(), |ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Some(Value::String(s)) => s.clone(),
        _ => "-".to_string(),
    }
}
