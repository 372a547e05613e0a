//! Rendering of comparison rows.
//!
//! Table for terminals, CSV for spreadsheets, JSON for machines. Bit-exact
//! formatting is not contractual; the query strings are, and live in
//! [`crate::plan`].

use serde_json::Value;

use crate::assemble::ComparisonRow;

/// Output format for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Csv,
    Json,
}

/// Render comparison rows in the requested format.
pub fn render(rows: &[ComparisonRow], format: ReportFormat) -> String {
    match format {
        ReportFormat::Table => render_table(rows),
        ReportFormat::Csv => render_csv(rows),
        ReportFormat::Json => render_json(rows),
    }
}

fn render_table(rows: &[ComparisonRow]) -> String {
    let headers = ["METRIC", "SOURCE", "TARGET", "DIFFERENCE"];
    let mut table: Vec<[String; 4]> = Vec::with_capacity(rows.len());
    for row in rows {
        table.push([
            row.metric.clone(),
            display_value(&row.source),
            display_value(&row.target),
            row.difference
                .map(display_number)
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let mut widths = headers.map(str::len);
    for row in &table {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    for (i, header) in headers.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&format!("{:<width$}", header, width = widths[i]));
    }
    out.push('\n');
    for row in &table {
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            out.push_str(&format!("{:<width$}", cell, width = widths[i]));
        }
        out.push('\n');
    }
    out
}

fn render_csv(rows: &[ComparisonRow]) -> String {
    let mut out = String::from("metric,alias,value_type,source,target,difference\n");
    for row in rows {
        let value_type = match row.value_type {
            crate::metric::ValueType::Number => "number",
            crate::metric::ValueType::Date => "date",
        };
        let fields = [
            csv_escape(&row.metric),
            csv_escape(&row.alias),
            value_type.to_string(),
            csv_escape(&display_value(&row.source)),
            csv_escape(&display_value(&row.target)),
            row.difference.map(display_number).unwrap_or_default(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn render_json(rows: &[ComparisonRow]) -> String {
    serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
}

/// RFC 4180 quoting: wrap when the field contains a comma, quote, or
/// newline; double embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Number(n) => n
            .as_f64()
            .map(display_number)
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trim trailing zeros so whole numbers print as integers.
fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
