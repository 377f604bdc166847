//! Table formatting for the row-oriented commands
//!
//! Quantities, summary and cost all print numbered rows of typed cells. The
//! formatter renders them as aligned columns, CSV, or a Markdown table.

use console::style;

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::RowStatus;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, truncated to the column width
    Text(String),
    /// Part type or type group
    Type(String),
    /// Row status (active or excluded)
    Status(RowStatus),
    /// Count
    Number(usize),
    /// Float value with precision
    Float(f64, usize),
    /// Length in millimetres, up to two decimals with trailing zeros dropped
    Millimetres(f64),
    /// Currency amount (two decimals, dimmed when zero)
    Money(f64),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Format for aligned output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width);
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Type(t) => {
                format!("{:<width$}", style(truncate_str(t, width)).cyan(), width = width)
            }
            CellValue::Status(status) => {
                let s = status.to_string();
                let styled = match status {
                    RowStatus::Active => style(s).green(),
                    RowStatus::Excluded => style(s).red().dim(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Float(f, precision) => {
                format!("{:>width$.prec$}", f, width = width, prec = precision)
            }
            CellValue::Millimetres(_) => format!("{:>width$}", self.raw(), width = width),
            CellValue::Money(m) => {
                let s = format!("{:>width$.2}", m, width = width);
                if *m == 0.0 {
                    style(s).dim().to_string()
                } else {
                    s
                }
            }
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::Type(s) => escape_csv(s),
            other => other.raw(),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Type(s) => s.clone(),
            CellValue::Status(status) => status.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Float(f, precision) => format!("{:.prec$}", f, prec = precision),
            CellValue::Millimetres(mm) => {
                let s = format!("{:.2}", mm);
                let s = s.trim_end_matches('0').trim_end_matches('.');
                if s == "-0" {
                    "0".to_string()
                } else {
                    s.to_string()
                }
            }
            CellValue::Money(m) => format!("{:.2}", m),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A numbered row of cell values
pub struct TableRow {
    pub number: usize,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that renders rows in the tabular output formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun: &'static str) -> Self {
        Self {
            columns,
            noun,
            show_summary: true,
        }
    }

    /// Drop the trailing "N rows" line
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Render rows in the given format; json is handled by the caller
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            _ => self.render_tsv(rows),
        }
    }

    /// Print rows to stdout
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    /// Calculate column widths from content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let number_width = rows
            .iter()
            .map(|r| r.number.to_string().len())
            .max()
            .unwrap_or(1)
            .max(1);

        let mut widths = vec![number_width];
        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(max_content).min(col.width));
        }
        widths
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let mut header = vec![format!("{:>width$}", style("#").bold().dim(), width = widths[0])];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        out.push_str(&header.join(" "));
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let mut parts = vec![format!("{:>width$}", style(row.number).dim(), width = widths[0])];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => parts.push(value.format_tsv(*width)),
                    None => parts.push(CellValue::Empty.format_tsv(*width)),
                }
            }
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!("{} {}(s)\n", style(rows.len()).cyan(), self.noun));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let mut headers = vec!["row"];
        headers.extend(self.columns.iter().map(|c| c.key));
        out.push_str(&headers.join(","));
        out.push('\n');

        for row in rows {
            let mut values = vec![row.number.to_string()];
            for col in self.columns {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            out.push_str(&values.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let mut headers = vec!["#"];
        headers.extend(self.columns.iter().map(|c| c.header));
        out.push_str(&format!("| {} |\n", headers.join(" | ")));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        out.push_str(&format!("|{}|\n", separators.join("|")));

        for row in rows {
            let mut values = vec![row.number.to_string()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            out.push_str(&format!("| {} |\n", values.join(" | ")));
        }
        out
    }
}
