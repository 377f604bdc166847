//! Part records - filtering raw export lines down to eligible parts
//!
//! The parts export is plain text with one part per line and tab-separated
//! fields. Only lines that carry the eligibility marker in their first field
//! and have at least [`MIN_FIELDS`] fields are kept; everything else is
//! skipped without aborting the batch.

use std::fs;
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

/// Default eligibility marker looked for in the first field
pub const DEFAULT_MARKER: &str = "ADIN";

/// Minimum number of tab-separated fields for an eligible line
pub const MIN_FIELDS: usize = 14;

/// Fixed field positions within a part line
pub mod field {
    pub const TAG: usize = 0;
    pub const TYPE: usize = 1;
    pub const LENGTH: usize = 3;
    pub const DEPTH: usize = 4;
    pub const HEIGHT: usize = 5;
    pub const DOOR_MODEL: usize = 10;
    pub const COLOR_CATEGORY: usize = 12;
    pub const COLOR_CODE: usize = 13;
}

/// One eligible line of the parts export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    /// 1-based line number in the source text
    pub line: usize,
    fields: Vec<String>,
}

impl PartRecord {
    /// Split a line into a record if it is eligible, `None` otherwise
    pub fn parse_line(line: &str, line_number: usize, marker: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();

        if fields.len() < MIN_FIELDS || !fields[field::TAG].contains(marker) {
            return None;
        }

        Some(Self {
            line: line_number,
            fields,
        })
    }

    /// Raw field by position, trimmed (empty when out of range)
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(|s| s.trim()).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn tag(&self) -> &str {
        self.field(field::TAG)
    }

    pub fn part_type(&self) -> &str {
        self.field(field::TYPE)
    }

    pub fn door_model(&self) -> &str {
        self.field(field::DOOR_MODEL)
    }

    pub fn color_category(&self) -> &str {
        self.field(field::COLOR_CATEGORY)
    }

    pub fn color_code(&self) -> &str {
        self.field(field::COLOR_CODE)
    }

    /// Length, depth and height in millimetres
    ///
    /// Empty cells read as zero. A cell that is present but not a number
    /// fails this record only.
    pub fn dimensions_mm(&self) -> Result<(f64, f64, f64), RecordError> {
        Ok((
            self.millimetres(field::LENGTH, "L")?,
            self.millimetres(field::DEPTH, "P")?,
            self.millimetres(field::HEIGHT, "H")?,
        ))
    }

    fn millimetres(&self, index: usize, name: &'static str) -> Result<f64, RecordError> {
        parse_millimetres(self.field(index)).ok_or_else(|| RecordError::MalformedNumber {
            line: self.line,
            field: name,
            value: self.field(index).to_string(),
        })
    }
}

/// Parse a millimetre cell; empty means zero
pub fn parse_millimetres(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Errors for a single part record
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum RecordError {
    #[error("line {line}: {field} value '{value}' is not a number")]
    #[diagnostic(
        code(partcost::record::malformed_number),
        help("dimensions must be plain millimetre numbers such as 720 or 562.5")
    )]
    MalformedNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Result of filtering a parts export
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Eligible records in file order
    pub records: Vec<PartRecord>,
    /// Number of lines read
    pub lines_read: usize,
    /// Number of lines that were not eligible
    pub skipped: usize,
}

/// Keep the eligible lines of a parts export
pub fn filter_records(text: &str, marker: &str) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for (idx, line) in text.lines().enumerate() {
        outcome.lines_read += 1;
        match PartRecord::parse_line(line, idx + 1, marker) {
            Some(record) => outcome.records.push(record),
            None => {
                if !line.trim().is_empty() {
                    tracing::debug!(line = idx + 1, "skipping ineligible line");
                }
                outcome.skipped += 1;
            }
        }
    }

    tracing::info!(
        eligible = outcome.records.len(),
        skipped = outcome.skipped,
        "filtered parts export"
    );
    outcome
}

/// Read a parts export from disk and filter it
pub fn read_records(path: &Path, marker: &str) -> std::io::Result<FilterOutcome> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(filter_records(&text, marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(tag: &str, part_type: &str, l: &str, p: &str, h: &str) -> String {
        let mut fields = vec![""; MIN_FIELDS];
        fields[field::TAG] = tag;
        fields[field::TYPE] = part_type;
        fields[field::LENGTH] = l;
        fields[field::DEPTH] = p;
        fields[field::HEIGHT] = h;
        fields[field::DOOR_MODEL] = "MO1";
        fields[field::COLOR_CATEGORY] = "TYPE";
        fields[field::COLOR_CODE] = "TISAN";
        fields.join("\t")
    }

    #[test]
    fn test_parse_line_eligible() {
        let text = line("ADIN001", "BASE-A", "1000", "500", "720");
        let record = PartRecord::parse_line(&text, 3, "ADIN").unwrap();
        assert_eq!(record.line, 3);
        assert_eq!(record.part_type(), "BASE-A");
        assert_eq!(record.door_model(), "MO1");
        assert_eq!(record.color_category(), "TYPE");
        assert_eq!(record.color_code(), "TISAN");
        assert_eq!(record.dimensions_mm().unwrap(), (1000.0, 500.0, 720.0));
    }

    #[test]
    fn test_marker_is_substring_match() {
        let tagged = line("X-ADIN-9", "BASE", "1", "1", "1");
        assert!(PartRecord::parse_line(&tagged, 1, "ADIN").is_some());
        let untagged = line("PART", "BASE", "1", "1", "1");
        assert!(PartRecord::parse_line(&untagged, 1, "ADIN").is_none());
    }

    #[test]
    fn test_short_line_rejected() {
        let short = "ADIN\tBASE\t\t1000\t500\t720";
        assert!(PartRecord::parse_line(short, 1, "ADIN").is_none());
    }

    #[test]
    fn test_trailing_empty_fields_count() {
        let mut fields = vec![""; MIN_FIELDS];
        fields[0] = "ADIN";
        let text = format!("{}\r\n", fields.join("\t"));
        assert!(PartRecord::parse_line(&text, 1, "ADIN").is_some());
    }

    #[test]
    fn test_empty_dimensions_are_zero() {
        let text = line("ADIN", "WALL", "", " ", "300");
        let record = PartRecord::parse_line(&text, 1, "ADIN").unwrap();
        assert_eq!(record.dimensions_mm().unwrap(), (0.0, 0.0, 300.0));
    }

    #[test]
    fn test_malformed_dimension_fails_record() {
        let text = line("ADIN", "WALL", "12a", "1", "1");
        let record = PartRecord::parse_line(&text, 7, "ADIN").unwrap();
        let err = record.dimensions_mm().unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedNumber {
                line: 7,
                field: "L",
                value: "12a".to_string()
            }
        );
    }

    #[test]
    fn test_filter_keeps_order_and_counts_skips() {
        let text = [
            line("ADIN1", "BASE", "1", "1", "1"),
            "header\tline".to_string(),
            line("ADIN2", "WALL", "1", "1", "1"),
            line("ADIN1", "BASE", "1", "1", "1"),
            String::new(),
        ]
        .join("\n");

        let outcome = filter_records(&text, DEFAULT_MARKER);
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.records[0].part_type(), "BASE");
        assert_eq!(outcome.records[1].part_type(), "WALL");
        assert_eq!(outcome.records[2].line, 4);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_custom_marker() {
        let text = line("KIT-7", "BASE", "1", "1", "1");
        assert_eq!(filter_records(&text, "ADIN").records.len(), 0);
        assert_eq!(filter_records(&text, "KIT").records.len(), 1);
    }
}
