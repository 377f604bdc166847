//! Quantity rows - one computed quantity per eligible part record

use serde::Serialize;

use crate::core::formula::{self, Dimensions};
use crate::core::record::{PartRecord, RecordError};

/// Whether a row takes part in aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    #[default]
    Active,
    Excluded,
}

impl std::fmt::Display for RowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowStatus::Active => write!(f, "active"),
            RowStatus::Excluded => write!(f, "excluded"),
        }
    }
}

/// A part with its computed quantity
///
/// Rows are never edited in place: the `with_*` methods return a new row with
/// the quantity derived again from the type and dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityRow {
    /// Source line number of the part record
    pub line: usize,
    pub part_type: String,
    /// Dimensions in metres
    pub dimensions: Dimensions,
    pub door_model: String,
    pub color_category: String,
    pub color_code: String,
    pub quantity: f64,
    pub status: RowStatus,
}

impl QuantityRow {
    /// Build a row and compute its quantity
    pub fn new(
        line: usize,
        part_type: impl Into<String>,
        dimensions: Dimensions,
        door_model: impl Into<String>,
        color_category: impl Into<String>,
        color_code: impl Into<String>,
    ) -> Self {
        let part_type = part_type.into();
        let quantity = formula::evaluate(&part_type, &dimensions);
        Self {
            line,
            part_type,
            dimensions,
            door_model: door_model.into(),
            color_category: color_category.into(),
            color_code: color_code.into(),
            quantity,
            status: RowStatus::Active,
        }
    }

    /// Build a row from a part record, converting millimetres to metres
    pub fn from_record(record: &PartRecord) -> Result<Self, RecordError> {
        let (l, p, h) = record.dimensions_mm()?;
        Ok(Self::new(
            record.line,
            record.part_type(),
            Dimensions::from_millimetres(l, p, h),
            record.door_model(),
            record.color_category(),
            record.color_code(),
        ))
    }

    pub fn is_active(&self) -> bool {
        self.status == RowStatus::Active
    }

    pub fn with_type(&self, part_type: impl Into<String>) -> Self {
        let mut row = Self::new(
            self.line,
            part_type,
            self.dimensions,
            self.door_model.clone(),
            self.color_category.clone(),
            self.color_code.clone(),
        );
        row.status = self.status;
        row
    }

    pub fn with_dimensions(&self, dimensions: Dimensions) -> Self {
        let mut row = Self::new(
            self.line,
            self.part_type.clone(),
            dimensions,
            self.door_model.clone(),
            self.color_category.clone(),
            self.color_code.clone(),
        );
        row.status = self.status;
        row
    }

    pub fn with_door_model(&self, door_model: impl Into<String>) -> Self {
        Self {
            door_model: door_model.into(),
            ..self.clone()
        }
    }

    pub fn with_color_category(&self, color_category: impl Into<String>) -> Self {
        Self {
            color_category: color_category.into(),
            ..self.clone()
        }
    }

    pub fn with_color_code(&self, color_code: impl Into<String>) -> Self {
        Self {
            color_code: color_code.into(),
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: RowStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Rows computed from a batch of records, plus the records that failed
#[derive(Debug, Default)]
pub struct QuantityBatch {
    pub rows: Vec<QuantityRow>,
    pub errors: Vec<RecordError>,
}

/// Compute a quantity row for every record; bad records are reported, not fatal
pub fn compute_quantities(records: &[PartRecord]) -> QuantityBatch {
    let mut batch = QuantityBatch::default();

    for record in records {
        match QuantityRow::from_record(record) {
            Ok(row) => batch.rows.push(row),
            Err(err) => {
                tracing::debug!(line = record.line, "skipping part record: {}", err);
                batch.errors.push(err);
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{filter_records, DEFAULT_MARKER};

    fn export() -> String {
        [
            "ADIN001\tBASE-A\tx\t1000\t500\t720\t\t\t\t\tMO1\t\tTYPE\tTISAN",
            "ADIN002\tWALL\tx\tabc\t350\t700\t\t\t\t\tMO1\t\tTYPE\tTISAN",
            "ADIN003\tFOOBAR\tx\t1\t1\t1\t\t\t\t\tMO1\t\tTYPE\tTISAN",
        ]
        .join("\n")
    }

    #[test]
    fn test_compute_quantities_skips_bad_record() {
        let records = filter_records(&export(), DEFAULT_MARKER).records;
        assert_eq!(records.len(), 3);

        let batch = compute_quantities(&records);
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.errors.len(), 1);

        let base = &batch.rows[0];
        assert_eq!(base.part_type, "BASE-A");
        assert_eq!(base.quantity, 0.5);
        assert_eq!(base.door_model, "MO1");
        assert_eq!(base.color_category, "TYPE");
        assert_eq!(base.color_code, "TISAN");
        assert!(base.is_active());

        assert_eq!(batch.rows[1].part_type, "FOOBAR");
        assert_eq!(batch.rows[1].quantity, 0.0);
    }

    fn sample_row(part_type: &str) -> QuantityRow {
        QuantityRow::new(1, part_type, Dimensions::new(1.0, 0.5, 0.72), "MO1", "TYPE", "TISAN")
    }

    #[test]
    fn test_with_type_recomputes() {
        let row = sample_row("FOOBAR");
        assert_eq!(row.quantity, 0.0);

        let edited = row.with_type("BASE");
        assert_eq!(edited.quantity, 0.5);
        assert_eq!(row.quantity, 0.0);
    }

    #[test]
    fn test_with_dimensions_recomputes_and_keeps_status() {
        let row = sample_row("BASE").with_status(RowStatus::Excluded);
        let edited = row.with_dimensions(Dimensions::new(2.0, 0.5, 0.72));
        assert_eq!(edited.quantity, 1.0);
        assert_eq!(edited.status, RowStatus::Excluded);
    }

    #[test]
    fn test_metadata_edits_keep_quantity() {
        let row = sample_row("BASE");
        let edited = row
            .with_door_model("MO7")
            .with_color_category("GLOSS")
            .with_color_code("W01");
        assert_eq!(edited.quantity, row.quantity);
        assert_eq!(edited.door_model, "MO7");
        assert_eq!(edited.color_category, "GLOSS");
        assert_eq!(edited.color_code, "W01");
    }
}
