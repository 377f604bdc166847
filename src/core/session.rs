//! Working session over one parts list
//!
//! A session owns the quantity rows of a single dataset. Edits replace a
//! row with a newly computed one; summary and cost are always derived from
//! the current rows in full, never patched.

use std::str::FromStr;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::aggregate::{aggregate, SummaryRow};
use crate::core::cost::{cost, CostReport};
use crate::core::formula::{millimetres_to_metres, Dimensions};
use crate::core::pipeline::PipelineError;
use crate::core::price::PriceTable;
use crate::core::quantity::{compute_quantities, QuantityRow, RowStatus};
use crate::core::record::{parse_millimetres, PartRecord, RecordError};

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("row {row} does not exist (the list has {len} rows)")]
    #[diagnostic(code(partcost::session::no_row))]
    NoSuchRow { row: usize, len: usize },

    #[error("unknown field '{0}'")]
    #[diagnostic(
        code(partcost::session::unknown_field),
        help("editable fields: type, l, p, h, door, category, code")
    )]
    UnknownField(String),

    #[error("'{0}' is not a valid edit")]
    #[diagnostic(
        code(partcost::session::bad_edit),
        help("write edits as ROW:FIELD=VALUE, for example 3:h=720")
    )]
    BadEdit(String),

    #[error("'{value}' is not a millimetre value")]
    #[diagnostic(code(partcost::session::bad_number))]
    BadNumber { value: String },
}

/// An editable column of the quantity table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Type,
    Length,
    Depth,
    Height,
    DoorModel,
    ColorCategory,
    ColorCode,
}

impl FromStr for EditField {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "type" => Ok(EditField::Type),
            "l" | "length" => Ok(EditField::Length),
            "p" | "depth" => Ok(EditField::Depth),
            "h" | "height" => Ok(EditField::Height),
            "door" | "door_model" => Ok(EditField::DoorModel),
            "category" | "color_category" => Ok(EditField::ColorCategory),
            "code" | "color_code" => Ok(EditField::ColorCode),
            other => Err(SessionError::UnknownField(other.to_string())),
        }
    }
}

/// A change to one row, addressed by 1-based row number
#[derive(Debug, Clone, PartialEq)]
pub enum RowEdit {
    Set {
        row: usize,
        field: EditField,
        value: String,
    },
    Exclude {
        row: usize,
    },
    Restore {
        row: usize,
    },
}

impl RowEdit {
    pub fn row(&self) -> usize {
        match self {
            RowEdit::Set { row, .. } | RowEdit::Exclude { row } | RowEdit::Restore { row } => *row,
        }
    }
}

impl FromStr for RowEdit {
    type Err = SessionError;

    /// Parse `ROW:FIELD=VALUE`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || SessionError::BadEdit(s.to_string());
        let (row, assignment) = s.split_once(':').ok_or_else(bad)?;
        let (field, value) = assignment.split_once('=').ok_or_else(bad)?;
        let row = row.trim().parse::<usize>().map_err(|_| bad())?;

        Ok(RowEdit::Set {
            row,
            field: field.parse()?,
            value: value.trim().to_string(),
        })
    }
}

/// Quantity rows of one dataset plus derived views
#[derive(Debug, Default)]
pub struct Session {
    rows: Vec<QuantityRow>,
    rejected: Vec<RecordError>,
}

impl Session {
    /// Start a session from filtered part records
    pub fn from_records(records: &[PartRecord]) -> Self {
        let batch = compute_quantities(records);
        Self {
            rows: batch.rows,
            rejected: batch.errors,
        }
    }

    /// Start a session, refusing a batch with no records
    pub fn try_from_records(records: &[PartRecord]) -> Result<Self, PipelineError> {
        if records.is_empty() {
            return Err(PipelineError::EmptyResult);
        }
        Ok(Self::from_records(records))
    }

    pub fn rows(&self) -> &[QuantityRow] {
        &self.rows
    }

    /// Records that failed when the session was created
    pub fn rejected(&self) -> &[RecordError] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply one edit, replacing the addressed row
    pub fn apply(&mut self, edit: &RowEdit) -> Result<(), SessionError> {
        let len = self.rows.len();
        let idx = edit
            .row()
            .checked_sub(1)
            .filter(|i| *i < len)
            .ok_or(SessionError::NoSuchRow {
                row: edit.row(),
                len,
            })?;
        let current = &self.rows[idx];

        let updated = match edit {
            RowEdit::Exclude { .. } => current.with_status(RowStatus::Excluded),
            RowEdit::Restore { .. } => current.with_status(RowStatus::Active),
            RowEdit::Set { field, value, .. } => set_field(current, *field, value)?,
        };

        tracing::debug!(row = edit.row(), quantity = updated.quantity, "row edited");
        self.rows[idx] = updated;
        Ok(())
    }

    /// Apply edits in order, stopping at the first failure
    pub fn apply_all<'a>(
        &mut self,
        edits: impl IntoIterator<Item = &'a RowEdit>,
    ) -> Result<(), SessionError> {
        for edit in edits {
            self.apply(edit)?;
        }
        Ok(())
    }

    /// Summary of the active rows
    pub fn summary(&self) -> Vec<SummaryRow> {
        aggregate(&self.rows)
    }

    /// Cost report against a price table
    ///
    /// Groups without a price row cost nothing, so an empty table yields a
    /// zero grand total.
    pub fn cost(&self, prices: &PriceTable) -> CostReport {
        cost(&self.summary(), prices)
    }
}

fn set_field(
    row: &QuantityRow,
    field: EditField,
    value: &str,
) -> Result<QuantityRow, SessionError> {
    let metres = |v: &str| {
        parse_millimetres(v)
            .map(millimetres_to_metres)
            .ok_or_else(|| SessionError::BadNumber {
                value: v.to_string(),
            })
    };
    let dims = row.dimensions;

    Ok(match field {
        EditField::Type => row.with_type(value),
        EditField::Length => row.with_dimensions(Dimensions {
            length: metres(value)?,
            ..dims
        }),
        EditField::Depth => row.with_dimensions(Dimensions {
            depth: metres(value)?,
            ..dims
        }),
        EditField::Height => row.with_dimensions(Dimensions {
            height: metres(value)?,
            ..dims
        }),
        EditField::DoorModel => row.with_door_model(value),
        EditField::ColorCategory => row.with_color_category(value),
        EditField::ColorCode => row.with_color_code(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{filter_records, DEFAULT_MARKER};

    fn session() -> Session {
        let text = [
            "ADIN1\tBASE\t\t1000\t500\t720\t\t\t\t\tMO1\t\tTYPE\tTISAN",
            "ADIN2\tFOOBAR\t\t1000\t500\t720\t\t\t\t\tMO1\t\tTYPE\tTISAN",
            "ADIN3\tBASE\t\t2000\t500\t720\t\t\t\t\tMO1\t\tTYPE\tTISAN",
        ]
        .join("\n");
        Session::from_records(&filter_records(&text, DEFAULT_MARKER).records)
    }

    #[test]
    fn test_parse_edit() {
        let edit: RowEdit = "2:type=BASE-B".parse().unwrap();
        assert_eq!(
            edit,
            RowEdit::Set {
                row: 2,
                field: EditField::Type,
                value: "BASE-B".to_string()
            }
        );
        assert!(matches!("2:width=3".parse::<RowEdit>(), Err(SessionError::UnknownField(_))));
        assert!(matches!("two:h=3".parse::<RowEdit>(), Err(SessionError::BadEdit(_))));
        assert!(matches!("2-h=3".parse::<RowEdit>(), Err(SessionError::BadEdit(_))));
    }

    #[test]
    fn test_type_edit_recomputes_summary() {
        let mut session = session();
        assert_eq!(session.summary().len(), 2);

        session.apply(&"2:type=base".parse().unwrap()).unwrap();
        assert_eq!(session.rows()[1].quantity, 0.5);

        let summary = session.summary();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].member_count, 3);
        assert_eq!(summary[0].total_quantity, 2.0);
    }

    #[test]
    fn test_dimension_edit_in_millimetres() {
        let mut session = session();
        session.apply(&"1:l=3000".parse().unwrap()).unwrap();
        assert_eq!(session.rows()[0].dimensions.length, 3.0);
        assert_eq!(session.rows()[0].quantity, 1.5);

        let err = session.apply(&"1:h=tall".parse().unwrap()).unwrap_err();
        assert!(matches!(err, SessionError::BadNumber { .. }));
    }

    #[test]
    fn test_exclude_and_restore() {
        let mut session = session();
        session.apply(&RowEdit::Exclude { row: 3 }).unwrap();
        let base = session.summary().into_iter().find(|s| s.key.type_group == "Base").unwrap();
        assert_eq!(base.member_count, 1);
        assert_eq!(base.total_quantity, 0.5);

        session.apply(&RowEdit::Restore { row: 3 }).unwrap();
        let base = session.summary().into_iter().find(|s| s.key.type_group == "Base").unwrap();
        assert_eq!(base.member_count, 2);
    }

    #[test]
    fn test_row_out_of_range() {
        let mut session = session();
        assert!(matches!(
            session.apply(&RowEdit::Exclude { row: 0 }),
            Err(SessionError::NoSuchRow { row: 0, len: 3 })
        ));
        assert!(matches!(
            session.apply(&RowEdit::Exclude { row: 4 }),
            Err(SessionError::NoSuchRow { row: 4, len: 3 })
        ));
    }

    #[test]
    fn test_cost_against_default_table() {
        let report = session().cost(&PriceTable::default_table());
        assert_eq!(report.grand_total, 1500.0);
    }

    #[test]
    fn test_cost_with_header_only_table_is_zero() {
        let prices = PriceTable::from_reader(
            "Door model,Color category,Color code,Cabinet,Description\n".as_bytes(),
            "test",
        )
        .unwrap();
        assert!(prices.is_empty());

        let report = session().cost(&prices);
        assert_eq!(report.rows.len(), 2);
        assert!(report.rows.iter().all(|r| r.unit_price == 0.0));
        assert_eq!(report.grand_total, 0.0);
    }

    #[test]
    fn test_no_records_is_empty_result() {
        assert!(matches!(
            Session::try_from_records(&[]),
            Err(PipelineError::EmptyResult)
        ));
    }
}
