//! Aggregation of quantity rows into summary rows

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::normalize::normalize_type;
use crate::core::quantity::QuantityRow;

/// Grouping and pricing key
///
/// Ordering is lexicographic over (type group, door model, colour category,
/// colour code), which is also the order of summary output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub type_group: String,
    pub door_model: String,
    pub color_category: String,
    pub color_code: String,
}

impl GroupKey {
    pub fn new(
        type_group: impl Into<String>,
        door_model: impl Into<String>,
        color_category: impl Into<String>,
        color_code: impl Into<String>,
    ) -> Self {
        Self {
            type_group: type_group.into(),
            door_model: door_model.into(),
            color_category: color_category.into(),
            color_code: color_code.into(),
        }
    }

    /// Key of a quantity row (type normalised, other fields as-is)
    pub fn for_row(row: &QuantityRow) -> Self {
        Self::new(
            normalize_type(&row.part_type),
            row.door_model.clone(),
            row.color_category.clone(),
            row.color_code.clone(),
        )
    }
}

/// Total quantity of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(flatten)]
    pub key: GroupKey,
    pub total_quantity: f64,
    pub member_count: usize,
}

/// Group active rows by key and sum their quantities
///
/// Excluded rows are ignored. The result is sorted by key and fully
/// determined by the input rows.
pub fn aggregate(rows: &[QuantityRow]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<GroupKey, (f64, usize)> = BTreeMap::new();

    for row in rows.iter().filter(|r| r.is_active()) {
        let entry = groups.entry(GroupKey::for_row(row)).or_insert((0.0, 0));
        entry.0 += row.quantity;
        entry.1 += 1;
    }

    let summary: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(key, (total_quantity, member_count))| SummaryRow {
            key,
            total_quantity,
            member_count,
        })
        .collect();

    tracing::info!(groups = summary.len(), "aggregated quantity rows");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formula::Dimensions;
    use crate::core::quantity::RowStatus;

    fn row(part_type: &str, l: f64, door: &str) -> QuantityRow {
        QuantityRow::new(1, part_type, Dimensions::new(l, 0.35, 0.7), door, "TYPE", "TISAN")
    }

    #[test]
    fn test_two_walls_merge() {
        let a = row("WALL 60", 0.6, "MO1");
        let b = row("wall 90", 0.9, "MO1");
        let summary = aggregate(&[a.clone(), b.clone()]);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].key.type_group, "Wall");
        assert_eq!(summary[0].member_count, 2);
        assert!((summary[0].total_quantity - (a.quantity + b.quantity)).abs() < 1e-12);
    }

    #[test]
    fn test_metadata_is_case_preserving() {
        let summary = aggregate(&[row("BASE", 1.0, "MO1"), row("BASE", 1.0, "mo1")]);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_unknown_type_case_insensitive() {
        let summary = aggregate(&[row("FooBar", 1.0, "MO1"), row("FOOBAR", 1.0, "MO1")]);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].key.type_group, "FOOBAR");
        assert_eq!(summary[0].total_quantity, 0.0);
    }

    #[test]
    fn test_excluded_rows_ignored() {
        let kept = row("BASE", 1.0, "MO1");
        let dropped = row("BASE", 2.0, "MO1").with_status(RowStatus::Excluded);
        let summary = aggregate(&[kept.clone(), dropped]);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].member_count, 1);
        assert_eq!(summary[0].total_quantity, kept.quantity);
    }

    #[test]
    fn test_sorted_by_key() {
        let summary = aggregate(&[
            row("WALL", 1.0, "MO1"),
            row("BASE", 1.0, "MO7"),
            row("BASE", 1.0, "MO10"),
        ]);
        let keys: Vec<(&str, &str)> = summary
            .iter()
            .map(|s| (s.key.type_group.as_str(), s.key.door_model.as_str()))
            .collect();
        assert_eq!(keys, vec![("Base", "MO10"), ("Base", "MO7"), ("Wall", "MO1")]);
    }

    #[test]
    fn test_totals_preserved() {
        let rows: Vec<QuantityRow> = ["BASE", "WALL", "WARD", "KESHO", "SHELF", "FOO"]
            .iter()
            .enumerate()
            .map(|(i, t)| row(t, 0.3 + i as f64 * 0.1, if i % 2 == 0 { "MO1" } else { "MO7" }))
            .collect();
        let input: f64 = rows.iter().map(|r| r.quantity).sum();
        let output: f64 = aggregate(&rows).iter().map(|s| s.total_quantity).sum();
        assert!((input - output).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![row("WALL", 1.0, "MO1"), row("BASE", 0.5, "MO7"), row("WALL", 0.4, "MO1")];
        assert_eq!(aggregate(&rows), aggregate(&rows));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
