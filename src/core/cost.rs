//! Costing - unit prices times aggregated quantities

use std::io::Write;

use serde::Serialize;

use crate::core::aggregate::SummaryRow;
use crate::core::price::PriceTable;

/// Export column headers
pub const EXPORT_HEADERS: [&str; 7] = [
    "Type",
    "Door Model",
    "Color Category",
    "Color Code",
    "Total Quantity",
    "Unit Price",
    "Total Price",
];

/// A summary row with its price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRow {
    #[serde(flatten)]
    pub summary: SummaryRow,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Cost rows and their grand total
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CostReport {
    pub rows: Vec<CostRow>,
    pub grand_total: f64,
}

impl CostReport {
    /// Write the export CSV: one line per group and a trailing total line
    ///
    /// Quantities are rounded to 4 decimals and prices to 2; the report itself
    /// keeps full precision.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(EXPORT_HEADERS)?;

        for row in &self.rows {
            let key = &row.summary.key;
            writer.write_record([
                key.type_group.clone(),
                key.door_model.clone(),
                key.color_category.clone(),
                key.color_code.clone(),
                format!("{:.4}", row.summary.total_quantity),
                format!("{:.2}", row.unit_price),
                format!("{:.2}", row.total_price),
            ])?;
        }

        let total = format!("{:.2}", self.grand_total);
        writer.write_record(["", "", "", "", "", "TOTAL", total.as_str()])?;
        writer.flush()?;
        Ok(())
    }
}

/// Price every summary row and total them
pub fn cost(summary: &[SummaryRow], prices: &PriceTable) -> CostReport {
    if prices.is_empty() && !summary.is_empty() {
        tracing::warn!("price table has no rows; every group costs zero");
    }
    let rows: Vec<CostRow> = summary
        .iter()
        .map(|s| {
            let unit_price = prices.resolve(&s.key);
            CostRow {
                summary: s.clone(),
                unit_price,
                total_price: s.total_quantity * unit_price,
            }
        })
        .collect();
    let grand_total = rows.iter().map(|r| r.total_price).sum();

    CostReport { rows, grand_total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::GroupKey;
    use crate::core::price::PriceEntry;

    fn summary(type_group: &str, door: &str, total_quantity: f64) -> SummaryRow {
        SummaryRow {
            key: GroupKey::new(type_group, door, "TYPE", "TISAN"),
            total_quantity,
            member_count: 1,
        }
    }

    #[test]
    fn test_cost_rows() {
        let report = cost(
            &[summary("Base", "MO1", 0.5), summary("Ward", "MO7", 2.0)],
            &PriceTable::default_table(),
        );
        assert_eq!(report.rows[0].unit_price, 1000.0);
        assert_eq!(report.rows[0].total_price, 500.0);
        assert_eq!(report.rows[1].unit_price, 1250.0);
        assert_eq!(report.rows[1].total_price, 2500.0);
        assert_eq!(report.grand_total, 3000.0);
    }

    #[test]
    fn test_unknown_group_costs_zero() {
        let report = cost(&[summary("FOOBAR", "MO1", 3.0)], &PriceTable::default_table());
        assert_eq!(report.rows[0].unit_price, 0.0);
        assert_eq!(report.rows[0].total_price, 0.0);
        assert_eq!(report.grand_total, 0.0);
    }

    #[test]
    fn test_grand_total_is_sum_of_rows() {
        let rows = [
            summary("Base", "MO1", 0.37),
            summary("Wall", "MO10", 1.91),
            summary("Kesho", "MO7", 0.12),
        ];
        let report = cost(&rows, &PriceTable::default_table());
        let sum: f64 = report.rows.iter().map(|r| r.total_price).sum();
        assert_eq!(report.grand_total, sum);
    }

    #[test]
    fn test_price_change_moves_total_by_quantity() {
        let rows = [summary("Base", "MO2", 0.75), summary("Wall", "MO1", 1.5)];
        let mut table = PriceTable::default_table();
        let before = cost(&rows, &table).grand_total;

        table
            .add_entry(PriceEntry::new("MO2", "TYPE", "TISAN").with_price("Cabinet", "800"))
            .unwrap();
        let after = cost(&rows, &table).grand_total;

        assert!((after - before - 0.75 * 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_layout() {
        let report = cost(
            &[summary("Base", "MO1", 0.5), summary("FOOBAR", "MO1", 0.0)],
            &PriceTable::default_table(),
        );
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();

        insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
        Type,Door Model,Color Category,Color Code,Total Quantity,Unit Price,Total Price
        Base,MO1,TYPE,TISAN,0.5000,1000.00,500.00
        FOOBAR,MO1,TYPE,TISAN,0.0000,0.00,0.00
        ,,,,,TOTAL,500.00
        ");
    }
}
