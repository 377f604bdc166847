//! Price table - persisted unit prices and the price resolver
//!
//! The price table is a CSV file with three key columns (door model, colour
//! category, colour code), one column per price group and a free-text
//! description. Lookups scan the rows in order and compare the keys
//! case-insensitively; the first matching row wins.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::aggregate::GroupKey;
use crate::core::normalize::price_column;

pub const DOOR_MODEL: &str = "Door model";
pub const COLOR_CATEGORY: &str = "Color category";
pub const COLOR_CODE: &str = "Color code";
pub const DESCRIPTION: &str = "Description";

/// Price columns of a freshly created table
pub const DEFAULT_PRICE_COLUMNS: &[&str] = &[
    "Cabinet",
    "Wardrobe",
    "NAMA",
    "Safhe 60",
    "Safhe 65",
    "Safhe 75",
    "Safhe 90",
    "Safhe 100",
    "Safhe 120",
    "Open shelf",
    "Shelf",
    "Kesho",
    "Tabaghe",
];

/// Example rows written into a new table
const DEFAULT_ROWS: &[(&str, &[&str])] = &[
    (
        "MO1",
        &[
            "1000", "1200", "800", "500", "550", "600", "650", "700", "750", "900", "1100", "1300",
            "1500",
        ],
    ),
    (
        "MO10",
        &[
            "1100", "1300", "850", "520", "570", "620", "670", "720", "770", "920", "1150", "1350",
            "1550",
        ],
    ),
    (
        "MO7",
        &[
            "1050", "1250", "825", "510", "560", "610", "660", "710", "760", "910", "1125", "1325",
            "1525",
        ],
    ),
];

/// Errors reading, writing or editing a price table
#[derive(Debug, Error, Diagnostic)]
pub enum PriceTableError {
    #[error("price table not found: {}", path.display())]
    #[diagnostic(
        code(partcost::price::not_found),
        help("run `partcost price init` to create a default table, or pass --price-table")
    )]
    NotFound { path: PathBuf },

    #[error("cannot access price table {}", path.display())]
    #[diagnostic(code(partcost::price::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed price table {origin}")]
    #[diagnostic(code(partcost::price::csv))]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("price table {origin} has no '{column}' column")]
    #[diagnostic(
        code(partcost::price::missing_column),
        help("the header row must name 'Door model', 'Color category' and 'Color code'")
    )]
    MissingColumn { origin: String, column: &'static str },

    #[error("price table has no '{column}' column")]
    #[diagnostic(code(partcost::price::unknown_column))]
    UnknownColumn { column: String },

    #[error("no price row for {door_model} / {color_category} / {color_code}")]
    #[diagnostic(code(partcost::price::entry_not_found))]
    EntryNotFound {
        door_model: String,
        color_category: String,
        color_code: String,
    },

    #[error("a price row for {door_model} / {color_category} / {color_code} already exists")]
    #[diagnostic(
        code(partcost::price::duplicate),
        help("use `partcost price set` to change an existing row")
    )]
    DuplicateKey {
        door_model: String,
        color_category: String,
        color_code: String,
    },
}

/// One row of the price table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceEntry {
    pub door_model: String,
    pub color_category: String,
    pub color_code: String,
    /// Raw cell text by price column name
    pub prices: BTreeMap<String, String>,
    pub description: String,
}

impl PriceEntry {
    pub fn new(
        door_model: impl Into<String>,
        color_category: impl Into<String>,
        color_code: impl Into<String>,
    ) -> Self {
        Self {
            door_model: door_model.into(),
            color_category: color_category.into(),
            color_code: color_code.into(),
            prices: BTreeMap::new(),
            description: String::new(),
        }
    }

    pub fn with_price(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.prices.insert(column.into(), value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive match on the three key fields
    pub fn matches(&self, door_model: &str, color_category: &str, color_code: &str) -> bool {
        same_key(&self.door_model, door_model)
            && same_key(&self.color_category, color_category)
            && same_key(&self.color_code, color_code)
    }

    /// Numeric price in a column; `None` when missing or not a number
    pub fn price(&self, column: &str) -> Option<f64> {
        self.cell(column)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Raw cell text in a column (column name compared case-insensitively)
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.prices
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(column.trim()))
            .map(|(_, value)| value.as_str())
    }
}

fn same_key(a: &str, b: &str) -> bool {
    a.trim().to_uppercase() == b.trim().to_uppercase()
}

/// The loaded price table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    columns: Vec<String>,
    entries: Vec<PriceEntry>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

impl PriceTable {
    /// Empty table with the given price columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            entries: Vec::new(),
        }
    }

    /// Table with the default columns and example rows
    pub fn default_table() -> Self {
        let mut table = Self::default();
        for (door_model, prices) in DEFAULT_ROWS {
            let mut entry =
                PriceEntry::new(*door_model, "TYPE", "TISAN").with_description("Example");
            for (column, price) in DEFAULT_PRICE_COLUMNS.iter().zip(prices.iter()) {
                entry = entry.with_price(*column, *price);
            }
            table.entries.push(entry);
        }
        table
    }

    /// Price column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a table from a CSV file
    pub fn load(path: &Path) -> Result<Self, PriceTableError> {
        if !path.exists() {
            return Err(PriceTableError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| PriceTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file, &path.display().to_string())?;
        tracing::info!(path = %path.display(), rows = table.len(), "loaded price table");
        Ok(table)
    }

    /// Load a table from CSV text
    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self, PriceTableError> {
        let csv_err = |source| PriceTableError::Csv {
            origin: origin.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = reader.headers().map_err(csv_err)?.clone();

        let position = |name: &'static str| -> Result<usize, PriceTableError> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| PriceTableError::MissingColumn {
                    origin: origin.to_string(),
                    column: name,
                })
        };
        let door_idx = position(DOOR_MODEL)?;
        let category_idx = position(COLOR_CATEGORY)?;
        let code_idx = position(COLOR_CODE)?;
        let description_idx = headers.iter().position(|h| h.eq_ignore_ascii_case(DESCRIPTION));

        let key_columns = [Some(door_idx), Some(category_idx), Some(code_idx), description_idx];
        let price_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !key_columns.contains(&Some(*i)) && !h.is_empty())
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut table = Self::new(price_columns.iter().map(|(_, h)| h.clone()).collect());
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let get = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

            let mut entry = PriceEntry::new(get(door_idx), get(category_idx), get(code_idx));
            if let Some(idx) = description_idx {
                entry.description = get(idx);
            }
            for (idx, name) in &price_columns {
                entry.prices.insert(name.clone(), get(*idx));
            }

            if table.find(&entry.door_model, &entry.color_category, &entry.color_code).is_some() {
                tracing::warn!(
                    door_model = %entry.door_model,
                    color_category = %entry.color_category,
                    color_code = %entry.color_code,
                    "duplicate price row; the first one is used"
                );
            }
            table.entries.push(entry);
        }

        Ok(table)
    }

    /// Write the table to a CSV file
    pub fn save(&self, path: &Path) -> Result<(), PriceTableError> {
        let io_err = |source| PriceTableError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        self.write_to(file, &path.display().to_string())?;
        tracing::info!(path = %path.display(), rows = self.len(), "saved price table");
        Ok(())
    }

    /// Write the table as CSV
    pub fn write_to<W: Write>(&self, writer: W, origin: &str) -> Result<(), PriceTableError> {
        let csv_err = |source| PriceTableError::Csv {
            origin: origin.to_string(),
            source,
        };
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![DOOR_MODEL, COLOR_CATEGORY, COLOR_CODE];
        header.extend(self.columns.iter().map(String::as_str));
        header.push(DESCRIPTION);
        writer.write_record(&header).map_err(csv_err)?;

        for entry in &self.entries {
            let mut row = vec![
                entry.door_model.as_str(),
                entry.color_category.as_str(),
                entry.color_code.as_str(),
            ];
            row.extend(self.columns.iter().map(|c| entry.cell(c).unwrap_or("")));
            row.push(entry.description.as_str());
            writer.write_record(&row).map_err(csv_err)?;
        }

        writer
            .flush()
            .map_err(|e| csv_err(csv::Error::from(e)))?;
        Ok(())
    }

    /// First row matching the key fields
    pub fn find(
        &self,
        door_model: &str,
        color_category: &str,
        color_code: &str,
    ) -> Option<&PriceEntry> {
        self.entries
            .iter()
            .find(|e| e.matches(door_model, color_category, color_code))
    }

    /// Unit price for a type group and its model / colour
    ///
    /// Unmapped groups, missing rows and non-numeric cells all price at zero.
    pub fn unit_price(
        &self,
        type_group: &str,
        door_model: &str,
        color_category: &str,
        color_code: &str,
    ) -> f64 {
        let Some(column) = price_column(type_group) else {
            tracing::warn!(type_group, "no price column for type group");
            return 0.0;
        };

        match self.find(door_model, color_category, color_code) {
            Some(entry) => entry.price(column).unwrap_or_else(|| {
                tracing::warn!(door_model, column, "price cell is empty or not a number");
                0.0
            }),
            None => {
                tracing::warn!(door_model, color_category, color_code, "no price row");
                0.0
            }
        }
    }

    /// Unit price for an aggregation key
    pub fn resolve(&self, key: &GroupKey) -> f64 {
        self.unit_price(
            &key.type_group,
            &key.door_model,
            &key.color_category,
            &key.color_code,
        )
    }

    /// Append a row; the key must not already exist
    pub fn add_entry(&mut self, mut entry: PriceEntry) -> Result<(), PriceTableError> {
        if self
            .find(&entry.door_model, &entry.color_category, &entry.color_code)
            .is_some()
        {
            return Err(PriceTableError::DuplicateKey {
                door_model: entry.door_model,
                color_category: entry.color_category,
                color_code: entry.color_code,
            });
        }
        let mut prices = BTreeMap::new();
        for (column, value) in std::mem::take(&mut entry.prices) {
            prices.insert(self.column_name(&column)?.to_string(), value.trim().to_string());
        }
        entry.prices = prices;
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the row with the given key
    pub fn remove_entry(
        &mut self,
        door_model: &str,
        color_category: &str,
        color_code: &str,
    ) -> Result<PriceEntry, PriceTableError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.matches(door_model, color_category, color_code))
            .ok_or_else(|| not_found(door_model, color_category, color_code))?;
        Ok(self.entries.remove(idx))
    }

    /// Change one price cell of an existing row
    pub fn set_price(
        &mut self,
        door_model: &str,
        color_category: &str,
        color_code: &str,
        column: &str,
        value: &str,
    ) -> Result<(), PriceTableError> {
        let column = self.column_name(column)?.to_string();
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.matches(door_model, color_category, color_code))
            .ok_or_else(|| not_found(door_model, color_category, color_code))?;

        entry.prices.retain(|name, _| !name.eq_ignore_ascii_case(&column));
        entry.prices.insert(column, value.trim().to_string());
        Ok(())
    }

    /// Canonical spelling of a price column
    fn column_name(&self, column: &str) -> Result<&str, PriceTableError> {
        self.columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(column.trim()))
            .map(String::as_str)
            .ok_or_else(|| PriceTableError::UnknownColumn {
                column: column.to_string(),
            })
    }
}

fn not_found(door_model: &str, color_category: &str, color_code: &str) -> PriceTableError {
    PriceTableError::EntryNotFound {
        door_model: door_model.to_string(),
        color_category: color_category.to_string(),
        color_code: color_code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TABLE: &str = "\
Door model,Color category,Color code,Cabinet,Wardrobe,NAMA,Safhe 60,Description
MO1,TYPE,TISAN,1000,1200,800,500,Example
MO7,TYPE,TISAN,1050,n/a,,510,Partial
MO1,TYPE,TISAN,9999,9999,9999,9999,Shadowed
";

    fn table() -> PriceTable {
        PriceTable::from_reader(TABLE.as_bytes(), "test").unwrap()
    }

    #[test]
    fn test_load_columns_and_rows() {
        let table = table();
        assert_eq!(table.columns(), &["Cabinet", "Wardrobe", "NAMA", "Safhe 60"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.entries()[1].description, "Partial");
    }

    #[test]
    fn test_resolve_maps_group_to_column() {
        let table = table();
        assert_eq!(table.unit_price("Base", "MO1", "TYPE", "TISAN"), 1000.0);
        assert_eq!(table.unit_price("Wall", "MO1", "TYPE", "TISAN"), 1000.0);
        assert_eq!(table.unit_price("Ward", "MO1", "TYPE", "TISAN"), 1200.0);
        assert_eq!(table.unit_price("Safhe 60", "MO1", "TYPE", "TISAN"), 500.0);
    }

    #[test]
    fn test_resolve_is_case_insensitive_on_keys() {
        assert_eq!(table().unit_price("NAMA", "mo1", "type", "Tisan"), 800.0);
    }

    #[test]
    fn test_first_row_wins() {
        assert_eq!(table().unit_price("Base", "MO1", "TYPE", "TISAN"), 1000.0);
    }

    #[test]
    fn test_misses_price_at_zero() {
        let table = table();
        assert_eq!(table.unit_price("FOOBAR", "MO1", "TYPE", "TISAN"), 0.0);
        assert_eq!(table.unit_price("Base", "MO99", "TYPE", "TISAN"), 0.0);
        assert_eq!(table.unit_price("Ward", "MO7", "TYPE", "TISAN"), 0.0);
        assert_eq!(table.unit_price("NAMA", "MO7", "TYPE", "TISAN"), 0.0);
        // column absent from this table
        assert_eq!(table.unit_price("Kesho", "MO1", "TYPE", "TISAN"), 0.0);
    }

    #[test]
    fn test_missing_key_column() {
        let err =
            PriceTable::from_reader("Door model,Color code,Cabinet\n".as_bytes(), "t").unwrap_err();
        assert!(matches!(
            err,
            PriceTableError::MissingColumn { column: COLOR_CATEGORY, .. }
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = PriceTable::load(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, PriceTableError::NotFound { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices/price_table.csv");
        let table = PriceTable::default_table();
        table.save(&path).unwrap();

        let loaded = PriceTable::load(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.unit_price("Tabaghe", "MO10", "TYPE", "TISAN"), 1550.0);
        assert_eq!(loaded.unit_price("Open shelf", "MO7", "TYPE", "TISAN"), 910.0);
    }

    #[test]
    fn test_default_header() {
        let mut out = Vec::new();
        PriceTable::default().write_to(&mut out, "mem").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.trim_end(),
            "Door model,Color category,Color code,Cabinet,Wardrobe,NAMA,Safhe 60,Safhe 65,\
Safhe 75,Safhe 90,Safhe 100,Safhe 120,Open shelf,Shelf,Kesho,Tabaghe,Description"
        );
    }

    #[test]
    fn test_add_entry_rejects_duplicates_and_unknown_columns() {
        let mut table = PriceTable::default();
        table
            .add_entry(PriceEntry::new("MO2", "TYPE", "WHITE").with_price("cabinet", "900"))
            .unwrap();
        assert_eq!(table.unit_price("Tall", "MO2", "TYPE", "WHITE"), 900.0);

        let dup = table.add_entry(PriceEntry::new("mo2", "type", "white"));
        assert!(matches!(dup, Err(PriceTableError::DuplicateKey { .. })));

        let bad = table.add_entry(PriceEntry::new("MO3", "TYPE", "WHITE").with_price("Doors", "1"));
        assert!(matches!(bad, Err(PriceTableError::UnknownColumn { .. })));
    }

    #[test]
    fn test_set_price_and_remove() {
        let mut table = PriceTable::default_table();
        table.set_price("MO1", "TYPE", "TISAN", "kesho", " 1400 ").unwrap();
        assert_eq!(table.unit_price("Kesho", "MO1", "TYPE", "TISAN"), 1400.0);

        let err = table.set_price("MO1", "TYPE", "TISAN", "Doors", "1").unwrap_err();
        assert!(matches!(err, PriceTableError::UnknownColumn { .. }));

        let removed = table.remove_entry("MO1", "TYPE", "TISAN").unwrap();
        assert_eq!(removed.door_model, "MO1");
        assert_eq!(table.unit_price("Kesho", "MO1", "TYPE", "TISAN"), 0.0);
        assert!(table.remove_entry("MO1", "TYPE", "TISAN").is_err());
    }
}
