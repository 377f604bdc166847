//! Type groups - collapsing raw part labels for aggregation and pricing

/// Ordered (prefix, group) table; first prefix match wins
pub const TYPE_GROUPS: &[(&str, &str)] = &[
    ("BASE", "Base"),
    ("TALL", "Tall"),
    ("WALL", "Wall"),
    ("NAMA", "NAMA"),
    ("SAFHE 100", "Safhe 100"),
    ("SAFHE 120", "Safhe 120"),
    ("SAFHE 60", "Safhe 60"),
    ("SAFHE 65", "Safhe 65"),
    ("SAFHE 75", "Safhe 75"),
    ("SAFHE 90", "Safhe 90"),
    ("WARD", "Ward"),
    ("OPEN SHELF", "Open shelf"),
    ("SHELF", "Shelf"),
    ("KESHO", "Kesho"),
    ("TABAGHE", "Tabaghe"),
];

/// Price table column for each type group
const PRICE_COLUMNS: &[(&str, &str)] = &[
    ("Base", "Cabinet"),
    ("Tall", "Cabinet"),
    ("Wall", "Cabinet"),
    ("Ward", "Wardrobe"),
    ("NAMA", "NAMA"),
    ("Safhe 60", "Safhe 60"),
    ("Safhe 65", "Safhe 65"),
    ("Safhe 75", "Safhe 75"),
    ("Safhe 90", "Safhe 90"),
    ("Safhe 100", "Safhe 100"),
    ("Safhe 120", "Safhe 120"),
    ("Open shelf", "Open shelf"),
    ("Shelf", "Shelf"),
    ("Kesho", "Kesho"),
    ("Tabaghe", "Tabaghe"),
];

/// Canonical group for a raw type label
///
/// Labels outside the table keep their text, upper-cased, so that grouping
/// on the type is case-insensitive.
pub fn normalize_type(part_type: &str) -> String {
    let label = part_type.trim().to_uppercase();
    TYPE_GROUPS
        .iter()
        .find(|(prefix, _)| label.starts_with(prefix))
        .map(|(_, group)| group.to_string())
        .unwrap_or(label)
}

/// Price table column holding the unit price of a type group
pub fn price_column(type_group: &str) -> Option<&'static str> {
    PRICE_COLUMNS
        .iter()
        .find(|(group, _)| *group == type_group)
        .map(|(_, column)| *column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_groups() {
        assert_eq!(normalize_type("BASE-A"), "Base");
        assert_eq!(normalize_type("tall 60"), "Tall");
        assert_eq!(normalize_type("Wall 80"), "Wall");
        assert_eq!(normalize_type("NAMA VER WITH LIGHT"), "NAMA");
        assert_eq!(normalize_type("SAFHE 60 GRANITE"), "Safhe 60");
        assert_eq!(normalize_type("SAFHE 100"), "Safhe 100");
        assert_eq!(normalize_type("SAFHE 120"), "Safhe 120");
        assert_eq!(normalize_type("WARD 3D"), "Ward");
        assert_eq!(normalize_type("OPEN SHELF"), "Open shelf");
        assert_eq!(normalize_type("SHELF"), "Shelf");
        assert_eq!(normalize_type("KESHO 2"), "Kesho");
        assert_eq!(normalize_type("TABAGHE 3"), "Tabaghe");
    }

    #[test]
    fn test_unknown_label_kept() {
        assert_eq!(normalize_type("FOOBAR"), "FOOBAR");
        assert_eq!(normalize_type("foobar"), "FOOBAR");
        assert_eq!(normalize_type("SAFHE 50"), "SAFHE 50");
    }

    #[test]
    fn test_price_columns() {
        assert_eq!(price_column("Base"), Some("Cabinet"));
        assert_eq!(price_column("Tall"), Some("Cabinet"));
        assert_eq!(price_column("Wall"), Some("Cabinet"));
        assert_eq!(price_column("Ward"), Some("Wardrobe"));
        assert_eq!(price_column("Safhe 90"), Some("Safhe 90"));
        assert_eq!(price_column("Open shelf"), Some("Open shelf"));
        assert_eq!(price_column("FOOBAR"), None);
    }

    #[test]
    fn test_every_group_has_a_price_column() {
        for (_, group) in TYPE_GROUPS {
            assert!(price_column(group).is_some(), "{} has no price column", group);
        }
    }

    #[test]
    fn test_no_group_prefix_is_shadowed() {
        for (i, (earlier, _)) in TYPE_GROUPS.iter().enumerate() {
            for (later, _) in &TYPE_GROUPS[i + 1..] {
                assert!(!later.starts_with(earlier), "{} shadowed by {}", later, earlier);
            }
        }
    }
}
