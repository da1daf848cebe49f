//! Derived color-name table.
//!
//! One StringList setting holds `"label:RRGGBBAA"` entries; this module
//! parses them into a [`ColorTable`] mapping packed RGBA values to labels.
//! Malformed entries are dropped with a warning, never fatal. The finished
//! table is handed to a [`ColorRegistry`] collaborator, replacing whatever
//! table was published before (no partial merge).

use std::collections::BTreeMap;

use tracing::warn;

/// Immutable lookup from packed RGBA color to its human-readable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    entries: BTreeMap<u32, String>,
}

impl ColorTable {
    pub fn name_of(&self, color: u32) -> Option<&str> {
        self.entries.get(&color).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(color, name)| (*color, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Receives each rebuilt [`ColorTable`]. The published table replaces the
/// previous one in full.
pub trait ColorRegistry {
    fn publish(&self, table: ColorTable);
}

/// Discards published tables.
pub struct NullRegistry;

impl ColorRegistry for NullRegistry {
    fn publish(&self, _table: ColorTable) {}
}

/// Build a [`ColorTable`] from `"label:RRGGBBAA"` entries.
///
/// Entries that do not split into exactly two parts, or whose second part
/// is not hexadecimal, are skipped and reported. A color that appears twice
/// keeps the last label.
pub fn build_color_table(entries: &[String]) -> ColorTable {
    let mut table = ColorTable::default();
    for entry in entries {
        let parts: Vec<&str> = entry.split(':').collect();
        if parts.len() != 2 {
            warn!("invalid format for color entry: {:?}", entry);
            continue;
        }
        match u32::from_str_radix(parts[1], 16) {
            Ok(color) => {
                table.entries.insert(color, parts[0].to_string());
            }
            Err(e) => {
                warn!("invalid color value in entry {:?}: {}", entry, e);
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_entry_parses() {
        let table = build_color_table(&entries(&["Red:FF0000FF"]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(0xFF0000FF), Some("Red"));
    }

    #[test]
    fn test_entry_without_colon_is_dropped() {
        let table = build_color_table(&entries(&["Red:FF0000FF", "BadEntry"]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(0xFF0000FF), Some("Red"));
    }

    #[test]
    fn test_entry_with_extra_colon_is_dropped() {
        let table = build_color_table(&entries(&["Red:FF00:00FF"]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_non_hex_value_is_dropped() {
        let table = build_color_table(&entries(&["Red:NOTHEX", "Blue:0000FFFF"]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(0x0000FFFF), Some("Blue"));
    }

    #[test]
    fn test_duplicate_color_keeps_last_label() {
        let table = build_color_table(&entries(&["Crimson:FF0000FF", "Red:FF0000FF"]));
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(0xFF0000FF), Some("Red"));
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let table = build_color_table(&[]);
        assert!(table.is_empty());
        assert_eq!(table.name_of(0xFF0000FF), None);
    }
}
