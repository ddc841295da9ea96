//! Aggregations over the inventory table
//!
//! Every query takes an optional delegation to narrow on first; an absent or
//! empty delegation means the whole table. An empty table is an error
//! ([`InventoryError::NoData`]) rather than an empty answer.

use crate::error::{InventoryError, Result};
use crate::policy::is_allowed;
use crate::table::{Table, COL_DELEGATION, COL_DESTINATION, COL_LOCATION, COL_STATUS};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Location value meaning "in transit"; compared case-sensitively
pub const TRANSIT_LOCATION: &str = "TRANSITO";

/// Status label for items pending review
pub const STATUS_PENDING: &str = "Pend. revisar";
/// Status label for operational items
pub const STATUS_OPERATIONAL: &str = "Operativo";
/// Status label for new items
pub const STATUS_NEW: &str = "Nuevo";

/// Row counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Rows with status "Pend. revisar"
    #[serde(rename = "Pendiente de Revisar")]
    pub pending: usize,
    /// Rows with status "Operativo"
    #[serde(rename = "Operativo")]
    pub operational: usize,
    /// Rows with status "Nuevo"
    #[serde(rename = "Nuevo")]
    pub new: usize,
}

/// Value → row count
pub type Counts = BTreeMap<String, usize>;

fn narrowed(table: &Table, delegation: Option<&str>) -> Result<Table> {
    if table.is_empty() {
        return Err(InventoryError::NoData);
    }
    Ok(table.for_delegation(delegation))
}

fn without_transit(table: Table) -> Table {
    match table.column_index(COL_LOCATION) {
        Some(idx) => table.filtered(|row| !row[idx].is_text(TRANSIT_LOCATION)),
        None => table,
    }
}

/// Sorted distinct delegations present in the table
pub fn list_delegations(table: &Table, delegation: Option<&str>) -> Result<Vec<String>> {
    let table = narrowed(table, delegation)?;
    let Some(values) = table.column_values(COL_DELEGATION) else {
        return Ok(Vec::new());
    };

    let distinct: BTreeSet<String> = values
        .filter_map(|cell| cell.as_str())
        .filter(|name| !name.is_empty() && is_allowed(name))
        .map(str::to_string)
        .collect();

    Ok(distinct.into_iter().collect())
}

/// Counts of the three tracked statuses, excluding items in transit
pub fn status_counts(table: &Table, delegation: Option<&str>) -> Result<StatusCounts> {
    let table = without_transit(narrowed(table, delegation)?);
    let mut counts = StatusCounts::default();

    if let Some(values) = table.column_values(COL_STATUS) {
        for cell in values {
            match cell.as_str() {
                Some(STATUS_PENDING) => counts.pending += 1,
                Some(STATUS_OPERATIONAL) => counts.operational += 1,
                Some(STATUS_NEW) => counts.new += 1,
                _ => {}
            }
        }
    }

    Ok(counts)
}

/// Row counts per uppercased location, excluding items in transit.
///
/// Blank location cells are skipped rather than counted under a `"NAN"` key.
pub fn location_counts(table: &Table, delegation: Option<&str>) -> Result<Counts> {
    let table = without_transit(narrowed(table, delegation)?);
    let mut counts = Counts::new();

    if let Some(values) = table.column_values(COL_LOCATION) {
        for cell in values.filter(|cell| !cell.is_empty()) {
            *counts.entry(cell.to_string().to_uppercase()).or_insert(0) += 1;
        }
    }

    Ok(counts)
}

/// Row counts per shipping destination
pub fn destination_counts(table: &Table, delegation: Option<&str>) -> Result<Counts> {
    let table = narrowed(table, delegation)?;
    let mut counts = Counts::new();

    if let Some(values) = table.column_values(COL_DESTINATION) {
        for cell in values.filter(|cell| !cell.is_empty()) {
            *counts.entry(cell.to_string()).or_insert(0) += 1;
        }
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    fn inventory() -> Table {
        Table::from_text_rows(
            &[COL_DELEGATION, COL_STATUS, COL_LOCATION, COL_DESTINATION],
            &[
                &["CUSCO - CUSCO", "Operativo", "Lima", "Almacén"],
                &["CUSCO - CUSCO", "Nuevo", "TRANSITO", "Almacén"],
                &["CUSCO - CUSCO", "Pend. revisar", "transito", "Taller"],
                &["PUNO", "Operativo", "LIMA", ""],
                &["PUNO", "Baja", "", "Taller"],
                &["TACNA", "Nuevo", "Tacna", "Almacén"],
            ],
        )
    }

    #[test]
    fn test_empty_table_is_no_data() {
        let empty = Table::default();
        assert!(matches!(list_delegations(&empty, None), Err(InventoryError::NoData)));
        assert!(matches!(status_counts(&empty, None), Err(InventoryError::NoData)));
        assert!(matches!(location_counts(&empty, Some("PUNO")), Err(InventoryError::NoData)));
        assert!(matches!(destination_counts(&empty, None), Err(InventoryError::NoData)));
    }

    #[test]
    fn test_list_delegations_sorted_and_unique() {
        let table = inventory();
        assert_eq!(
            list_delegations(&table, None).unwrap(),
            vec!["CUSCO - CUSCO", "PUNO", "TACNA"]
        );
        assert_eq!(list_delegations(&table, Some("PUNO")).unwrap(), vec!["PUNO"]);
        assert!(list_delegations(&table, Some("LORETO")).unwrap().is_empty());
    }

    #[test]
    fn test_list_delegations_ignores_values_outside_allow_list() {
        let table = Table::from_text_rows(
            &[COL_DELEGATION],
            &[&["TUMBES"], &["FAKE"], &[""], &["AMAZONAS"]],
        );
        assert_eq!(
            list_delegations(&table, None).unwrap(),
            vec!["AMAZONAS", "TUMBES"]
        );
    }

    #[test]
    fn test_status_counts_excludes_transit() {
        let table = inventory();
        let all = status_counts(&table, None).unwrap();
        assert_eq!(all, StatusCounts { pending: 1, operational: 2, new: 1 });

        let cusco = status_counts(&table, Some("CUSCO - CUSCO")).unwrap();
        assert_eq!(cusco, StatusCounts { pending: 1, operational: 1, new: 0 });
    }

    #[test]
    fn test_status_counts_without_status_column() {
        let table = Table::from_text_rows(&[COL_DELEGATION], &[&["PUNO"]]);
        assert_eq!(status_counts(&table, None).unwrap(), StatusCounts::default());
    }

    #[test]
    fn test_status_counts_serialized_keys() {
        let counts = StatusCounts {
            pending: 0,
            operational: 1,
            new: 0,
        };
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Pendiente de Revisar":0,"Operativo":1,"Nuevo":0}"#);
    }

    #[test]
    fn test_location_counts_sentinel_is_case_sensitive() {
        let table = inventory();
        let counts = location_counts(&table, None).unwrap();

        // Lower-case "transito" survives the filter and is uppercased
        assert_eq!(counts.get("TRANSITO"), Some(&1));
        assert_eq!(counts.get("LIMA"), Some(&2));
        assert_eq!(counts.get("TACNA"), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 4);
    }

    #[test]
    fn test_location_counts_skip_blank_cells() {
        let table = Table::from_text_rows(
            &[COL_DELEGATION, COL_LOCATION],
            &[&["PUNO", ""], &["PUNO", "Juliaca"]],
        );
        let counts = location_counts(&table, None).unwrap();
        assert_eq!(counts.len(), 1);
        assert!(!counts.contains_key("NAN"));
        assert_eq!(counts.get("JULIACA"), Some(&1));
    }

    #[test]
    fn test_location_counts_without_column() {
        let table = Table::from_text_rows(&[COL_DELEGATION], &[&["PUNO"]]);
        assert!(location_counts(&table, None).unwrap().is_empty());
    }

    #[test]
    fn test_destination_counts_keeps_transit_rows() {
        let table = inventory();
        let counts = destination_counts(&table, None).unwrap();
        assert_eq!(counts.get("Almacén"), Some(&3));
        assert_eq!(counts.get("Taller"), Some(&2));
        assert_eq!(counts.len(), 2);

        let cusco = destination_counts(&table, Some("CUSCO - CUSCO")).unwrap();
        assert_eq!(cusco.get("Almacén"), Some(&2));
    }

    #[test]
    fn test_numeric_cells_counted_by_display_form() {
        let mut table = Table::new(vec![COL_DELEGATION.to_string(), COL_DESTINATION.to_string()]);
        table.push_row(vec![CellValue::text("PUNO"), CellValue::Number(101.0)]);
        table.push_row(vec![CellValue::text("PUNO"), CellValue::Number(101.0)]);

        let counts = destination_counts(&table, None).unwrap();
        assert_eq!(counts.get("101"), Some(&2));
    }

    #[test]
    fn test_queries_are_idempotent() {
        let table = inventory();
        assert_eq!(
            location_counts(&table, None).unwrap(),
            location_counts(&table, None).unwrap()
        );
        assert_eq!(
            status_counts(&table, Some("PUNO")).unwrap(),
            status_counts(&table, Some("PUNO")).unwrap()
        );
    }
}
