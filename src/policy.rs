//! Delegation allow-list
//!
//! Only rows belonging to one of the known regional delegations are ever
//! kept. The filter runs on every default load and every upload, never on
//! reads.

use crate::error::{InventoryError, Result};
use crate::table::{CellValue, Table, COL_DELEGATION};

/// Delegations accepted into the dataset
pub const ALLOWED_DELEGATIONS: [&str; 27] = [
    "AMAZONAS",
    "ANCASH - CHIMBOTE",
    "ANCASH - HUARAZ",
    "APURIMAC",
    "AREQUIPA",
    "AYACUCHO",
    "CAJAMARCA",
    "CUSCO - CUSCO",
    "CUSCO - MACHUPICCHU",
    "HUANUCO",
    "ICA - CHINCHA",
    "ICA - ICA",
    "JUNIN - CHANCHAMAYO",
    "JUNIN - HUANCAYO",
    "LA LIBERTAD",
    "LAMBAYEQUE",
    "LIMA NORTE - PROVINCIA",
    "LORETO",
    "MADRE DE DIOS",
    "MOQUEGUA",
    "PIURA - PIURA",
    "PIURA - TALARA",
    "PUNO",
    "SAN MARTIN",
    "TACNA",
    "TUMBES",
    "UCAYALI",
];

/// Whether `name` is an allowed delegation (exact match)
pub fn is_allowed(name: &str) -> bool {
    ALLOWED_DELEGATIONS.contains(&name)
}

/// Normalize the delegation column and drop rows outside the allow-list.
///
/// Every delegation cell is rendered as text and trimmed before the
/// membership test, so numeric or padded cells are compared the same way.
pub fn apply_allow_list(mut table: Table) -> Result<Table> {
    let idx = table
        .column_index(COL_DELEGATION)
        .ok_or_else(|| InventoryError::MissingColumn(COL_DELEGATION.to_string()))?;

    for row in table.rows_mut() {
        let trimmed = row[idx].to_string().trim().to_string();
        row[idx] = CellValue::Text(trimmed);
    }

    let before = table.len();
    table.retain(|row| row[idx].as_str().is_some_and(is_allowed));
    tracing::debug!(
        kept = table.len(),
        dropped = before - table.len(),
        "Applied delegation allow-list"
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;

    #[test]
    fn test_drops_unknown_delegations() {
        let table = Table::from_text_rows(
            &[COL_DELEGATION, "Estado"],
            &[&["CUSCO - CUSCO", "Operativo"], &["FAKE", "Nuevo"], &["", "Nuevo"]],
        );

        let filtered = apply_allow_list(table).unwrap();
        assert_eq!(filtered.len(), 1);
        assert!(filtered.rows()[0][0].is_text("CUSCO - CUSCO"));
    }

    #[test]
    fn test_trims_before_matching() {
        let table = Table::from_text_rows(&[COL_DELEGATION], &[&["  PUNO "], &["\tTACNA"]]);

        let filtered = apply_allow_list(table).unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.rows()[0][0].is_text("PUNO"));
        assert!(filtered.rows()[1][0].is_text("TACNA"));
    }

    #[test]
    fn test_case_sensitive_membership() {
        let table = Table::from_text_rows(&[COL_DELEGATION], &[&["puno"]]);
        assert!(apply_allow_list(table).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column() {
        let table = Table::from_text_rows(&["Estado"], &[&["Nuevo"]]);
        let err = apply_allow_list(table).unwrap_err();
        assert!(matches!(err, InventoryError::MissingColumn(ref c) if c == COL_DELEGATION));
    }

    #[test]
    fn test_numeric_delegation_dropped() {
        let mut table = Table::new(vec![COL_DELEGATION.to_string()]);
        table.push_row(vec![CellValue::Number(7.0)]);
        assert!(apply_allow_list(table).unwrap().is_empty());
    }

    fn delegation_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            select(ALLOWED_DELEGATIONS.to_vec()).prop_map(|s| s.to_string()),
            select(ALLOWED_DELEGATIONS.to_vec()).prop_map(|s| format!("  {} ", s)),
            "[A-Z ]{0,12}",
        ]
    }

    proptest! {
        #[test]
        fn test_filtered_rows_are_always_allowed(
            names in proptest::collection::vec(delegation_strategy(), 0..40)
        ) {
            let mut table = Table::new(vec![COL_DELEGATION.to_string()]);
            for name in &names {
                table.push_row(vec![CellValue::text(name.clone())]);
            }

            let filtered = apply_allow_list(table).unwrap();
            prop_assert!(filtered.len() <= names.len());
            for row in filtered.rows() {
                prop_assert!(row[0].as_str().is_some_and(is_allowed));
            }
        }
    }
}
