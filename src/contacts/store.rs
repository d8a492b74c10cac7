//! Contact store - the session's ordered collection of members.
//!
//! Two dedup policies live here and they differ on purpose:
//! - `import_bulk` keeps the FIRST record per id (a re-upload never clobbers
//!   records already in the store)
//! - `dedup_keep_last` keeps the LAST record per id (manual adds and edits
//!   override imported data)
//!
//! CHANGELOG:
//! - 02/20/2026 - A rename onto a later record's ID moves the edit last
//! - 02/18/2026 - Import summary reports duplicates and skipped rows
//! - 02/16/2026 - Standing keep-last cleanup pass
//! - 02/14/2026 - Initial store with import/add/update/delete/search

use super::phone::normalize_phone;
use super::sheet::Sheet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Columns an imported sheet must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["ID", "Name", "Phone"];

/// Errors from store mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Sheet must contain ID, Name, Phone columns (missing: {})", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Invalid record: {0}")]
    Validation(String),

    #[error("No member with ID '{0}'")]
    NotFound(String),
}

/// One member row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
}

impl ContactRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
        }
    }

    fn matches(&self, needle_lower: &str) -> bool {
        self.id.to_lowercase().contains(needle_lower)
            || self.name.to_lowercase().contains(needle_lower)
            || self.phone.to_lowercase().contains(needle_lower)
    }
}

/// Field changes for `ContactStore::update`. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// New rows retained in the store.
    pub added: usize,
    /// New rows dropped because their ID was already present.
    pub duplicates: usize,
    /// Blank rows and rows without an ID.
    pub skipped: usize,
    /// Store size after the import.
    pub total: usize,
}

/// Ordered in-memory member collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactStore {
    records: Vec<ContactRecord>,
}

impl ContactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in current order.
    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The effective record for an id (last occurrence).
    pub fn get(&self, id: &str) -> Option<&ContactRecord> {
        self.records.iter().rev().find(|r| r.id == id)
    }

    /// Merge a sheet into the store.
    ///
    /// Rejects the whole sheet if a required column is missing. Otherwise
    /// appends the normalized rows after the existing records and keeps the
    /// first record seen for each id.
    pub fn import_bulk(&mut self, sheet: &Sheet) -> Result<ImportSummary, StoreError> {
        let (Some(id_col), Some(name_col), Some(phone_col)) =
            (sheet.column("ID"), sheet.column("Name"), sheet.column("Phone"))
        else {
            let missing: Vec<String> = REQUIRED_COLUMNS
                .iter()
                .filter(|col| sheet.column(col).is_none())
                .map(|col| col.to_string())
                .collect();
            tracing::warn!(?missing, headers = ?sheet.headers, "sheet rejected");
            return Err(StoreError::Schema { missing });
        };

        let mut summary = ImportSummary::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<ContactRecord> = Vec::with_capacity(self.records.len() + sheet.rows.len());

        for record in self.records.drain(..) {
            if seen.insert(record.id.clone()) {
                merged.push(record);
            }
        }

        for row in 0..sheet.rows.len() {
            let id = sheet.cell(row, id_col).trim();
            if id.is_empty() {
                summary.skipped += 1;
                continue;
            }
            if !seen.insert(id.to_string()) {
                summary.duplicates += 1;
                continue;
            }
            merged.push(ContactRecord {
                id: id.to_string(),
                name: sheet.cell(row, name_col).trim().to_string(),
                phone: normalize_phone(sheet.cell(row, phone_col)),
            });
            summary.added += 1;
        }

        self.records = merged;
        summary.total = self.records.len();

        tracing::info!(
            added = summary.added,
            duplicates = summary.duplicates,
            skipped = summary.skipped,
            total = summary.total,
            "sheet imported"
        );
        Ok(summary)
    }

    /// Append one record. No dedup here; the standing cleanup resolves it.
    pub fn add(&mut self, record: ContactRecord) -> Result<(), StoreError> {
        let id = record.id.trim();
        if id.is_empty() {
            return Err(StoreError::Validation("ID must not be empty".to_string()));
        }

        let record = ContactRecord {
            id: id.to_string(),
            name: record.name.trim().to_string(),
            phone: normalize_phone(&record.phone),
        };
        tracing::debug!(id = %record.id, "member added");
        self.records.push(record);
        Ok(())
    }

    /// Change fields of the effective record for `id`.
    pub fn update(&mut self, id: &str, update: RecordUpdate) -> Result<(), StoreError> {
        let new_id = match update.id {
            Some(new_id) => {
                let new_id = new_id.trim().to_string();
                if new_id.is_empty() {
                    return Err(StoreError::Validation("ID must not be empty".to_string()));
                }
                Some(new_id)
            }
            None => None,
        };

        let index = self
            .records
            .iter()
            .rposition(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let record = &mut self.records[index];
        if let Some(new_id) = new_id {
            record.id = new_id;
        }
        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            record.phone = normalize_phone(&phone);
        }

        // Renamed onto an ID held later in the list: move to the end so the
        // keep-last cleanup keeps the edit.
        let new_id = record.id.clone();
        let taken_later = self.records[index + 1..].iter().any(|r| r.id == new_id);
        if taken_later {
            let edited = self.records.remove(index);
            self.records.push(edited);
        }

        tracing::debug!(id, new_id = %new_id, moved = taken_later, "member updated");
        Ok(())
    }

    /// Remove every record with `id`. Missing ids are not an error.
    pub fn delete(&mut self, id: &str) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = before - self.records.len();
        tracing::debug!(id, removed, "member delete");
        removed
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Collapse duplicate ids to their last occurrence, survivors keep order.
    ///
    /// Returns how many records were dropped.
    pub fn dedup_keep_last(&mut self) -> usize {
        let before = self.records.len();
        let mut seen: HashSet<String> = HashSet::with_capacity(before);
        let mut kept: Vec<ContactRecord> = Vec::with_capacity(before);

        for record in self.records.drain(..).rev() {
            if seen.insert(record.id.clone()) {
                kept.push(record);
            }
        }
        kept.reverse();
        self.records = kept;

        let dropped = before - self.records.len();
        if dropped > 0 {
            tracing::debug!(dropped, "duplicate IDs collapsed");
        }
        dropped
    }

    /// Case-insensitive substring search over id, name and phone.
    ///
    /// An empty term returns every record.
    pub fn search(&self, term: &str) -> Vec<&ContactRecord> {
        self.search_with_positions(term)
            .into_iter()
            .map(|(_, r)| r)
            .collect()
    }

    /// `search`, keeping each match's 0-based index in the store.
    pub fn search_with_positions(&self, term: &str) -> Vec<(usize, &ContactRecord)> {
        let needle = term.to_lowercase();
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| needle.is_empty() || r.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[[&str; 3]]) -> Sheet {
        Sheet::new(
            ["ID", "Name", "Phone"],
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect::<Vec<String>>())
                .collect::<Vec<_>>(),
        )
    }

    fn ids(store: &ContactStore) -> Vec<&str> {
        store.records().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_import_normalizes_phones() {
        let mut store = ContactStore::new();
        let summary = store
            .import_bulk(&sheet(&[["1", "Asha", "9876543210"], ["2", "Ravi", "+14155551234"]]))
            .unwrap();
        assert_eq!(summary.added, 2);
        assert_eq!(store.get("1").unwrap().phone, "+919876543210");
        assert_eq!(store.get("2").unwrap().phone, "+14155551234");
    }

    #[test]
    fn test_import_missing_column_leaves_store_unchanged() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        let before = store.clone();

        let bad = Sheet::new(["ID", "Name"], vec![vec!["2".to_string(), "Ravi".to_string()]]);
        let err = store.import_bulk(&bad).unwrap_err();
        assert_eq!(
            err,
            StoreError::Schema {
                missing: vec!["Phone".to_string()]
            }
        );
        assert_eq!(store, before);
    }

    #[test]
    fn test_import_ignores_extra_columns() {
        let extra = Sheet::new(
            ["Phone", "Batch", "Name", "ID"],
            vec![vec![
                "9876543210".to_string(),
                "A".to_string(),
                "Asha".to_string(),
                "7".to_string(),
            ]],
        );
        let mut store = ContactStore::new();
        store.import_bulk(&extra).unwrap();
        assert_eq!(store.records(), &[ContactRecord::new("7", "Asha", "+919876543210")]);
    }

    #[test]
    fn test_import_first_wins() {
        let mut store = ContactStore::new();
        store.import_bulk(&sheet(&[["1", "Asha", "9876543210"]])).unwrap();

        let summary = store
            .import_bulk(&sheet(&[
                ["1", "Asha Updated", "9000000000"],
                ["2", "Ravi", "9876500000"],
                ["2", "Ravi Again", "9876500001"],
            ]))
            .unwrap();

        assert_eq!(summary.added, 1);
        assert_eq!(summary.duplicates, 2);
        assert_eq!(summary.total, 2);
        assert_eq!(store.get("1").unwrap().name, "Asha");
        assert_eq!(store.get("2").unwrap().name, "Ravi");
    }

    #[test]
    fn test_import_then_edit_then_cleanup_keeps_edit() {
        let mut store = ContactStore::new();
        store.import_bulk(&sheet(&[["1", "Asha", "9876543210"]])).unwrap();
        store
            .import_bulk(&sheet(&[["1", "Imported Again", "9876543210"]]))
            .unwrap();
        assert_eq!(store.get("1").unwrap().name, "Asha");

        // Manual re-add of the same ID overrides after cleanup
        store.add(ContactRecord::new("1", "Asha Edited", "9876543211")).unwrap();
        assert_eq!(store.len(), 2);
        store.dedup_keep_last();
        assert_eq!(store.records(), &[ContactRecord::new("1", "Asha Edited", "+919876543211")]);
    }

    #[test]
    fn test_import_skips_rows_without_id() {
        let mut store = ContactStore::new();
        let summary = store
            .import_bulk(&sheet(&[["", "Nobody", "9876543210"], ["  ", "", ""], ["3", "Meera", "12345"]]))
            .unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.added, 1);
        assert_eq!(ids(&store), vec!["3"]);
    }

    #[test]
    fn test_add_rejects_empty_id() {
        let mut store = ContactStore::new();
        let err = store.add(ContactRecord::new("  ", "Asha", "9876543210")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_does_not_dedup() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        store.add(ContactRecord::new("1", "Asha 2", "9876543210")).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1").unwrap().name, "Asha 2");
    }

    #[test]
    fn test_update_renormalizes_phone_and_renames_id() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        store
            .update(
                "1",
                RecordUpdate {
                    id: Some("10".to_string()),
                    name: None,
                    phone: Some("919812345678".to_string()),
                },
            )
            .unwrap();
        assert!(store.get("1").is_none());
        assert_eq!(store.get("10").unwrap(), &ContactRecord::new("10", "Asha", "+919812345678"));
    }

    #[test]
    fn test_rename_onto_later_id_survives_cleanup() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        store.add(ContactRecord::new("2", "Ravi", "9123456789")).unwrap();
        store.add(ContactRecord::new("3", "Meera", "9000000000")).unwrap();

        store
            .update(
                "1",
                RecordUpdate {
                    id: Some("2".to_string()),
                    name: Some("Asha Edited".to_string()),
                    phone: None,
                },
            )
            .unwrap();
        assert_eq!(store.dedup_keep_last(), 1);

        assert_eq!(ids(&store), vec!["3", "2"]);
        assert_eq!(store.get("2").unwrap().name, "Asha Edited");
    }

    #[test]
    fn test_rename_to_free_id_keeps_position() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        store.add(ContactRecord::new("2", "Ravi", "9123456789")).unwrap();
        store
            .update(
                "1",
                RecordUpdate {
                    id: Some("7".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(ids(&store), vec!["7", "2"]);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let mut store = ContactStore::new();
        let err = store.update("404", RecordUpdate::default()).unwrap_err();
        assert_eq!(err, StoreError::NotFound("404".to_string()));
    }

    #[test]
    fn test_update_rejects_empty_new_id() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        let err = store
            .update(
                "1",
                RecordUpdate {
                    id: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get("1").unwrap().name, "Asha");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        let before = store.clone();
        assert_eq!(store.delete("404"), 0);
        assert_eq!(store, before);
        assert_eq!(store.delete("1"), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_dedup_keep_last_order() {
        let mut store = ContactStore::new();
        for (id, name) in [("a", "A1"), ("b", "B1"), ("a", "A2"), ("c", "C1"), ("b", "B2")] {
            store.add(ContactRecord::new(id, name, "")).unwrap();
        }
        assert_eq!(store.dedup_keep_last(), 2);
        let names: Vec<&str> = store.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "C1", "B2"]);
    }

    #[test]
    fn test_search_empty_returns_all_in_order() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("2", "Ravi", "9876500000")).unwrap();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        let all: Vec<&str> = store.search("").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(all, vec!["2", "1"]);
    }

    #[test]
    fn test_search_case_insensitive_across_fields() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("A-7", "Asha", "9876543210")).unwrap();
        store.add(ContactRecord::new("8", "Ravi", "9123456789")).unwrap();

        assert_eq!(store.search("asha").len(), 1);
        assert_eq!(store.search("a-7")[0].name, "Asha");
        assert_eq!(store.search("+9191234")[0].id, "8");
        // "a" hits Asha's id/name and Ravi's name
        assert_eq!(store.search("A").len(), 2);
        assert!(store.search("zzz").is_empty());
    }

    #[test]
    fn test_search_is_literal() {
        let mut store = ContactStore::new();
        store.add(ContactRecord::new("1", "Asha", "9876543210")).unwrap();
        assert!(store.search(".*").is_empty());
    }
}
