use std::path::Path;

use thiserror::Error;

use crate::storage::{StorageBackend, StorageError};

/// Column order of the export file. Matches the persisted column order of
/// the expenses table.
pub const EXPORT_HEADER: [&str; 6] = ["ID", "User ID", "Category", "Amount", "Date", "Description"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no expense records to export")]
    NoData,
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Writes every stored expense record, across all accounts, as CSV rows
/// under a fixed header. Returns `NoData` when the store holds no records;
/// the destination file is not created in that case.
pub fn export_all(storage: &dyn StorageBackend, path: &Path) -> Result<(), ExportError> {
    let records = storage.all_expenses()?;
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(EXPORT_HEADER)?;
    for record in &records {
        writer.write_record([
            record.id.to_string(),
            record.account_id.to_string(),
            record.category.clone(),
            record.amount.to_string(),
            record.date.clone(),
            record.description.clone(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(rows = records.len(), path = %path.display(), "expenses exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewExpense;
    use crate::storage::InMemoryStorage;

    fn expense(category: &str, amount: f64, description: &str) -> NewExpense {
        NewExpense {
            category: category.to_string(),
            amount,
            date: "2024-01-01".to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_empty_store_is_no_data() {
        let storage = InMemoryStorage::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let err = export_all(&storage, &path).unwrap_err();
        assert!(matches!(err, ExportError::NoData));
        assert!(!path.exists());
    }

    #[test]
    fn test_writes_header_and_one_row_per_record() {
        let storage = InMemoryStorage::new();
        storage.register("alice", "pw1").unwrap();
        storage.register("bob", "pw2").unwrap();
        let alice = storage.authenticate("alice", "pw1").unwrap().unwrap();
        let bob = storage.authenticate("bob", "pw2").unwrap().unwrap();
        storage
            .add_expense(alice, &expense("Food", 12.5, "lunch"))
            .unwrap();
        storage
            .add_expense(bob, &expense("Bills", 80.0, ""))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_all(&storage, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,User ID,Category,Amount,Date,Description");
        assert_eq!(lines[1], "1,1,Food,12.5,2024-01-01,lunch");
        assert_eq!(lines[2], "2,2,Bills,80,2024-01-01,");
    }

    #[test]
    fn test_embedded_commas_are_quoted() {
        let storage = InMemoryStorage::new();
        storage.register("alice", "pw1").unwrap();
        let alice = storage.authenticate("alice", "pw1").unwrap().unwrap();
        storage
            .add_expense(alice, &expense("Bills", 120.0, "rent, utilities"))
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_all(&storage, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"rent, utilities\""));
    }
}
