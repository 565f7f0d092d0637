use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::{
    models::{AccountId, ExpenseId, ExpenseRecord, NewExpense},
    storage::{StorageBackend, StorageError},
};

const LIST_COLUMNS: &str = "id, account_id, category, amount, date, description";

/// SQLite-backed store. All access goes through one connection behind a
/// mutex; each operation is a single autocommitted statement.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| StorageError::Other(e.to_string()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| StorageError::Other(e.to_string()))?;

        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.ensure_schema()?;
        Ok(storage)
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
    })
}

impl StorageBackend for SqliteStorage {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE,
                password TEXT
            );

            CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER,
                category TEXT,
                amount REAL,
                date TEXT,
                description TEXT,
                FOREIGN KEY (account_id) REFERENCES accounts(id)
            );
            ",
        )
        .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(())
    }

    fn register(&self, username: &str, password: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        match conn.execute(
            "INSERT INTO accounts (username, password) VALUES (?1, ?2)",
            params![username, password],
        ) {
            Ok(_) => {
                tracing::debug!(username, "account registered");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateUsername(username.to_string()))
            }
            Err(e) => Err(StorageError::Other(e.to_string())),
        }
    }

    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountId>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let result: Result<AccountId, _> = conn.query_row(
            "SELECT id FROM accounts WHERE username = ?1 AND password = ?2",
            params![username, password],
            |row| row.get(0),
        );
        match result {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Other(e.to_string())),
        }
    }

    fn add_expense(
        &self,
        account_id: AccountId,
        expense: &NewExpense,
    ) -> Result<ExpenseId, StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO expenses (account_id, category, amount, date, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account_id,
                expense.category,
                expense.amount,
                expense.date,
                expense.description
            ],
        )
        .map_err(|e| StorageError::Other(e.to_string()))?;
        let id = conn.last_insert_rowid();
        tracing::debug!(account_id, expense_id = id, "expense added");
        Ok(id)
    }

    fn list_expenses(&self, account_id: AccountId) -> Result<Vec<ExpenseRecord>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {LIST_COLUMNS} FROM expenses WHERE account_id = ?1 ORDER BY id"
            ))
            .map_err(|e| StorageError::Other(e.to_string()))?;
        let records = stmt
            .query_map(params![account_id], row_to_record)
            .map_err(|e| StorageError::Other(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(records)
    }

    fn delete_expense(
        &self,
        account_id: AccountId,
        expense_id: ExpenseId,
    ) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM expenses WHERE account_id = ?1 AND id = ?2",
            params![account_id, expense_id],
        )
        .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(())
    }

    fn delete_all_expenses(&self, account_id: AccountId) -> Result<(), StorageError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM expenses WHERE account_id = ?1",
            params![account_id],
        )
        .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(())
    }

    fn all_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!("SELECT {LIST_COLUMNS} FROM expenses ORDER BY id"))
            .map_err(|e| StorageError::Other(e.to_string()))?;
        let records = stmt
            .query_map([], row_to_record)
            .map_err(|e| StorageError::Other(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(records)
    }
}
