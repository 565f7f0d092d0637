use std::sync::RwLock;

use thiserror::Error;

use crate::models::{Account, AccountId, ExpenseId, ExpenseRecord, NewExpense};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("username already exists: {0}")]
    DuplicateUsername(String),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Persistence seam between the core and its backends. Every operation is a
/// single synchronous request against the store; callers hold no session
/// state other than the account id they pass in.
pub trait StorageBackend: Send + Sync {
    /// Creates the account and expense tables when absent. Idempotent, safe
    /// to call on every startup.
    fn ensure_schema(&self) -> Result<(), StorageError>;

    /// Creates an account. `DuplicateUsername` is the only failure the
    /// caller can distinguish; everything else surfaces as a generic fault.
    fn register(&self, username: &str, password: &str) -> Result<(), StorageError>;

    /// Exact case-sensitive match on both fields. A non-match (wrong
    /// username, wrong password, empty input) is `Ok(None)`, not an error.
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountId>, StorageError>;

    /// Appends a record owned by `account_id`. Category, amount sign and
    /// date format are accepted as given; validation belongs to the caller.
    fn add_expense(
        &self,
        account_id: AccountId,
        expense: &NewExpense,
    ) -> Result<ExpenseId, StorageError>;

    /// Every record owned by `account_id`, ascending by id (insertion order).
    fn list_expenses(&self, account_id: AccountId) -> Result<Vec<ExpenseRecord>, StorageError>;

    /// Removes the record matching both ids. No-op when nothing matches, so
    /// a caller cannot delete another account's record by guessing its id.
    fn delete_expense(
        &self,
        account_id: AccountId,
        expense_id: ExpenseId,
    ) -> Result<(), StorageError>;

    /// Removes every record owned by `account_id`. No-op when there are none.
    fn delete_all_expenses(&self, account_id: AccountId) -> Result<(), StorageError>;

    /// Every record across all accounts, ascending by id. Feeds the exporter.
    fn all_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError>;
}

struct Inner {
    accounts: Vec<Account>,
    expenses: Vec<ExpenseRecord>,
    next_account_id: AccountId,
    next_expense_id: ExpenseId,
}

/// Backend holding everything in process memory. Same contract as the SQLite
/// backend; nothing survives the process, so it serves tests and dry runs.
pub struct InMemoryStorage {
    inner: RwLock<Inner>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                accounts: Vec::new(),
                expenses: Vec::new(),
                next_account_id: 1,
                next_expense_id: 1,
            }),
        }
    }
}

impl StorageBackend for InMemoryStorage {
    fn ensure_schema(&self) -> Result<(), StorageError> {
        // Nothing to create; the maps exist for the lifetime of the process.
        Ok(())
    }

    fn register(&self, username: &str, password: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write().unwrap();
        if inner.accounts.iter().any(|a| a.username == username) {
            return Err(StorageError::DuplicateUsername(username.to_string()));
        }
        let id = inner.next_account_id;
        inner.next_account_id += 1;
        inner.accounts.push(Account {
            id,
            username: username.to_string(),
            password: password.to_string(),
        });
        tracing::debug!(username, account_id = id, "account registered");
        Ok(())
    }

    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<AccountId>, StorageError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .map(|a| a.id))
    }

    fn add_expense(
        &self,
        account_id: AccountId,
        expense: &NewExpense,
    ) -> Result<ExpenseId, StorageError> {
        let mut inner = self.inner.write().unwrap();
        let id = inner.next_expense_id;
        inner.next_expense_id += 1;
        inner.expenses.push(ExpenseRecord {
            id,
            account_id,
            category: expense.category.clone(),
            amount: expense.amount,
            date: expense.date.clone(),
            description: expense.description.clone(),
        });
        tracing::debug!(account_id, expense_id = id, "expense added");
        Ok(id)
    }

    fn list_expenses(&self, account_id: AccountId) -> Result<Vec<ExpenseRecord>, StorageError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .expenses
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    fn delete_expense(
        &self,
        account_id: AccountId,
        expense_id: ExpenseId,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write().unwrap();
        inner
            .expenses
            .retain(|e| !(e.account_id == account_id && e.id == expense_id));
        Ok(())
    }

    fn delete_all_expenses(&self, account_id: AccountId) -> Result<(), StorageError> {
        let mut inner = self.inner.write().unwrap();
        inner.expenses.retain(|e| e.account_id != account_id);
        Ok(())
    }

    fn all_expenses(&self) -> Result<Vec<ExpenseRecord>, StorageError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.expenses.clone())
    }
}
