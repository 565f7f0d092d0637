pub type AccountId = i64;
pub type ExpenseId = i64;

/// Categories offered by the interactive front end. The store accepts any
/// string; this list is a presentation-layer convenience, not a store
/// invariant.
pub const CATEGORIES: &[&str] = &[
    "Food",
    "Clothes",
    "Travel",
    "Entertainment",
    "Bills",
    "Other",
];

/// A registered user identity. Usernames are unique and case-sensitive;
/// passwords are stored and compared verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password: String,
}

/// A single expense entry owned by exactly one account. Ids are assigned by
/// the store, monotonically increasing, and never reused after deletion.
/// `date` is opaque text (expected `YYYY-MM-DD`, validated by the caller).
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub account_id: AccountId,
    pub category: String,
    pub amount: f64,
    pub date: String,
    pub description: String,
}

/// Write command for [`crate::storage::StorageBackend::add_expense`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category: String,
    pub amount: f64,
    pub date: String,
    pub description: String,
}
