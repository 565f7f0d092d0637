//! Data-access and aggregation core for a personal expense tracker.
//!
//! Persistence sits behind [`storage::StorageBackend`], implemented by
//! [`sqlite_storage::SqliteStorage`] (production) and
//! [`storage::InMemoryStorage`]. [`aggregate::aggregate_by_category`] feeds
//! the category breakdown view; [`export::export_all`] dumps every stored
//! record to CSV. The binary in `main.rs` is the presentation adapter and
//! owns all input validation and rendering.

pub mod aggregate;
pub mod config;
pub mod export;
pub mod models;
pub mod sqlite_storage;
pub mod storage;
