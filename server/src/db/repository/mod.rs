//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

pub mod bill;
pub mod dining_table;
pub mod menu;
pub mod order;
pub mod tax;

// Re-exports
pub use bill::BillRepository;
pub use dining_table::DiningTableRepository;
pub use menu::MenuRepository;
pub use order::OrderRepository;
pub use tax::TaxRepository;

use crate::utils::AppError;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) | RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Map a raw SurrealDB error onto the API error type (for ad-hoc query paths)
pub fn surreal_err_to_app(err: surrealdb::Error) -> AppError {
    AppError::database(err.to_string())
}

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "order:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("order", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Parse a "table:id" string, rejecting ids that reference another table
pub fn parse_id(id: &str, table: &str) -> RepoResult<RecordId> {
    let thing: RecordId = id
        .parse()
        .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
    if thing.table() != table {
        return Err(RepoError::Validation(format!(
            "Expected {} ID, got: {}",
            table, id
        )));
    }
    Ok(thing)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Atomically increment and return the named sequence counter.
    ///
    /// Backs the sequential order/bill numbers; the UPSERT is a single
    /// statement, so concurrent callers never observe the same value.
    pub async fn next_sequence(&self, name: &str) -> RepoResult<i64> {
        #[derive(serde::Deserialize)]
        struct Counter {
            value: i64,
        }

        let counter_id = RecordId::from_table_key("counter", name);
        let mut result = self
            .db
            .query("UPSERT ONLY $counter SET value += 1 RETURN AFTER")
            .bind(("counter", counter_id))
            .await?;
        let counter: Option<Counter> = result.take(0)?;
        counter
            .map(|c| c.value)
            .ok_or_else(|| RepoError::Database(format!("Failed to advance sequence '{}'", name)))
    }
}
