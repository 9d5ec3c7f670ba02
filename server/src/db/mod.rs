//! Database Module
//!
//! 嵌入式 SurrealDB (RocksDB 存储引擎) 的初始化与 schema 定义

pub mod models;
pub mod repository;

use crate::utils::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

const NAMESPACE: &str = "mesa";
const DATABASE: &str = "pos";

/// Database service owning the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the embedded database at `db_path` and apply schema
    pub async fn new(db_path: &Path) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;

        define_schema(&db).await?;

        tracing::info!(path = %db_path.display(), "Database connection established (SurrealDB RocksDB)");

        Ok(Self { db })
    }
}

/// Index definitions for the uniqueness the business rules rely on
pub async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        r#"
        DEFINE INDEX IF NOT EXISTS idx_table_name ON TABLE dining_table COLUMNS name UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_order_number ON TABLE order COLUMNS order_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_bill_number ON TABLE bill COLUMNS bill_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_order_table ON TABLE order COLUMNS dining_table;
        DEFINE INDEX IF NOT EXISTS idx_order_bill ON TABLE order COLUMNS bill;
        DEFINE INDEX IF NOT EXISTS idx_item_order ON TABLE order_item COLUMNS order_ref;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;
    Ok(())
}
