//! Tax Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Tax, TaxCreate, TaxUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "tax";

#[derive(Clone)]
pub struct TaxRepository {
    base: BaseRepository,
}

impl TaxRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all tax rows
    pub async fn find_all(&self) -> RepoResult<Vec<Tax>> {
        let taxes: Vec<Tax> = self
            .base
            .db()
            .query("SELECT * FROM tax ORDER BY name")
            .await?
            .take(0)?;
        Ok(taxes)
    }

    /// Find currently active tax rows, the bill computation input
    pub async fn find_active(&self) -> RepoResult<Vec<Tax>> {
        let taxes: Vec<Tax> = self
            .base
            .db()
            .query("SELECT * FROM tax WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(taxes)
    }

    /// Find tax by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Tax>> {
        let thing = parse_id(id, TABLE)?;
        let tax: Option<Tax> = self.base.db().select(thing).await?;
        Ok(tax)
    }

    /// Create a new tax row
    pub async fn create(&self, data: TaxCreate) -> RepoResult<Tax> {
        let now = now_millis();
        let tax = Tax {
            id: None,
            name: data.name,
            percentage: data.percentage,
            is_active: data.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let created: Option<Tax> = self.base.db().create(TABLE).content(tax).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create tax".to_string()))
    }

    /// Update a tax row. Never touches historical bills
    pub async fn update(&self, id: &str, data: TaxUpdate) -> RepoResult<Tax> {
        let thing = parse_id(id, TABLE)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Tax {} not found", id)))?;

        let name = data.name.unwrap_or(existing.name);
        let percentage = data.percentage.unwrap_or(existing.percentage);
        let is_active = data.is_active.unwrap_or(existing.is_active);

        self.base
            .db()
            .query("UPDATE $thing SET name = $name, percentage = $percentage, is_active = $is_active, updated_at = $now")
            .bind(("thing", thing))
            .bind(("name", name))
            .bind(("percentage", percentage))
            .bind(("is_active", is_active))
            .bind(("now", now_millis()))
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Tax {} not found", id)))
    }

    /// Hard delete a tax row
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id, TABLE)?;
        let existing: Option<Tax> = self.base.db().select(thing.clone()).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Tax {} not found", id)));
        }
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }
}
