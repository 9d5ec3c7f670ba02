//! Menu Catalog Repository (read-only boundary)
//!
//! 只读：下单时解析菜单项/规格并快照单价。菜单维护属于外部系统。

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{MenuItem, MenuVariant};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct MenuRepository {
    base: BaseRepository,
}

/// Resolved price snapshot for one order line
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    pub item: MenuItem,
    pub variant: Option<MenuVariant>,
}

impl PriceSnapshot {
    /// Variant price wins over the base item price when a variant is chosen
    pub fn unit_price(&self) -> f64 {
        self.variant
            .as_ref()
            .map(|v| v.price)
            .unwrap_or(self.item.price)
    }
}

impl MenuRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Resolve a menu item (and optional variant) for price capture
    pub async fn resolve(
        &self,
        menu_item_id: &str,
        variant_id: Option<&str>,
    ) -> RepoResult<PriceSnapshot> {
        let item_thing = parse_id(menu_item_id, "menu_item")?;
        let item: Option<MenuItem> = self.base.db().select(item_thing.clone()).await?;
        let item = item.ok_or_else(|| {
            RepoError::NotFound(format!("Menu item {} not found", menu_item_id))
        })?;

        let variant = match variant_id {
            Some(vid) => {
                let variant_thing = parse_id(vid, "menu_variant")?;
                let variant: Option<MenuVariant> =
                    self.base.db().select(variant_thing).await?;
                let variant = variant.ok_or_else(|| {
                    RepoError::NotFound(format!("Menu variant {} not found", vid))
                })?;
                if variant.menu_item != item_thing {
                    return Err(RepoError::Validation(format!(
                        "Variant {} does not belong to menu item {}",
                        vid, menu_item_id
                    )));
                }
                Some(variant)
            }
            None => None,
        };

        Ok(PriceSnapshot { item, variant })
    }
}
