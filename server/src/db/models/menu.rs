//! Menu Catalog Models (boundary collaborator)
//!
//! 菜单目录由外部系统维护；此处只定义下单时快照单价所需的最小结构。
//! 不提供菜单 CRUD 接口。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Menu item, only the fields the order path reads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub price: f64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

/// Menu item variant with its own price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuVariant {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub menu_item: RecordId,
    pub name: String,
    pub price: f64,
}

fn default_true() -> bool {
    true
}
