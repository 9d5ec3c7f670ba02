//! Tax Model
//!
//! 命名税率行，可独立启用/停用。账单税率 = 所有启用行的百分比之和，
//! 每次计算时取当前配置；修改配置不回写历史账单。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Named percentage tax entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tax {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: String,
    pub percentage: f64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create tax payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaxCreate {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: f64,
    pub is_active: Option<bool>,
}

/// Update tax payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaxUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
