//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Table occupancy status
///
/// OCCUPIED is derived from the active-order count and only written inside
/// the same transaction as the order transition that changes it. RESERVED
/// and direct overrides go through the explicit force-status endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "AVAILABLE",
            TableStatus::Occupied => "OCCUPIED",
            TableStatus::Reserved => "RESERVED",
        }
    }
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Display number, unique
    pub name: String,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub floor: i32,
    /// Arbitrary position metadata for the floor-plan UI
    pub position: Option<serde_json::Value>,
    pub status: TableStatus,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableCreate {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    pub floor: Option<i32>,
    pub position: Option<serde_json::Value>,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Force-status payload (manual override, manager only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusForce {
    pub status: TableStatus,
}
