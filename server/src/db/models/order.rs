//! Order Model
//!
//! 订单主表 + 订单明细 (order_item)，明细通过 `order` 字段引用主表。
//! 明细单价在下单时从菜单快照，之后不再读取实时菜单价格。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

// =============================================================================
// Order (主表)
// =============================================================================

/// Order lifecycle status
///
/// PENDING → PREPARING → READY → SERVED → COMPLETED (via payment only).
/// CANCELLED is reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// COMPLETED and CANCELLED accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Active = still occupying its table
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Explicit transition table for the status-update endpoint.
    ///
    /// COMPLETED is deliberately absent: it is only reachable through
    /// payment reconciliation, never through a direct status update.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Preparing) => true,
            (Preparing, Ready) => true,
            (Ready, Served) => true,
            (Pending | Preparing | Ready | Served, Cancelled) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Served => "SERVED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Service channel of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Sequential human-readable number, printed on receipts
    pub order_number: String,
    pub order_type: OrderType,
    /// Table reference (required iff DINE_IN)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub dining_table: Option<RecordId>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub note: Option<String>,
    pub status: OrderStatus,
    /// Bill this order is attached to (zero-or-one, never two)
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub bill: Option<RecordId>,
    pub created_at: i64,
    pub updated_at: i64,
}

// =============================================================================
// Order Item (明细)
// =============================================================================

/// Order line item with the unit price snapshotted at creation time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(rename = "order_ref", with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub menu_item: RecordId,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub variant: Option<RecordId>,
    pub name: String,
    pub variant_name: Option<String>,
    /// Captured unit price (snapshot, NOT a live menu reference)
    pub price: f64,
    pub quantity: i32,
    pub note: Option<String>,
}

// =============================================================================
// API Request Types
// =============================================================================

/// Line item in an order-create payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemCreate {
    pub menu_item: String,
    pub variant: Option<String>,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub order_type: OrderType,
    pub table_id: Option<String>,
    #[validate(length(max = 100))]
    pub customer_name: Option<String>,
    #[validate(length(max = 30))]
    pub customer_phone: Option<String>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemCreate>,
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Order with items and derived total (for detail views and bill payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    /// Sum of item.price * item.quantity, always derived, never stored
    pub total: f64,
    pub table_name: Option<String>,
}
