//! Bill Model
//!
//! 账单聚合一个或多个订单。金额在生成/更新时整体重算后冻结，
//! 税费明细 (tax_lines) 在计算时快照，收据渲染不再读取实时税率配置。

use super::order::OrderDetail;
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Bill payment lifecycle. COMPLETED exactly once, irreversibly
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
        }
    }
}

/// How a bill was settled. CASH_UPI is the split indicator and requires
/// a [`SplitPaymentDetails`] whose sum matches the bill total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    Upi,
    Card,
    CashUpi,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Upi => "UPI",
            PaymentMode::Card => "CARD",
            PaymentMode::CashUpi => "CASH_UPI",
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, PaymentMode::CashUpi)
    }
}

/// Per-tax snapshot line captured at bill computation time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxLine {
    pub name: String,
    /// Percentage rate at computation time
    pub rate: f64,
    pub amount: f64,
}

/// Bill entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Sequential bill number, printed on receipts
    pub bill_number: String,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount: f64,
    /// Invariant: total_amount = subtotal + tax_amount - discount
    pub total_amount: f64,
    /// Snapshot of the active tax breakdown at generation/update time
    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,
    pub payment_mode: Option<PaymentMode>,
    /// Serialized split-payment record (JSON string), null for single modes
    pub payment_details: Option<String>,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<i64>,
    /// Issuing user
    pub user_id: String,
    pub user_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Structured split-payment record (cash + UPI)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitPaymentDetails {
    pub cash: f64,
    pub upi: f64,
}

// =============================================================================
// API Request Types
// =============================================================================

/// Bill generation payload, exactly one of `table_id` / `order_id`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BillGenerateRequest {
    pub table_id: Option<String>,
    pub order_id: Option<String>,
    /// Absolute currency amount, not a percentage
    pub discount: Option<f64>,
}

/// Payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_mode: PaymentMode,
    /// Required for CASH_UPI; ignored otherwise
    pub payment_details: Option<SplitPaymentDetails>,
}

/// Bill list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct BillListQuery {
    pub payment_status: Option<PaymentStatus>,
    /// YYYY-MM-DD, inclusive
    pub start_date: Option<String>,
    /// YYYY-MM-DD, inclusive
    pub end_date: Option<String>,
}

// =============================================================================
// API Response Types
// =============================================================================

/// Bill with all attached orders, their items and table detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDetail {
    #[serde(flatten)]
    pub bill: Bill,
    pub orders: Vec<OrderDetail>,
}

/// Receipt item line (flattened across the bill's orders)
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub line_total: f64,
}

/// Formatted receipt view, a pure read over the bill's frozen snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptView {
    pub store_name: String,
    pub bill_number: String,
    pub order_numbers: Vec<String>,
    pub table_name: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: f64,
    /// Tax breakdown by named tax, as snapshotted at billing time
    pub tax_lines: Vec<TaxLine>,
    pub tax_amount: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub payment_mode: Option<PaymentMode>,
    pub paid_at: Option<i64>,
    pub issued_by: String,
    pub created_at: i64,
}
