//! Statistics API Handlers
//!
//! 报表只统计已完成支付的账单，按 paid_at 落在查询区间内筛选。
//! 拆分支付 (CASH_UPI) 在支付方式报表里按明细拆成现金/UPI 两份；
//! 明细缺失或损坏时回退到合并的 CASH_UPI 桶，读路径绝不报错。

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::ServerState;
use crate::db::models::{Bill, PaymentMode, PaymentStatus, SplitPaymentDetails};
use crate::money;
use crate::utils::AppResult;
use crate::utils::time::{day_end_millis, day_start_millis, millis_to_date_string, parse_date};

// ============================================================================
// Query / Response Types
// ============================================================================

/// 日期范围查询参数 (缺省为当天)
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Daily sales aggregate row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySalesRow {
    pub date: String,
    pub bill_count: i64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub discount: f64,
    pub total_amount: f64,
}

/// Item sales aggregate row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSalesRow {
    pub name: String,
    pub variant_name: Option<String>,
    pub quantity_sold: i64,
    pub revenue: f64,
}

/// Payment mode aggregate row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentModeRow {
    pub mode: String,
    pub bill_count: i64,
    pub amount: f64,
}

fn resolve_range(query: &DateRangeQuery) -> AppResult<(i64, i64)> {
    let today = chrono::Utc::now().date_naive();
    let start = match &query.start_date {
        Some(d) => parse_date(d)?,
        None => today,
    };
    let end = match &query.end_date {
        Some(d) => parse_date(d)?,
        None => today,
    };
    Ok((day_start_millis(start), day_end_millis(end)))
}

async fn completed_bills_in_range(
    state: &ServerState,
    start: i64,
    end: i64,
) -> AppResult<Vec<Bill>> {
    let mut result = state
        .db
        .query(
            "SELECT * FROM bill WHERE payment_status = 'COMPLETED' AND paid_at >= $start AND paid_at < $end",
        )
        .bind(("start", start))
        .bind(("end", end))
        .await
        .map_err(crate::db::repository::surreal_err_to_app)?;
    let bills: Vec<Bill> = result
        .take(0)
        .map_err(crate::db::repository::surreal_err_to_app)?;
    Ok(bills)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/statistics/daily-sales - 按日汇总已结账单
pub async fn daily_sales(
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<DailySalesRow>>> {
    let (start, end) = resolve_range(&query)?;
    let bills = completed_bills_in_range(&state, start, end).await?;

    let mut days: BTreeMap<String, DailySalesRow> = BTreeMap::new();
    for bill in &bills {
        let date = millis_to_date_string(bill.paid_at.unwrap_or(bill.created_at));
        let row = days.entry(date.clone()).or_insert_with(|| DailySalesRow {
            date,
            bill_count: 0,
            subtotal: 0.0,
            tax_amount: 0.0,
            discount: 0.0,
            total_amount: 0.0,
        });
        row.bill_count += 1;
        row.subtotal = round2(row.subtotal + bill.subtotal);
        row.tax_amount = round2(row.tax_amount + bill.tax_amount);
        row.discount = round2(row.discount + bill.discount);
        row.total_amount = round2(row.total_amount + bill.total_amount);
    }

    Ok(Json(days.into_values().collect()))
}

/// GET /api/statistics/item-sales - 按菜品/规格汇总销量与营收
pub async fn item_sales(
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<ItemSalesRow>>> {
    let (start, end) = resolve_range(&query)?;

    // 通过 order_ref.bill 的记录链接直接下钻到账单的支付状态
    let mut result = state
        .db
        .query(
            r#"
            SELECT name, variant_name,
                   math::sum(quantity) AS quantity_sold,
                   math::sum(price * quantity) AS revenue
            FROM order_item
            WHERE order_ref.bill.payment_status = 'COMPLETED'
              AND order_ref.bill.paid_at >= $start
              AND order_ref.bill.paid_at < $end
            GROUP BY name, variant_name
            "#,
        )
        .bind(("start", start))
        .bind(("end", end))
        .await
        .map_err(crate::db::repository::surreal_err_to_app)?;
    let mut rows: Vec<ItemSalesRow> = result
        .take(0)
        .map_err(crate::db::repository::surreal_err_to_app)?;

    rows.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for row in &mut rows {
        row.revenue = round2(row.revenue);
    }
    Ok(Json(rows))
}

/// GET /api/statistics/payment-modes - 支付方式汇总
pub async fn payment_modes(
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<PaymentModeRow>>> {
    let (start, end) = resolve_range(&query)?;
    let bills = completed_bills_in_range(&state, start, end).await?;
    Ok(Json(payment_buckets(&bills)))
}

// ============================================================================
// Aggregation helpers
// ============================================================================

pub(crate) fn round2(value: f64) -> f64 {
    money::to_f64(money::to_decimal(value))
}

/// Fold completed bills into per-mode buckets.
///
/// CASH_UPI bills contribute their cash part to CASH and their UPI part to
/// UPI when the stored split details parse; otherwise the whole amount lands
/// in a combined CASH_UPI bucket.
pub(crate) fn payment_buckets(bills: &[Bill]) -> Vec<PaymentModeRow> {
    let mut buckets: BTreeMap<&'static str, PaymentModeRow> = BTreeMap::new();

    let mut add = |buckets: &mut BTreeMap<&'static str, PaymentModeRow>,
                   mode: &'static str,
                   count: i64,
                   amount: f64| {
        let row = buckets.entry(mode).or_insert_with(|| PaymentModeRow {
            mode: mode.to_string(),
            bill_count: 0,
            amount: 0.0,
        });
        row.bill_count += count;
        row.amount = round2(row.amount + amount);
    };

    for bill in bills {
        if bill.payment_status != PaymentStatus::Completed {
            continue;
        }
        match bill.payment_mode {
            Some(PaymentMode::Cash) => add(&mut buckets, "CASH", 1, bill.total_amount),
            Some(PaymentMode::Upi) => add(&mut buckets, "UPI", 1, bill.total_amount),
            Some(PaymentMode::Card) => add(&mut buckets, "CARD", 1, bill.total_amount),
            Some(PaymentMode::CashUpi) => match parse_split_details(bill) {
                Some(details) => {
                    add(&mut buckets, "CASH", 1, details.cash);
                    add(&mut buckets, "UPI", 0, details.upi);
                }
                None => {
                    tracing::warn!(
                        bill_number = %bill.bill_number,
                        "Unreadable split payment details, using combined bucket"
                    );
                    add(&mut buckets, "CASH_UPI", 1, bill.total_amount);
                }
            },
            None => {}
        }
    }

    buckets.into_values().collect()
}

fn parse_split_details(bill: &Bill) -> Option<SplitPaymentDetails> {
    let raw = bill.payment_details.as_deref()?;
    serde_json::from_str(raw).ok()
}
