//! Billing API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::billing::{BillingEngine, render_receipt};
use crate::core::ServerState;
use crate::db::models::{Bill, BillDetail, BillGenerateRequest, BillListQuery, PaymentRequest, ReceiptView};
use crate::utils::AppResult;
use crate::utils::time::{day_end_millis, day_start_millis, parse_date};

/// POST /api/billing/generate - 生成或合并账单
pub async fn generate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BillGenerateRequest>,
) -> AppResult<Json<BillDetail>> {
    let engine = BillingEngine::new(state.db.clone());
    let detail = engine.generate(&payload, &user).await?;

    tracing::info!(
        bill_number = %detail.bill.bill_number,
        total_amount = detail.bill.total_amount,
        issued_by = %user.username,
        "Bill generated"
    );
    Ok(Json(detail))
}

/// GET /api/billing - 账单列表 (按支付状态 / 日期范围过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<BillListQuery>,
) -> AppResult<Json<Vec<Bill>>> {
    let start = match &query.start_date {
        Some(d) => Some(day_start_millis(parse_date(d)?)),
        None => None,
    };
    let end = match &query.end_date {
        Some(d) => Some(day_end_millis(parse_date(d)?)),
        None => None,
    };

    let bills = state
        .bills()
        .find_all(query.payment_status, start, end)
        .await?;
    Ok(Json(bills))
}

/// GET /api/billing/:id - 账单详情 (含全部挂接订单)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BillDetail>> {
    let engine = BillingEngine::new(state.db.clone());
    let bill_id = state.bills().parse(&id)?;
    let detail = engine.detail(&bill_id).await?;
    Ok(Json(detail))
}

/// POST /api/billing/:id/payment - 登记支付
pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<BillDetail>> {
    let engine = BillingEngine::new(state.db.clone());
    let bill_id = state.bills().parse(&id)?;
    let detail = engine.pay(&bill_id, &payload).await?;
    Ok(Json(detail))
}

/// GET /api/billing/:id/receipt - 渲染收据 (读冻结快照)
pub async fn receipt(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReceiptView>> {
    let engine = BillingEngine::new(state.db.clone());
    let bill_id = state.bills().parse(&id)?;
    let detail = engine.detail(&bill_id).await?;
    Ok(Json(render_receipt(&detail, &state.config.store_name)))
}
