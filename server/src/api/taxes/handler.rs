//! Tax Registry API Handlers
//!
//! 税率变更只影响之后生成/重算的账单；已冻结的账单读自身快照。

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Tax, TaxCreate, TaxUpdate};
use crate::utils::AppResult;

/// GET /api/taxes - 获取所有税率
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Tax>>> {
    let taxes = state.taxes().find_all().await?;
    Ok(Json(taxes))
}

/// POST /api/taxes - 创建税率
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TaxCreate>,
) -> AppResult<Json<Tax>> {
    payload.validate()?;
    let tax = state.taxes().create(payload).await?;
    Ok(Json(tax))
}

/// PUT /api/taxes/:id - 更新税率
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<TaxUpdate>,
) -> AppResult<Json<Tax>> {
    payload.validate()?;
    let tax = state.taxes().update(&id, payload).await?;
    Ok(Json(tax))
}

/// DELETE /api/taxes/:id - 删除税率
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let result = state.taxes().delete(&id).await?;
    Ok(Json(result))
}
