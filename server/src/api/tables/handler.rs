//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatusForce};
use crate::utils::{AppError, AppResult};

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.tables().find_all().await?;
    Ok(Json(tables))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let table = state
        .tables()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(Json(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    payload.validate()?;
    let table = state.tables().create(payload).await?;
    Ok(Json(table))
}

/// PUT /api/tables/:id - 更新桌台 (不触碰占用状态)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    payload.validate()?;
    let table = state.tables().update(&id, payload).await?;
    Ok(Json(table))
}

/// PATCH /api/tables/:id/status - 手动覆盖桌台状态
///
/// 占用状态平时由订单生命周期派生，这里是显式的人工覆盖入口
/// (例如预订、临时封桌)。
pub async fn force_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    user: CurrentUser,
    Json(payload): Json<TableStatusForce>,
) -> AppResult<Json<DiningTable>> {
    let table = state.tables().force_status(&id, payload.status).await?;
    tracing::info!(
        table_id = %id,
        status = payload.status.as_str(),
        user_id = %user.id,
        username = %user.username,
        "Table status manually overridden"
    );
    Ok(Json(table))
}

/// DELETE /api/tables/:id - 删除桌台 (软删除，有活跃订单时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let result = state.tables().delete(&id).await?;
    Ok(Json(result))
}
