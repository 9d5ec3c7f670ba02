//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::{Capability, CurrentUser};
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderDetail, OrderStatus, OrderStatusUpdate, OrderType};
use crate::db::repository::order::{NewOrder, NewOrderItem};
use crate::db::repository::parse_id;
use crate::money;
use crate::utils::{AppError, AppResult};

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<String>,
}

/// GET /api/orders - 订单列表 (可按状态/桌台过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let table = match &query.table_id {
        Some(id) => Some(parse_id(id, "dining_table")?),
        None => None,
    };
    let orders = state.orders().find_all(query.status, table).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 订单详情 (含明细与派生总额)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let order_id = state.orders().parse(&id)?;
    let detail = state
        .orders()
        .detail(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(detail))
}

/// POST /api/orders - 下单
///
/// 每个明细的单价在此刻从菜单快照；桌台在同一事务内转为 OCCUPIED。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    payload.validate()?;

    // DINE_IN 必须带桌台，其余渠道不得带
    let dining_table = match (payload.order_type, &payload.table_id) {
        (OrderType::DineIn, Some(table_id)) => {
            let table = parse_id(table_id, "dining_table")?;
            let existing = state.tables().find_by_id(table_id).await?;
            let existing =
                existing.ok_or_else(|| AppError::not_found(format!("Table {} not found", table_id)))?;
            if !existing.is_active {
                return Err(AppError::validation(format!(
                    "Table '{}' is not active",
                    existing.name
                )));
            }
            Some(table)
        }
        (OrderType::DineIn, None) => {
            return Err(AppError::validation("Dine-in orders require a table_id"));
        }
        (_, Some(_)) => {
            return Err(AppError::validation(
                "table_id is only valid for dine-in orders",
            ));
        }
        (_, None) => None,
    };

    // 逐项解析菜单并快照单价
    let menu = state.menu();
    let mut items = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        money::validate_quantity(line.quantity)?;
        let snapshot = menu.resolve(&line.menu_item, line.variant.as_deref()).await?;
        if !snapshot.item.is_active {
            return Err(AppError::validation(format!(
                "Menu item '{}' is not available",
                snapshot.item.name
            )));
        }
        let price = snapshot.unit_price();
        money::validate_unit_price(price)?;

        items.push(NewOrderItem {
            menu_item: parse_id(&line.menu_item, "menu_item")?,
            variant: match &line.variant {
                Some(v) => Some(parse_id(v, "menu_variant")?),
                None => None,
            },
            name: snapshot.item.name.clone(),
            variant_name: snapshot.variant.as_ref().map(|v| v.name.clone()),
            price,
            quantity: line.quantity,
            note: line.note.clone(),
        });
    }

    let order = state
        .orders()
        .create(
            NewOrder {
                order_type: payload.order_type,
                dining_table,
                customer_name: payload.customer_name,
                customer_phone: payload.customer_phone,
                note: payload.note,
            },
            items,
        )
        .await?;

    let order_id = order
        .id
        .ok_or_else(|| AppError::internal("Created order has no id"))?;
    let detail = state
        .orders()
        .detail(&order_id)
        .await?
        .ok_or_else(|| AppError::internal("Created order vanished"))?;

    tracing::info!(order_number = %detail.order.order_number, "Order created");
    Ok(Json(detail))
}

/// PATCH /api/orders/:id/status - 驱动状态流转
///
/// COMPLETED 不在可达集合内 (只能经支付产生)；
/// 转 CANCELLED 需要作废能力。
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    if payload.status == OrderStatus::Cancelled && !user.has_capability(Capability::VoidOrders) {
        return Err(AppError::forbidden("Cancelling orders requires void capability"));
    }

    let order_id = state.orders().parse(&id)?;
    let order = state.orders().update_status(&order_id, payload.status).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/:id - 删除订单及其明细
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let order_id = state.orders().parse(&id)?;
    let result = state.orders().delete(&order_id).await?;
    Ok(Json(result))
}

/// DELETE /api/orders/:id/items/:item_id - 移除明细
///
/// 已开票或已终结的订单会被拒绝。
pub async fn delete_item(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(String, String)>,
) -> AppResult<Json<bool>> {
    let order_id = state.orders().parse(&id)?;
    let result = state.orders().delete_item(&order_id, &item_id).await?;
    Ok(Json(result))
}
