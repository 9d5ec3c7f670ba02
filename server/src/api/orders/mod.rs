//! Order API 模块

mod handler;

use axum::{Router, middleware, routing::delete, routing::get, routing::patch, routing::post};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/items/{item_id}", delete(handler::delete_item))
        .layer(middleware::from_fn(require_capability(
            Capability::ManageOrders,
        )));

    // 删除整个订单是敏感操作
    let void_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_capability(
            Capability::VoidOrders,
        )));

    read_routes.merge(manage_routes).merge(void_routes)
}
