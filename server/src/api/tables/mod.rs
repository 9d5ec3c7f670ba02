//! Dining Table API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    // 读取对所有已认证员工开放
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .route("/{id}/status", axum::routing::patch(handler::force_status))
        .layer(middleware::from_fn(require_capability(
            Capability::ManageTables,
        )));

    read_routes.merge(manage_routes)
}
