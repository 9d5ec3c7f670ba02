//! Billing API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/billing", routes())
}

fn routes() -> Router<ServerState> {
    // 开单与查看单张账单/收据对所有已认证员工开放
    let open_routes = Router::new()
        .route("/generate", post(handler::generate))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/receipt", get(handler::receipt));

    // 浏览台账与登记支付属于收银能力
    let payment_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/payment", post(handler::pay))
        .layer(middleware::from_fn(require_capability(
            Capability::TakePayments,
        )));

    open_routes.merge(payment_routes)
}
