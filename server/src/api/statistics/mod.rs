//! Statistics API 模块

mod handler;

#[cfg(test)]
mod tests;

use axum::{Router, middleware, routing::get};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/daily-sales", get(handler::daily_sales))
        .route("/item-sales", get(handler::item_sales))
        .route("/payment-modes", get(handler::payment_modes))
        .layer(middleware::from_fn(require_capability(
            Capability::ViewReports,
        )))
}
