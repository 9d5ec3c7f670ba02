//! Tax Registry API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/taxes", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/", get(handler::list));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            axum::routing::put(handler::update).delete(handler::delete),
        )
        .layer(middleware::from_fn(require_capability(
            Capability::ManageTaxes,
        )));

    read_routes.merge(manage_routes)
}
