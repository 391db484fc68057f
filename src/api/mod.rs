mod error;
mod rest;
mod types;
mod websocket;

pub use error::{ApiError, ApiResult};
pub use rest::RestApi;
pub use types::*;
pub use websocket::websocket_handler;

use crate::metrics::metrics_route;
use crate::relay::MessageRelay;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create a complete API server with REST and WebSocket support
///
/// `/metrics` is mounted here unless the exporter runs on its own listener.
pub fn create_api_server(relay: Arc<MessageRelay>) -> Router {
    let rest_api = RestApi::new(relay.clone());
    let serve_metrics = relay.config().metrics_addr.is_none();

    let ws_router = Router::new()
        .route("/ws/:client_mrn", get(websocket_handler))
        .with_state(relay);

    let mut app = Router::new().merge(rest_api.router()).merge(ws_router);
    if serve_metrics {
        app = app.route("/metrics", metrics_route());
    }

    app.layer(TraceLayer::new_for_http())
}
