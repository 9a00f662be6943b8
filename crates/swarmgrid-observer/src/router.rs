//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::control;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/ticks` -- `WebSocket` tick stream
/// - `GET /api/state`, `/api/grid`, `/api/metrics` -- read views
/// - `GET /api/agents`, `/api/agents/{id}` -- agents
/// - `GET /api/transactions` -- transaction log queries
/// - `GET|POST /api/settings` -- read or update settings
/// - `GET /api/control/status` and `POST /api/control/*` -- cadence control
///
/// CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/ticks", get(ws::ws_ticks))
        // Read API
        .route("/api/state", get(handlers::get_state))
        .route("/api/grid", get(handlers::get_grid))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/{id}", get(handlers::get_agent))
        .route("/api/transactions", get(handlers::list_transactions))
        .route("/api/metrics", get(handlers::get_metrics))
        .route(
            "/api/settings",
            get(handlers::get_settings).post(control::update_settings),
        )
        // Control API
        .route("/api/control/status", get(control::status))
        .route("/api/control/start", post(control::start))
        .route("/api/control/pause", post(control::pause))
        .route("/api/control/step", post(control::step))
        .route("/api/control/reset", post(control::reset))
        .route("/api/control/speed", post(control::set_speed))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
