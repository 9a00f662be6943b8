//! Control REST API handlers for run cadence and settings.
//!
//! These are the only endpoints that mutate the simulation, and they do so
//! exclusively through the [`TickDriver`](swarmgrid_core::driver::TickDriver).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/control/status` | Driver status |
//! | `POST` | `/api/control/start` | Start the timer (no-op if running) |
//! | `POST` | `/api/control/pause` | Stop the timer (no-op if paused) |
//! | `POST` | `/api/control/step` | Run one tick (409 while running) |
//! | `POST` | `/api/control/reset` | Stop and re-initialize |
//! | `POST` | `/api/control/speed` | Set the speed multiplier |
//! | `POST` | `/api/settings` | Partial settings update |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use swarmgrid_core::config::SettingsUpdate;
use swarmgrid_core::driver::DriverStatus;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/control/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New speed multiplier. Any positive finite value; `0.5` halves the
    /// tick rate.
    pub multiplier: f64,
}

/// Generic control response.
#[derive(Debug, serde::Serialize)]
struct ControlResponse {
    /// Whether the operation changed anything.
    ok: bool,
    /// Human-readable message.
    message: String,
    /// Driver status after the operation.
    status: DriverStatus,
}

async fn respond(state: &AppState, ok: bool, message: &str) -> Json<ControlResponse> {
    Json(ControlResponse {
        ok,
        message: message.to_owned(),
        status: state.driver.status().await,
    })
}

// ---------------------------------------------------------------------------
// GET /api/control/status
// ---------------------------------------------------------------------------

/// Return the current driver status.
pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.driver.status().await)
}

// ---------------------------------------------------------------------------
// POST /api/control/start
// ---------------------------------------------------------------------------

/// Start the timer. Starting a running simulation changes nothing.
pub async fn start(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let started = state.driver.start().await;
    let message = if started {
        "Simulation started"
    } else {
        "Simulation already running"
    };
    respond(&state, started, message).await
}

// ---------------------------------------------------------------------------
// POST /api/control/pause
// ---------------------------------------------------------------------------

/// Stop the timer. Pausing a paused simulation changes nothing.
pub async fn pause(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let paused = state.driver.pause().await;
    let message = if paused {
        "Simulation paused"
    } else {
        "Simulation already paused"
    };
    respond(&state, paused, message).await
}

// ---------------------------------------------------------------------------
// POST /api/control/step
// ---------------------------------------------------------------------------

/// Run a single tick. Rejected while the timer is running.
pub async fn step(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    if state.driver.is_running().await {
        return Err(ObserverError::Conflict(
            "cannot step while the simulation is running".to_owned(),
        ));
    }

    let summary = state.driver.step_once().await?;
    Ok(Json(summary))
}

// ---------------------------------------------------------------------------
// POST /api/control/reset
// ---------------------------------------------------------------------------

/// Stop the timer and rebuild the world from the current settings.
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    state.driver.reset().await?;
    Ok(respond(&state, true, "Simulation reset").await)
}

// ---------------------------------------------------------------------------
// POST /api/control/speed
// ---------------------------------------------------------------------------

/// Change the speed multiplier. A running timer is replaced.
///
/// Malformed bodies and non-positive multipliers are both answered with a
/// JSON 400.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SetSpeedRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(body) = body?;
    state.driver.set_speed(body.multiplier).await?;
    Ok(respond(&state, true, &format!("Speed set to {}x", body.multiplier)).await)
}

// ---------------------------------------------------------------------------
// POST /api/settings
// ---------------------------------------------------------------------------

/// Apply a partial settings update.
///
/// Structural changes re-initialize the world; the response says which
/// kind of change was applied.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    update: Result<Json<SettingsUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ObserverError> {
    let Json(update) = update?;
    let change = state.driver.update_settings(&update).await?;
    info!(?change, "Settings updated via API");

    let simulation = state.driver.simulation().read().await;
    Ok(Json(serde_json::json!({
        "change": change,
        "settings": simulation.settings(),
        "run_id": simulation.run_id(),
    })))
}
