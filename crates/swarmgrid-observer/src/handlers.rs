//! REST API read handlers for the Observer server.
//!
//! All handlers read the simulation through the driver's read lock, so a
//! response never reflects a half-finished tick.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/state` | Tick, run, driver and population overview |
//! | `GET` | `/api/grid` | Every cell with occupants, resources and heat |
//! | `GET` | `/api/agents` | List agents (optionally by kind) |
//! | `GET` | `/api/agents/:id` | One agent, its history and network view |
//! | `GET` | `/api/transactions` | Query the log (by tick or agent) |
//! | `GET` | `/api/metrics` | Metrics, price trends, recent feed, network stats |
//! | `GET` | `/api/settings` | Current settings |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use swarmgrid_ledger::{price_trends, recent_counterparties, recent_transactions};
use swarmgrid_types::{AgentId, AgentKind, Transaction};

use crate::error::ObserverError;
use crate::state::AppState;

/// Default number of transactions returned by `GET /api/transactions`.
pub const DEFAULT_TRANSACTION_LIMIT: usize = 100;

/// Upper bound on `limit` for `GET /api/transactions`.
pub const MAX_TRANSACTION_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/transactions` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct TransactionsQuery {
    /// Filter by tick number.
    pub tick: Option<u64>,
    /// Filter by participating agent.
    pub agent_id: Option<u32>,
    /// Maximum number of transactions to return (default 100).
    pub limit: Option<usize>,
}

/// Query parameters for the `GET /api/agents` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct AgentsQuery {
    /// Filter by kind: `provider`, `consumer` or `hybrid`.
    pub kind: Option<AgentKind>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing simulation status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.driver.status().await;
    let simulation = state.driver.simulation().read().await;
    let sim_state = simulation.state();
    let tick = status.tick;
    let running = if status.running { "RUNNING" } else { "PAUSED" };
    let speed = status.speed;
    let agent_count = sim_state.agents.len();
    let transaction_count = sim_state.ledger.len();
    let success_rate = sim_state.metrics.success_rate * 100.0;
    let grid = format!("{}x{}", sim_state.grid.width(), sim_state.grid.height());
    let run_id = status.run_id;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>SwarmGrid Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>SwarmGrid Observer</h1>
    <p class="subtitle">Run {run_id}</p>

    <p>Status: <span class="status">{running}</span> at {speed}x</p>

    <div>
        <div class="metric">
            <div class="label">Tick</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Grid</div>
            <div class="value">{grid}</div>
        </div>
        <div class="metric">
            <div class="label">Agents</div>
            <div class="value">{agent_count}</div>
        </div>
        <div class="metric">
            <div class="label">Transactions</div>
            <div class="value">{transaction_count}</div>
        </div>
        <div class="metric">
            <div class="label">Success</div>
            <div class="value">{success_rate:.1}%</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/state">/api/state</a> -- Simulation overview</li>
        <li>GET <a href="/api/grid">/api/grid</a> -- Cells, occupants, resources, heat</li>
        <li>GET <a href="/api/agents">/api/agents</a> -- List all agents (?kind=provider)</li>
        <li>GET /api/agents/:id -- Agent detail with history and network view</li>
        <li>GET <a href="/api/transactions">/api/transactions</a> -- Query the log (?tick=N, ?agent_id=N, ?limit=N)</li>
        <li>GET <a href="/api/metrics">/api/metrics</a> -- Metrics, trends, recent trades</li>
        <li>GET <a href="/api/settings">/api/settings</a> -- Current settings</li>
        <li>POST /api/settings -- Partial settings update</li>
        <li>GET <a href="/api/control/status">/api/control/status</a> -- Driver status</li>
        <li>POST /api/control/start | pause | step | reset | speed</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/ticks</code> -- Live tick summary stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/state -- overview
// ---------------------------------------------------------------------------

/// Return the tick, run, driver state, grid size, population and metrics.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let status = state.driver.status().await;
    let simulation = state.driver.simulation().read().await;
    let sim_state = simulation.state();

    Ok(Json(serde_json::json!({
        "run_id": status.run_id,
        "started_at": status.started_at,
        "tick": status.tick,
        "running": status.running,
        "speed": status.speed,
        "seed": simulation.seed(),
        "grid_width": sim_state.grid.width(),
        "grid_height": sim_state.grid.height(),
        "agent_count": sim_state.agents.len(),
        "transaction_count": sim_state.ledger.len(),
        "metrics": sim_state.metrics,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/grid -- cells
// ---------------------------------------------------------------------------

/// Return every cell in row-major order.
pub async fn get_grid(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let simulation = state.driver.simulation().read().await;
    let grid = &simulation.state().grid;
    let cells: Vec<_> = grid.cells().collect();

    Ok(Json(serde_json::json!({
        "tick": simulation.current_tick(),
        "width": grid.width(),
        "height": grid.height(),
        "cells": cells,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/agents -- list agents
// ---------------------------------------------------------------------------

/// List all agents, optionally filtered by kind.
///
/// # Query Parameters
///
/// - `kind`: `provider` | `consumer` | `hybrid` (default: all)
pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgentsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let simulation = state.driver.simulation().read().await;

    let agents: Vec<serde_json::Value> = simulation
        .state()
        .agents
        .iter()
        .filter(|agent| params.kind.is_none_or(|kind| agent.kind == kind))
        .map(|agent| {
            serde_json::json!({
                "id": agent.id,
                "kind": agent.kind,
                "position": agent.position,
                "reputation": agent.reputation,
                "holdings": agent.holdings,
                "transaction_count": agent.history.len(),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "count": agents.len(),
        "agents": agents,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/agents/:id -- single agent detail
// ---------------------------------------------------------------------------

/// Return one agent with its full transaction history and the last
/// distinct agents it traded with.
pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let agent_id = parse_agent_id(&id_str)?;

    let simulation = state.driver.simulation().read().await;
    let sim_state = simulation.state();
    let agent = sim_state
        .agents
        .get(agent_id)
        .ok_or_else(|| ObserverError::NotFound(format!("agent {agent_id}")))?;

    let history: Vec<&Transaction> = agent
        .history
        .iter()
        .filter_map(|id| sim_state.ledger.get(*id))
        .collect();
    let counterparties = recent_counterparties(&sim_state.ledger, agent_id, &agent.history);

    Ok(Json(serde_json::json!({
        "agent": agent,
        "history": history,
        "counterparties": counterparties,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/transactions -- query the log
// ---------------------------------------------------------------------------

/// Query transactions, newest first.
///
/// # Query Parameters
///
/// - `tick`: only transactions stamped with this tick
/// - `agent_id`: only transactions this agent took part in
/// - `limit`: max results (default 100, max 1000)
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
        .min(MAX_TRANSACTION_LIMIT);
    let agent = params.agent_id.map(AgentId::new);

    let simulation = state.driver.simulation().read().await;
    let ledger = &simulation.state().ledger;

    let involves = |tx: &&Transaction| agent.is_none_or(|id| tx.involves(id));
    let transactions: Vec<&Transaction> = match params.tick {
        Some(tick) => ledger.for_tick(tick).rev().filter(involves).take(limit).collect(),
        None => ledger.entries().iter().rev().filter(involves).take(limit).collect(),
    };

    Ok(Json(serde_json::json!({
        "count": transactions.len(),
        "total": ledger.len(),
        "transactions": transactions,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/metrics -- dashboard analytics
// ---------------------------------------------------------------------------

/// Return metrics, per-type price trends, the recent feed, and network
/// statistics.
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let simulation = state.driver.simulation().read().await;
    let sim_state = simulation.state();

    Ok(Json(serde_json::json!({
        "tick": simulation.current_tick(),
        "metrics": sim_state.metrics,
        "price_trends": price_trends(&sim_state.ledger),
        "recent_transactions": recent_transactions(&sim_state.ledger),
        "network": {
            "agent_count": sim_state.agents.len(),
            "agents_by_kind": sim_state.agents.kind_counts(),
            "grid_width": sim_state.grid.width(),
            "grid_height": sim_state.grid.height(),
        },
    })))
}

// ---------------------------------------------------------------------------
// GET /api/settings
// ---------------------------------------------------------------------------

/// Return the current settings.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let simulation = state.driver.simulation().read().await;
    Ok(Json(serde_json::to_value(simulation.settings())?))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an agent id from a path segment.
fn parse_agent_id(s: &str) -> Result<AgentId, ObserverError> {
    s.parse::<u32>()
        .map(AgentId::new)
        .map_err(|e| ObserverError::InvalidRequest(format!("invalid agent id '{s}': {e}")))
}
