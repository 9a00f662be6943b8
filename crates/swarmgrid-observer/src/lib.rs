//! Observer API server for the `SwarmGrid` simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/ticks`) sending a snapshot on connect,
//!   then a summary of every completed tick via [`tokio::sync::broadcast`],
//!   with a notice whenever the run is reset
//! - **Read endpoints** for the grid, agents, transactions, metrics and
//!   settings
//! - **Control endpoints** to start, pause, step, reset and re-speed the
//!   run, and to change settings
//! - **Minimal HTML page** (`GET /`) with the current tick and links
//!
//! # Architecture
//!
//! Every endpoint goes through the shared
//! [`TickDriver`](swarmgrid_core::driver::TickDriver). Reads take the
//! simulation's read lock and so only ever see state between ticks; the
//! control endpoints are the only writers. Shutting the server down stops
//! the tick timer.

pub mod control;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, shutdown_signal, start_server};
pub use state::{AppState, TickBroadcast, broadcast_channel};
pub use ws::{RunTracker, StreamMessage};
