//! `WebSocket` stream of simulation progress.
//!
//! Clients connect to `GET /ws/ticks`. The first frame is a
//! [`StreamMessage::Snapshot`] of the run as it stands, so a viewer can
//! render immediately without polling the REST API. After that every
//! completed tick arrives as a [`StreamMessage::Tick`].
//!
//! Each connection keeps a [`RunTracker`]. When a tick belongs to a run the
//! client has not seen (the simulation was reset or re-initialized by a
//! settings change) a [`StreamMessage::Reset`] precedes it. Ticks already
//! covered by the snapshot are not repeated. A client that falls behind the
//! broadcast buffer is told how many ticks it missed.
//!
//! Every frame is a JSON object tagged by `"type"`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use swarmgrid_core::driver::DriverStatus;
use swarmgrid_types::EconomicMetrics;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::{AppState, TickBroadcast};

/// One frame on the tick stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// Current run state, sent once on connect.
    Snapshot {
        /// Driver status at connect time.
        status: DriverStatus,
        /// Live agents.
        agent_count: usize,
        /// Transactions recorded so far in this run.
        transaction_count: usize,
        /// Metrics after the last completed tick.
        metrics: EconomicMetrics,
    },

    /// A completed tick.
    Tick(TickBroadcast),

    /// The run changed since the client's last frame.
    Reset {
        /// Run the client was following.
        previous_run_id: Uuid,
        /// Run the following ticks belong to.
        run_id: Uuid,
    },

    /// The client fell behind and these ticks were dropped.
    Lagged {
        /// Number of skipped broadcasts.
        skipped: u64,
    },
}

impl StreamMessage {
    /// Capture the current run for a newly connected client.
    pub async fn snapshot(state: &AppState) -> Self {
        let status = state.driver.status().await;
        let simulation = state.driver.simulation().read().await;
        let sim_state = simulation.state();
        Self::Snapshot {
            status,
            agent_count: sim_state.agents.len(),
            transaction_count: sim_state.ledger.len(),
            metrics: sim_state.metrics.clone(),
        }
    }
}

/// Per-connection view of which run and tick the client has seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTracker {
    run_id: Uuid,
    last_tick: u64,
}

impl RunTracker {
    /// Start tracking from a snapshot of `run_id` at `tick`.
    pub const fn new(run_id: Uuid, tick: u64) -> Self {
        Self {
            run_id,
            last_tick: tick,
        }
    }

    /// Run the client is following.
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Frames to send for `tick`: nothing if the client already has it,
    /// a reset notice first if it starts a new run.
    pub fn frames_for(&mut self, tick: TickBroadcast) -> Vec<StreamMessage> {
        let mut frames = Vec::with_capacity(2);
        if tick.run_id == self.run_id {
            if tick.tick <= self.last_tick {
                return frames;
            }
        } else {
            frames.push(StreamMessage::Reset {
                previous_run_id: self.run_id,
                run_id: tick.run_id,
            });
            self.run_id = tick.run_id;
        }
        self.last_tick = tick.tick;
        frames.push(StreamMessage::Tick(tick));
        frames
    }
}

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming.
///
/// # Route
///
/// `GET /ws/ticks`
pub async fn ws_ticks(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe first so no tick falls between the snapshot and the stream.
    let mut rx = state.subscribe();
    let snapshot = StreamMessage::snapshot(&state).await;
    let mut tracker = match &snapshot {
        StreamMessage::Snapshot { status, .. } => RunTracker::new(status.run_id, status.tick),
        _ => return,
    };
    debug!(run_id = %tracker.run_id(), "WebSocket client connected");

    if !send_frame(&mut socket, &snapshot).await {
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                let frames = match result {
                    Ok(tick) => tracker.frames_for(tick),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "WebSocket client lagged, skipping ahead");
                        vec![StreamMessage::Lagged { skipped }]
                    }
                    Err(RecvError::Closed) => {
                        debug!("Broadcast channel closed, ending stream");
                        let _ = socket.send(Message::Close(None)).await;
                        return;
                    }
                };
                for frame in &frames {
                    if !send_frame(&mut socket, frame).await {
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%e, "WebSocket error");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Serialize and send one frame. Returns `false` once the client is gone.
async fn send_frame(socket: &mut WebSocket, frame: &StreamMessage) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            warn!(%e, "Failed to serialize stream frame");
            return true;
        }
    };
    if socket.send(Message::Text(json.into())).await.is_err() {
        debug!("WebSocket client disconnected (send failed)");
        return false;
    }
    true
}
