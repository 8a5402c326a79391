//! WebSocket endpoint streaming training progress for one job.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use calaxis_core::{ProgressSink, StreamError, StreamOutcome, StreamPayload, UniformNoise};
use std::sync::Arc;
use tracing::{debug, info};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Adapts an axum WebSocket to a [`ProgressSink`].
///
/// Payloads go out as JSON text frames. Anything the client sends is ignored
/// apart from close frames.
pub struct WsSink {
    socket: WebSocket,
    open: bool,
}

impl WsSink {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket, open: true }
    }
}

#[async_trait]
impl ProgressSink for WsSink {
    async fn send(&mut self, payload: &StreamPayload) -> Result<(), StreamError> {
        if !self.open {
            return Err(StreamError::Disconnected);
        }

        let json = serde_json::to_string(payload)?;
        if let Err(e) = self.socket.send(Message::Text(json.into())).await {
            debug!("WebSocket send failed, client disconnected: {}", e);
            self.open = false;
            return Err(StreamError::Disconnected);
        }

        WS_MESSAGES_SENT.with_label_values(&[payload.kind()]).inc();
        Ok(())
    }

    async fn closed(&mut self) {
        if !self.open {
            return;
        }

        while let Some(result) = self.socket.recv().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("WebSocket client requested close");
                    break;
                }
                Ok(Message::Text(text)) => {
                    // We don't expect any client messages, but log them
                    debug!("Received text message: {}", text.as_str());
                }
                Ok(_) => {
                    // Ping/pong is handled by axum
                }
                Err(e) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            }
        }
        self.open = false;
    }

    async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.socket.send(Message::Close(None)).await {
            debug!("Failed to send close frame: {}", e);
        }
    }
}

/// WebSocket upgrade handler for `/ws/training/{job_id}`.
pub async fn training_ws(
    ws: WebSocketUpgrade,
    Path(job_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, job_id, state))
}

/// Stream one job's run over an accepted connection.
async fn handle_socket(socket: WebSocket, job_id: String, state: Arc<AppState>) {
    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!(job_id = %job_id, "WebSocket client connected");

    let mut sink = WsSink::new(socket);
    let mut noise = UniformNoise::new(state.config().training.noise_amplitude);
    let outcome = state.streamer().run(&job_id, &mut sink, &mut noise).await;

    // The streamer leaves the socket open after a successful run
    if matches!(
        outcome,
        StreamOutcome::Completed | StreamOutcome::AlreadyCompleted
    ) {
        sink.close().await;
    }

    WS_CONNECTIONS_ACTIVE.dec();
    info!(job_id = %job_id, outcome = outcome.as_str(), "WebSocket session ended");
}
