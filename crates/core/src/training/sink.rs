use async_trait::async_trait;
use thiserror::Error;

use crate::job::{JobError, StreamPayload};

/// Errors raised while pushing progress to a client.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The remote end closed the stream.
    #[error("Client disconnected")]
    Disconnected,

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Job(#[from] JobError),
}

/// Destination of a progress stream, implemented by the transport.
#[async_trait]
pub trait ProgressSink: Send {
    /// Deliver one payload. Returns [`StreamError::Disconnected`] once the remote end is gone.
    async fn send(&mut self, payload: &StreamPayload) -> Result<(), StreamError>;

    /// Resolves when the remote end has closed the stream.
    ///
    /// Raced against the step delay, so implementations must be cancel-safe.
    async fn closed(&mut self) {
        std::future::pending::<()>().await
    }

    /// Close the stream from our side. Errors are ignored.
    async fn close(&mut self);
}
