//! In-memory progress sink for testing.

use async_trait::async_trait;

use crate::job::{JobSnapshot, StreamPayload};
use crate::training::{ProgressSink, StreamError};

/// Records every payload it is sent.
///
/// Can simulate a client that disconnects after a number of messages, or a
/// transport that starts failing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    payloads: Vec<StreamPayload>,
    disconnect_after: Option<usize>,
    fail_after: Option<usize>,
    drop_after: Option<usize>,
    closed_by_server: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave as if the client hangs up once `count` payloads were received.
    pub fn disconnect_after(mut self, count: usize) -> Self {
        self.disconnect_after = Some(count);
        self
    }

    /// Fail sends as disconnected once `count` payloads were received,
    /// without the hang-up being observable through `closed()`.
    pub fn drop_after(mut self, count: usize) -> Self {
        self.drop_after = Some(count);
        self
    }

    /// Fail every send once `count` payloads were received.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    pub fn payloads(&self) -> &[StreamPayload] {
        &self.payloads
    }

    /// Only the snapshot payloads, in order.
    pub fn snapshots(&self) -> Vec<JobSnapshot> {
        self.payloads
            .iter()
            .filter_map(|p| p.as_snapshot().cloned())
            .collect()
    }

    /// Whether the streamer closed the sink.
    pub fn was_closed(&self) -> bool {
        self.closed_by_server
    }

    fn remote_gone(&self) -> bool {
        self.disconnect_after
            .is_some_and(|limit| self.payloads.len() >= limit)
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn send(&mut self, payload: &StreamPayload) -> Result<(), StreamError> {
        let dropped = self
            .drop_after
            .is_some_and(|limit| self.payloads.len() >= limit);
        if self.closed_by_server || self.remote_gone() || dropped {
            return Err(StreamError::Disconnected);
        }
        if self.fail_after.is_some_and(|limit| self.payloads.len() >= limit) {
            return Err(StreamError::Transport("simulated transport fault".to_string()));
        }
        self.payloads.push(payload.clone());
        Ok(())
    }

    async fn closed(&mut self) {
        if !self.remote_gone() {
            std::future::pending::<()>().await;
        }
    }

    async fn close(&mut self) {
        self.closed_by_server = true;
    }
}
