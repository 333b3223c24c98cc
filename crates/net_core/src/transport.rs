//! Transport abstraction for replication bytes.
//!
//! The simulation only ever broadcasts; delivery, fan-out to individual
//! clients, and retries belong to the implementation.
//!
//! Implementations:
//! - `LocalLoopbackTransport`: in-proc bounded channel for the harness and tests

use crate::channel::{self, Rx, Tx};
use crate::codec::SnapshotDecode;
use crate::msg::ServerMsg;
use crate::{Channel, frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrySendError {
    Full,
    Disconnected,
}

impl std::fmt::Display for TrySendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrySendError::Full => f.write_str("transport queue full"),
            TrySendError::Disconnected => f.write_str("transport disconnected"),
        }
    }
}

impl std::error::Error for TrySendError {}

/// Fire-and-forget broadcast to all relevant clients.
pub trait Transport: Send {
    fn broadcast(&self, payload: &[u8], channel: Channel) -> Result<(), TrySendError>;
}

/// Server half of an in-process loopback: frames and enqueues each broadcast.
#[derive(Clone)]
pub struct LocalLoopbackTransport {
    tx: Tx,
}

/// Client half of an in-process loopback.
pub struct LoopbackClient {
    rx: Rx,
}

impl LocalLoopbackTransport {
    #[must_use]
    pub fn new(capacity: usize) -> (Self, LoopbackClient) {
        let (tx, rx) = channel::channel_bounded(capacity);
        (Self { tx }, LoopbackClient { rx })
    }
}

impl Transport for LocalLoopbackTransport {
    fn broadcast(&self, payload: &[u8], channel: Channel) -> Result<(), TrySendError> {
        let mut buf = Vec::with_capacity(payload.len() + 6);
        frame::write_msg(&mut buf, channel, payload);
        self.tx.try_send(buf)
    }
}

impl LoopbackClient {
    /// Drain and decode every queued frame, in broadcast order.
    pub fn drain_msgs(&self) -> anyhow::Result<Vec<(Channel, ServerMsg)>> {
        let mut out = Vec::new();
        for bytes in self.rx.drain() {
            let mut inp: &[u8] = &bytes;
            let (channel, mut payload) = frame::read_msg(&mut inp)?;
            out.push((channel, ServerMsg::decode(&mut payload)?));
        }
        Ok(out)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.rx.depth()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::codec::SnapshotEncode;

    #[test]
    fn loopback_frames_and_decodes() {
        let (server, client) = LocalLoopbackTransport::new(4);
        let msg = ServerMsg::DebugMessage { text: "ping".into() };
        let mut payload = Vec::new();
        msg.encode(&mut payload);
        server.broadcast(&payload, Channel::S2C).unwrap();
        assert_eq!(client.depth(), 1);
        let got = client.drain_msgs().unwrap();
        assert_eq!(got, vec![(Channel::S2C, msg)]);
    }
}
