//! Bounded in-proc channel for replication bytes.
//!
//! Uses `std::sync::mpsc::sync_channel` and tracks queue depth so the server
//! can observe back-pressure without blocking the simulation thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError as MpscTrySendError};

use crate::transport::TrySendError;

#[derive(Clone)]
pub struct Tx {
    inner: SyncSender<Vec<u8>>,
    depth: Arc<AtomicUsize>,
}

pub struct Rx {
    inner: Receiver<Vec<u8>>,
    depth: Arc<AtomicUsize>,
}

/// Create a sender/receiver pair holding at most `capacity` queued messages.
#[must_use]
pub fn channel_bounded(capacity: usize) -> (Tx, Rx) {
    let (s, r) = mpsc::sync_channel::<Vec<u8>>(capacity.max(1));
    let depth = Arc::new(AtomicUsize::new(0));
    (
        Tx { inner: s, depth: depth.clone() },
        Rx { inner: r, depth },
    )
}

impl Tx {
    /// Non-blocking send.
    pub fn try_send(&self, bytes: Vec<u8>) -> Result<(), TrySendError> {
        match self.inner.try_send(bytes) {
            Ok(()) => {
                self.depth.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(MpscTrySendError::Full(_)) => Err(TrySendError::Full),
            Err(MpscTrySendError::Disconnected(_)) => Err(TrySendError::Disconnected),
        }
    }
}

impl Rx {
    /// Non-blocking receive of a single message.
    #[must_use]
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        let b = self.inner.try_recv().ok()?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(b)
    }

    /// Drain all currently queued messages.
    #[must_use]
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(b) = self.try_recv() {
            out.push(b);
        }
        out
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}
