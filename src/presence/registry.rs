use crate::identity::Mrn;
use crate::metrics::recorder;
use crate::presence::error::{PresenceError, PresenceResult};
use crate::protocol::OutboundFrame;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Sending half of one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    tx: mpsc::Sender<OutboundFrame>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its writer task drains
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            tx,
        };
        (handle, rx)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queue a frame for this connection's own writer, waiting as long as it takes
    pub async fn push(&self, frame: OutboundFrame) -> bool {
        self.tx.send(frame).await.is_ok()
    }

    /// Send a frame, giving up after `timeout` of backpressure
    pub async fn send(&self, frame: OutboundFrame, timeout: Duration) -> Result<(), String> {
        self.tx
            .send_timeout(frame, timeout)
            .await
            .map_err(|e| match e {
                mpsc::error::SendTimeoutError::Timeout(_) => {
                    format!("backpressure exceeded {timeout:?}")
                }
                mpsc::error::SendTimeoutError::Closed(_) => "connection closed".to_string(),
            })
    }
}

/// Identifier to live connection map
pub struct PresenceRegistry {
    connections: DashMap<Mrn, ConnectionHandle>,
    send_timeout: Duration,
}

impl PresenceRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            connections: DashMap::new(),
            send_timeout,
        }
    }

    pub fn shared(send_timeout: Duration) -> Arc<Self> {
        Arc::new(Self::new(send_timeout))
    }

    /// Make `handle` the live connection for `mrn`, returning any it displaced
    pub fn register(&self, mrn: Mrn, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let connection_id = handle.id();
        let previous = self.connections.insert(mrn.clone(), handle);

        match &previous {
            Some(old) => tracing::info!(
                %mrn,
                connection_id,
                replaced = old.id(),
                "Connection replaced"
            ),
            None => tracing::info!(%mrn, connection_id, "Client connected"),
        }
        recorder::set_active_connections(self.connections.len());

        previous
    }

    /// Remove `mrn` only if it is still held by `connection_id`
    pub fn unregister(&self, mrn: &Mrn, connection_id: u64) -> bool {
        let removed = self
            .connections
            .remove_if(mrn, |_, handle| handle.id() == connection_id)
            .is_some();

        if removed {
            tracing::info!(%mrn, connection_id, "Client disconnected");
            recorder::set_active_connections(self.connections.len());
        }
        removed
    }

    pub fn lookup(&self, mrn: &Mrn) -> Option<ConnectionHandle> {
        self.connections.get(mrn).map(|entry| entry.value().clone())
    }

    pub fn is_present(&self, mrn: &Mrn) -> bool {
        self.connections.contains_key(mrn)
    }

    /// Currently present identifiers
    pub fn snapshot(&self) -> BTreeSet<Mrn> {
        self.connections.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Send to the live connection for `mrn`
    ///
    /// A failed send evicts the handle that failed, so a connection that
    /// replaced it in the meantime is left alone.
    pub async fn send_to(&self, mrn: &Mrn, frame: OutboundFrame) -> PresenceResult<()> {
        let handle = self
            .lookup(mrn)
            .ok_or_else(|| PresenceError::NotPresent(mrn.to_string()))?;

        match handle.send(frame, self.send_timeout).await {
            Ok(()) => Ok(()),
            Err(reason) => {
                tracing::warn!(%mrn, connection_id = handle.id(), "Error sending message: {}", reason);
                self.unregister(mrn, handle.id());
                Err(PresenceError::SendFailed {
                    mrn: mrn.to_string(),
                    reason,
                })
            }
        }
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
