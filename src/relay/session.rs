use crate::identity::Mrn;
use crate::metrics::recorder;
use crate::presence::ConnectionHandle;
use crate::protocol::{InboundFrame, OutboundFrame};
use crate::relay::node::MessageRelay;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// One admitted connection
///
/// Dropping the session removes its presence entry unless a newer
/// connection for the same identifier has taken over.
pub struct Session {
    relay: Arc<MessageRelay>,
    identity: Mrn,
    handle: ConnectionHandle,
}

impl Session {
    pub(crate) fn new(relay: Arc<MessageRelay>, identity: Mrn, handle: ConnectionHandle) -> Self {
        Self {
            relay,
            identity,
            handle,
        }
    }

    pub fn identity(&self) -> &Mrn {
        &self.identity
    }

    pub fn connection_id(&self) -> u64 {
        self.handle.id()
    }

    /// Process one inbound text frame and build the reply for the sender
    pub async fn handle_text(&self, text: &str) -> OutboundFrame {
        let counters = self.relay.counters();
        counters.frames_received.fetch_add(1, Ordering::Relaxed);

        let frame = match InboundFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                counters.frames_rejected.fetch_add(1, Ordering::Relaxed);
                recorder::record_frame_rejected(e.kind());
                tracing::debug!(identity = %self.identity, "Rejected frame: {}", e);
                return OutboundFrame::error(e.to_string());
            }
        };

        match frame {
            InboundFrame::Ping => {
                counters.pings.fetch_add(1, Ordering::Relaxed);
                OutboundFrame::Pong
            }
            InboundFrame::Message(message) => {
                match self.relay.submit(&self.identity, message).await {
                    Ok(outcome) => OutboundFrame::Ack {
                        status: outcome.status,
                        message_id: outcome.message_id,
                    },
                    Err(e) => {
                        tracing::error!(identity = %self.identity, "Submission failed: {}", e);
                        OutboundFrame::error(e.to_string())
                    }
                }
            }
        }
    }

    /// Queue a reply on this session's own connection
    pub async fn respond(&self, frame: OutboundFrame) -> bool {
        self.handle.push(frame).await
    }

    /// Remove this connection from presence
    pub fn close(self) {}
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("connection_id", &self.handle.id())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.relay
            .presence()
            .unregister(&self.identity, self.handle.id());
    }
}
