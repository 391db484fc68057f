//! Relay service
//!
//! Owns the presence registry, message store and delivery tracker for one
//! relay instance and runs the submission pipeline against them.

use crate::config::RelayConfig;
use crate::delivery::{DeliveryError, DeliverySimulator, DeliveryStatus, DeliveryTracker};
use crate::identity::{IdentityRegistry, Mrn, OpenRegistry};
use crate::metrics::recorder;
use crate::presence::{ConnectionHandle, PresenceError, PresenceRegistry};
use crate::protocol::{AckStatus, MessageFrame, OutboundFrame};
use crate::relay::session::Session;
use crate::relay::types::{
    availability, ChannelStatsEntry, ChannelStatsReport, RelayResult, RelayStats, SubmitOutcome,
};
use crate::routing::{Channel, RoutingDecision, RoutingPolicy};
use crate::store::{Message, MessageFilter, MessageStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A maritime message relay instance
pub struct MessageRelay {
    config: RelayConfig,
    presence: Arc<PresenceRegistry>,
    policy: RoutingPolicy,
    store: Arc<MessageStore>,
    tracker: Arc<DeliveryTracker>,
    identities: Arc<dyn IdentityRegistry>,
    stats: RelayStatsInner,
}

#[derive(Default)]
pub(crate) struct RelayStatsInner {
    pub(crate) frames_received: AtomicU64,
    pub(crate) frames_rejected: AtomicU64,
    pub(crate) send_failures: AtomicU64,
    pub(crate) pings: AtomicU64,
}

impl MessageRelay {
    pub fn new(config: RelayConfig) -> Self {
        MessageRelayBuilder::new().config(config).build()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    pub(crate) fn counters(&self) -> &RelayStatsInner {
        &self.stats
    }

    /// Admit a connection for `identity` and make it present
    ///
    /// Returns the session that processes its inbound frames and the receiver
    /// its writer drains.
    pub fn open_session(
        self: &Arc<Self>,
        identity: &str,
    ) -> RelayResult<(Session, mpsc::Receiver<OutboundFrame>)> {
        let mrn = Mrn::parse(identity)?;
        self.identities.validate(&mrn)?;

        let (handle, outbound) = ConnectionHandle::channel(self.config.outbound_buffer);
        self.presence.register(mrn.clone(), handle.clone());

        Ok((Session::new(self.clone(), mrn, handle), outbound))
    }

    /// Persist a message from `sender` and deliver or route it
    ///
    /// Refused without being stored once the relay has shut down.
    pub async fn submit(&self, sender: &Mrn, frame: MessageFrame) -> RelayResult<SubmitOutcome> {
        if self.tracker.is_shut_down() {
            return Err(DeliveryError::ShuttingDown.into());
        }

        let message = self.store.put(Message::from_frame(sender.clone(), frame))?;
        self.tracker.submit(message.id)?;
        recorder::record_message_submitted(message.message_type.as_str());

        tracing::info!(
            message_id = %message.id,
            sender = %message.sender,
            recipient = %message.recipient,
            message_type = %message.message_type,
            "Message queued"
        );

        let envelope = OutboundFrame::Message(message.envelope());
        match self.presence.send_to(&message.recipient, envelope).await {
            Ok(()) => {
                self.tracker.resolve_direct(message.id)?;
                tracing::info!(message_id = %message.id, "Message sent successfully to {}", message.recipient);
                return Ok(SubmitOutcome {
                    message_id: message.id,
                    status: AckStatus::Delivered,
                });
            }
            Err(PresenceError::NotPresent(_)) => {
                tracing::info!(message_id = %message.id, "Recipient {} not connected", message.recipient);
            }
            Err(PresenceError::SendFailed { reason, .. }) => {
                self.stats.send_failures.fetch_add(1, Ordering::Relaxed);
                recorder::record_send_failure();
                tracing::warn!(message_id = %message.id, "Direct forward failed, routing instead: {}", reason);
            }
        }

        let channel = self
            .policy
            .decide_for(&message.recipient, &self.presence)
            .routed_channel();
        self.tracker.resolve_routed(message.id, channel)?;

        Ok(SubmitOutcome {
            message_id: message.id,
            status: AckStatus::Queued,
        })
    }

    pub fn status(&self, message_id: &Uuid) -> RelayResult<DeliveryStatus> {
        Ok(self.tracker.get(message_id)?)
    }

    pub fn message(&self, message_id: &Uuid) -> RelayResult<Arc<Message>> {
        Ok(self.store.get(message_id)?)
    }

    /// Newest-first listing; `limit` falls back to the configured default
    pub fn list_messages(&self, filter: &MessageFilter, limit: Option<usize>) -> Vec<Arc<Message>> {
        self.store
            .list(filter, limit.unwrap_or(self.config.default_list_limit))
    }

    /// Identifiers with a live connection
    pub fn connections(&self) -> Vec<Mrn> {
        self.presence.snapshot().into_iter().collect()
    }

    /// Routing decision for an identifier known to the identity registry
    pub fn routing(&self, identifier: &str) -> RelayResult<RoutingDecision> {
        let decision = self.policy.decide(identifier, &self.presence)?;
        self.identities.validate(&decision.recipient_mrn)?;
        Ok(decision)
    }

    pub fn channel_stats(&self) -> ChannelStatsReport {
        let delivery = self.tracker.stats();

        let channels = Channel::ALL
            .into_iter()
            .map(|channel| {
                let counts = delivery.channel(channel);
                ChannelStatsEntry {
                    name: channel,
                    kind: channel.kind(),
                    availability: availability(channel),
                    active_connections: if channel.is_simulated() {
                        0
                    } else {
                        self.presence.len()
                    },
                    messages_sent: counts.messages,
                    delivered: counts.delivered,
                    failed: counts.failed,
                }
            })
            .collect();

        ChannelStatsReport {
            channels,
            total_messages: self.store.len(),
            delivered_messages: delivery.delivered,
            failed_messages: delivery.failed,
            routing_messages: delivery.routing,
        }
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            frames_received: self.stats.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.stats.frames_rejected.load(Ordering::Relaxed),
            send_failures: self.stats.send_failures.load(Ordering::Relaxed),
            pings: self.stats.pings.load(Ordering::Relaxed),
        }
    }

    /// Cancel pending routed resolutions
    pub fn shutdown(&self) {
        self.tracker.shutdown();
    }
}

/// Builder for relay instances
pub struct MessageRelayBuilder {
    config: RelayConfig,
    identities: Arc<dyn IdentityRegistry>,
    simulator: Option<DeliverySimulator>,
}

impl MessageRelayBuilder {
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
            identities: Arc::new(OpenRegistry),
            simulator: None,
        }
    }

    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity_registry(mut self, registry: impl IdentityRegistry + 'static) -> Self {
        self.identities = Arc::new(registry);
        self
    }

    /// Override the simulator derived from the config
    pub fn simulator(mut self, simulator: DeliverySimulator) -> Self {
        self.simulator = Some(simulator);
        self
    }

    pub fn build(self) -> MessageRelay {
        let config = self.config;
        let simulator = self.simulator.unwrap_or_else(|| {
            DeliverySimulator::new(config.delivery_delay(), config.success_rate, config.seed)
        });

        MessageRelay {
            presence: PresenceRegistry::shared(config.send_timeout()),
            policy: RoutingPolicy::new(),
            store: Arc::new(MessageStore::new()),
            tracker: Arc::new(DeliveryTracker::new(simulator)),
            identities: self.identities,
            stats: RelayStatsInner::default(),
            config,
        }
    }

    pub fn build_shared(self) -> Arc<MessageRelay> {
        Arc::new(self.build())
    }
}

impl Default for MessageRelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
