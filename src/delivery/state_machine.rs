use crate::delivery::error::{DeliveryError, DeliveryResult};
use crate::delivery::simulator::DeliverySimulator;
use crate::delivery::types::{DeliveryState, DeliveryStats, DeliveryStatus};
use crate::metrics::recorder::{self, ResolutionTimer};
use crate::routing::Channel;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use uuid::Uuid;

const DIRECT_DETAIL: &str = "delivered via direct channel";
const UNREACHABLE_DETAIL: &str = "recipient unreachable";

struct StatusRecord {
    status: DeliveryStatus,
    /// Every state visited, in order
    history: Vec<DeliveryState>,
}

/// Owns every message's delivery status and the timers that resolve them
pub struct DeliveryTracker {
    records: Arc<DashMap<Uuid, StatusRecord>>,
    simulator: Arc<DeliverySimulator>,
    pending: Arc<AtomicUsize>,
    shutdown_tx: watch::Sender<bool>,
}

/// Decrements the pending count however the resolution task ends
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let remaining = self.0.fetch_sub(1, Ordering::SeqCst) - 1;
        recorder::set_pending_resolutions(remaining);
    }
}

impl DeliveryTracker {
    pub fn new(simulator: DeliverySimulator) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            records: Arc::new(DashMap::new()),
            simulator: Arc::new(simulator),
            pending: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        }
    }

    /// Start tracking a message in `Queued`
    pub fn submit(&self, message_id: Uuid) -> DeliveryResult<DeliveryStatus> {
        match self.records.entry(message_id) {
            Entry::Occupied(_) => Err(DeliveryError::AlreadyTracked(message_id)),
            Entry::Vacant(slot) => {
                let status = DeliveryStatus::queued(message_id);
                slot.insert(StatusRecord {
                    status: status.clone(),
                    history: vec![DeliveryState::Queued],
                });
                Ok(status)
            }
        }
    }

    /// `Queued -> Delivered` for a recipient reached over its live connection
    pub fn resolve_direct(&self, message_id: Uuid) -> DeliveryResult<DeliveryStatus> {
        let status = transition(
            &self.records,
            message_id,
            DeliveryState::Delivered,
            DIRECT_DETAIL.to_string(),
            Channel::Direct,
        )?;
        recorder::record_delivery(Channel::Direct.as_str(), DeliveryState::Delivered.as_str());
        Ok(status)
    }

    /// `Queued -> Routing`, then resolve on `channel` after the simulated delay
    ///
    /// The resolution does not look at presence when it fires. Outside a
    /// Tokio runtime nothing can run the timer, so the message is left in
    /// `Queued` and `NoRuntime` is returned.
    pub fn resolve_routed(
        &self,
        message_id: Uuid,
        channel: Channel,
    ) -> DeliveryResult<DeliveryStatus> {
        if *self.shutdown_tx.borrow() {
            return Err(DeliveryError::ShuttingDown);
        }
        let runtime = Handle::try_current().map_err(|_| DeliveryError::NoRuntime)?;

        let status = transition(
            &self.records,
            message_id,
            DeliveryState::Routing,
            format!("routing via {channel} channel"),
            channel,
        )?;

        self.schedule(&runtime, message_id, channel);
        Ok(status)
    }

    fn schedule(&self, runtime: &Handle, message_id: Uuid, channel: Channel) {
        let records = self.records.clone();
        let simulator = self.simulator.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let pending = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        recorder::set_pending_resolutions(pending);
        let guard = PendingGuard(self.pending.clone());

        runtime.spawn(async move {
            let _guard = guard;
            let timer = ResolutionTimer::start();

            tokio::select! {
                _ = tokio::time::sleep(simulator.delay()) => {}
                _ = shutdown_rx.wait_for(|stopped| *stopped) => {
                    tracing::debug!(%message_id, "Routed resolution cancelled by shutdown");
                    return;
                }
            }

            let (next, detail) = if simulator.draw() {
                (
                    DeliveryState::Delivered,
                    format!("delivered via {channel} channel (simulated)"),
                )
            } else {
                (DeliveryState::Failed, UNREACHABLE_DETAIL.to_string())
            };

            match transition(&records, message_id, next, detail, channel) {
                Ok(status) => {
                    timer.stop();
                    recorder::record_delivery(channel.as_str(), status.state.as_str());
                    tracing::info!(%message_id, %channel, state = %status.state, "Message delivery simulated");
                }
                Err(e) => tracing::warn!(%message_id, "Routed resolution dropped: {}", e),
            }
        });
    }

    pub fn get(&self, message_id: &Uuid) -> DeliveryResult<DeliveryStatus> {
        self.records
            .get(message_id)
            .map(|record| record.status.clone())
            .ok_or(DeliveryError::NotFound(*message_id))
    }

    /// States visited so far, oldest first
    pub fn history(&self, message_id: &Uuid) -> DeliveryResult<Vec<DeliveryState>> {
        self.records
            .get(message_id)
            .map(|record| record.history.clone())
            .ok_or(DeliveryError::NotFound(*message_id))
    }

    /// Routed resolutions scheduled and not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn simulator(&self) -> &DeliverySimulator {
        &self.simulator
    }

    pub fn stats(&self) -> DeliveryStats {
        let mut stats = DeliveryStats::default();

        for record in self.records.iter() {
            let status = &record.status;
            match status.state {
                DeliveryState::Queued => stats.queued += 1,
                DeliveryState::Routing => stats.routing += 1,
                DeliveryState::Delivered => stats.delivered += 1,
                DeliveryState::Failed => stats.failed += 1,
            }

            if let Some(channel) = status.channel {
                let counts = stats.by_channel.entry(channel).or_default();
                counts.messages += 1;
                match status.state {
                    DeliveryState::Delivered => counts.delivered += 1,
                    DeliveryState::Failed => counts.failed += 1,
                    _ => {}
                }
            }
        }

        stats
    }

    /// Cancel every pending resolution; later routed submissions are refused
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            tracing::info!(pending = self.pending(), "Delivery tracker shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

impl Default for DeliveryTracker {
    fn default() -> Self {
        Self::new(DeliverySimulator::default())
    }
}

/// Apply one transition under the record's shard lock
fn transition(
    records: &DashMap<Uuid, StatusRecord>,
    message_id: Uuid,
    next: DeliveryState,
    detail: String,
    channel: Channel,
) -> DeliveryResult<DeliveryStatus> {
    let mut record = records
        .get_mut(&message_id)
        .ok_or(DeliveryError::NotFound(message_id))?;

    let current = record.status.state;
    if !current.can_transition_to(next) {
        return Err(DeliveryError::InvalidTransition {
            id: message_id,
            from: current,
            to: next,
        });
    }

    record.status.state = next;
    record.status.updated_at = Utc::now();
    record.status.detail = Some(detail);
    record.status.channel = Some(channel);
    record.history.push(next);

    Ok(record.status.clone())
}
