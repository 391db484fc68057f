use crate::identity::{EntityType, Mrn};
use crate::presence::PresenceRegistry;
use crate::routing::error::RoutingResult;
use crate::routing::types::{Channel, RoutingDecision};
use chrono::{DateTime, Utc};

/// Channel table keyed by entity type
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutingPolicy;

impl RoutingPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Channels for an entity type in priority order, excluding direct
    pub fn channels_for(&self, entity_type: &EntityType) -> Vec<Channel> {
        match entity_type {
            EntityType::Vessel => vec![Channel::RadioRelay, Channel::Satellite, Channel::Internet],
            EntityType::Shore => vec![Channel::Internet, Channel::RadioRelay],
            _ => vec![Channel::Internet],
        }
    }

    /// Parse `recipient` and decide against current presence
    pub fn decide(&self, recipient: &str, presence: &PresenceRegistry) -> RoutingResult<RoutingDecision> {
        let mrn = Mrn::parse(recipient)?;
        Ok(self.decide_for(&mrn, presence))
    }

    pub fn decide_for(&self, recipient: &Mrn, presence: &PresenceRegistry) -> RoutingDecision {
        self.decide_with(recipient, presence.is_present(recipient), Utc::now())
    }

    /// Pure decision from identifier and presence
    pub fn decide_with(&self, recipient: &Mrn, present: bool, now: DateTime<Utc>) -> RoutingDecision {
        let entity_type = recipient.entity_type();
        let mut available_channels = self.channels_for(&entity_type);
        let mut last_seen = None;

        if present {
            available_channels.insert(0, Channel::Direct);
            last_seen = Some(now);
        }

        // Tables are never empty, so the first entry is always the preferred channel.
        let preferred_channel = available_channels.first().copied().unwrap_or(Channel::Internet);
        let fallback_channels = available_channels.iter().skip(1).copied().collect();

        RoutingDecision {
            recipient_mrn: recipient.clone(),
            entity_type,
            available_channels,
            preferred_channel,
            fallback_channels,
            last_seen,
        }
    }
}
