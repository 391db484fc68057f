use crate::identity::{EntityType, Mrn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// Live connection to the recipient
    Direct,
    /// Terrestrial VHF data exchange
    RadioRelay,
    Satellite,
    Internet,
}

/// Physical medium behind a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Ip,
    Rf,
    Satellite,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Direct,
        Channel::RadioRelay,
        Channel::Satellite,
        Channel::Internet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Direct => "direct",
            Channel::RadioRelay => "radio-relay",
            Channel::Satellite => "satellite",
            Channel::Internet => "internet",
        }
    }

    pub fn kind(&self) -> ChannelKind {
        match self {
            Channel::Direct | Channel::Internet => ChannelKind::Ip,
            Channel::RadioRelay => ChannelKind::Rf,
            Channel::Satellite => ChannelKind::Satellite,
        }
    }

    /// Only direct delivery uses a real transport
    pub fn is_simulated(&self) -> bool {
        !matches!(self, Channel::Direct)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a message to one recipient should travel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub recipient_mrn: Mrn,
    pub entity_type: EntityType,
    pub available_channels: Vec<Channel>,
    pub preferred_channel: Channel,
    pub fallback_channels: Vec<Channel>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl RoutingDecision {
    pub fn is_direct(&self) -> bool {
        self.preferred_channel == Channel::Direct
    }

    /// First channel a routed (non-direct) delivery would use
    pub fn routed_channel(&self) -> Channel {
        self.available_channels
            .iter()
            .copied()
            .find(Channel::is_simulated)
            .unwrap_or(Channel::Internet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_wire_names() {
        assert_eq!(
            serde_json::to_string(&Channel::RadioRelay).unwrap(),
            "\"radio-relay\""
        );
        for channel in Channel::ALL {
            let json = serde_json::to_string(&channel).unwrap();
            assert_eq!(json, format!("\"{}\"", channel.as_str()));
        }
    }

    #[test]
    fn test_channel_kind() {
        assert_eq!(Channel::Satellite.kind(), ChannelKind::Satellite);
        assert_eq!(Channel::RadioRelay.kind(), ChannelKind::Rf);
        assert!(!Channel::Direct.is_simulated());
    }
}
