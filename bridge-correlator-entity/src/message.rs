use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::address::checksummed_opt;

/// Transport-layer protocol a message travels on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Layerzero,
    Across,
    Cctp,
    Agglayer,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Layerzero => "layerzero",
            Protocol::Across => "across",
            Protocol::Cctp => "cctp",
            Protocol::Agglayer => "agglayer",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed side of a cross-chain message.
///
/// `actor` is the sender on the outbound leg and the recipient on the
/// inbound leg.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLeg {
    pub block_number: u64,
    /// Block timestamp, seconds since the Unix epoch.
    pub timestamp: u64,
    pub tx_hash: B256,
    pub chain_id: u64,
    #[serde(with = "checksummed_opt")]
    pub actor: Option<Address>,
}

/// Which legs of a message have been observed so far.
///
/// Once a side is present it is never replaced; transitions only add the
/// missing side. `latency_secs` is fixed at the moment both sides meet and
/// may be non-positive (chains do not share a clock).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageLegs {
    Outbound {
        outbound: MessageLeg,
    },
    Inbound {
        inbound: MessageLeg,
    },
    Matched {
        outbound: MessageLeg,
        inbound: MessageLeg,
        latency_secs: i64,
    },
}

impl MessageLegs {
    /// Add the outbound side if it is not already present.
    pub fn with_outbound(self, leg: MessageLeg) -> MessageLegs {
        match self {
            MessageLegs::Inbound { inbound } => {
                let latency_secs = inbound.timestamp as i64 - leg.timestamp as i64;
                MessageLegs::Matched {
                    outbound: leg,
                    inbound,
                    latency_secs,
                }
            }
            keep => keep,
        }
    }

    /// Add the inbound side if it is not already present.
    pub fn with_inbound(self, leg: MessageLeg) -> MessageLegs {
        match self {
            MessageLegs::Outbound { outbound } => {
                let latency_secs = leg.timestamp as i64 - outbound.timestamp as i64;
                MessageLegs::Matched {
                    outbound,
                    inbound: leg,
                    latency_secs,
                }
            }
            keep => keep,
        }
    }

    pub fn outbound(&self) -> Option<&MessageLeg> {
        match self {
            MessageLegs::Outbound { outbound } | MessageLegs::Matched { outbound, .. } => {
                Some(outbound)
            }
            MessageLegs::Inbound { .. } => None,
        }
    }

    pub fn inbound(&self) -> Option<&MessageLeg> {
        match self {
            MessageLegs::Inbound { inbound } | MessageLegs::Matched { inbound, .. } => Some(inbound),
            MessageLegs::Outbound { .. } => None,
        }
    }

    pub fn matched(&self) -> bool {
        matches!(self, MessageLegs::Matched { .. })
    }

    pub fn latency_secs(&self) -> Option<i64> {
        match self {
            MessageLegs::Matched { latency_secs, .. } => Some(*latency_secs),
            _ => None,
        }
    }
}

/// Endpoint-id route of a message. Endpoint ids are protocol-local chain
/// identifiers (LayerZero EIDs, CCTP domains, agglayer network ids).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub src_eid: Option<u32>,
    pub dst_eid: Option<u32>,
    pub src_slug: Option<String>,
    pub dst_slug: Option<String>,
}

impl Route {
    /// Fill empty components from `other`; populated components are kept.
    pub fn merge(&mut self, other: Route) {
        if self.src_eid.is_none() {
            self.src_eid = other.src_eid;
        }
        if self.dst_eid.is_none() {
            self.dst_eid = other.dst_eid;
        }
        if self.src_slug.is_none() {
            self.src_slug = other.src_slug;
        }
        if self.dst_slug.is_none() {
            self.dst_slug = other.dst_slug;
        }
    }
}

/// One record per transport-layer message, keyed `protocol:messageKey`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosschainMessage {
    pub id: String,
    pub protocol: Protocol,
    pub message_key: String,
    #[serde(flatten)]
    pub legs: MessageLegs,
    pub route: Route,
}

impl CrosschainMessage {
    pub fn id_for(protocol: Protocol, message_key: &str) -> String {
        format!("{protocol}:{message_key}")
    }

    pub fn matched(&self) -> bool {
        self.legs.matched()
    }

    pub fn latency_secs(&self) -> Option<i64> {
        self.legs.latency_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    fn leg(timestamp: u64) -> MessageLeg {
        MessageLeg {
            block_number: 1,
            timestamp,
            tx_hash: b256!("1111111111111111111111111111111111111111111111111111111111111111"),
            chain_id: 1,
            actor: None,
        }
    }

    #[test]
    fn legs_meet_in_either_order() {
        let forward = MessageLegs::Outbound { outbound: leg(100) }.with_inbound(leg(160));
        let reverse = MessageLegs::Inbound { inbound: leg(160) }.with_outbound(leg(100));
        assert_eq!(forward, reverse);
        assert_eq!(forward.latency_secs(), Some(60));
    }

    #[test]
    fn latency_may_be_negative() {
        let legs = MessageLegs::Outbound { outbound: leg(200) }.with_inbound(leg(150));
        assert_eq!(legs.latency_secs(), Some(-50));
    }

    #[test]
    fn sides_are_set_at_most_once() {
        let original = MessageLegs::Outbound { outbound: leg(100) };
        let unchanged = original.clone().with_outbound(leg(999));
        assert_eq!(original, unchanged);

        let matched = original.with_inbound(leg(160));
        let still_matched = matched.clone().with_inbound(leg(999)).with_outbound(leg(0));
        assert_eq!(matched, still_matched);
    }

    #[test]
    fn route_merge_never_overwrites() {
        let mut route = Route {
            src_eid: Some(30101),
            dst_eid: None,
            src_slug: Some("ethereum".into()),
            dst_slug: None,
        };
        route.merge(Route {
            src_eid: Some(1),
            dst_eid: Some(30184),
            src_slug: Some("other".into()),
            dst_slug: Some("base".into()),
        });
        assert_eq!(route.src_eid, Some(30101));
        assert_eq!(route.dst_eid, Some(30184));
        assert_eq!(route.src_slug.as_deref(), Some("ethereum"));
        assert_eq!(route.dst_slug.as_deref(), Some("base"));
    }
}
