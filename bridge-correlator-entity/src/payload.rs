use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::address::checksummed_opt;
use crate::message::Protocol;

/// Application-level tag of a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum App {
    LayerZero,
    Across,
    #[serde(rename = "CCTP")]
    Cctp,
    Agglayer,
    #[serde(rename = "StargateV2-taxi")]
    StargateV2Taxi,
    #[serde(rename = "StargateV2-bus-passenger")]
    StargateV2BusPassenger,
    #[serde(rename = "StargateV2-inbound-buffer")]
    StargateV2InboundBuffer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    Transfer,
    Message,
}

/// One observed side of an application transfer.
///
/// `actor` is the sender on the outbound side and the recipient on the
/// inbound side; `target` is the declared destination account, where the
/// source event carries one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSide {
    #[serde(with = "checksummed_opt")]
    pub asset: Option<Address>,
    pub amount: Option<U256>,
    #[serde(with = "checksummed_opt")]
    pub actor: Option<Address>,
    #[serde(with = "checksummed_opt")]
    pub target: Option<Address>,
    pub raw: Option<Bytes>,
}

/// Which sides of a transfer have been observed so far. Mirrors
/// [`crate::MessageLegs`], at the application layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayloadSides {
    Outbound {
        outbound: PayloadSide,
    },
    Inbound {
        inbound: PayloadSide,
    },
    Complete {
        outbound: PayloadSide,
        inbound: PayloadSide,
    },
}

impl PayloadSides {
    pub fn with_outbound(self, side: PayloadSide) -> PayloadSides {
        match self {
            PayloadSides::Inbound { inbound } => PayloadSides::Complete {
                outbound: side,
                inbound,
            },
            keep => keep,
        }
    }

    pub fn with_inbound(self, side: PayloadSide) -> PayloadSides {
        match self {
            PayloadSides::Outbound { outbound } => PayloadSides::Complete {
                outbound,
                inbound: side,
            },
            keep => keep,
        }
    }

    pub fn outbound(&self) -> Option<&PayloadSide> {
        match self {
            PayloadSides::Outbound { outbound } | PayloadSides::Complete { outbound, .. } => {
                Some(outbound)
            }
            PayloadSides::Inbound { .. } => None,
        }
    }

    pub fn inbound(&self) -> Option<&PayloadSide> {
        match self {
            PayloadSides::Inbound { inbound } | PayloadSides::Complete { inbound, .. } => {
                Some(inbound)
            }
            PayloadSides::Outbound { .. } => None,
        }
    }
}

/// One record per user-visible transfer, linked to its transporting
/// envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPayload {
    pub id: String,
    pub app: App,
    pub payload_type: PayloadType,
    pub transporting_protocol: Protocol,
    /// Envelope id this payload rides on; the `get_where` lookup key.
    pub transporting_message_id: String,
    /// Foreign key into `CrosschainMessage`; same value as
    /// `transporting_message_id`.
    pub crosschain_message_id: String,
    #[serde(flatten)]
    pub sides: PayloadSides,
}

impl AppPayload {
    /// A payload is matched when both sides carry an amount.
    pub fn matched(&self) -> bool {
        match &self.sides {
            PayloadSides::Complete { outbound, inbound } => {
                outbound.amount.is_some() && inbound.amount.is_some()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(amount: Option<u64>) -> PayloadSide {
        PayloadSide {
            amount: amount.map(U256::from),
            ..Default::default()
        }
    }

    fn payload(sides: PayloadSides) -> AppPayload {
        AppPayload {
            id: "layerzero:0xabc-taxi".into(),
            app: App::StargateV2Taxi,
            payload_type: PayloadType::Transfer,
            transporting_protocol: Protocol::Layerzero,
            transporting_message_id: "layerzero:0xabc".into(),
            crosschain_message_id: "layerzero:0xabc".into(),
            sides,
        }
    }

    #[test]
    fn matched_requires_amounts_on_both_sides() {
        let complete = payload(PayloadSides::Complete {
            outbound: side(Some(1000)),
            inbound: side(Some(990)),
        });
        assert!(complete.matched());

        let amountless = payload(PayloadSides::Complete {
            outbound: side(None),
            inbound: side(Some(990)),
        });
        assert!(!amountless.matched());

        let one_sided = payload(PayloadSides::Outbound {
            outbound: side(Some(1000)),
        });
        assert!(!one_sided.matched());
    }

    #[test]
    fn sides_complete_in_either_order() {
        let forward = PayloadSides::Outbound {
            outbound: side(Some(1)),
        }
        .with_inbound(side(Some(2)));
        let reverse = PayloadSides::Inbound {
            inbound: side(Some(2)),
        }
        .with_outbound(side(Some(1)));
        assert_eq!(forward, reverse);
    }

    #[test]
    fn app_tags_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&App::StargateV2BusPassenger).unwrap(),
            "\"StargateV2-bus-passenger\""
        );
        assert_eq!(
            serde_json::to_string(&App::StargateV2InboundBuffer).unwrap(),
            "\"StargateV2-inbound-buffer\""
        );
    }
}
