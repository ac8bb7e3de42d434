use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::address::checksummed_opt;

/// Decoded 43-byte bus passenger record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusPassenger {
    pub asset_id: u16,
    /// Receiver as emitted, left-padded to 32 bytes.
    pub receiver: B256,
    pub amount_sd: u64,
    pub native_drop: bool,
}

impl BusPassenger {
    /// Receiver collapsed to its 20-byte form.
    pub fn receiver_address(&self) -> Address {
        Address::from_word(self.receiver)
    }
}

/// Per-passenger pre-record built up on the source chain.
///
/// Keyed first by the source tx hash, then re-keyed to the stable
/// `srcEid:dstEid:ticketId` once `BusRode` and the zero-GUID `OFTSent` have
/// both been seen. Consumed by `BusDriven` / `OFTReceived` reconciliation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusPassengerDraft {
    pub id: String,
    pub src_eid: u32,
    pub tx_hash: B256,
    /// Passenger fields, present once `BusRode` has been seen.
    pub dst_eid: Option<u32>,
    pub ticket_id: Option<u64>,
    pub fare: Option<U256>,
    pub passenger: Option<BusPassenger>,
    /// Token fields, present once the zero-GUID `OFTSent` has been seen.
    #[serde(with = "checksummed_opt")]
    pub sender: Option<Address>,
    #[serde(with = "checksummed_opt")]
    pub token: Option<Address>,
    pub amount_sent_ld: Option<U256>,
    pub amount_received_ld: Option<U256>,
}

impl BusPassengerDraft {
    pub fn new(id: String, src_eid: u32, tx_hash: B256) -> Self {
        Self {
            id,
            src_eid,
            tx_hash,
            dst_eid: None,
            ticket_id: None,
            fare: None,
            passenger: None,
            sender: None,
            token: None,
            amount_sent_ld: None,
            amount_received_ld: None,
        }
    }

    /// Stable draft key once the passenger fields are known.
    pub fn stable_id(src_eid: u32, dst_eid: u32, ticket_id: u64) -> String {
        format!("{src_eid}:{dst_eid}:{ticket_id}")
    }

    pub fn has_passenger_fields(&self) -> bool {
        self.passenger.is_some() && self.ticket_id.is_some() && self.dst_eid.is_some()
    }

    /// Amount the source leg reports for the user transfer.
    pub fn outbound_amount(&self) -> Option<U256> {
        self.amount_sent_ld.or(self.fare)
    }
}

/// Per-envelope list of expected passenger ids, written by `BusDriven` and
/// consulted when inbound receptions carry no passenger identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusManifest {
    /// Envelope id (`layerzero:<guid>`).
    pub id: String,
    pub guid: B256,
    pub src_eid: u32,
    pub dst_eid: u32,
    /// Ticket ids in passenger order.
    pub passenger_ids: Vec<u64>,
}
