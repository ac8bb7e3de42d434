//! Typed rendition of the subscriber's event tuples.
//!
//! The subscriber delivers one record per matched log: shared block/tx
//! metadata plus protocol-specific params. Params arrive here already bound
//! to one variant per `(protocol, event kind)`, so handlers never touch an
//! untyped map.

use alloy::primitives::{Address, B256, U256};

use bridge_correlator_entity::Protocol;

/// Block and transaction context shared by every event.
#[derive(Clone, Debug)]
pub struct EventMeta {
    pub chain_id: u64,
    pub block_number: u64,
    /// Block timestamp, seconds since the Unix epoch.
    pub block_timestamp: u64,
    pub tx_hash: B256,
    pub log_index: u64,
}

/// One delivered log.
#[derive(Clone, Debug)]
pub struct RawEvent {
    pub meta: EventMeta,
    pub kind: EventKind,
}

#[derive(Clone, Debug)]
pub enum EventKind {
    LayerZero(LayerZeroEvent),
    Stargate(StargateEvent),
    Across(AcrossEvent),
    Cctp(CctpEvent),
    Agglayer(AgglayerEvent),
}

impl EventKind {
    /// Transport protocol whose envelope space this event touches.
    pub fn protocol(&self) -> Protocol {
        match self {
            EventKind::LayerZero(_) | EventKind::Stargate(_) => Protocol::Layerzero,
            EventKind::Across(_) => Protocol::Across,
            EventKind::Cctp(_) => Protocol::Cctp,
            EventKind::Agglayer(_) => Protocol::Agglayer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::LayerZero(event) => event.name(),
            EventKind::Stargate(event) => event.name(),
            EventKind::Across(event) => event.name(),
            EventKind::Cctp(event) => event.name(),
            EventKind::Agglayer(event) => event.name(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum LayerZeroEvent {
    /// v2 `PacketSent` (also the Uln301 path, which shares the packet
    /// shape). `encoded_packet` is the hex packet: 81-byte header plus
    /// inner payload.
    PacketSent { encoded_packet: String },
    /// v2 `PacketDelivered`: origin tuple plus the local receiver.
    PacketDelivered {
        src_eid: u32,
        sender: B256,
        nonce: u64,
        receiver: Address,
    },
    /// v1 UltraLight `Packet`: the raw packed packet.
    PacketSentV1 { encoded_packet: String },
    /// v1 UltraLight `PacketReceived`.
    PacketReceivedV1 {
        src_chain_id: u16,
        sender: Address,
        receiver: Address,
        nonce: u64,
    },
}

impl LayerZeroEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LayerZeroEvent::PacketSent { .. } => "PacketSent",
            LayerZeroEvent::PacketDelivered { .. } => "PacketDelivered",
            LayerZeroEvent::PacketSentV1 { .. } => "Packet",
            LayerZeroEvent::PacketReceivedV1 { .. } => "PacketReceived",
        }
    }
}

#[derive(Clone, Debug)]
pub enum StargateEvent {
    /// `OFTSent`. A zero GUID marks a bus passenger; a real GUID a taxi
    /// transfer. `token` is the emitting OFT contract.
    OftSent {
        guid: B256,
        dst_eid: u32,
        from: Address,
        amount_sent_ld: U256,
        amount_received_ld: U256,
        token: Option<Address>,
    },
    /// `OFTReceived` on the destination chain. Carries no passenger-level
    /// identifier; the receiver address is the only intra-envelope key.
    OftReceived {
        guid: B256,
        src_eid: u32,
        to: Address,
        amount_received_ld: U256,
        token: Option<Address>,
    },
    /// `BusRode`: one passenger boarded, `passenger` is the packed 43-byte
    /// record as hex.
    BusRode {
        dst_eid: u32,
        ticket_id: u64,
        fare: U256,
        passenger: String,
    },
    /// `BusDriven`: the bus departed under a real GUID, transporting
    /// `num_passengers` tickets starting at `start_ticket_id`.
    BusDriven {
        guid: B256,
        dst_eid: u32,
        start_ticket_id: u64,
        num_passengers: u32,
    },
}

impl StargateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StargateEvent::OftSent { .. } => "OFTSent",
            StargateEvent::OftReceived { .. } => "OFTReceived",
            StargateEvent::BusRode { .. } => "BusRode",
            StargateEvent::BusDriven { .. } => "BusDriven",
        }
    }
}

#[derive(Clone, Debug)]
pub enum AcrossEvent {
    FundsDeposited {
        deposit_id: u64,
        destination_chain_id: u64,
        input_token: Address,
        output_token: Address,
        input_amount: U256,
        output_amount: U256,
        depositor: Address,
        recipient: Address,
        message: Option<String>,
    },
    /// `FilledRelay` / `FilledV3Relay`; both carry the origin tuple.
    FilledRelay {
        origin_chain_id: u64,
        deposit_id: u64,
        output_token: Address,
        output_amount: U256,
        recipient: Address,
        relayer: Address,
    },
}

impl AcrossEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AcrossEvent::FundsDeposited { .. } => "FundsDeposited",
            AcrossEvent::FilledRelay { .. } => "FilledRelay",
        }
    }
}

#[derive(Clone, Debug)]
pub enum CctpEvent {
    DepositForBurn {
        nonce: u64,
        burn_token: Address,
        amount: U256,
        depositor: Address,
        mint_recipient: B256,
        destination_domain: u32,
    },
    MessageReceived {
        source_domain: u32,
        nonce: u64,
        sender: B256,
        /// Raw v1 burn body as hex.
        message_body: String,
    },
    DepositForBurnV2 {
        burn_token: Address,
        amount: U256,
        depositor: Address,
        mint_recipient: B256,
        destination_domain: u32,
        max_fee: U256,
        hook_data: String,
    },
    MessageReceivedV2 {
        source_domain: u32,
        nonce: B256,
        sender: B256,
        finality_threshold_executed: u32,
        /// Raw v2 burn body as hex.
        message_body: String,
    },
}

impl CctpEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CctpEvent::DepositForBurn { .. } => "DepositForBurn",
            CctpEvent::MessageReceived { .. } => "MessageReceived",
            CctpEvent::DepositForBurnV2 { .. } => "DepositForBurnV2",
            CctpEvent::MessageReceivedV2 { .. } => "MessageReceivedV2",
        }
    }
}

#[derive(Clone, Debug)]
pub enum AgglayerEvent {
    BridgeEvent {
        leaf_type: u8,
        origin_network: u32,
        origin_address: Address,
        destination_network: u32,
        destination_address: Address,
        amount: U256,
        metadata: Option<String>,
        deposit_count: u32,
    },
    ClaimEvent {
        global_index: U256,
        origin_network: u32,
        origin_address: Address,
        destination_address: Address,
        amount: U256,
    },
}

impl AgglayerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AgglayerEvent::BridgeEvent { .. } => "BridgeEvent",
            AgglayerEvent::ClaimEvent { .. } => "ClaimEvent",
        }
    }
}
