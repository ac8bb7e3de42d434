//! Agglayer (unified bridge) handlers. No emitted message id exists; both
//! legs derive a composite key from the asset origin, destination, amount,
//! and deposit count, the latter recovered on the claim side from the
//! `globalIndex` bitfield.

use alloy::primitives::{Address, Bytes, U256};
use bridge_correlator_entity::{
    App, CrosschainMessage, PayloadSide, PayloadType, Protocol, Route,
};

use crate::decode::{decode_bridge_mint, decode_global_index, decode_hex, decode_token_metadata};
use crate::engine::CorrelationEngine;
use crate::envelope;
use crate::error::EngineError;
use crate::event::{AgglayerEvent, EventMeta};
use crate::identity::agglayer_key;
use crate::payload::{self, PayloadRef};
use crate::store::EntityStore;

/// Leaf type of an asset bridge; other leaves carry arbitrary messages.
const LEAF_TYPE_ASSET: u8 = 0;

pub(crate) async fn handle<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    event: &AgglayerEvent,
) -> Result<(), EngineError> {
    match event {
        AgglayerEvent::BridgeEvent {
            leaf_type,
            origin_network,
            origin_address,
            destination_network,
            destination_address,
            amount,
            metadata,
            deposit_count,
        } => {
            bridge_event(
                engine,
                meta,
                *leaf_type,
                *origin_network,
                *origin_address,
                *destination_network,
                *destination_address,
                *amount,
                metadata.as_deref(),
                *deposit_count,
            )
            .await
        }
        AgglayerEvent::ClaimEvent {
            global_index,
            origin_network,
            origin_address,
            destination_address,
            amount,
        } => {
            claim_event(
                engine,
                meta,
                *global_index,
                *origin_network,
                *origin_address,
                *destination_address,
                *amount,
            )
            .await
        }
    }
}

fn payload_ref(key: &str, payload_type: PayloadType) -> PayloadRef {
    let envelope_id = CrosschainMessage::id_for(Protocol::Agglayer, key);
    PayloadRef {
        id: format!("{envelope_id}-0"),
        app: App::Agglayer,
        payload_type,
        transporting_protocol: Protocol::Agglayer,
        envelope_id,
    }
}

fn network_route(
    chains: &crate::chains::ChainRegistry,
    src_network: Option<u32>,
    dst_network: Option<u32>,
) -> Route {
    let slug = |network: u32| {
        chains
            .entries()
            .iter()
            .find(|entry| entry.agglayer_network == Some(network))
            .map(|entry| entry.slug.clone())
    };
    Route {
        src_eid: src_network,
        dst_eid: dst_network,
        src_slug: src_network.and_then(slug),
        dst_slug: dst_network.and_then(slug),
    }
}

#[allow(clippy::too_many_arguments)]
async fn bridge_event<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    leaf_type: u8,
    origin_network: u32,
    origin_address: Address,
    destination_network: u32,
    destination_address: Address,
    amount: U256,
    metadata: Option<&str>,
    deposit_count: u32,
) -> Result<(), EngineError> {
    let key = agglayer_key(
        origin_network,
        &origin_address,
        &destination_address,
        &amount,
        deposit_count,
    );
    let payload_type = if leaf_type == LEAF_TYPE_ASSET {
        PayloadType::Transfer
    } else {
        PayloadType::Message
    };

    let raw = metadata
        .map(decode_hex)
        .transpose()?
        .map(Bytes::from)
        .filter(|bytes| !bytes.is_empty());

    // Asset leaves with metadata carry the wrapped token's
    // (name, symbol, decimals); a malformed block fails the event. Message
    // leaves carry arbitrary calldata and are only probed for mint data.
    if let Some(raw) = raw.as_ref().map(|bytes| format!("0x{}", hex::encode(bytes))) {
        if payload_type == PayloadType::Transfer {
            let token = decode_token_metadata(&raw)?;
            tracing::debug!(
                name = %token.name,
                symbol = %token.symbol,
                decimals = token.decimals,
                origin_network,
                "bridged asset metadata"
            );
        } else if let Ok((token, recipient, _, mint_amount, _)) = decode_bridge_mint(&raw) {
            tracing::debug!(
                token = %token,
                recipient = %recipient,
                amount = %mint_amount,
                "bridge message carries mint data"
            );
        }
    }

    let local_network = engine
        .chains()
        .by_chain_id(meta.chain_id)
        .ok()
        .and_then(|entry| entry.agglayer_network);

    envelope::upsert_outbound(
        engine.store(),
        Protocol::Agglayer,
        &key,
        meta,
        None,
        network_route(engine.chains(), local_network, Some(destination_network)),
    )
    .await?;

    let created = payload::upsert_payload_outbound(
        engine.store(),
        &payload_ref(&key, payload_type),
        PayloadSide {
            asset: Some(origin_address),
            amount: Some(amount),
            actor: None,
            target: Some(destination_address),
            raw,
        },
    )
    .await?;

    tracing::debug!(
        payload_id = %created.id,
        origin_network,
        destination_network,
        deposit_count,
        "processed BridgeEvent"
    );
    Ok(())
}

async fn claim_event<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    global_index: U256,
    origin_network: u32,
    origin_address: Address,
    destination_address: Address,
    amount: U256,
) -> Result<(), EngineError> {
    let index = decode_global_index(global_index);
    // The bridge event's depositCount equals the claim's localRootIndex.
    let key = agglayer_key(
        origin_network,
        &origin_address,
        &destination_address,
        &amount,
        index.local_root_index,
    );

    let local_network = engine
        .chains()
        .by_chain_id(meta.chain_id)
        .ok()
        .and_then(|entry| entry.agglayer_network);

    let message = envelope::upsert_inbound(
        engine.store(),
        Protocol::Agglayer,
        &key,
        meta,
        Some(destination_address),
        network_route(engine.chains(), Some(index.source_network()), local_network),
    )
    .await?;

    let updated = payload::upsert_payload_inbound(
        engine.store(),
        &payload_ref(&key, PayloadType::Transfer),
        PayloadSide {
            asset: Some(origin_address),
            amount: Some(amount),
            actor: Some(destination_address),
            target: None,
            raw: None,
        },
    )
    .await?;

    tracing::debug!(
        payload_id = %updated.id,
        envelope_matched = message.matched(),
        local_root_index = index.local_root_index,
        source_network = index.source_network(),
        "processed ClaimEvent"
    );
    Ok(())
}
