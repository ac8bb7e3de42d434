//! LayerZero packet handlers: the envelope writers for everything that
//! rides a LayerZero endpoint, including Stargate traffic.

use bridge_correlator_entity::{Protocol, Route};

use super::route_between;
use crate::decode::{decode_packet_v1, decode_packet_v2};
use crate::engine::CorrelationEngine;
use crate::envelope;
use crate::error::EngineError;
use crate::event::{EventMeta, LayerZeroEvent};
use crate::identity::{guid_key, is_sentinel_guid, layerzero_guid, layerzero_v1_key};
use crate::store::EntityStore;

pub(crate) async fn handle<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    event: &LayerZeroEvent,
) -> Result<(), EngineError> {
    match event {
        LayerZeroEvent::PacketSent { encoded_packet } => {
            packet_sent(engine, meta, encoded_packet).await
        }
        LayerZeroEvent::PacketDelivered {
            src_eid,
            sender,
            nonce,
            receiver,
        } => packet_delivered(engine, meta, *src_eid, sender, *nonce, receiver).await,
        LayerZeroEvent::PacketSentV1 { encoded_packet } => {
            packet_sent_v1(engine, meta, encoded_packet).await
        }
        LayerZeroEvent::PacketReceivedV1 {
            src_chain_id,
            sender,
            receiver,
            nonce,
        } => packet_received_v1(engine, meta, *src_chain_id, sender, receiver, *nonce).await,
    }
}

/// Source leg: the GUID is recomputed from the decoded header.
async fn packet_sent<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    encoded_packet: &str,
) -> Result<(), EngineError> {
    let packet = decode_packet_v2(encoded_packet)?;
    let guid = layerzero_guid(
        packet.nonce,
        packet.src_eid,
        &packet.sender,
        packet.dst_eid,
        &packet.receiver,
    );
    if is_sentinel_guid(&guid) {
        return Err(EngineError::State("PacketSent with all-zero guid".into()));
    }

    let message = envelope::upsert_outbound(
        engine.store(),
        Protocol::Layerzero,
        &guid_key(&guid),
        meta,
        Some(packet.sender_address()),
        route_between(engine.chains(), Some(packet.src_eid), Some(packet.dst_eid)),
    )
    .await?;

    tracing::debug!(
        envelope_id = %message.id,
        nonce = packet.nonce,
        src_eid = packet.src_eid,
        dst_eid = packet.dst_eid,
        chain_id = meta.chain_id,
        "processed PacketSent"
    );
    Ok(())
}

/// Destination leg: the GUID is always recomputed from the origin tuple
/// plus the local endpoint id.
async fn packet_delivered<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    src_eid: u32,
    sender: &alloy::primitives::B256,
    nonce: u64,
    receiver: &alloy::primitives::Address,
) -> Result<(), EngineError> {
    let local_eid = engine.chains().eid_for_chain(meta.chain_id)?;
    let guid = layerzero_guid(nonce, src_eid, sender, local_eid, &receiver.into_word());
    if is_sentinel_guid(&guid) {
        return Err(EngineError::State(
            "PacketDelivered with all-zero guid".into(),
        ));
    }

    let message = envelope::upsert_inbound(
        engine.store(),
        Protocol::Layerzero,
        &guid_key(&guid),
        meta,
        Some(*receiver),
        route_between(engine.chains(), Some(src_eid), Some(local_eid)),
    )
    .await?;

    tracing::debug!(
        envelope_id = %message.id,
        matched = message.matched(),
        nonce,
        src_eid,
        dst_eid = local_eid,
        chain_id = meta.chain_id,
        "processed PacketDelivered"
    );
    Ok(())
}

/// v1 UltraLight source leg. v1 emits no GUID; the key is a digest over
/// the packed header fields.
async fn packet_sent_v1<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    encoded_packet: &str,
) -> Result<(), EngineError> {
    let packet = decode_packet_v1(encoded_packet)?;
    let key = layerzero_v1_key(
        packet.nonce,
        packet.src_chain_id,
        &packet.sender,
        packet.dst_chain_id,
        &packet.receiver,
    );

    let route = Route {
        src_eid: Some(packet.src_chain_id as u32),
        dst_eid: Some(packet.dst_chain_id as u32),
        src_slug: engine.chains().slug_for_v1_id(packet.src_chain_id),
        dst_slug: engine.chains().slug_for_v1_id(packet.dst_chain_id),
    };
    let message = envelope::upsert_outbound(
        engine.store(),
        Protocol::Layerzero,
        &key,
        meta,
        Some(packet.sender),
        route,
    )
    .await?;

    tracing::debug!(
        envelope_id = %message.id,
        nonce = packet.nonce,
        src_chain_id = packet.src_chain_id,
        dst_chain_id = packet.dst_chain_id,
        "processed v1 Packet"
    );
    Ok(())
}

async fn packet_received_v1<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    src_chain_id: u16,
    sender: &alloy::primitives::Address,
    receiver: &alloy::primitives::Address,
    nonce: u64,
) -> Result<(), EngineError> {
    let local_v1_id = engine.chains().v1_id_for_chain(meta.chain_id)?;
    let key = layerzero_v1_key(nonce, src_chain_id, sender, local_v1_id, receiver);

    let route = Route {
        src_eid: Some(src_chain_id as u32),
        dst_eid: Some(local_v1_id as u32),
        src_slug: engine.chains().slug_for_v1_id(src_chain_id),
        dst_slug: engine.chains().slug_for_v1_id(local_v1_id),
    };
    let message = envelope::upsert_inbound(
        engine.store(),
        Protocol::Layerzero,
        &key,
        meta,
        Some(*receiver),
        route,
    )
    .await?;

    tracing::debug!(
        envelope_id = %message.id,
        matched = message.matched(),
        nonce,
        src_chain_id,
        "processed v1 PacketReceived"
    );
    Ok(())
}
