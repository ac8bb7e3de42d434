//! Stargate v2 handlers.
//!
//! Taxi mode (one transfer per envelope, real GUID on `OFTSent`) goes
//! straight through the payload upsert. Bus mode coalesces many passengers
//! into one envelope: outbound state is staged per passenger in
//! `BusPassengerDraft` records, the `BusDriven` manifest names the ticket
//! range an envelope transports, and inbound `OFTReceived` events, which
//! carry no passenger identifier, are resolved against the staged
//! passenger receivers. Envelope fields are written by the LayerZero packet
//! handlers only; nothing here touches them.

use alloy::primitives::{Address, B256, U256};
use itertools::Itertools;

use bridge_correlator_entity::{
    App, AppPayload, BusManifest, BusPassengerDraft, CrosschainMessage, PayloadSide, PayloadSides,
    PayloadType, Protocol,
};

use crate::decode::decode_bus_passenger;
use crate::engine::CorrelationEngine;
use crate::error::EngineError;
use crate::event::{EventMeta, StargateEvent};
use crate::identity::{guid_key, is_sentinel_guid};
use crate::metrics;
use crate::payload::{self, PayloadRef};
use crate::store::EntityStore;

/// Id prefix of terminal bus passenger payloads.
const BUS_PASSENGER_PREFIX: &str = "stargatev2-bus-passenger";

pub(crate) async fn handle<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    event: &StargateEvent,
) -> Result<(), EngineError> {
    match event {
        StargateEvent::OftSent {
            guid,
            dst_eid,
            from,
            amount_sent_ld,
            amount_received_ld,
            token,
        } => {
            if is_sentinel_guid(guid) {
                bus_oft_sent(engine, meta, *from, *amount_sent_ld, *amount_received_ld, *token)
                    .await
            } else {
                taxi_outbound(
                    engine,
                    guid,
                    *dst_eid,
                    *from,
                    *amount_sent_ld,
                    *token,
                )
                .await
            }
        }
        StargateEvent::OftReceived {
            guid,
            src_eid,
            to,
            amount_received_ld,
            token,
        } => oft_received(engine, meta, guid, *src_eid, *to, *amount_received_ld, *token).await,
        StargateEvent::BusRode {
            dst_eid,
            ticket_id,
            fare,
            passenger,
        } => bus_rode(engine, meta, *dst_eid, *ticket_id, *fare, passenger).await,
        StargateEvent::BusDriven {
            guid,
            dst_eid,
            start_ticket_id,
            num_passengers,
        } => bus_driven(engine, meta, guid, *dst_eid, *start_ticket_id, *num_passengers).await,
    }
}

fn envelope_id(guid: &B256) -> String {
    CrosschainMessage::id_for(Protocol::Layerzero, &guid_key(guid))
}

fn taxi_ref(guid: &B256) -> PayloadRef {
    let envelope_id = envelope_id(guid);
    PayloadRef {
        id: format!("{envelope_id}-taxi"),
        app: App::StargateV2Taxi,
        payload_type: PayloadType::Transfer,
        transporting_protocol: Protocol::Layerzero,
        envelope_id,
    }
}

fn passenger_ref(src_eid: u32, dst_eid: u32, ticket_id: u64, guid: &B256) -> PayloadRef {
    PayloadRef {
        id: format!("{BUS_PASSENGER_PREFIX}:{src_eid}:{dst_eid}:{ticket_id}"),
        app: App::StargateV2BusPassenger,
        payload_type: PayloadType::Transfer,
        transporting_protocol: Protocol::Layerzero,
        envelope_id: envelope_id(guid),
    }
}

/// `OFTSent` with a real GUID: a single-transfer taxi.
async fn taxi_outbound<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    guid: &B256,
    dst_eid: u32,
    from: Address,
    amount_sent_ld: U256,
    token: Option<Address>,
) -> Result<(), EngineError> {
    let payload_ref = taxi_ref(guid);
    let created = payload::upsert_payload_outbound(
        engine.store(),
        &payload_ref,
        PayloadSide {
            asset: token,
            amount: Some(amount_sent_ld),
            actor: Some(from),
            target: None,
            raw: None,
        },
    )
    .await?;

    tracing::debug!(
        payload_id = %created.id,
        guid = %guid,
        dst_eid,
        "processed taxi OFTSent"
    );
    Ok(())
}

/// `BusRode`: stage the decoded passenger tuple under the source tx hash.
///
/// If the zero-GUID `OFTSent` of the same passenger was delivered first
/// (out of the documented order), its token fields are already in the
/// tx-keyed record; the passenger fields are merged in but no re-key
/// happens.
async fn bus_rode<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    dst_eid: u32,
    ticket_id: u64,
    fare: U256,
    passenger: &str,
) -> Result<(), EngineError> {
    let decoded = decode_bus_passenger(passenger)?;
    let src_eid = engine.chains().eid_for_chain(meta.chain_id)?;

    let draft_id = format!("{:#x}", meta.tx_hash);
    let mut draft = engine
        .store()
        .get_passenger_draft(&draft_id)
        .await?
        .unwrap_or_else(|| BusPassengerDraft::new(draft_id.clone(), src_eid, meta.tx_hash));

    if draft.sender.is_some() && !draft.has_passenger_fields() {
        tracing::debug!(
            tx_hash = %meta.tx_hash,
            ticket_id,
            "BusRode after OFTSent in the same tx; passenger will not be re-keyed"
        );
    }

    draft.dst_eid = Some(dst_eid);
    draft.ticket_id = Some(ticket_id);
    draft.fare = Some(fare);
    draft.passenger = Some(decoded);
    engine.store().put_passenger_draft(&draft).await?;

    tracing::debug!(
        tx_hash = %meta.tx_hash,
        ticket_id,
        dst_eid,
        receiver = %decoded.receiver_address(),
        amount_sd = decoded.amount_sd,
        "processed BusRode"
    );
    Ok(())
}

/// Zero-GUID `OFTSent`: fill the staged passenger's token fields and, when
/// the passenger tuple is already present, re-key the record to its stable
/// `(srcEid, dstEid, ticketId)` id.
async fn bus_oft_sent<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    from: Address,
    amount_sent_ld: U256,
    amount_received_ld: U256,
    token: Option<Address>,
) -> Result<(), EngineError> {
    let src_eid = engine.chains().eid_for_chain(meta.chain_id)?;
    let draft_id = format!("{:#x}", meta.tx_hash);

    let mut draft = engine
        .store()
        .get_passenger_draft(&draft_id)
        .await?
        .unwrap_or_else(|| BusPassengerDraft::new(draft_id.clone(), src_eid, meta.tx_hash));

    draft.sender = Some(from);
    draft.token = token;
    draft.amount_sent_ld = Some(amount_sent_ld);
    draft.amount_received_ld = Some(amount_received_ld);
    engine.store().put_passenger_draft(&draft).await?;

    match (draft.dst_eid, draft.ticket_id) {
        (Some(dst_eid), Some(ticket_id)) if draft.passenger.is_some() => {
            let stable = BusPassengerDraft {
                id: BusPassengerDraft::stable_id(src_eid, dst_eid, ticket_id),
                ..draft
            };
            engine.store().put_passenger_draft(&stable).await?;
            tracing::debug!(
                draft_id = %stable.id,
                tx_hash = %meta.tx_hash,
                "bus passenger staged under stable id"
            );
        }
        _ => {
            // Token leg arrived before the passenger leg; the record stays
            // tx-keyed and a later BusDriven will not find it.
            tracing::debug!(
                tx_hash = %meta.tx_hash,
                "zero-guid OFTSent before BusRode; token fields staged tx-keyed"
            );
        }
    }
    Ok(())
}

/// `BusDriven`: the envelope's GUID and ticket range are now known.
///
/// Inbound buffers that arrived ahead of this event are reconciled here:
/// each is matched to a staged passenger by receiver address, rebound to
/// the stable passenger id, and removed from the buffer space. The
/// manifest is persisted in every case so receptions arriving later can
/// resolve their passenger.
async fn bus_driven<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    guid: &B256,
    dst_eid: u32,
    start_ticket_id: u64,
    num_passengers: u32,
) -> Result<(), EngineError> {
    if is_sentinel_guid(guid) {
        return Err(EngineError::State("BusDriven with all-zero guid".into()));
    }
    let src_eid = engine.chains().eid_for_chain(meta.chain_id)?;
    let envelope_id = envelope_id(guid);
    let tickets: Vec<u64> = (start_ticket_id..start_ticket_id + num_passengers as u64).collect();

    let buffers: Vec<AppPayload> = engine
        .store()
        .payloads_by_envelope(&envelope_id)
        .await?
        .into_iter()
        .filter(|candidate| candidate.app == App::StargateV2InboundBuffer)
        .collect();

    let mut drafts = Vec::with_capacity(tickets.len());
    for ticket_id in &tickets {
        let draft = engine
            .store()
            .get_passenger_draft(&BusPassengerDraft::stable_id(src_eid, dst_eid, *ticket_id))
            .await?;
        if draft.is_none() {
            tracing::debug!(
                envelope_id = %envelope_id,
                ticket_id,
                "no staged passenger for driven ticket"
            );
        }
        drafts.push((*ticket_id, draft));
    }
    warn_on_duplicate_receivers(&envelope_id, &drafts);

    for buffer in &buffers {
        let Some(inbound) = buffer.sides.inbound().cloned() else {
            continue;
        };
        let hit = drafts.iter().find(|(_, draft)| {
            draft
                .as_ref()
                .and_then(|draft| draft.passenger)
                .map(|passenger| Some(passenger.receiver_address()) == inbound.actor)
                .unwrap_or(false)
        });
        let Some((ticket_id, Some(draft))) = hit else {
            tracing::warn!(
                envelope_id = %envelope_id,
                buffer_id = %buffer.id,
                "inbound buffer has no matching passenger"
            );
            continue;
        };

        let payload_ref = passenger_ref(src_eid, dst_eid, *ticket_id, guid);
        if engine.store().get_payload(&payload_ref.id).await?.is_none() {
            let terminal = AppPayload {
                id: payload_ref.id.clone(),
                app: payload_ref.app,
                payload_type: payload_ref.payload_type,
                transporting_protocol: payload_ref.transporting_protocol,
                transporting_message_id: payload_ref.envelope_id.clone(),
                crosschain_message_id: payload_ref.envelope_id.clone(),
                sides: PayloadSides::Complete {
                    outbound: outbound_side(draft),
                    inbound,
                },
            };
            engine.store().put_payload(&terminal).await?;
            tracing::debug!(
                payload_id = %terminal.id,
                buffer_id = %buffer.id,
                "inbound buffer rebound to passenger payload"
            );
        }
        engine.store().delete_payload(&buffer.id).await?;
    }

    engine
        .store()
        .put_bus_manifest(&BusManifest {
            id: envelope_id.clone(),
            guid: *guid,
            src_eid,
            dst_eid,
            passenger_ids: tickets,
        })
        .await?;

    tracing::debug!(
        envelope_id = %envelope_id,
        start_ticket_id,
        num_passengers,
        reconciled_buffers = buffers.len(),
        "processed BusDriven"
    );
    Ok(())
}

/// `OFTReceived`: resolve against a taxi payload, then against the staged
/// passenger manifest; an inbound reception ahead of `BusDriven` becomes a
/// buffer payload keyed by the envelope id.
async fn oft_received<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    guid: &B256,
    src_eid: u32,
    to: Address,
    amount_received_ld: U256,
    token: Option<Address>,
) -> Result<(), EngineError> {
    if is_sentinel_guid(guid) {
        return Err(EngineError::State("OFTReceived with all-zero guid".into()));
    }
    let envelope_id = envelope_id(guid);
    let inbound = PayloadSide {
        asset: token,
        amount: Some(amount_received_ld),
        actor: Some(to),
        target: None,
        raw: None,
    };

    let taxi = taxi_ref(guid);
    if engine.store().get_payload(&taxi.id).await?.is_some() {
        let updated = payload::upsert_payload_inbound(engine.store(), &taxi, inbound).await?;
        tracing::debug!(
            payload_id = %updated.id,
            matched = updated.matched(),
            "processed taxi OFTReceived"
        );
        return Ok(());
    }

    if let Some(manifest) = engine.store().get_bus_manifest(&envelope_id).await? {
        return bus_reception(engine, meta, &manifest, guid, to, inbound).await;
    }

    // Inbound arrived before BusDriven: stage the reception as a buffer
    // payload under the envelope id.
    let buffer = PayloadRef {
        id: envelope_id.clone(),
        app: App::StargateV2InboundBuffer,
        payload_type: PayloadType::Transfer,
        transporting_protocol: Protocol::Layerzero,
        envelope_id,
    };
    let created = payload::upsert_payload_inbound(engine.store(), &buffer, inbound).await?;
    tracing::debug!(
        payload_id = %created.id,
        src_eid,
        to = %to,
        "OFTReceived before BusDriven; staged inbound buffer"
    );
    Ok(())
}

/// Resolve a reception against the driven manifest: walk ticket ids in
/// order and take the first staged passenger whose receiver matches.
async fn bus_reception<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    manifest: &BusManifest,
    guid: &B256,
    to: Address,
    inbound: PayloadSide,
) -> Result<(), EngineError> {
    let mut matches = Vec::new();
    for ticket_id in &manifest.passenger_ids {
        let draft_id = BusPassengerDraft::stable_id(manifest.src_eid, manifest.dst_eid, *ticket_id);
        if let Some(draft) = engine.store().get_passenger_draft(&draft_id).await?
            && let Some(passenger) = draft.passenger
            && passenger.receiver_address() == to
        {
            matches.push((*ticket_id, draft));
        }
    }

    if matches.len() > 1 {
        metrics::BUS_AMBIGUOUS_RECEIVER
            .with_label_values(&[Protocol::Layerzero.as_str()])
            .inc();
        tracing::warn!(
            envelope_id = %manifest.id,
            receiver = %to,
            candidates = matches.len(),
            "multiple passengers share a receiver; resolving first-hit by ticket id"
        );
    }

    let Some((ticket_id, draft)) = matches.into_iter().next() else {
        return Err(EngineError::State(format!(
            "OFTReceived for {} has no matching passenger",
            manifest.id
        )));
    };

    let payload_ref = passenger_ref(manifest.src_eid, manifest.dst_eid, ticket_id, guid);
    payload::upsert_payload_outbound(engine.store(), &payload_ref, outbound_side(&draft)).await?;
    let updated = payload::upsert_payload_inbound(engine.store(), &payload_ref, inbound).await?;

    tracing::debug!(
        payload_id = %updated.id,
        matched = updated.matched(),
        ticket_id,
        tx_hash = %meta.tx_hash,
        "processed bus OFTReceived"
    );
    Ok(())
}

fn outbound_side(draft: &BusPassengerDraft) -> PayloadSide {
    PayloadSide {
        asset: draft.token,
        amount: draft.outbound_amount(),
        actor: draft.sender,
        target: draft.passenger.map(|passenger| passenger.receiver_address()),
        raw: None,
    }
}

fn warn_on_duplicate_receivers(envelope_id: &str, drafts: &[(u64, Option<BusPassengerDraft>)]) {
    let counts = drafts
        .iter()
        .filter_map(|(_, draft)| draft.as_ref())
        .filter_map(|draft| draft.passenger)
        .map(|passenger| passenger.receiver_address())
        .counts();
    for (receiver, count) in counts {
        if count > 1 {
            metrics::BUS_AMBIGUOUS_RECEIVER
                .with_label_values(&[Protocol::Layerzero.as_str()])
                .inc();
            tracing::warn!(
                envelope_id,
                receiver = %receiver,
                passengers = count,
                "driven envelope carries passengers with a duplicate receiver"
            );
        }
    }
}
