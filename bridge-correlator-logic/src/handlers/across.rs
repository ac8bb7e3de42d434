//! Across handlers: deposit/fill pairs keyed by `originChainId-depositId`.

use alloy::primitives::{Address, Bytes, U256};
use bridge_correlator_entity::{
    App, CrosschainMessage, PayloadSide, PayloadType, Protocol, Route,
};

use crate::decode::decode_hex;
use crate::engine::CorrelationEngine;
use crate::envelope;
use crate::error::EngineError;
use crate::event::{AcrossEvent, EventMeta};
use crate::identity::across_key;
use crate::payload::{self, PayloadRef};
use crate::store::EntityStore;

pub(crate) async fn handle<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    event: &AcrossEvent,
) -> Result<(), EngineError> {
    match event {
        AcrossEvent::FundsDeposited {
            deposit_id,
            destination_chain_id,
            input_token,
            output_token: _,
            input_amount,
            output_amount: _,
            depositor,
            recipient,
            message,
        } => {
            funds_deposited(
                engine,
                meta,
                *deposit_id,
                *destination_chain_id,
                *input_token,
                *input_amount,
                *depositor,
                *recipient,
                message.as_deref(),
            )
            .await
        }
        AcrossEvent::FilledRelay {
            origin_chain_id,
            deposit_id,
            output_token,
            output_amount,
            recipient,
            relayer: _,
        } => {
            filled_relay(
                engine,
                meta,
                *origin_chain_id,
                *deposit_id,
                *output_token,
                *output_amount,
                *recipient,
            )
            .await
        }
    }
}

fn payload_ref(key: &str) -> PayloadRef {
    let envelope_id = CrosschainMessage::id_for(Protocol::Across, key);
    PayloadRef {
        id: format!("{envelope_id}-0"),
        app: App::Across,
        payload_type: PayloadType::Transfer,
        transporting_protocol: Protocol::Across,
        envelope_id,
    }
}

/// Across routes are expressed in EVM chain ids directly.
fn chain_route(
    engine_chains: &crate::chains::ChainRegistry,
    src_chain_id: u64,
    dst_chain_id: u64,
) -> Route {
    Route {
        src_eid: u32::try_from(src_chain_id).ok(),
        dst_eid: u32::try_from(dst_chain_id).ok(),
        src_slug: engine_chains.slug_for_chain(src_chain_id),
        dst_slug: engine_chains.slug_for_chain(dst_chain_id),
    }
}

#[allow(clippy::too_many_arguments)]
async fn funds_deposited<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    deposit_id: u64,
    destination_chain_id: u64,
    input_token: Address,
    input_amount: U256,
    depositor: Address,
    recipient: Address,
    message: Option<&str>,
) -> Result<(), EngineError> {
    let key = across_key(meta.chain_id, deposit_id);
    let raw = message
        .map(decode_hex)
        .transpose()?
        .map(Bytes::from)
        .filter(|bytes| !bytes.is_empty());

    envelope::upsert_outbound(
        engine.store(),
        Protocol::Across,
        &key,
        meta,
        Some(depositor),
        chain_route(engine.chains(), meta.chain_id, destination_chain_id),
    )
    .await?;

    let created = payload::upsert_payload_outbound(
        engine.store(),
        &payload_ref(&key),
        PayloadSide {
            asset: Some(input_token),
            amount: Some(input_amount),
            actor: Some(depositor),
            target: Some(recipient),
            raw,
        },
    )
    .await?;

    tracing::debug!(
        payload_id = %created.id,
        deposit_id,
        destination_chain_id,
        chain_id = meta.chain_id,
        "processed FundsDeposited"
    );
    Ok(())
}

async fn filled_relay<S: EntityStore>(
    engine: &CorrelationEngine<S>,
    meta: &EventMeta,
    origin_chain_id: u64,
    deposit_id: u64,
    output_token: Address,
    output_amount: U256,
    recipient: Address,
) -> Result<(), EngineError> {
    let key = across_key(origin_chain_id, deposit_id);

    let message = envelope::upsert_inbound(
        engine.store(),
        Protocol::Across,
        &key,
        meta,
        Some(recipient),
        chain_route(engine.chains(), origin_chain_id, meta.chain_id),
    )
    .await?;

    let updated = payload::upsert_payload_inbound(
        engine.store(),
        &payload_ref(&key),
        PayloadSide {
            asset: Some(output_token),
            amount: Some(output_amount),
            actor: Some(recipient),
            target: None,
            raw: None,
        },
    )
    .await?;

    tracing::debug!(
        payload_id = %updated.id,
        envelope_matched = message.matched(),
        payload_matched = updated.matched(),
        origin_chain_id,
        deposit_id,
        "processed FilledRelay"
    );
    Ok(())
}
