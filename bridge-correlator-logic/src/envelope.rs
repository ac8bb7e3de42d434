//! Envelope upsert: one `CrosschainMessage` per transport-layer message.
//!
//! Either leg may arrive first. A leg is written at most once; a second
//! observation of the same side leaves the record untouched. Route fields
//! merge component-wise, populated components winning.

use alloy::primitives::Address;
use bridge_correlator_entity::{CrosschainMessage, MessageLeg, MessageLegs, Protocol, Route};

use crate::error::EngineError;
use crate::event::EventMeta;
use crate::metrics;
use crate::store::EntityStore;

enum Side {
    Outbound,
    Inbound,
}

/// Record the source-chain observation of a message.
pub async fn upsert_outbound<S: EntityStore + ?Sized>(
    store: &S,
    protocol: Protocol,
    message_key: &str,
    meta: &EventMeta,
    from: Option<Address>,
    route: Route,
) -> Result<CrosschainMessage, EngineError> {
    upsert_leg(store, protocol, message_key, meta, from, route, Side::Outbound).await
}

/// Record the destination-chain observation of a message.
pub async fn upsert_inbound<S: EntityStore + ?Sized>(
    store: &S,
    protocol: Protocol,
    message_key: &str,
    meta: &EventMeta,
    to: Option<Address>,
    route: Route,
) -> Result<CrosschainMessage, EngineError> {
    upsert_leg(store, protocol, message_key, meta, to, route, Side::Inbound).await
}

async fn upsert_leg<S: EntityStore + ?Sized>(
    store: &S,
    protocol: Protocol,
    message_key: &str,
    meta: &EventMeta,
    actor: Option<Address>,
    route: Route,
    side: Side,
) -> Result<CrosschainMessage, EngineError> {
    let id = CrosschainMessage::id_for(protocol, message_key);
    let leg = MessageLeg {
        block_number: meta.block_number,
        timestamp: meta.block_timestamp,
        tx_hash: meta.tx_hash,
        chain_id: meta.chain_id,
        actor,
    };

    let existing = store.get_message(&id).await?;
    let was_matched = existing.as_ref().is_some_and(CrosschainMessage::matched);

    let message = match existing {
        None => CrosschainMessage {
            id: id.clone(),
            protocol,
            message_key: message_key.to_string(),
            legs: match side {
                Side::Outbound => MessageLegs::Outbound { outbound: leg },
                Side::Inbound => MessageLegs::Inbound { inbound: leg },
            },
            route,
        },
        Some(mut message) => {
            message.legs = match side {
                Side::Outbound => message.legs.with_outbound(leg),
                Side::Inbound => message.legs.with_inbound(leg),
            };
            message.route.merge(route);
            message
        }
    };

    if message.matched() && !was_matched {
        metrics::ENVELOPES_MATCHED
            .with_label_values(&[protocol.as_str()])
            .inc();
        if let Some(latency) = message.latency_secs() {
            metrics::MATCH_LATENCY_SECONDS
                .with_label_values(&[protocol.as_str()])
                .observe(latency as f64);
            tracing::debug!(
                envelope_id = %message.id,
                latency_secs = latency,
                "envelope matched"
            );
        }
    }

    store.put_message(&message).await?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use alloy::primitives::{B256, address};
    use pretty_assertions::assert_eq;

    fn meta(chain_id: u64, block_number: u64, timestamp: u64, tx: u8) -> EventMeta {
        EventMeta {
            chain_id,
            block_number,
            block_timestamp: timestamp,
            tx_hash: B256::repeat_byte(tx),
            log_index: 0,
        }
    }

    fn route(src: Option<u32>, dst: Option<u32>) -> Route {
        Route {
            src_eid: src,
            dst_eid: dst,
            src_slug: None,
            dst_slug: None,
        }
    }

    #[tokio::test]
    async fn either_order_reaches_the_same_matched_state() {
        let out_meta = meta(1, 100, 1000, 0x0a);
        let in_meta = meta(8453, 200, 1060, 0x0b);
        let from = Some(address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1"));
        let to = Some(address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2"));

        let forward = MemoryStore::new();
        upsert_outbound(&forward, Protocol::Layerzero, "0xk", &out_meta, from, route(Some(30101), None))
            .await
            .unwrap();
        let matched = upsert_inbound(&forward, Protocol::Layerzero, "0xk", &in_meta, to, route(None, Some(30184)))
            .await
            .unwrap();

        let reverse = MemoryStore::new();
        upsert_inbound(&reverse, Protocol::Layerzero, "0xk", &in_meta, to, route(None, Some(30184)))
            .await
            .unwrap();
        let matched_reverse =
            upsert_outbound(&reverse, Protocol::Layerzero, "0xk", &out_meta, from, route(Some(30101), None))
                .await
                .unwrap();

        assert_eq!(matched, matched_reverse);
        assert!(matched.matched());
        assert_eq!(matched.latency_secs(), Some(60));
        assert_eq!(matched.route.src_eid, Some(30101));
        assert_eq!(matched.route.dst_eid, Some(30184));
    }

    #[tokio::test]
    async fn legs_are_immutable_once_set() {
        let store = MemoryStore::new();
        let first = upsert_outbound(
            &store,
            Protocol::Across,
            "1-7",
            &meta(1, 100, 2000, 0x0c),
            None,
            Route::default(),
        )
        .await
        .unwrap();

        let second = upsert_outbound(
            &store,
            Protocol::Across,
            "1-7",
            &meta(1, 999, 9999, 0xff),
            None,
            Route::default(),
        )
        .await
        .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn negative_latency_is_surfaced_as_is() {
        let store = MemoryStore::new();
        upsert_outbound(&store, Protocol::Cctp, "0-1", &meta(1, 10, 5000, 0x01), None, Route::default())
            .await
            .unwrap();
        let matched =
            upsert_inbound(&store, Protocol::Cctp, "0-1", &meta(8453, 20, 4950, 0x02), None, Route::default())
                .await
                .unwrap();
        assert_eq!(matched.latency_secs(), Some(-50));
    }
}
