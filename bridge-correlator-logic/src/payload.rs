//! Payload upsert: one `AppPayload` per user-visible transfer, linked to
//! its transporting envelope. Mirrors the envelope upsert one layer up.

use bridge_correlator_entity::{App, AppPayload, PayloadSide, PayloadSides, PayloadType, Protocol};

use crate::error::EngineError;
use crate::store::EntityStore;

enum Side {
    Outbound,
    Inbound,
}

/// Identity of a payload, fixed at creation.
#[derive(Clone, Debug)]
pub struct PayloadRef {
    pub id: String,
    pub app: App,
    pub payload_type: PayloadType,
    pub transporting_protocol: Protocol,
    /// Envelope id; also used as the `crosschain_message_id` foreign key.
    pub envelope_id: String,
}

pub async fn upsert_payload_outbound<S: EntityStore + ?Sized>(
    store: &S,
    payload: &PayloadRef,
    outbound: PayloadSide,
) -> Result<AppPayload, EngineError> {
    upsert_side(store, payload, outbound, Side::Outbound).await
}

pub async fn upsert_payload_inbound<S: EntityStore + ?Sized>(
    store: &S,
    payload: &PayloadRef,
    inbound: PayloadSide,
) -> Result<AppPayload, EngineError> {
    upsert_side(store, payload, inbound, Side::Inbound).await
}

async fn upsert_side<S: EntityStore + ?Sized>(
    store: &S,
    payload: &PayloadRef,
    side_data: PayloadSide,
    side: Side,
) -> Result<AppPayload, EngineError> {
    let existing = store.get_payload(&payload.id).await?;

    let next = match existing {
        None => AppPayload {
            id: payload.id.clone(),
            app: payload.app,
            payload_type: payload.payload_type,
            transporting_protocol: payload.transporting_protocol,
            transporting_message_id: payload.envelope_id.clone(),
            crosschain_message_id: payload.envelope_id.clone(),
            sides: match side {
                Side::Outbound => PayloadSides::Outbound {
                    outbound: side_data,
                },
                Side::Inbound => PayloadSides::Inbound { inbound: side_data },
            },
        },
        Some(mut existing) => {
            existing.sides = match side {
                Side::Outbound => existing.sides.with_outbound(side_data),
                Side::Inbound => existing.sides.with_inbound(side_data),
            };
            existing
        }
    };

    if next.matched() {
        tracing::debug!(payload_id = %next.id, app = ?next.app, "payload matched");
    }

    store.put_payload(&next).await?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use alloy::primitives::{U256, address};
    use pretty_assertions::assert_eq;

    fn payload_ref() -> PayloadRef {
        PayloadRef {
            id: "across:1-7-0".into(),
            app: App::Across,
            payload_type: PayloadType::Transfer,
            transporting_protocol: Protocol::Across,
            envelope_id: "across:1-7".into(),
        }
    }

    fn side(amount: u64, actor: [u8; 20]) -> PayloadSide {
        PayloadSide {
            asset: Some(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")),
            amount: Some(U256::from(amount)),
            actor: Some(actor.into()),
            target: None,
            raw: None,
        }
    }

    #[tokio::test]
    async fn sides_pair_in_either_order_and_never_overwrite() {
        let outbound = side(1000, [0x0d; 20]);
        let inbound = side(990, [0x0e; 20]);

        let forward = MemoryStore::new();
        upsert_payload_outbound(&forward, &payload_ref(), outbound.clone())
            .await
            .unwrap();
        let paired = upsert_payload_inbound(&forward, &payload_ref(), inbound.clone())
            .await
            .unwrap();
        assert!(paired.matched());

        let reverse = MemoryStore::new();
        upsert_payload_inbound(&reverse, &payload_ref(), inbound.clone())
            .await
            .unwrap();
        let paired_reverse = upsert_payload_outbound(&reverse, &payload_ref(), outbound.clone())
            .await
            .unwrap();
        assert_eq!(paired, paired_reverse);

        let replayed = upsert_payload_outbound(&forward, &payload_ref(), side(1, [0xff; 20]))
            .await
            .unwrap();
        assert_eq!(replayed, paired);
    }

    #[tokio::test]
    async fn foreign_key_points_at_the_envelope() {
        let store = MemoryStore::new();
        let created = upsert_payload_outbound(&store, &payload_ref(), side(1000, [0x0d; 20]))
            .await
            .unwrap();
        assert_eq!(created.crosschain_message_id, "across:1-7");
        assert_eq!(created.transporting_message_id, "across:1-7");
        assert!(!created.matched());
    }
}
