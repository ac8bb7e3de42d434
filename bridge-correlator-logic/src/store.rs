//! Entity store surface.
//!
//! The engine owns no entity state: every handler reads current state from
//! the store, computes the next state, and writes it back. [`MemoryStore`]
//! is the bundled implementation; persistent backings implement the same
//! trait. Entities cross the boundary through serde, which is where address
//! fields take their canonical checksummed string form.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use bridge_correlator_entity::{AppPayload, BusManifest, BusPassengerDraft, CrosschainMessage};

use crate::error::StoreError;

/// Keyed upsert-and-query surface over the four entity types.
///
/// `payloads_by_envelope` is the one non-id lookup: an exact match on
/// `transporting_message_id`, used by bus coalescing to find inbound
/// buffers. `delete_payload` removes a buffer once it has been rebound to
/// its terminal passenger id.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_message(&self, id: &str) -> Result<Option<CrosschainMessage>, StoreError>;
    async fn put_message(&self, message: &CrosschainMessage) -> Result<(), StoreError>;

    async fn get_payload(&self, id: &str) -> Result<Option<AppPayload>, StoreError>;
    async fn put_payload(&self, payload: &AppPayload) -> Result<(), StoreError>;
    async fn delete_payload(&self, id: &str) -> Result<(), StoreError>;
    async fn payloads_by_envelope(
        &self,
        transporting_message_id: &str,
    ) -> Result<Vec<AppPayload>, StoreError>;

    async fn get_passenger_draft(&self, id: &str)
    -> Result<Option<BusPassengerDraft>, StoreError>;
    async fn put_passenger_draft(&self, draft: &BusPassengerDraft) -> Result<(), StoreError>;

    async fn get_bus_manifest(&self, id: &str) -> Result<Option<BusManifest>, StoreError>;
    async fn put_bus_manifest(&self, manifest: &BusManifest) -> Result<(), StoreError>;
}

/// In-memory store backed by per-entity `DashMap`s.
///
/// Entities are held as JSON values and round-tripped through serde on
/// every access, so callers observe exactly what a persistent store would
/// hand back.
#[derive(Default)]
pub struct MemoryStore {
    messages: DashMap<String, Value>,
    payloads: DashMap<String, Value>,
    passenger_drafts: DashMap<String, Value>,
    bus_manifests: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all envelopes, for inspection and tests.
    pub fn all_messages(&self) -> Result<Vec<CrosschainMessage>, StoreError> {
        self.messages
            .iter()
            .map(|entry| from_value(entry.value()))
            .collect()
    }

    /// Snapshot of all payloads, for inspection and tests.
    pub fn all_payloads(&self) -> Result<Vec<AppPayload>, StoreError> {
        self.payloads
            .iter()
            .map(|entry| from_value(entry.value()))
            .collect()
    }
}

fn to_value<T: Serialize>(entity: &T) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(|err| StoreError(err.into()))
}

fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, StoreError> {
    serde_json::from_value(value.clone()).map_err(|err| StoreError(err.into()))
}

fn get_from<T: DeserializeOwned>(
    map: &DashMap<String, Value>,
    id: &str,
) -> Result<Option<T>, StoreError> {
    map.get(id).map(|entry| from_value(entry.value())).transpose()
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_message(&self, id: &str) -> Result<Option<CrosschainMessage>, StoreError> {
        get_from(&self.messages, id)
    }

    async fn put_message(&self, message: &CrosschainMessage) -> Result<(), StoreError> {
        self.messages.insert(message.id.clone(), to_value(message)?);
        Ok(())
    }

    async fn get_payload(&self, id: &str) -> Result<Option<AppPayload>, StoreError> {
        get_from(&self.payloads, id)
    }

    async fn put_payload(&self, payload: &AppPayload) -> Result<(), StoreError> {
        self.payloads.insert(payload.id.clone(), to_value(payload)?);
        Ok(())
    }

    async fn delete_payload(&self, id: &str) -> Result<(), StoreError> {
        self.payloads.remove(id);
        Ok(())
    }

    async fn payloads_by_envelope(
        &self,
        transporting_message_id: &str,
    ) -> Result<Vec<AppPayload>, StoreError> {
        let mut matching: Vec<AppPayload> = self
            .payloads
            .iter()
            .filter(|entry| {
                entry.value().get("transporting_message_id").and_then(Value::as_str)
                    == Some(transporting_message_id)
            })
            .map(|entry| from_value(entry.value()))
            .collect::<Result<_, _>>()?;
        // DashMap iteration order is arbitrary; callers need determinism.
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }

    async fn get_passenger_draft(
        &self,
        id: &str,
    ) -> Result<Option<BusPassengerDraft>, StoreError> {
        get_from(&self.passenger_drafts, id)
    }

    async fn put_passenger_draft(&self, draft: &BusPassengerDraft) -> Result<(), StoreError> {
        self.passenger_drafts.insert(draft.id.clone(), to_value(draft)?);
        Ok(())
    }

    async fn get_bus_manifest(&self, id: &str) -> Result<Option<BusManifest>, StoreError> {
        get_from(&self.bus_manifests, id)
    }

    async fn put_bus_manifest(&self, manifest: &BusManifest) -> Result<(), StoreError> {
        self.bus_manifests
            .insert(manifest.id.clone(), to_value(manifest)?);
        Ok(())
    }
}
