//! Engine entry point and per-event dispatch.
//!
//! Each delivered event is handled end to end as one atomic sequence of
//! store reads and upserts. Handlers hold no state of their own: they see
//! the event, the static chain tables, and the store.

use crate::chains::ChainRegistry;
use crate::error::{EngineError, StoreError};
use crate::event::{EventKind, RawEvent};
use crate::handlers;
use crate::metrics;
use crate::store::EntityStore;

/// What became of a delivered event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Processed,
    /// Dropped without side effects (decode/config/state failure).
    Skipped,
}

pub struct CorrelationEngine<S> {
    store: S,
    chains: ChainRegistry,
}

impl<S: EntityStore> CorrelationEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_chains(store, ChainRegistry::default())
    }

    pub fn with_chains(store: S, chains: ChainRegistry) -> Self {
        Self { store, chains }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    /// Subscriber entry point.
    ///
    /// Decode, config, and state failures skip the event: nothing was
    /// persisted, a structured record is logged, a metric is incremented.
    /// Store failures propagate so the subscriber can redeliver; handlers
    /// are idempotent across redelivery.
    pub async fn process(&self, event: &RawEvent) -> Result<Outcome, StoreError> {
        let protocol = event.kind.protocol();
        match self.handle(event).await {
            Ok(()) => {
                metrics::EVENTS_PROCESSED
                    .with_label_values(&[protocol.as_str()])
                    .inc();
                Ok(Outcome::Processed)
            }
            Err(EngineError::Store(err)) => Err(err),
            Err(err) => {
                metrics::EVENTS_SKIPPED
                    .with_label_values(&[protocol.as_str(), err.reason()])
                    .inc();
                tracing::warn!(
                    err = %err,
                    reason = err.reason(),
                    protocol = %protocol,
                    event = event.kind.name(),
                    chain_id = event.meta.chain_id,
                    block_number = event.meta.block_number,
                    tx_hash = %event.meta.tx_hash,
                    log_index = event.meta.log_index,
                    "skipping event"
                );
                Ok(Outcome::Skipped)
            }
        }
    }

    /// Dispatch without the skip policy; callers see the full error
    /// surface.
    pub async fn handle(&self, event: &RawEvent) -> Result<(), EngineError> {
        match &event.kind {
            EventKind::LayerZero(inner) => {
                handlers::layerzero::handle(self, &event.meta, inner).await
            }
            EventKind::Stargate(inner) => {
                handlers::stargate::handle(self, &event.meta, inner).await
            }
            EventKind::Across(inner) => handlers::across::handle(self, &event.meta, inner).await,
            EventKind::Cctp(inner) => handlers::cctp::handle(self, &event.meta, inner).await,
            EventKind::Agglayer(inner) => {
                handlers::agglayer::handle(self, &event.meta, inner).await
            }
        }
    }
}
