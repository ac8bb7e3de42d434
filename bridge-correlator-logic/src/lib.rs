//! Cross-chain bridge correlation engine.
//!
//! Consumes raw bridge/messaging events from many chains and maintains a
//! normalized record of each end-to-end transfer: the outbound leg, the
//! inbound leg, whether the two have been paired, and the observed
//! latency. Legs arrive in any order, on different chains, and sometimes
//! batched (Stargate bus mode); the engine is symmetric and idempotent so
//! every permitted delivery order converges on the same entity set.

mod chains;
mod engine;
mod envelope;
mod error;
mod handlers;
mod identity;
mod payload;
mod store;

pub mod decode;
pub mod event;
pub mod metrics;

pub use chains::{CHAINS, ChainEntry, ChainRegistry};
pub use engine::{CorrelationEngine, Outcome};
pub use envelope::{upsert_inbound, upsert_outbound};
pub use error::{ConfigError, DecodeError, EngineError, StoreError};
pub use identity::{
    CctpV2Tuple, across_key, agglayer_key, cctp_v1_key, cctp_v2_key, guid_key, is_sentinel_guid,
    layerzero_guid, layerzero_v1_key,
};
pub use payload::{PayloadRef, upsert_payload_inbound, upsert_payload_outbound};
pub use store::{EntityStore, MemoryStore};
