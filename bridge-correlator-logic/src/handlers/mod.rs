//! Per-protocol event handlers. Each binds the raw event kinds of one
//! protocol to the decode → identity → upsert pipeline.

pub(crate) mod across;
pub(crate) mod agglayer;
pub(crate) mod cctp;
pub(crate) mod layerzero;
pub(crate) mod stargate;

use bridge_correlator_entity::Route;

use crate::chains::ChainRegistry;

/// Route between two endpoint ids, slugs filled tolerantly from the
/// registry.
pub(crate) fn route_between(
    chains: &ChainRegistry,
    src_eid: Option<u32>,
    dst_eid: Option<u32>,
) -> Route {
    Route {
        src_eid,
        dst_eid,
        src_slug: src_eid.and_then(|eid| chains.slug_for_eid(eid)),
        dst_slug: dst_eid.and_then(|eid| chains.slug_for_eid(eid)),
    }
}
