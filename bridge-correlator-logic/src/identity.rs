//! Canonical cross-chain message keys, one derivation per protocol.
//!
//! Whatever a protocol emits on each side, both legs must independently
//! arrive at the same `messageKey` string so the envelope upsert can pair
//! them.

use alloy::primitives::{Address, B256, Bytes, U256, keccak256};

/// LayerZero v2 GUID: keccak over the packed
/// `uint64 ‖ uint32 ‖ bytes32 ‖ uint32 ‖ bytes32` header tuple.
pub fn layerzero_guid(
    nonce: u64,
    src_eid: u32,
    sender: &B256,
    dst_eid: u32,
    receiver: &B256,
) -> B256 {
    let mut packed = Vec::with_capacity(8 + 4 + 32 + 4 + 32);
    packed.extend_from_slice(&nonce.to_be_bytes());
    packed.extend_from_slice(&src_eid.to_be_bytes());
    packed.extend_from_slice(sender.as_slice());
    packed.extend_from_slice(&dst_eid.to_be_bytes());
    packed.extend_from_slice(receiver.as_slice());
    keccak256(&packed)
}

/// The all-zero GUID marks a batched (bus) outbound event, never a real
/// packet identifier.
pub fn is_sentinel_guid(guid: &B256) -> bool {
    guid.is_zero()
}

pub fn guid_key(guid: &B256) -> String {
    format!("{guid:#x}")
}

/// LayerZero v1 (UltraLight path) key: digest over the packed v1 header
/// fields. v1 has no emitted GUID; both legs carry the same five fields.
pub fn layerzero_v1_key(
    nonce: u64,
    src_chain_id: u16,
    sender: &Address,
    dst_chain_id: u16,
    receiver: &Address,
) -> String {
    let mut packed = Vec::with_capacity(8 + 2 + 20 + 2 + 20);
    packed.extend_from_slice(&nonce.to_be_bytes());
    packed.extend_from_slice(&src_chain_id.to_be_bytes());
    packed.extend_from_slice(sender.as_slice());
    packed.extend_from_slice(&dst_chain_id.to_be_bytes());
    packed.extend_from_slice(receiver.as_slice());
    format!("{:#x}", keccak256(&packed))
}

/// Across key: origin chain id and deposit id, both explicit on the fill.
pub fn across_key(origin_chain_id: u64, deposit_id: u64) -> String {
    format!("{origin_chain_id}-{deposit_id}")
}

/// CCTP v1 key: domain-scoped nonce, present on both legs.
pub fn cctp_v1_key(source_domain: u32, nonce: u64) -> String {
    format!("{source_domain}-{nonce}")
}

/// Normalized tuple hashed into the CCTP v2 deterministic nonce. v2 drops
/// the domain-scoped nonce on the destination leg, so both sides hash the
/// burn-message fields instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CctpV2Tuple {
    pub source_domain: u32,
    pub destination_domain: u32,
    pub burn_token: B256,
    pub mint_recipient: B256,
    pub amount: U256,
    pub message_sender: B256,
    pub max_fee: U256,
    pub hook_data: Bytes,
}

pub fn cctp_v2_key(tuple: &CctpV2Tuple) -> String {
    let mut packed = Vec::with_capacity(4 + 4 + 32 * 4 + 32 + tuple.hook_data.len());
    packed.extend_from_slice(&tuple.source_domain.to_be_bytes());
    packed.extend_from_slice(&tuple.destination_domain.to_be_bytes());
    packed.extend_from_slice(tuple.burn_token.as_slice());
    packed.extend_from_slice(tuple.mint_recipient.as_slice());
    packed.extend_from_slice(&tuple.amount.to_be_bytes::<32>());
    packed.extend_from_slice(tuple.message_sender.as_slice());
    packed.extend_from_slice(&tuple.max_fee.to_be_bytes::<32>());
    packed.extend_from_slice(&tuple.hook_data);
    format!("{:#x}", keccak256(&packed))
}

/// Agglayer composite key. `deposit_count` on the bridge event equals the
/// claim's `localRootIndex`.
pub fn agglayer_key(
    asset_origin_network: u32,
    asset_origin_address: &Address,
    destination_address: &Address,
    amount: &U256,
    deposit_count: u32,
) -> String {
    format!(
        "{asset_origin_network}:0x{}:0x{}:{amount}:{deposit_count}",
        hex::encode(asset_origin_address.as_slice()),
        hex::encode(destination_address.as_slice()),
    )
}
