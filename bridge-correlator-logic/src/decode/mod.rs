//! Byte decoders for raw event fields.
//!
//! Every decoder is total: on a length shortfall, malformed prefix, or
//! out-of-range header tag it returns [`DecodeError`] and nothing is
//! partially consumed by the caller.

mod cctp;
mod global_index;
mod packet;
mod passenger;
mod token;

pub use cctp::{BurnBodyV1, BurnBodyV2, MessageV2, decode_burn_body_v1, decode_burn_body_v2, decode_message_v2};
pub use global_index::{GlobalIndex, decode_global_index};
pub use packet::{PacketV1, PacketV2, decode_packet_v1, decode_packet_v2};
pub use passenger::decode_bus_passenger;
pub use token::{BridgeMintData, TokenMetadata, decode_bridge_mint, decode_token_metadata};

use crate::error::DecodeError;

/// Strip an optional `0x` prefix and hex-decode.
pub(crate) fn decode_hex(raw: &str) -> Result<Vec<u8>, DecodeError> {
    let stripped = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    Ok(hex::decode(stripped)?)
}

/// Borrow `count` bytes at `offset`, or fail with the total length needed.
pub(crate) fn take<'a>(
    bytes: &'a [u8],
    offset: usize,
    count: usize,
) -> Result<&'a [u8], DecodeError> {
    bytes
        .get(offset..offset + count)
        .ok_or(DecodeError::TooShort {
            expected: offset + count,
            actual: bytes.len(),
        })
}

pub(crate) fn take_u16(bytes: &[u8], offset: usize) -> Result<u16, DecodeError> {
    let b = take(bytes, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub(crate) fn take_u32(bytes: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let b = take(bytes, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn take_u64(bytes: &[u8], offset: usize) -> Result<u64, DecodeError> {
    let b = take(bytes, offset, 8)?;
    Ok(u64::from_be_bytes([
        b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
    ]))
}
