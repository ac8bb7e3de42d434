use alloy::primitives::{Address, B256, Bytes};

use super::{decode_hex, take, take_u16, take_u32, take_u64};
use crate::error::DecodeError;

/// Header length of a v2 packet (and of the Uln301 v1 path, which shares
/// the shape): 1 + 8 + 4 + 32 + 4 + 32.
const V2_HEADER_LEN: usize = 81;

/// Header length of an UltraLight v1 packet: 8 + 2 + 20 + 2 + 20.
const V1_HEADER_LEN: usize = 52;

const PACKET_VERSION: u8 = 1;

/// Decoded LayerZero v2 packet: 81-byte packed header plus the inner
/// application payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketV2 {
    pub nonce: u64,
    pub src_eid: u32,
    /// Sender, left-padded to 32 bytes.
    pub sender: B256,
    pub dst_eid: u32,
    /// Receiver, left-padded to 32 bytes.
    pub receiver: B256,
    pub message: Bytes,
}

impl PacketV2 {
    pub fn sender_address(&self) -> Address {
        Address::from_word(self.sender)
    }

    pub fn receiver_address(&self) -> Address {
        Address::from_word(self.receiver)
    }
}

/// Decode a v2-shaped packet (native v2 and the Uln301 compatibility path).
pub fn decode_packet_v2(raw: &str) -> Result<PacketV2, DecodeError> {
    let bytes = decode_hex(raw)?;
    if bytes.len() < V2_HEADER_LEN {
        return Err(DecodeError::TooShort {
            expected: V2_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    if bytes[0] != PACKET_VERSION {
        return Err(DecodeError::Version(bytes[0]));
    }

    let nonce = take_u64(&bytes, 1)?;
    let src_eid = take_u32(&bytes, 9)?;
    let sender = B256::from_slice(take(&bytes, 13, 32)?);
    let dst_eid = take_u32(&bytes, 45)?;
    let receiver = B256::from_slice(take(&bytes, 49, 32)?);

    Ok(PacketV2 {
        nonce,
        src_eid,
        sender,
        dst_eid,
        receiver,
        message: Bytes::copy_from_slice(&bytes[V2_HEADER_LEN..]),
    })
}

/// Decoded UltraLight v1 packet: uint16 chain ids and 20-byte addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketV1 {
    pub nonce: u64,
    pub src_chain_id: u16,
    pub sender: Address,
    pub dst_chain_id: u16,
    pub receiver: Address,
    pub payload: Bytes,
}

pub fn decode_packet_v1(raw: &str) -> Result<PacketV1, DecodeError> {
    let bytes = decode_hex(raw)?;
    if bytes.len() < V1_HEADER_LEN {
        return Err(DecodeError::TooShort {
            expected: V1_HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let nonce = take_u64(&bytes, 0)?;
    let src_chain_id = take_u16(&bytes, 8)?;
    let sender = Address::from_slice(take(&bytes, 10, 20)?);
    let dst_chain_id = take_u16(&bytes, 30)?;
    let receiver = Address::from_slice(take(&bytes, 32, 20)?);

    Ok(PacketV1 {
        nonce,
        src_chain_id,
        sender,
        dst_chain_id,
        receiver,
        payload: Bytes::copy_from_slice(&bytes[V1_HEADER_LEN..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use hex_literal::hex;

    // version 1 ‖ nonce 42 ‖ srcEid 30101 ‖ sender ‖ dstEid 30184 ‖
    // receiver ‖ inner payload.
    fn v2_fixture() -> String {
        let bytes = hex!(
            "01"
            "000000000000002a"
            "00007595"
            "000000000000000000000000aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1"
            "000075e8"
            "000000000000000000000000bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2"
            "deadbeef"
        );
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn decodes_v2_header_and_inner_payload() {
        let packet = decode_packet_v2(&v2_fixture()).unwrap();
        assert_eq!(packet.nonce, 42);
        assert_eq!(packet.src_eid, 30101);
        assert_eq!(packet.dst_eid, 30184);
        assert_eq!(
            packet.sender_address(),
            address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1")
        );
        assert_eq!(
            packet.receiver_address(),
            address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2")
        );
        assert_eq!(packet.message.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn rejects_wrong_version_and_short_input() {
        let mut raw = v2_fixture();
        raw.replace_range(2..4, "02");
        assert!(matches!(
            decode_packet_v2(&raw),
            Err(DecodeError::Version(2))
        ));

        assert!(matches!(
            decode_packet_v2("0x01ffff"),
            Err(DecodeError::TooShort { .. })
        ));
        assert!(matches!(
            decode_packet_v2("0xzz"),
            Err(DecodeError::Hex(_))
        ));
    }

    #[test]
    fn decodes_v1_header() {
        // nonce 7 ‖ srcChainId 101 ‖ sender ‖ dstChainId 109 ‖ receiver ‖
        // payload.
        let bytes = hex!(
            "0000000000000007"
            "0065"
            "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1"
            "006d"
            "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2"
            "ff"
        );

        let packet = decode_packet_v1(&format!("0x{}", hex::encode(bytes))).unwrap();
        assert_eq!(packet.nonce, 7);
        assert_eq!(packet.src_chain_id, 101);
        assert_eq!(packet.dst_chain_id, 109);
        assert_eq!(packet.payload.as_ref(), &[0xff]);
    }
}
