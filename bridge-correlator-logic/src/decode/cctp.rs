use alloy::primitives::{Address, B256, Bytes, U256};

use super::{decode_hex, take, take_u32};
use crate::error::DecodeError;

const BODY_VERSION_V1: u32 = 0;
const BODY_VERSION_V2: u32 = 1;

/// v1 burn body: version ‖ burnToken ‖ mintRecipient ‖ amount ‖
/// messageSender, all 32-byte slots after the 4-byte version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnBodyV1 {
    pub burn_token: B256,
    pub mint_recipient: B256,
    pub amount: U256,
    pub message_sender: B256,
}

impl BurnBodyV1 {
    pub fn mint_recipient_address(&self) -> Address {
        Address::from_word(self.mint_recipient)
    }
}

pub fn decode_burn_body_v1(raw: &str) -> Result<BurnBodyV1, DecodeError> {
    let bytes = decode_hex(raw)?;
    let expected = 4 + 4 * 32;
    if bytes.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }
    let version = take_u32(&bytes, 0)?;
    if version != BODY_VERSION_V1 {
        return Err(DecodeError::Version(version as u8));
    }

    Ok(BurnBodyV1 {
        burn_token: B256::from_slice(take(&bytes, 4, 32)?),
        mint_recipient: B256::from_slice(take(&bytes, 36, 32)?),
        amount: U256::from_be_slice(take(&bytes, 68, 32)?),
        message_sender: B256::from_slice(take(&bytes, 100, 32)?),
    })
}

/// v2 burn body: version ‖ burnToken ‖ mintRecipient ‖ amount ‖
/// messageSender ‖ maxFee ‖ feeExecuted ‖ expirationBlock ‖ hookData.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnBodyV2 {
    pub burn_token: B256,
    pub mint_recipient: B256,
    pub amount: U256,
    pub message_sender: B256,
    pub max_fee: U256,
    pub fee_executed: U256,
    pub expiration_block: U256,
    pub hook_data: Bytes,
}

impl BurnBodyV2 {
    pub fn mint_recipient_address(&self) -> Address {
        Address::from_word(self.mint_recipient)
    }
}

pub fn decode_burn_body_v2(raw: &str) -> Result<BurnBodyV2, DecodeError> {
    let bytes = decode_hex(raw)?;
    let expected = 4 + 7 * 32;
    if bytes.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }
    let version = take_u32(&bytes, 0)?;
    if version != BODY_VERSION_V2 {
        return Err(DecodeError::Version(version as u8));
    }

    Ok(BurnBodyV2 {
        burn_token: B256::from_slice(take(&bytes, 4, 32)?),
        mint_recipient: B256::from_slice(take(&bytes, 36, 32)?),
        amount: U256::from_be_slice(take(&bytes, 68, 32)?),
        message_sender: B256::from_slice(take(&bytes, 100, 32)?),
        max_fee: U256::from_be_slice(take(&bytes, 132, 32)?),
        fee_executed: U256::from_be_slice(take(&bytes, 164, 32)?),
        expiration_block: U256::from_be_slice(take(&bytes, 196, 32)?),
        hook_data: Bytes::copy_from_slice(&bytes[expected..]),
    })
}

/// v2 outer message: version ‖ sourceDomain ‖ destinationDomain ‖ nonce ‖
/// sender ‖ recipient ‖ destinationCaller ‖ minFinalityThreshold ‖
/// finalityThresholdExecuted ‖ body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageV2 {
    pub source_domain: u32,
    pub destination_domain: u32,
    pub nonce: B256,
    pub sender: B256,
    pub recipient: B256,
    pub destination_caller: B256,
    pub min_finality_threshold: u32,
    pub finality_threshold_executed: u32,
    pub body: Bytes,
}

pub fn decode_message_v2(raw: &str) -> Result<MessageV2, DecodeError> {
    let bytes = decode_hex(raw)?;
    let expected = 4 + 4 + 4 + 4 * 32 + 4 + 4;
    if bytes.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: bytes.len(),
        });
    }
    let version = take_u32(&bytes, 0)?;
    if version != BODY_VERSION_V2 {
        return Err(DecodeError::Version(version as u8));
    }

    Ok(MessageV2 {
        source_domain: take_u32(&bytes, 4)?,
        destination_domain: take_u32(&bytes, 8)?,
        nonce: B256::from_slice(take(&bytes, 12, 32)?),
        sender: B256::from_slice(take(&bytes, 44, 32)?),
        recipient: B256::from_slice(take(&bytes, 76, 32)?),
        destination_caller: B256::from_slice(take(&bytes, 108, 32)?),
        min_finality_threshold: take_u32(&bytes, 140)?,
        finality_threshold_executed: take_u32(&bytes, 144)?,
        body: Bytes::copy_from_slice(&bytes[expected..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;
    use hex_literal::hex;

    // version 1 ‖ burnToken ‖ mintRecipient ‖ amount 5_000_000 ‖
    // messageSender ‖ maxFee 500 ‖ feeExecuted 499 ‖ expirationBlock 0.
    fn burn_body_v2_fixture(hook_data: &[u8]) -> String {
        let mut bytes = hex!(
            "00000001"
            "000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
            "000000000000000000000000dddddddddddddddddddddddddddddddddddddd01"
            "00000000000000000000000000000000000000000000000000000000004c4b40"
            "000000000000000000000000eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee02"
            "00000000000000000000000000000000000000000000000000000000000001f4"
            "00000000000000000000000000000000000000000000000000000000000001f3"
            "0000000000000000000000000000000000000000000000000000000000000000"
        )
        .to_vec();
        bytes.extend_from_slice(hook_data);
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn decodes_v2_burn_body() {
        let body = decode_burn_body_v2(&burn_body_v2_fixture(&[0xaa, 0xbb])).unwrap();
        assert_eq!(body.amount, U256::from(5_000_000u64));
        assert_eq!(body.max_fee, U256::from(500u64));
        assert_eq!(body.fee_executed, U256::from(499u64));
        assert_eq!(body.hook_data.as_ref(), &[0xaa, 0xbb]);
    }

    #[test]
    fn rejects_v1_body_in_v2_decoder() {
        let mut raw = burn_body_v2_fixture(&[]);
        raw.replace_range(2..10, "00000000");
        assert!(matches!(
            decode_burn_body_v2(&raw),
            Err(DecodeError::Version(0))
        ));
    }

    #[test]
    fn decodes_v1_burn_body() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&BODY_VERSION_V1.to_be_bytes());
        bytes.extend_from_slice(&[0x11; 32]);
        bytes.extend_from_slice(&[0x22; 32]);
        bytes.extend_from_slice(&U256::from(777u64).to_be_bytes::<32>());
        bytes.extend_from_slice(&[0x33; 32]);

        let body = decode_burn_body_v1(&format!("0x{}", hex::encode(bytes))).unwrap();
        assert_eq!(body.amount, U256::from(777u64));
        assert_eq!(body.burn_token, B256::from([0x11; 32]));
    }

    #[test]
    fn decodes_v2_outer_message_and_embedded_body() {
        let body = burn_body_v2_fixture(&[0xaa, 0xbb]);

        // version 1 ‖ sourceDomain 0 ‖ destinationDomain 6 ‖ nonce ‖
        // sender ‖ recipient ‖ destinationCaller ‖ thresholds 2000.
        let mut bytes = hex!(
            "00000001"
            "00000000"
            "00000006"
            "7777777777777777777777777777777777777777777777777777777777777777"
            "000000000000000000000000eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee02"
            "000000000000000000000000dddddddddddddddddddddddddddddddddddddd01"
            "0000000000000000000000000000000000000000000000000000000000000000"
            "000007d0"
            "000007d0"
        )
        .to_vec();
        bytes.extend_from_slice(&hex::decode(body.trim_start_matches("0x")).unwrap());

        let message = decode_message_v2(&format!("0x{}", hex::encode(&bytes))).unwrap();
        assert_eq!(message.source_domain, 0);
        assert_eq!(message.destination_domain, 6);
        assert_eq!(message.nonce, B256::repeat_byte(0x77));
        assert_eq!(
            message.sender,
            b256!("000000000000000000000000eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee02")
        );
        assert_eq!(message.min_finality_threshold, 2000);
        assert_eq!(message.finality_threshold_executed, 2000);

        let inner = decode_burn_body_v2(&format!("0x{}", hex::encode(&message.body))).unwrap();
        assert_eq!(inner.amount, U256::from(5_000_000u64));
        assert_eq!(inner.hook_data.as_ref(), &[0xaa, 0xbb]);
    }

    #[test]
    fn short_bodies_fail_whole_decode() {
        assert!(matches!(
            decode_burn_body_v1("0x00000000ffff"),
            Err(DecodeError::TooShort { .. })
        ));
        assert!(matches!(
            decode_message_v2("0x00000001"),
            Err(DecodeError::TooShort { .. })
        ));
    }
}
