use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolValue;

use super::decode_hex;
use crate::error::DecodeError;

/// ABI tuple carried by bridge-mint data:
/// `(address, address, address, uint256, bytes)`.
pub type BridgeMintData = (Address, Address, Address, U256, Bytes);

pub fn decode_bridge_mint(raw: &str) -> Result<BridgeMintData, DecodeError> {
    let bytes = decode_hex(raw)?;
    BridgeMintData::abi_decode(&bytes).map_err(|err| DecodeError::Abi(err.to_string()))
}

const MAX_DECIMALS: u8 = 77;
const MAX_STRING_LEN: usize = 256;

const FALLBACK_NAME: &str = "Unknown";
const FALLBACK_SYMBOL: &str = "UNK";

/// ERC-20 style metadata bridged alongside a wrapped-asset deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Decode ABI-encoded `(string name, string symbol, uint8 decimals)`.
///
/// The head is three 32-byte slots: name offset, symbol offset, decimals.
/// A malformed string falls back to "Unknown"/"UNK"; malformed decimals
/// fail the whole decode.
pub fn decode_token_metadata(raw: &str) -> Result<TokenMetadata, DecodeError> {
    let bytes = decode_hex(raw)?;
    if bytes.len() < 96 {
        return Err(DecodeError::TooShort {
            expected: 96,
            actual: bytes.len(),
        });
    }

    let name_offset = head_usize(&bytes, 0);
    let symbol_offset = head_usize(&bytes, 32);

    let decimals_word = U256::from_be_slice(&bytes[64..96]);
    let decimals =
        u8::try_from(decimals_word).map_err(|_| DecodeError::OutOfRange("decimals".into()))?;
    if decimals > MAX_DECIMALS {
        return Err(DecodeError::OutOfRange(format!(
            "decimals {decimals} exceeds {MAX_DECIMALS}"
        )));
    }

    let name = name_offset
        .and_then(|offset| read_string(&bytes, offset))
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    let symbol = symbol_offset
        .and_then(|offset| read_string(&bytes, offset))
        .unwrap_or_else(|| FALLBACK_SYMBOL.to_string());

    Ok(TokenMetadata {
        name,
        symbol,
        decimals,
    })
}

fn head_usize(bytes: &[u8], at: usize) -> Option<usize> {
    usize::try_from(U256::from_be_slice(&bytes[at..at + 32])).ok()
}

/// Read a `(length, bytes)` string slot at `offset`. Returns `None` on any
/// bounds or content violation so the caller can apply its fallback.
fn read_string(bytes: &[u8], offset: usize) -> Option<String> {
    let length_end = offset.checked_add(32)?;
    if length_end > bytes.len() {
        return None;
    }
    let length = usize::try_from(U256::from_be_slice(&bytes[offset..length_end])).ok()?;
    if length > MAX_STRING_LEN {
        return None;
    }
    let data = bytes.get(length_end..length_end.checked_add(length)?)?;

    let visible: &[u8] = data
        .iter()
        .position(|byte| *byte == 0)
        .map_or(data, |null_at| &data[..null_at]);
    if !visible.iter().all(|byte| (0x20..=0x7e).contains(byte)) {
        return None;
    }
    Some(String::from_utf8_lossy(visible).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn abi_string_slot(value: &[u8]) -> Vec<u8> {
        let mut slot = U256::from(value.len()).to_be_bytes::<32>().to_vec();
        slot.extend_from_slice(value);
        slot.resize(32 + value.len().div_ceil(32) * 32, 0);
        slot
    }

    fn metadata_fixture(name: &[u8], symbol: &[u8], decimals: u64) -> String {
        let name_slot = abi_string_slot(name);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&U256::from(96u64).to_be_bytes::<32>());
        bytes.extend_from_slice(&U256::from(96 + name_slot.len()).to_be_bytes::<32>());
        bytes.extend_from_slice(&U256::from(decimals).to_be_bytes::<32>());
        bytes.extend_from_slice(&name_slot);
        bytes.extend_from_slice(&abi_string_slot(symbol));
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn decodes_well_formed_metadata() {
        let metadata = decode_token_metadata(&metadata_fixture(b"Wrapped Ether", b"WETH", 18));
        assert_eq!(
            metadata.unwrap(),
            TokenMetadata {
                name: "Wrapped Ether".into(),
                symbol: "WETH".into(),
                decimals: 18,
            }
        );
    }

    #[test]
    fn null_padding_is_trimmed() {
        let metadata = decode_token_metadata(&metadata_fixture(b"USD\0\0\0", b"USD", 6)).unwrap();
        assert_eq!(metadata.name, "USD");
    }

    #[rstest]
    #[case(&[0x01, 0x02, 0x03][..])] // control bytes before the null
    #[case(&[0xff; 8][..])]
    fn unprintable_strings_fall_back(#[case] name: &[u8]) {
        let metadata = decode_token_metadata(&metadata_fixture(name, b"OK", 8)).unwrap();
        assert_eq!(metadata.name, FALLBACK_NAME);
        assert_eq!(metadata.symbol, "OK");
    }

    #[test]
    fn out_of_bounds_offset_falls_back() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&U256::from(10_000u64).to_be_bytes::<32>());
        bytes.extend_from_slice(&U256::from(20_000u64).to_be_bytes::<32>());
        bytes.extend_from_slice(&U256::from(9u64).to_be_bytes::<32>());
        let metadata = decode_token_metadata(&format!("0x{}", hex::encode(bytes))).unwrap();
        assert_eq!(metadata.name, FALLBACK_NAME);
        assert_eq!(metadata.symbol, FALLBACK_SYMBOL);
        assert_eq!(metadata.decimals, 9);
    }

    #[test]
    fn bad_decimals_fail_the_whole_decode() {
        assert!(matches!(
            decode_token_metadata(&metadata_fixture(b"Token", b"TKN", 78)),
            Err(DecodeError::OutOfRange(_))
        ));
    }

    #[test]
    fn decodes_bridge_mint_tuple() {
        let tuple: BridgeMintData = (
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            Address::repeat_byte(0x33),
            U256::from(1234u64),
            Bytes::from_static(&[0xab, 0xcd]),
        );
        let encoded = format!("0x{}", hex::encode(tuple.abi_encode()));
        let decoded = decode_bridge_mint(&encoded).unwrap();
        assert_eq!(decoded, tuple);

        assert!(matches!(
            decode_bridge_mint("0x1234"),
            Err(DecodeError::Abi(_))
        ));
    }
}
