use alloy::primitives::B256;
use bridge_correlator_entity::BusPassenger;

use super::{decode_hex, take, take_u16, take_u64};
use crate::error::DecodeError;

/// Packed length of a bus passenger record: 2 + 32 + 8 + 1.
const PASSENGER_LEN: usize = 43;

/// Minimum hex-character count (after the `0x` prefix) the wire format
/// guarantees for a passenger field.
const MIN_HEX_CHARS: usize = 44;

/// Decode a 43-byte packed bus passenger record.
pub fn decode_bus_passenger(raw: &str) -> Result<BusPassenger, DecodeError> {
    let stripped = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if stripped.len() < MIN_HEX_CHARS {
        return Err(DecodeError::TooShort {
            expected: PASSENGER_LEN,
            actual: stripped.len() / 2,
        });
    }

    let bytes = decode_hex(raw)?;
    if bytes.len() < PASSENGER_LEN {
        return Err(DecodeError::TooShort {
            expected: PASSENGER_LEN,
            actual: bytes.len(),
        });
    }

    let asset_id = take_u16(&bytes, 0)?;
    let receiver = B256::from_slice(take(&bytes, 2, 32)?);
    let amount_sd = take_u64(&bytes, 34)?;
    let native_drop = match bytes[42] {
        0 => false,
        1 => true,
        other => {
            return Err(DecodeError::OutOfRange(format!(
                "nativeDrop flag must be 0 or 1, got {other}"
            )));
        }
    };

    Ok(BusPassenger {
        asset_id,
        receiver,
        amount_sd,
        native_drop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};
    use rstest::rstest;

    fn fixture(native_drop: u8) -> String {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(
            b256!("000000000000000000000000cccccccccccccccccccccccccccccccccccccc01")
                .as_slice(),
        );
        bytes.extend_from_slice(&100u64.to_be_bytes());
        bytes.push(native_drop);
        format!("0x{}", hex::encode(bytes))
    }

    #[test]
    fn decodes_passenger_record() {
        let passenger = decode_bus_passenger(&fixture(1)).unwrap();
        assert_eq!(passenger.asset_id, 1);
        assert_eq!(passenger.amount_sd, 100);
        assert!(passenger.native_drop);
        assert_eq!(
            passenger.receiver_address(),
            address!("cccccccccccccccccccccccccccccccccccccc01")
        );
    }

    #[rstest]
    #[case("0x")]
    #[case("0x0001")]
    #[case("0x00000000000000000000000000000000000000000001")] // 22 bytes
    fn rejects_short_inputs(#[case] raw: &str) {
        assert!(matches!(
            decode_bus_passenger(raw),
            Err(DecodeError::TooShort { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_flag() {
        assert!(matches!(
            decode_bus_passenger(&fixture(7)),
            Err(DecodeError::OutOfRange(_))
        ));
    }
}
