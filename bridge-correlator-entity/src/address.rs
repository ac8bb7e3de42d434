//! Canonical address serialization for the store boundary.
//!
//! In memory, addresses are `alloy::primitives::Address`. At the store
//! boundary every address field is written as its EIP-55 checksummed string,
//! so stored entities always carry the canonical 20-byte form.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Deserializer, Serializer};
use std::str::FromStr;

/// Best-effort normalization of a raw address string.
///
/// Accepts a left-padded bytes32 hex string or a 20-byte hex string and
/// returns the checksummed 20-byte form. Anything else is returned unchanged.
pub fn normalize_address(raw: &str) -> String {
    let stripped = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    match stripped.len() {
        64 => match B256::from_str(stripped) {
            Ok(word) => Address::from_word(word).to_checksum(None),
            Err(_) => raw.to_string(),
        },
        40 => match Address::from_str(stripped) {
            Ok(address) => address.to_checksum(None),
            Err(_) => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Serde adapter for `Address` fields: checksummed on write, case-insensitive
/// hex on read.
pub mod checksummed {
    use super::*;

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&address.to_checksum(None))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<Address>` fields.
pub mod checksummed_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        address: &Option<Address>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match address {
            Some(address) => serializer.serialize_some(&address.to_checksum(None)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Address>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| Address::from_str(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bytes32_and_short_forms() {
        let padded = "0x000000000000000000000000fb6916095ca1df60bb79ce92ce3ea74c37c5d359";
        assert_eq!(
            normalize_address(padded),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
        assert_eq!(
            normalize_address("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359"),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn passes_through_non_address_strings() {
        assert_eq!(normalize_address("0x1234"), "0x1234");
        assert_eq!(normalize_address("not-an-address"), "not-an-address");
    }

    #[test]
    fn serde_adapters_write_checksummed_strings() {
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Holder {
            #[serde(with = "checksummed")]
            required: Address,
            #[serde(with = "checksummed_opt")]
            optional: Option<Address>,
        }

        let holder = Holder {
            required: Address::from_str("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap(),
            optional: None,
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert!(json.contains("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"));
        assert!(json.contains("null"));
        assert_eq!(serde_json::from_str::<Holder>(&json).unwrap(), holder);
    }
}
