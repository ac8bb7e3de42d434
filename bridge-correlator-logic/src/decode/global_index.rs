use alloy::primitives::U256;

/// Unpacked agglayer claim `globalIndex`.
///
/// Low 32 bits are the leaf index in the local exit root, the next 32 bits
/// the rollup index, bit 64 the mainnet flag. Higher bits are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalIndex {
    pub local_root_index: u32,
    pub rollup_index: u32,
    pub mainnet_flag: bool,
}

impl GlobalIndex {
    /// Network the claimed deposit originated on.
    pub fn source_network(&self) -> u32 {
        if self.mainnet_flag {
            0
        } else {
            self.rollup_index + 1
        }
    }
}

/// Total: any 256-bit value unpacks.
pub fn decode_global_index(value: U256) -> GlobalIndex {
    let low = value.as_limbs()[0];
    GlobalIndex {
        local_root_index: low as u32,
        rollup_index: (low >> 32) as u32,
        mainnet_flag: value.bit(64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(U256::from(7u64), 7, 0, false)]
    #[case(U256::from((3u64 << 32) | 9), 9, 3, false)]
    #[case(U256::from(1u128 << 64) + U256::from(5u64), 5, 0, true)]
    fn unpacks_bitfield(
        #[case] value: U256,
        #[case] local: u32,
        #[case] rollup: u32,
        #[case] mainnet: bool,
    ) {
        let index = decode_global_index(value);
        assert_eq!(index.local_root_index, local);
        assert_eq!(index.rollup_index, rollup);
        assert_eq!(index.mainnet_flag, mainnet);
    }

    #[test]
    fn higher_bits_are_ignored() {
        let value = (U256::from(1u64) << 200) | U256::from(42u64);
        assert_eq!(decode_global_index(value).local_root_index, 42);
        assert!(!decode_global_index(value).mainnet_flag);
    }

    #[test]
    fn source_network_prefers_mainnet_flag() {
        let mainnet = decode_global_index(U256::from(1u128 << 64));
        assert_eq!(mainnet.source_network(), 0);
        let rollup = decode_global_index(U256::from(4u64 << 32));
        assert_eq!(rollup.source_network(), 5);
    }
}
