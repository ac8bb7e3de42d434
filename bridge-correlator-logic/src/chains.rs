//! Static chain tables: EVM chain id ↔ LayerZero EID ↔ slug ↔ CCTP domain ↔
//! agglayer network id ↔ explorer URL.
//!
//! The tables are immutable once loaded. Lookups needed for key derivation
//! return [`ConfigError`] on a miss; slug lookups used only for route
//! display are tolerant.

use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::ConfigError;

/// One routed chain.
#[derive(Clone, Debug, Deserialize)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub slug: String,
    pub name: String,
    /// LayerZero v2 endpoint id.
    pub lz_eid: Option<u32>,
    /// LayerZero v1 chain id (uint16 on the wire).
    pub lz_v1_id: Option<u16>,
    pub cctp_domain: Option<u32>,
    pub agglayer_network: Option<u32>,
    pub explorer_url: String,
}

/// Immutable lookup tables over [`ChainEntry`] rows.
pub struct ChainRegistry {
    entries: Vec<ChainEntry>,
    by_chain_id: HashMap<u64, usize>,
    by_eid: HashMap<u32, usize>,
    by_v1_id: HashMap<u16, usize>,
    by_domain: HashMap<u32, usize>,
}

impl ChainRegistry {
    pub fn from_entries(entries: Vec<ChainEntry>) -> Self {
        let mut by_chain_id = HashMap::new();
        let mut by_eid = HashMap::new();
        let mut by_v1_id = HashMap::new();
        let mut by_domain = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_chain_id.insert(entry.chain_id, index);
            if let Some(eid) = entry.lz_eid {
                by_eid.insert(eid, index);
            }
            if let Some(v1) = entry.lz_v1_id {
                by_v1_id.insert(v1, index);
            }
            if let Some(domain) = entry.cctp_domain {
                by_domain.insert(domain, index);
            }
        }
        Self {
            entries,
            by_chain_id,
            by_eid,
            by_v1_id,
            by_domain,
        }
    }

    pub fn by_chain_id(&self, chain_id: u64) -> Result<&ChainEntry, ConfigError> {
        self.by_chain_id
            .get(&chain_id)
            .map(|index| &self.entries[*index])
            .ok_or(ConfigError::UnknownChainId(chain_id))
    }

    pub fn by_eid(&self, eid: u32) -> Result<&ChainEntry, ConfigError> {
        self.by_eid
            .get(&eid)
            .map(|index| &self.entries[*index])
            .ok_or(ConfigError::UnknownEid(eid))
    }

    pub fn by_cctp_domain(&self, domain: u32) -> Result<&ChainEntry, ConfigError> {
        self.by_domain
            .get(&domain)
            .map(|index| &self.entries[*index])
            .ok_or(ConfigError::UnknownDomain(domain))
    }

    /// LayerZero v2 EID of a chain; required for inbound GUID recomputation.
    pub fn eid_for_chain(&self, chain_id: u64) -> Result<u32, ConfigError> {
        self.by_chain_id(chain_id)?
            .lz_eid
            .ok_or(ConfigError::MissingIdentifier(chain_id, "layerzero-eid"))
    }

    /// LayerZero v1 chain id of a chain; required for v1 inbound keys.
    pub fn v1_id_for_chain(&self, chain_id: u64) -> Result<u16, ConfigError> {
        self.by_chain_id(chain_id)?
            .lz_v1_id
            .ok_or(ConfigError::MissingIdentifier(chain_id, "layerzero-v1-id"))
    }

    /// CCTP domain of a chain; required for burn/receive key derivation.
    pub fn domain_for_chain(&self, chain_id: u64) -> Result<u32, ConfigError> {
        self.by_chain_id(chain_id)?
            .cctp_domain
            .ok_or(ConfigError::MissingIdentifier(chain_id, "cctp-domain"))
    }

    /// Tolerant slug lookup by EID, for route display fields only.
    pub fn slug_for_eid(&self, eid: u32) -> Option<String> {
        self.by_eid(eid).ok().map(|entry| entry.slug.clone())
    }

    /// Tolerant slug lookup by chain id, for route display fields only.
    pub fn slug_for_chain(&self, chain_id: u64) -> Option<String> {
        self.by_chain_id(chain_id)
            .ok()
            .map(|entry| entry.slug.clone())
    }

    /// Tolerant slug lookup by CCTP domain.
    pub fn slug_for_domain(&self, domain: u32) -> Option<String> {
        self.by_cctp_domain(domain).ok().map(|entry| entry.slug.clone())
    }

    /// Tolerant slug lookup by LayerZero v1 chain id.
    pub fn slug_for_v1_id(&self, v1_id: u16) -> Option<String> {
        self.by_v1_id
            .get(&v1_id)
            .map(|index| self.entries[*index].slug.clone())
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::from_entries(default_entries())
    }
}

macro_rules! chain {
    ($chain_id:expr, $slug:expr, $name:expr, $eid:expr, $v1:expr, $domain:expr, $network:expr, $explorer:expr) => {
        ChainEntry {
            chain_id: $chain_id,
            slug: $slug.to_string(),
            name: $name.to_string(),
            lz_eid: $eid,
            lz_v1_id: $v1,
            cctp_domain: $domain,
            agglayer_network: $network,
            explorer_url: $explorer.to_string(),
        }
    };
}

/// Compiled-in table of the major routed chains.
fn default_entries() -> Vec<ChainEntry> {
    vec![
        chain!(1, "ethereum", "Ethereum", Some(30101), Some(101), Some(0), Some(0), "https://etherscan.io"),
        chain!(10, "optimism", "OP Mainnet", Some(30111), Some(111), Some(2), None, "https://optimistic.etherscan.io"),
        chain!(56, "bsc", "BNB Smart Chain", Some(30102), Some(102), None, None, "https://bscscan.com"),
        chain!(137, "polygon", "Polygon", Some(30109), Some(109), Some(7), None, "https://polygonscan.com"),
        chain!(1101, "polygon-zkevm", "Polygon zkEVM", Some(30158), Some(158), None, Some(1), "https://zkevm.polygonscan.com"),
        chain!(8453, "base", "Base", Some(30184), Some(184), Some(6), None, "https://basescan.org"),
        chain!(42161, "arbitrum", "Arbitrum One", Some(30110), Some(110), Some(3), None, "https://arbiscan.io"),
        chain!(43114, "avalanche", "Avalanche C-Chain", Some(30106), Some(106), Some(1), None, "https://snowtrace.io"),
        chain!(59144, "linea", "Linea", Some(30183), Some(183), Some(11), None, "https://lineascan.build"),
        chain!(534352, "scroll", "Scroll", Some(30214), Some(214), None, None, "https://scrollscan.com"),
    ]
}

lazy_static! {
    /// Process-wide default registry.
    pub static ref CHAINS: ChainRegistry = ChainRegistry::default();
}
