//! Network settings
//!
//! The library reads no files or environment variables; callers pick a
//! network by passing these settings explicitly.

use serde::{Deserialize, Serialize};

/// Version bytes prepended to address hashes before base58check encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressPrefixes {
    /// Pay-to-public-key-hash version byte
    pub p2kh: u8,
    /// Pay-to-script-hash version byte
    pub p2sh: u8,
}

impl AddressPrefixes {
    pub const MAINNET: Self = Self {
        p2kh: 0x00,
        p2sh: 0x05,
    };

    pub const TESTNET: Self = Self {
        p2kh: 0x6f,
        p2sh: 0xc4,
    };

    pub fn mainnet() -> Self {
        Self::MAINNET
    }

    pub fn testnet() -> Self {
        Self::TESTNET
    }
}

impl Default for AddressPrefixes {
    fn default() -> Self {
        Self::MAINNET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mainnet() {
        assert_eq!(AddressPrefixes::default(), AddressPrefixes::mainnet());
        assert_ne!(AddressPrefixes::testnet().p2kh, AddressPrefixes::mainnet().p2kh);
    }

    #[test]
    fn test_prefixes_deserialize() {
        let prefixes: AddressPrefixes = serde_json::from_str(r#"{"p2kh":111,"p2sh":196}"#).unwrap();
        assert_eq!(prefixes, AddressPrefixes::testnet());
    }
}
