//! Payment addresses
//!
//! A payment address is a version byte plus a 20-byte key or script hash,
//! shown as Base58Check(version || hash || checksum).

use crate::config::AddressPrefixes;
use crate::core::script::{Script, ScriptPattern};
use crate::crypto::{checksum, hash160, SHORT_HASH_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid base58: {0}")]
    InvalidBase58(String),
    #[error("Invalid address length: {0} bytes")]
    InvalidLength(usize),
    #[error("Checksum mismatch")]
    ChecksumMismatch,
}

/// A version byte and a 20-byte hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentAddress {
    version: u8,
    hash: [u8; SHORT_HASH_SIZE],
}

impl PaymentAddress {
    pub fn new(version: u8, hash: [u8; SHORT_HASH_SIZE]) -> Self {
        Self { version, hash }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash(&self) -> &[u8; SHORT_HASH_SIZE] {
        &self.hash
    }

    /// Derive the address a script pays to or spends from, on mainnet
    pub fn extract(script: &Script) -> Option<Self> {
        Self::extract_with(script, &AddressPrefixes::MAINNET)
    }

    /// Derive the address a script pays to or spends from
    ///
    /// Pay-to-key-hash and pay-to-public-key shapes (and their spends) map to
    /// a key hash address; pay-to-script-hash shapes and their spends map to
    /// a script hash address. Everything else has no address.
    pub fn extract_with(script: &Script, prefixes: &AddressPrefixes) -> Option<Self> {
        match script.pattern() {
            ScriptPattern::PayKeyHash(hash) => Self::from_slice(prefixes.p2kh, hash),
            ScriptPattern::PayScriptHash(hash) => Self::from_slice(prefixes.p2sh, hash),
            ScriptPattern::PayPublicKey(key) | ScriptPattern::SignKeyHash { public_key: key } => {
                Some(Self::new(prefixes.p2kh, hash160(key)))
            }
            ScriptPattern::SignScriptHash { redeem_script } => {
                Some(Self::new(prefixes.p2sh, hash160(redeem_script)))
            }
            ScriptPattern::PayMultisig { .. }
            | ScriptPattern::NullData
            | ScriptPattern::NonStandard => None,
        }
    }

    fn from_slice(version: u8, hash: &[u8]) -> Option<Self> {
        hash.try_into().ok().map(|hash| Self::new(version, hash))
    }

    /// Base58Check encoding
    pub fn encoded(&self) -> String {
        let mut payload = Vec::with_capacity(1 + SHORT_HASH_SIZE + 4);
        payload.push(self.version);
        payload.extend_from_slice(&self.hash);
        let check = checksum(&payload);
        payload.extend_from_slice(&check);
        bs58::encode(payload).into_string()
    }
}

impl fmt::Display for PaymentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

impl FromStr for PaymentAddress {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let data = bs58::decode(text)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;

        if data.len() != 1 + SHORT_HASH_SIZE + 4 {
            return Err(AddressError::InvalidLength(data.len()));
        }

        let (payload, check) = data.split_at(1 + SHORT_HASH_SIZE);
        if checksum(payload) != check {
            return Err(AddressError::ChecksumMismatch);
        }

        let mut hash = [0u8; SHORT_HASH_SIZE];
        hash.copy_from_slice(&payload[1..]);
        Ok(Self::new(payload[0], hash))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::opcode::*;

    // Compressed public key for private key 1.
    const GENERATOR_KEY: &str =
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn sign_key_hash_script() -> Script {
        let key = hex::decode(GENERATOR_KEY).unwrap();
        let mut program = vec![71];
        program.extend([0x30; 71]);
        program.push(key.len() as u8);
        program.extend(key);
        Script::from_program(program)
    }

    #[test]
    fn test_extract_from_sign_key_hash() {
        let address = PaymentAddress::extract(&sign_key_hash_script()).unwrap();
        assert_eq!(address.to_string(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    #[test]
    fn test_extract_matches_pay_key_hash() {
        let hash = hash160(&hex::decode(GENERATOR_KEY).unwrap());
        let mut program = vec![OP_DUP, OP_HASH160, 20];
        program.extend(hash);
        program.extend([OP_EQUALVERIFY, OP_CHECKSIG]);

        let paid = PaymentAddress::extract(&Script::from_program(program)).unwrap();
        let spent = PaymentAddress::extract(&sign_key_hash_script()).unwrap();
        assert_eq!(paid, spent);
    }

    #[test]
    fn test_extract_script_hash() {
        let mut program = vec![OP_HASH160, 20];
        program.extend([0x42; 20]);
        program.push(OP_EQUAL);

        let address = PaymentAddress::extract(&Script::from_program(program)).unwrap();
        assert_eq!(address.version(), 0x05);
        assert!(address.to_string().starts_with('3'));
    }

    #[test]
    fn test_extract_with_testnet_prefixes() {
        let address =
            PaymentAddress::extract_with(&sign_key_hash_script(), &AddressPrefixes::testnet())
                .unwrap();
        assert_eq!(address.version(), 0x6f);
        let text = address.to_string();
        assert!(text.starts_with('m') || text.starts_with('n'));
    }

    #[test]
    fn test_non_standard_has_no_address() {
        assert_eq!(PaymentAddress::extract(&Script::new()), None);
        assert_eq!(
            PaymentAddress::extract(&Script::from_program(vec![OP_DUP, OP_DUP])),
            None
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let address = PaymentAddress::extract(&sign_key_hash_script()).unwrap();
        let parsed: PaymentAddress = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);

        let mut corrupted = address.to_string();
        corrupted.pop();
        corrupted.push('1');
        assert!(corrupted.parse::<PaymentAddress>().is_err());
    }
}
