//! Cryptographic hashing utilities
//!
//! Provides the SHA-256 and RIPEMD-160 based digests used for transaction
//! hashes, script hashes and address checksums.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Length of a RIPEMD-160 digest
pub const SHORT_HASH_SIZE: usize = 20;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Computes RIPEMD-160 of SHA-256, the digest behind key and script hashes
pub fn hash160(data: &[u8]) -> [u8; SHORT_HASH_SIZE] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}

/// First four bytes of the double SHA-256, used by base58check
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let hash = double_sha256(data);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
