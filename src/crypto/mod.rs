//! Cryptographic hashing
//!
//! This module provides:
//! - SHA-256 and double SHA-256
//! - HASH160 (RIPEMD-160 of SHA-256) for addresses
//! - Base58Check checksums

pub mod hash;

pub use hash::{checksum, double_sha256, hash160, sha256, sha256_hex, SHORT_HASH_SIZE};
