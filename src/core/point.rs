//! Transaction output points
//!
//! A point names an output by the hash of the transaction that created it
//! and the output's index within that transaction.

use crate::codec::{CodecError, Mode, Reader, SliceReader, Writer, HASH_SIZE};
use crate::core::constants::{NULL_INDEX, POINT_STORE_SIZE, POINT_WIRE_SIZE, STORE_NULL_INDEX};
use crate::core::point_iterator::PointIterator;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A 32-byte transaction hash in internal byte order
pub type HashDigest = [u8; HASH_SIZE];

/// The all-zero hash
pub const NULL_HASH: HashDigest = [0u8; HASH_SIZE];

/// Hash parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Invalid hash length: {0} bytes")]
    InvalidLength(usize),
}

/// Encode a hash for display (byte-reversed hex, as block explorers show it)
pub fn encode_hash(hash: &HashDigest) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Decode a display-order hex hash
pub fn decode_hash(text: &str) -> Result<HashDigest, HashError> {
    let bytes = hex::decode(text).map_err(|e| HashError::InvalidHex(e.to_string()))?;
    let mut hash: HashDigest = bytes
        .as_slice()
        .try_into()
        .map_err(|_| HashError::InvalidLength(bytes.len()))?;
    hash.reverse();
    Ok(hash)
}

// =============================================================================
// Point
// =============================================================================

/// Reference to a transaction output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    hash: HashDigest,
    index: u32,
}

impl Point {
    pub fn new(hash: HashDigest, index: u32) -> Self {
        Self { hash, index }
    }

    /// The point spent by coinbase inputs
    pub fn null() -> Self {
        Self::new(NULL_HASH, NULL_INDEX)
    }

    pub fn hash(&self) -> &HashDigest {
        &self.hash
    }

    pub fn set_hash(&mut self, hash: HashDigest) {
        self.hash = hash;
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn set_index(&mut self, index: u32) {
        self.index = index;
    }

    pub fn is_null(&self) -> bool {
        self.index == NULL_INDEX && self.hash == NULL_HASH
    }

    pub fn is_valid(&self) -> bool {
        self.hash != NULL_HASH || self.index != 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Compact key for hash-table indexing
    ///
    /// Keeps the upper 49 bits of a word taken from the middle of the hash
    /// and the lower 15 bits of the index.
    pub fn checksum(&self) -> u64 {
        const MASK: u64 = 0xffff_ffff_ffff_8000;

        let mut word = [0u8; 8];
        word.copy_from_slice(&self.hash[12..20]);
        let tx = u64::from_le_bytes(word);

        (tx & MASK) | (u64::from(self.index) & !MASK)
    }

    /// Byte iterator over the wire serialization
    pub fn bytes(&self) -> PointIterator<'_> {
        PointIterator::new(self)
    }

    // Serialization.
    // -------------------------------------------------------------------------

    pub fn serialized_size(&self, mode: Mode) -> usize {
        match mode {
            Mode::Wire => POINT_WIRE_SIZE,
            Mode::Store => POINT_STORE_SIZE,
        }
    }

    pub fn from_data<R: Reader>(&mut self, source: &mut R, mode: Mode) -> Result<(), CodecError> {
        self.reset();

        let result = Self::read(source, mode);
        match result {
            Ok(point) => {
                *self = point;
                Ok(())
            }
            Err(e) => {
                source.invalidate();
                Err(e)
            }
        }
    }

    pub fn from_bytes(data: &[u8], mode: Mode) -> Result<Self, CodecError> {
        let mut point = Self::default();
        point.from_data(&mut SliceReader::new(data), mode)?;
        Ok(point)
    }

    fn read<R: Reader>(source: &mut R, mode: Mode) -> Result<Self, CodecError> {
        let hash = source.read_hash()?;
        let index = match mode {
            Mode::Wire => source.read_u32_le()?,
            Mode::Store => match source.read_u16_le()? {
                STORE_NULL_INDEX => NULL_INDEX,
                index => u32::from(index),
            },
        };
        Ok(Self { hash, index })
    }

    /// Encode the point
    ///
    /// Store mode keeps 16 bits of index, with `0xFFFF` reserved for the null
    /// index. Indices from `0xFFFF` up to `u32::MAX - 1` cannot be stored:
    /// debug builds panic on them and release builds write the null marker.
    pub fn to_data<W: Writer>(&self, sink: &mut W, mode: Mode) {
        sink.write_hash(&self.hash);
        match mode {
            Mode::Wire => sink.write_u32_le(self.index),
            Mode::Store => {
                debug_assert!(
                    self.index == NULL_INDEX || self.index < u32::from(STORE_NULL_INDEX),
                    "index {} has no store form",
                    self.index
                );
                let index = if self.index == NULL_INDEX {
                    STORE_NULL_INDEX
                } else {
                    self.index as u16
                };
                sink.write_u16_le(index);
            }
        }
    }

    pub fn to_bytes(&self, mode: Mode) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.serialized_size(mode));
        self.to_data(&mut data, mode);
        debug_assert_eq!(data.len(), self.serialized_size(mode));
        data
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", encode_hash(&self.hash), self.index)
    }
}

// =============================================================================
// Tests
// =============================================================================
