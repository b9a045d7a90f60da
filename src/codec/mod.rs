//! Byte codec for wire and store serialization
//!
//! This module provides:
//! - `Reader` / `Writer` cursors with little-endian integers and compact sizes
//! - Slice, `io::Read`, `Vec` and `io::Write` implementations
//! - The serialization `Mode` shared by every serializable entity

pub mod reader;
pub mod writer;

pub use reader::{Reader, SliceReader, StreamReader};
pub use writer::{compact_size_len, StreamWriter, Writer};

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Length of a serialized hash
pub const HASH_SIZE: usize = 32;

/// Codec errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unexpected end of data: needed {needed} bytes, {available} available")]
    UnexpectedEnd { needed: usize, available: usize },
    #[error("Length prefix {length} exceeds limit of {limit} bytes")]
    LengthTooLarge { length: u64, limit: usize },
    #[error("Read from an invalidated source")]
    Invalidated,
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Serialization layout
///
/// Both modes share field order; they differ only in how nested fields
/// choose to encode themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Network protocol layout
    #[default]
    Wire,
    /// Internal persisted layout
    Store,
}

impl Mode {
    pub fn is_wire(self) -> bool {
        self == Mode::Wire
    }
}
