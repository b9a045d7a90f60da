//! Core transaction-input data model
//!
//! This module contains the building blocks of a spend reference:
//! - Points (transaction hash + output index) and their byte iterator
//! - Output points carrying chain-state validation data
//! - Scripts (operation parsing, sigop counting, pattern matching)
//! - Inputs (dual-mode codec, finality, BIP-68, sigops, cached address)

pub mod constants;
pub mod input;
pub mod opcode;
pub mod output_point;
pub mod point;
pub mod point_iterator;
pub mod script;

pub use constants::{
    COINBASE_MATURITY, MAX_INPUT_SEQUENCE, MAX_SCRIPT_SIZE, MULTISIG_DEFAULT_SIGOPS, NULL_INDEX,
    POINT_STORE_SIZE, POINT_WIRE_SIZE, RELATIVE_LOCKTIME_DISABLED, RELATIVE_LOCKTIME_MASK,
    RELATIVE_LOCKTIME_SECONDS_SHIFT, RELATIVE_LOCKTIME_TIME_LOCKED,
};
pub use input::{Input, RelativeLockTime, SequenceFlags};
pub use output_point::{OutputPoint, PrevoutValidation};
pub use point::{decode_hash, encode_hash, HashDigest, HashError, Point, NULL_HASH};
pub use point_iterator::PointIterator;
pub use script::{Operation, Operations, Script, ScriptError, ScriptPattern};
