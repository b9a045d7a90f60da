//! CLI commands for the inspection tool
//!
//! Implements the command handlers for the `txin` binary. Each handler
//! builds a serializable summary and prints it as JSON.

use crate::codec::Mode;
use crate::config::AddressPrefixes;
use crate::core::{decode_hash, encode_hash, Input, Point, RelativeLockTime};
use serde::Serialize;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Decoded input, as printed by `txin decode`
#[derive(Debug, Serialize)]
pub struct InputSummary {
    pub previous_hash: String,
    pub previous_index: u32,
    pub coinbase_spend: bool,
    pub script: String,
    pub script_asm: String,
    pub script_pattern: &'static str,
    pub sequence: u32,
    pub is_final: bool,
    pub relative_locktime: Option<RelativeLockTime>,
    /// Legacy count; P2SH redeem costs need the spent output's script
    pub sigops: usize,
    pub address: Option<String>,
    pub wire_size: usize,
    pub store_size: usize,
}

/// Serialized point, as printed by `txin point`
#[derive(Debug, Serialize)]
pub struct PointSummary {
    pub point: String,
    pub wire_key: String,
    pub checksum: u64,
}

pub fn summarize_input(input: &Input, prefixes: &AddressPrefixes) -> InputSummary {
    let previous_output = input.previous_output();
    let script = input.script();

    InputSummary {
        previous_hash: encode_hash(previous_output.hash()),
        previous_index: previous_output.index(),
        coinbase_spend: previous_output.is_null(),
        script: script.to_hex(),
        script_asm: script.to_string(),
        script_pattern: script.pattern().name(),
        sequence: input.sequence(),
        is_final: input.is_final(),
        relative_locktime: input.relative_locktime(),
        sigops: input.signature_operations(false),
        address: input.address_with(prefixes).map(|address| address.to_string()),
        wire_size: input.serialized_size(Mode::Wire),
        store_size: input.serialized_size(Mode::Store),
    }
}

pub fn summarize_point(point: &Point) -> PointSummary {
    let key: Vec<u8> = point.bytes().collect();

    PointSummary {
        point: point.to_string(),
        wire_key: hex::encode(key),
        checksum: point.checksum(),
    }
}

/// Decode a hex-encoded input and print its summary
pub fn cmd_decode(data_hex: &str, store: bool, testnet: bool) -> CliResult<()> {
    let data = hex::decode(data_hex.trim())?;
    let mode = if store { Mode::Store } else { Mode::Wire };
    let prefixes = if testnet {
        AddressPrefixes::testnet()
    } else {
        AddressPrefixes::mainnet()
    };

    let input = Input::from_bytes(&data, mode)?;
    let consumed = input.serialized_size(mode);
    if consumed < data.len() {
        log::warn!(
            "Ignoring {} trailing bytes after the input",
            data.len() - consumed
        );
    }

    let summary = summarize_input(&input, &prefixes);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the serialized key of a point
pub fn cmd_point(hash_hex: &str, index: u32) -> CliResult<()> {
    let point = Point::new(decode_hash(hash_hex)?, index);
    let summary = summarize_point(&point);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
