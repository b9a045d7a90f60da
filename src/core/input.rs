//! Transaction inputs
//!
//! An input spends a previous output: it names the output point, carries the
//! unlocking script, and holds the sequence number that signals finality and
//! relative locktime (BIP-68).
//!
//! Production-grade features:
//! - Wire and store encodings sharing one field order
//! - BIP-68 relative locktime checks against chain-state data
//! - Legacy and P2SH (BIP-16) sigop accounting
//! - A lazily derived payment address, shared safely between readers

use crate::codec::{CodecError, Mode, Reader, SliceReader, StreamReader, StreamWriter, Writer};
use crate::config::AddressPrefixes;
use crate::core::constants::{
    MAX_INPUT_SEQUENCE, RELATIVE_LOCKTIME_DISABLED, RELATIVE_LOCKTIME_MASK,
    RELATIVE_LOCKTIME_SECONDS_SHIFT, RELATIVE_LOCKTIME_TIME_LOCKED,
};
use crate::core::output_point::OutputPoint;
use crate::core::script::Script;
use crate::wallet::PaymentAddress;
use bitflags::bitflags;
use parking_lot::{RwLock, RwLockUpgradableReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::io;

/// Size of the serialized sequence field
const SEQUENCE_SIZE: usize = 4;

// =============================================================================
// Sequence
// =============================================================================

bitflags! {
    /// Flag bits of the sequence field (BIP-68)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SequenceFlags: u32 {
        /// Relative locktime does not apply
        const DISABLED = RELATIVE_LOCKTIME_DISABLED;
        /// The locktime value counts 512-second units instead of blocks
        const TIME_LOCKED = RELATIVE_LOCKTIME_TIME_LOCKED;
    }
}

/// Relative locktime encoded in a sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeLockTime {
    /// Minimum confirmations of the spent output
    Blocks(u16),
    /// Minimum age of the spent output, in 512-second units
    Time(u16),
}

impl RelativeLockTime {
    /// Decode a sequence number; `None` when the disable bit is set
    pub fn from_sequence(sequence: u32) -> Option<Self> {
        let flags = SequenceFlags::from_bits_truncate(sequence);
        if flags.contains(SequenceFlags::DISABLED) {
            return None;
        }

        let minimum = (sequence & RELATIVE_LOCKTIME_MASK) as u16;
        if flags.contains(SequenceFlags::TIME_LOCKED) {
            Some(RelativeLockTime::Time(minimum))
        } else {
            Some(RelativeLockTime::Blocks(minimum))
        }
    }

    /// Encode as a sequence number
    pub fn to_sequence(self) -> u32 {
        match self {
            RelativeLockTime::Blocks(blocks) => u32::from(blocks),
            RelativeLockTime::Time(units) => SequenceFlags::TIME_LOCKED.bits() | u32::from(units),
        }
    }

    /// Required age in seconds for time locks
    pub fn seconds(self) -> Option<u32> {
        match self {
            RelativeLockTime::Time(units) => {
                Some(u32::from(units) << RELATIVE_LOCKTIME_SECONDS_SHIFT)
            }
            RelativeLockTime::Blocks(_) => None,
        }
    }
}

// =============================================================================
// Address Cache
// =============================================================================

/// Memoized address of the unlocking script
///
/// The outer option records whether extraction ran; the inner one is its
/// result. Extraction is pure, so two threads racing through an empty cache
/// store the same value.
#[derive(Debug, Default)]
struct AddressCache(RwLock<Option<Option<PaymentAddress>>>);

impl AddressCache {
    fn get_or_extract(&self, script: &Script) -> Option<PaymentAddress> {
        if let Some(address) = *self.0.read() {
            return address;
        }

        let guard = self.0.upgradable_read();
        let guard = if guard.is_none() {
            let mut exclusive = RwLockUpgradableReadGuard::upgrade(guard);
            *exclusive = Some(PaymentAddress::extract(script));
            log::trace!("Cached input address {:?}", *exclusive);
            RwLockWriteGuard::downgrade_to_upgradable(exclusive)
        } else {
            guard
        };

        (*guard).flatten()
    }

    fn invalidate(&self) {
        let guard = self.0.upgradable_read();
        if guard.is_some() {
            let mut exclusive = RwLockUpgradableReadGuard::upgrade(guard);
            *exclusive = None;
            log::trace!("Invalidated cached input address");
        }
    }
}

// =============================================================================
// Input
// =============================================================================

/// A transaction input
///
/// Equality, cloning and serialization cover the previous output, script
/// and sequence. The cached address is not state: clones start without it.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Input {
    previous_output: OutputPoint,
    script: Script,
    sequence: u32,
    #[serde(skip)]
    address: AddressCache,
}

impl Input {
    pub fn new(previous_output: OutputPoint, script: Script, sequence: u32) -> Self {
        Self {
            previous_output,
            script,
            sequence,
            address: AddressCache::default(),
        }
    }

    /// Decode from a byte slice
    pub fn from_bytes(data: &[u8], mode: Mode) -> Result<Self, CodecError> {
        Self::from_reader(&mut SliceReader::new(data), mode)
    }

    /// Decode from a buffered byte stream
    ///
    /// Only this input's bytes are consumed, so consecutive inputs can be
    /// decoded from the same stream.
    pub fn from_stream<S: io::BufRead>(stream: S, mode: Mode) -> Result<Self, CodecError> {
        Self::from_reader(&mut StreamReader::new(stream), mode)
    }

    pub fn from_reader<R: Reader>(source: &mut R, mode: Mode) -> Result<Self, CodecError> {
        let mut input = Self::default();
        input.from_data(source, mode)?;
        Ok(input)
    }

    /// Decode in place
    ///
    /// On failure the input is left in its null state and the source is
    /// invalidated.
    pub fn from_data<R: Reader>(&mut self, source: &mut R, mode: Mode) -> Result<(), CodecError> {
        self.reset();

        let result = self.read_fields(source, mode);
        if let Err(e) = &result {
            log::debug!("Failed to decode {:?} input: {}", mode, e);
            source.invalidate();
            self.reset();
        }
        result
    }

    fn read_fields<R: Reader>(&mut self, source: &mut R, mode: Mode) -> Result<(), CodecError> {
        self.previous_output.from_data(source, mode)?;
        // Scripts are always length-prefixed, whatever the outer mode.
        self.script.from_data(source, Mode::Wire)?;
        self.sequence = source.read_u32_le()?;
        Ok(())
    }

    /// Return to the null state
    pub fn reset(&mut self) {
        self.previous_output.reset();
        self.script.reset();
        self.sequence = 0;
        self.address.invalidate();
    }

    /// False only for the null state
    ///
    /// An empty script with zero sequence is a real input when it spends a
    /// valid previous output.
    pub fn is_valid(&self) -> bool {
        self.sequence != 0 || self.previous_output.is_valid() || self.script.is_valid()
    }

    // Serialization.
    // -------------------------------------------------------------------------

    pub fn serialized_size(&self, mode: Mode) -> usize {
        self.previous_output.serialized_size(mode)
            + self.script.serialized_size(Mode::Wire)
            + SEQUENCE_SIZE
    }

    pub fn to_data<W: Writer>(&self, sink: &mut W, mode: Mode) {
        self.previous_output.to_data(sink, mode);
        self.script.to_data(sink, Mode::Wire);
        sink.write_u32_le(self.sequence);
    }

    /// Encode to a new buffer
    ///
    /// Store mode requires a previous output index below `0xFFFF` or the
    /// null index; see `Point::to_data`.
    pub fn to_bytes(&self, mode: Mode) -> Vec<u8> {
        let size = self.serialized_size(mode);
        let mut data = Vec::with_capacity(size);
        self.to_data(&mut data, mode);
        debug_assert_eq!(data.len(), size);
        data
    }

    pub fn to_stream<S: io::Write>(&self, stream: S, mode: Mode) -> io::Result<()> {
        let mut sink = StreamWriter::new(stream);
        self.to_data(&mut sink, mode);
        sink.finish().map(drop)
    }

    // Accessors.
    // -------------------------------------------------------------------------

    pub fn previous_output(&self) -> &OutputPoint {
        &self.previous_output
    }

    /// Mutable access, for chain state to populate validation data
    pub fn previous_output_mut(&mut self) -> &mut OutputPoint {
        &mut self.previous_output
    }

    pub fn set_previous_output(&mut self, previous_output: OutputPoint) {
        self.previous_output = previous_output;
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Replace the script, dropping the cached address
    pub fn set_script(&mut self, script: Script) {
        self.script = script;
        self.address.invalidate();
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    /// Address derived from the unlocking script (mainnet prefixes, cached)
    pub fn address(&self) -> Option<PaymentAddress> {
        self.address.get_or_extract(&self.script)
    }

    /// Address derived with explicit prefixes (not cached)
    pub fn address_with(&self, prefixes: &AddressPrefixes) -> Option<PaymentAddress> {
        PaymentAddress::extract_with(&self.script, prefixes)
    }

    // Validation helpers.
    // -------------------------------------------------------------------------

    /// Exempt from absolute and relative locktime
    pub fn is_final(&self) -> bool {
        self.sequence == MAX_INPUT_SEQUENCE
    }

    pub fn relative_locktime(&self) -> Option<RelativeLockTime> {
        RelativeLockTime::from_sequence(self.sequence)
    }

    /// BIP-68: whether the spent output is still too young
    ///
    /// Requires populated prevout validation data. The current height and
    /// median time past must not be older than the prevout's; monotonic
    /// chain state guarantees this.
    pub fn is_locked(&self, block_height: u64, median_time_past: u32) -> bool {
        let locktime = match self.relative_locktime() {
            Some(locktime) => locktime,
            None => return false,
        };

        let prevout = self.previous_output.populated();

        match locktime {
            RelativeLockTime::Time(units) => {
                debug_assert!(median_time_past >= prevout.median_time_past);
                let age_seconds = median_time_past.wrapping_sub(prevout.median_time_past);
                age_seconds < (u32::from(units) << RELATIVE_LOCKTIME_SECONDS_SHIFT)
            }
            RelativeLockTime::Blocks(blocks) => {
                debug_assert!(block_height >= prevout.height);
                let age_blocks = block_height.wrapping_sub(prevout.height);
                age_blocks < u64::from(blocks)
            }
        }
    }

    /// Sigops charged for this input
    ///
    /// With BIP-16 active the redeem script of a P2SH spend is counted too,
    /// which requires populated prevout validation data.
    pub fn signature_operations(&self, bip16_active: bool) -> usize {
        let mut sigops = self.script.operation_count(false);

        if bip16_active {
            // Each count is bounded by its script size, so this cannot overflow.
            let prevout_script = &self.previous_output.populated().referenced_script;
            sigops += self.script.embedded_operation_count(prevout_script);
        }

        sigops
    }
}

impl Clone for Input {
    fn clone(&self) -> Self {
        Self::new(
            self.previous_output.clone(),
            self.script.clone(),
            self.sequence,
        )
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
            && self.previous_output == other.previous_output
            && self.script == other.script
    }
}

impl Eq for Input {}

// =============================================================================
// Tests
// =============================================================================
