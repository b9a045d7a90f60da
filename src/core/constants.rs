//! Consensus constants for transaction inputs

// =============================================================================
// Sequence
// =============================================================================

/// Sequence value that marks an input as final (BIP-68 and locktime exempt)
pub const MAX_INPUT_SEQUENCE: u32 = 0xFFFFFFFF;

/// Sequence bit that disables relative locktime (BIP-68)
pub const RELATIVE_LOCKTIME_DISABLED: u32 = 1 << 31;

/// Sequence bit that selects 512-second units instead of blocks (BIP-68)
pub const RELATIVE_LOCKTIME_TIME_LOCKED: u32 = 1 << 22;

/// Mask over the sequence bits holding the relative locktime value
pub const RELATIVE_LOCKTIME_MASK: u32 = 0x0000FFFF;

/// Shift converting 512-second units to seconds
pub const RELATIVE_LOCKTIME_SECONDS_SHIFT: u32 = 9;

// =============================================================================
// Points
// =============================================================================

/// Output index of the null point (coinbase spend)
pub const NULL_INDEX: u32 = u32::MAX;

/// Store-form sentinel for the null index
pub const STORE_NULL_INDEX: u16 = u16::MAX;

/// Serialized point size in wire form
pub const POINT_WIRE_SIZE: usize = 36;

/// Serialized point size in store form
pub const POINT_STORE_SIZE: usize = 34;

// =============================================================================
// Scripts
// =============================================================================

/// Largest script length prefix the decoder accepts (block size bound)
pub const MAX_SCRIPT_DECODE_SIZE: usize = 4_000_000;

/// Largest script the interpreter executes
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Sigops charged for a multisig whose key count is not known
pub const MULTISIG_DEFAULT_SIGOPS: usize = 20;

/// Blocks before a coinbase output can be spent
pub const COINBASE_MATURITY: u64 = 100;
