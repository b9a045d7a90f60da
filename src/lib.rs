//! txin-model: the transaction-input data model of a Bitcoin-style full node
//!
//! This crate provides:
//! - Points (transaction hash + output index) with a zero-allocation byte view
//! - Wire and store encodings for points and inputs
//! - Finality and BIP-68 relative locktime checks
//! - Signature operation accounting, including P2SH redeem scripts
//! - Payment address derivation, cached per input and safe to share across threads
//!
//! # Example
//!
//! ```rust
//! use txin_model::codec::Mode;
//! use txin_model::core::{Input, OutputPoint, PrevoutValidation, Script};
//!
//! // Spend output 0 of some transaction, with a 10-block relative lock
//! let mut input = Input::new(OutputPoint::new([0x11; 32], 0), Script::new(), 10);
//!
//! // Wire and store encodings differ only in the point index width
//! let wire = input.to_bytes(Mode::Wire);
//! let store = input.to_bytes(Mode::Store);
//! assert_eq!(wire.len(), store.len() + 2);
//! assert_eq!(Input::from_bytes(&wire, Mode::Wire).unwrap(), input);
//!
//! // Chain state supplies where the spent output confirmed
//! input.previous_output_mut().set_validation(PrevoutValidation {
//!     height: 100,
//!     ..Default::default()
//! });
//! assert!(input.is_locked(109, 0));
//! assert!(!input.is_locked(110, 0));
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod core;
pub mod crypto;
pub mod wallet;

// Re-export commonly used types
pub use codec::{CodecError, Mode, Reader, SliceReader, StreamReader, StreamWriter, Writer};
pub use config::AddressPrefixes;
pub use crate::core::{
    Input, OutputPoint, Point, PointIterator, PrevoutValidation, RelativeLockTime, Script,
    SequenceFlags,
};
pub use wallet::{AddressError, PaymentAddress};
