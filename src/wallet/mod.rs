//! Wallet module for payment addresses

pub mod address;

pub use address::{AddressError, PaymentAddress};
