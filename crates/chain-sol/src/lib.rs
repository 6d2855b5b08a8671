//! Solana key and address support.
//!
//! Solana addresses are the Base58 encoding of a raw 32-byte Ed25519 public
//! key, with no hashing step and no version byte.

pub mod address;
pub mod error;
pub mod keys;

pub use address::{address_to_bytes, pubkey_to_address, validate_address};
pub use error::SolError;
pub use keys::SolKeypair;
