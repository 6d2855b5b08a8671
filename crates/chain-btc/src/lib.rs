//! Bitcoin-family key and address support.
//!
//! Provides BIP-32 derivation from a 64-byte seed, BIP-86 taproot (bech32m)
//! addresses, and Lightning-style node ids (hex compressed public keys).

pub mod address;
pub mod error;
pub mod hd;
pub mod lightning;
pub mod network;

pub use error::BtcError;
pub use network::BtcNetwork;
