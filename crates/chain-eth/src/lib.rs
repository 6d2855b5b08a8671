//! Ethereum/EVM key and address support.
//!
//! This crate provides:
//! - secp256k1 keypairs built from raw 32-byte key material
//! - Keccak-256 address derivation with EIP-55 checksums
//! - The table of EVM networks that share this address scheme

pub mod address;
pub mod chains;
pub mod error;
pub mod keys;

pub use address::{checksum_address, pubkey_to_eth_address, validate_address};
pub use error::EthError;
pub use keys::EthKeypair;
