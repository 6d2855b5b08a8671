//! Substrate-family (Polkadot, Kusama) key and address support.
//!
//! Keys are sr25519 (Schnorr over Ristretto25519) built from a 32-byte mini
//! secret; addresses use the SS58 checksum format.

pub mod error;
pub mod keys;
pub mod ss58;

pub use error::DotError;
pub use keys::Sr25519Keypair;
pub use ss58::{decode_address, encode_address, validate_address, KUSAMA_PREFIX, POLKADOT_PREFIX};
