//! # crypto-utils
//!
//! Master secret handling and the keyed entropy engine every chain key is
//! derived from.

pub mod entropy;
pub mod error;
pub mod secret;

pub use entropy::{derive_entropy, Entropy, ENTROPY_LEN, KEY_MATERIAL_LEN};
pub use error::CryptoError;
pub use secret::MasterSecret;
