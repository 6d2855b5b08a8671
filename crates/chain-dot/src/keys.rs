use schnorrkel::{ExpansionMode, MiniSecretKey};
use zeroize::Zeroize;

use crate::error::DotError;
use crate::ss58::encode_address;

/// An sr25519 keypair expanded from a 32-byte mini secret.
///
/// Expansion uses `ExpansionMode::Ed25519`, the mode Substrate tooling uses
/// for seeds, so the public key matches what `subkey` reports for the same
/// secret seed.
pub struct Sr25519Keypair {
    mini_secret: [u8; 32],
    public_key: [u8; 32],
}

impl Sr25519Keypair {
    pub fn from_mini_secret(seed: &[u8; 32]) -> Result<Self, DotError> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| DotError::InvalidSecret(e.to_string()))?;
        let keypair = mini.expand_to_keypair(ExpansionMode::Ed25519);

        Ok(Self {
            mini_secret: *seed,
            public_key: keypair.public.to_bytes(),
        })
    }

    pub fn mini_secret(&self) -> &[u8; 32] {
        &self.mini_secret
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn address(&self, prefix: u16) -> Result<String, DotError> {
        encode_address(&self.public_key, prefix)
    }
}

impl Drop for Sr25519Keypair {
    fn drop(&mut self) {
        self.mini_secret.zeroize();
    }
}
