use ed25519_dalek::SigningKey;
use zeroize::Zeroize;

use crate::address::pubkey_to_address;

/// An Ed25519 keypair generated from a 32-byte seed (RFC 8032 key
/// generation). Any 32 bytes form a valid seed.
pub struct SolKeypair {
    seed: [u8; 32],
    public_key: [u8; 32],
}

impl SolKeypair {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self {
            seed: *seed,
            public_key: signing_key.verifying_key().to_bytes(),
        }
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn address(&self) -> String {
        pubkey_to_address(&self.public_key)
    }
}

impl Drop for SolKeypair {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}
