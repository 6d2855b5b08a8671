use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use zeroize::Zeroize;

use crate::address::pubkey_to_eth_address;
use crate::error::EthError;

/// A secp256k1 keypair built directly from 32 bytes of key material.
///
/// The scalar is validated by k256: zero and values at or above the curve
/// order are rejected rather than reduced.
pub struct EthKeypair {
    private_key: [u8; 32],
    public_key_compressed: [u8; 33],
    public_key_uncompressed: [u8; 65],
}

impl EthKeypair {
    pub fn from_secret(secret: &[u8; 32]) -> Result<Self, EthError> {
        let signing_key = SigningKey::from_slice(secret)
            .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
        let verifying_key = signing_key.verifying_key();

        let public_key_compressed: [u8; 33] = verifying_key
            .to_encoded_point(true)
            .as_bytes()
            .try_into()
            .map_err(|_| EthError::InvalidPublicKey("unexpected compressed length".into()))?;
        let public_key_uncompressed: [u8; 65] = verifying_key
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .map_err(|_| EthError::InvalidPublicKey("unexpected uncompressed length".into()))?;

        Ok(Self {
            private_key: *secret,
            public_key_compressed,
            public_key_uncompressed,
        })
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn public_key_compressed(&self) -> &[u8; 33] {
        &self.public_key_compressed
    }

    pub fn public_key_uncompressed(&self) -> &[u8; 65] {
        &self.public_key_uncompressed
    }

    /// EIP-55 checksummed address for this keypair.
    pub fn address(&self) -> Result<String, EthError> {
        pubkey_to_eth_address(&self.public_key_uncompressed)
    }
}

impl Drop for EthKeypair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
