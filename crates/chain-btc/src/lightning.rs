use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey};

use crate::error::BtcError;

/// Compressed public key for a raw secp256k1 secret.
pub fn secret_to_pubkey(secret: &[u8; 32]) -> Result<[u8; 33], BtcError> {
    let secret_key = SecretKey::from_slice(secret)
        .map_err(|e| BtcError::InvalidPrivateKey(e.to_string()))?;
    let secp = Secp256k1::signing_only();
    Ok(PublicKey::from_secret_key(&secp, &secret_key).serialize())
}

/// A node id is the lowercase hex of the 33-byte compressed public key.
pub fn pubkey_to_node_id(pubkey: &[u8; 33]) -> String {
    hex::encode(pubkey)
}

/// Checks that `node_id` is 66 hex characters encoding a point on the curve.
pub fn validate_node_id(node_id: &str) -> Result<bool, BtcError> {
    if node_id.len() != 66 {
        return Err(BtcError::InvalidAddress(format!(
            "expected 66 hex characters, got {}",
            node_id.len()
        )));
    }
    let bytes = hex::decode(node_id)
        .map_err(|e| BtcError::InvalidAddress(format!("invalid hex: {e}")))?;
    PublicKey::from_slice(&bytes)
        .map(|_| true)
        .map_err(|e| BtcError::InvalidAddress(format!("not a curve point: {e}")))
}
