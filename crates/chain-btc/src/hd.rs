use bip32::{DerivationPath, XPrv};
use zeroize::Zeroize;

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// BIP-86 single-key taproot path. The index is fixed at zero: callers
/// separate accounts upstream, before the seed is produced.
pub fn taproot_path(network: BtcNetwork) -> String {
    format!("m/86'/{}'/0'/0/0", network.coin_type())
}

/// A secp256k1 child key derived along a BIP-32 path.
pub struct HdKey {
    pub private_key: [u8; 32],
    pub public_key_compressed: [u8; 33],
    pub derivation_path: String,
}

impl Drop for HdKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Derives the child at `path` from a BIP-32 master seed (16 to 64 bytes).
pub fn derive_child(seed: &[u8], path: &str) -> Result<HdKey, BtcError> {
    let parsed: DerivationPath = path
        .parse()
        .map_err(|e: bip32::Error| BtcError::Derivation(format!("bad path {path}: {e}")))?;

    let xprv = XPrv::derive_from_path(seed, &parsed)
        .map_err(|e| BtcError::Derivation(e.to_string()))?;

    Ok(HdKey {
        private_key: xprv.to_bytes(),
        public_key_compressed: xprv.public_key().to_bytes(),
        derivation_path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-39 seed of "abandon" x11 + "about" with an empty passphrase.
    const BIP39_SEED: &str = "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
                              9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4";

    fn seed() -> Vec<u8> {
        hex::decode(BIP39_SEED).unwrap()
    }

    #[test]
    fn taproot_paths() {
        assert_eq!(taproot_path(BtcNetwork::Mainnet), "m/86'/0'/0'/0/0");
        assert_eq!(taproot_path(BtcNetwork::Testnet), "m/86'/1'/0'/0/0");
    }

    #[test]
    fn bip86_reference_internal_key() {
        let key = derive_child(&seed(), "m/86'/0'/0'/0/0").unwrap();
        // x-only internal key from the BIP-86 test vectors.
        assert_eq!(
            hex::encode(&key.public_key_compressed[1..]),
            "cc8a4bc64d897bddc5fbc2f670f7a8ba0b386779106cf1223c6fc5d7cd6fc115"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_child(&seed(), "m/86'/0'/0'/0/0").unwrap();
        let b = derive_child(&seed(), "m/86'/0'/0'/0/0").unwrap();
        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.derivation_path, "m/86'/0'/0'/0/0");
    }

    #[test]
    fn different_paths_differ() {
        let a = derive_child(&seed(), "m/86'/0'/0'/0/0").unwrap();
        let b = derive_child(&seed(), "m/86'/1'/0'/0/0").unwrap();
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn malformed_path_errors() {
        assert!(matches!(
            derive_child(&seed(), "86'/0'"),
            Err(BtcError::Derivation(_))
        ));
    }
}
