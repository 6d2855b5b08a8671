use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::secp256k1::{PublicKey, Secp256k1};

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// Derives a BIP-86 key-path-only taproot address (bech32m, `bc1p...` /
/// `tb1p...`) from a 33-byte compressed public key.
///
/// The key's x coordinate is the internal key; it is tweaked with an empty
/// script tree.
pub fn pubkey_to_p2tr_address(
    pubkey_bytes: &[u8; 33],
    network: BtcNetwork,
) -> Result<String, BtcError> {
    let pubkey = PublicKey::from_slice(pubkey_bytes)
        .map_err(|e| BtcError::InvalidPublicKey(format!("failed to parse public key: {e}")))?;
    let (internal_key, _parity) = pubkey.x_only_public_key();

    let secp = Secp256k1::verification_only();
    let address = Address::p2tr(&secp, internal_key, None, network.to_bitcoin_network());

    Ok(address.to_string())
}

/// Validate a Bitcoin address string for the given network.
///
/// Returns `true` if the address is valid for the specified network,
/// `false` if it parses but belongs to a different network.
pub fn validate_address(address: &str, network: BtcNetwork) -> Result<bool, BtcError> {
    let parsed = address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| BtcError::InvalidAddress(format!("failed to parse address: {e}")))?;

    Ok(parsed.is_valid_for_network(network.to_bitcoin_network()))
}
