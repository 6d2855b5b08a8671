use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Derives an EIP-55 checksummed address from an uncompressed secp256k1
/// public key (65 bytes, `0x04 || x || y`).
///
/// Keccak-256 is taken over the 64 coordinate bytes and the low 20 bytes of
/// the digest form the address.
pub fn pubkey_to_eth_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&hash[12..]);

    Ok(encode_checksummed(&raw))
}

/// EIP-55 encoding of raw address bytes.
pub fn encode_checksummed(raw: &[u8; 20]) -> String {
    let lower = hex::encode(raw);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        // High nibble for even positions, low nibble for odd.
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Decodes a `0x`-prefixed address into its 20 raw bytes. Case is ignored.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_part = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|_| EthError::InvalidAddress("address contains non-hex characters".into()))?;

    let mut raw = [0u8; 20];
    raw.copy_from_slice(&bytes);
    Ok(raw)
}

/// Re-applies the EIP-55 casing to any well-formed address.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    parse_address(address).map(|raw| encode_checksummed(&raw))
}

/// Validates an address string.
///
/// Malformed input is an error. Single-case addresses carry no checksum and
/// are accepted; mixed-case addresses must match their EIP-55 casing, and a
/// mismatch yields `Ok(false)`.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let raw = parse_address(address)?;
    let hex_part = &address[2..];

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return Ok(true);
    }

    Ok(encode_checksummed(&raw)[2..] == *hex_part)
}
