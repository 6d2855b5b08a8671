use crate::error::SolError;

/// Shortest and longest Base58 renderings of a 32-byte key.
pub const MIN_ADDRESS_LEN: usize = 32;
pub const MAX_ADDRESS_LEN: usize = 44;

/// Encodes a 32-byte Ed25519 public key as a Solana address.
pub fn pubkey_to_address(pubkey: &[u8; 32]) -> String {
    bs58::encode(pubkey).into_string()
}

/// Decodes an address back to the 32 public key bytes.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&address.len()) {
        return Err(SolError::InvalidAddress(format!(
            "expected {MIN_ADDRESS_LEN}-{MAX_ADDRESS_LEN} characters, got {}",
            address.len()
        )));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Returns `Ok(true)` for a well-formed address, an error otherwise.
pub fn validate_address(address: &str) -> Result<bool, SolError> {
    address_to_bytes(address).map(|_| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_address() {
        assert_eq!(pubkey_to_address(&[0u8; 32]), "11111111111111111111111111111111");
    }

    #[test]
    fn token_program_roundtrip() {
        let address = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
        let bytes = address_to_bytes(address).unwrap();
        assert_eq!(pubkey_to_address(&bytes), address);
    }

    #[test]
    fn max_value_key_fits_length_bound() {
        let address = pubkey_to_address(&[0xFF; 32]);
        assert_eq!(address.len(), MAX_ADDRESS_LEN);
    }

    #[test]
    fn validate_rejects_garbage() {
        assert!(validate_address("not-a-valid-address!!!").is_err());
        assert!(validate_address("1").is_err());
        assert!(validate_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl").is_err());
    }

    #[test]
    fn validate_rejects_wrong_decoded_length() {
        // 33 leading '1's decode to 33 zero bytes.
        let address = "1".repeat(33);
        assert!(matches!(
            validate_address(&address),
            Err(SolError::InvalidAddress(_))
        ));
    }
}
