use crate::error::DotError;

pub const POLKADOT_PREFIX: u16 = 0;
pub const KUSAMA_PREFIX: u16 = 2;
/// Generic Substrate prefix (`5...` addresses).
pub const SUBSTRATE_PREFIX: u16 = 42;

const CHECKSUM_PREIMAGE: &[u8] = b"SS58PRE";
const CHECKSUM_LEN: usize = 2;
const MAX_PREFIX: u16 = 16383;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = blake2b_simd::Params::new()
        .hash_length(64)
        .to_state()
        .update(CHECKSUM_PREIMAGE)
        .update(payload)
        .finalize();
    [hash.as_bytes()[0], hash.as_bytes()[1]]
}

fn encode_prefix(prefix: u16) -> Result<Vec<u8>, DotError> {
    match prefix {
        0..=63 => Ok(vec![prefix as u8]),
        64..=MAX_PREFIX => {
            let first = (((prefix & 0b0000_0000_1111_1100) >> 2) as u8) | 0b0100_0000;
            let second = ((prefix >> 8) as u8) | (((prefix & 0b0000_0000_0000_0011) as u8) << 6);
            Ok(vec![first, second])
        }
        _ => Err(DotError::UnsupportedPrefix(prefix)),
    }
}

/// SS58-encodes a 32-byte account id under `prefix`.
pub fn encode_address(pubkey: &[u8; 32], prefix: u16) -> Result<String, DotError> {
    let mut payload = encode_prefix(prefix)?;
    payload.extend_from_slice(pubkey);
    let sum = checksum(&payload);
    payload.extend_from_slice(&sum);
    Ok(bs58::encode(payload).into_string())
}

/// Decodes an SS58 address into `(prefix, account id)`, verifying the
/// checksum.
pub fn decode_address(address: &str) -> Result<(u16, [u8; 32]), DotError> {
    let data = bs58::decode(address)
        .into_vec()
        .map_err(|e| DotError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    let first = *data
        .first()
        .ok_or_else(|| DotError::InvalidAddress("empty address".into()))?;
    let (prefix, prefix_len) = match first {
        0..=63 => (u16::from(first), 1),
        64..=127 => {
            let second = *data
                .get(1)
                .ok_or_else(|| DotError::InvalidAddress("truncated prefix".into()))?;
            let lower = (u16::from(first) << 2) | (u16::from(second) >> 6);
            let upper = u16::from(second & 0b0011_1111);
            ((lower & 0b1111_1111) | (upper << 8), 2)
        }
        _ => return Err(DotError::InvalidAddress(format!("invalid prefix byte {first}"))),
    };

    if data.len() != prefix_len + 32 + CHECKSUM_LEN {
        return Err(DotError::InvalidAddress(format!(
            "expected 32-byte account id, got {} payload bytes",
            data.len().saturating_sub(prefix_len + CHECKSUM_LEN)
        )));
    }

    let (body, sum) = data.split_at(prefix_len + 32);
    if checksum(body)[..] != *sum {
        return Err(DotError::InvalidAddress("checksum mismatch".into()));
    }

    let mut account = [0u8; 32];
    account.copy_from_slice(&body[prefix_len..]);
    Ok((prefix, account))
}

/// `Ok(true)` if the address is well formed and carries `expected_prefix`,
/// `Ok(false)` if it is well formed for another network.
pub fn validate_address(address: &str, expected_prefix: u16) -> Result<bool, DotError> {
    decode_address(address).map(|(prefix, _)| prefix == expected_prefix)
}
