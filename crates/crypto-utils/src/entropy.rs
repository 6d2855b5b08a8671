use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::secret::MasterSecret;

type HmacSha512 = Hmac<Sha512>;

/// Length of the keyed-hash output.
pub const ENTROPY_LEN: usize = 64;

/// Length of the prefix used as a private scalar or curve seed.
pub const KEY_MATERIAL_LEN: usize = 32;

/// Domain tag prepended to every canonical encoding. Bump the version suffix
/// if the field layout ever changes.
const DOMAIN_TAG: &[u8] = b"hd-entropy/v1";

/// 64 bytes of deterministic entropy for one (secret, fields) pair.
///
/// Zeroed on drop. Equality is constant-time.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Entropy([u8; ENTROPY_LEN]);

impl Entropy {
    /// Wraps raw bytes, e.g. a BIP-39 seed used directly as HD input.
    pub fn from_bytes(bytes: [u8; ENTROPY_LEN]) -> Self {
        Self(bytes)
    }

    /// The full 64 bytes, used as an HD master seed.
    pub fn as_bytes(&self) -> &[u8; ENTROPY_LEN] {
        &self.0
    }

    /// The first 32 bytes. Chains without hierarchical derivation use only
    /// this half; the upper 32 bytes are not consumed.
    pub fn key_material(&self) -> &[u8; KEY_MATERIAL_LEN] {
        self.0[..KEY_MATERIAL_LEN]
            .try_into()
            .unwrap_or_else(|_| unreachable!("entropy is always {ENTROPY_LEN} bytes"))
    }
}

impl PartialEq for Entropy {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Entropy {}

impl fmt::Debug for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Entropy([REDACTED])")
    }
}

/// Builds the byte string fed to the keyed hash.
///
/// Layout: `DOMAIN_TAG || for each field: u32_be(len) || utf8 bytes`.
/// Length prefixes make the encoding injective, so no choice of field
/// contents can make two distinct tuples collide. Field names are only used
/// for error reporting.
pub fn canonicalize(fields: &[(&str, &str)]) -> Result<Vec<u8>, CryptoError> {
    let capacity = DOMAIN_TAG.len()
        + fields
            .iter()
            .map(|(_, value)| 4 + value.len())
            .sum::<usize>();
    let mut out = Vec::with_capacity(capacity);
    out.extend_from_slice(DOMAIN_TAG);

    for (name, value) in fields {
        if value.is_empty() {
            return Err(CryptoError::EmptyField((*name).to_string()));
        }
        let len = u32::try_from(value.len())
            .map_err(|_| CryptoError::FieldTooLong((*name).to_string()))?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(value.as_bytes());
    }

    Ok(out)
}

/// HMAC-SHA512 keyed by the master secret over the canonical field encoding.
pub fn derive_entropy(
    secret: &MasterSecret,
    fields: &[(&str, &str)],
) -> Result<Entropy, CryptoError> {
    let message = canonicalize(fields)?;

    let mut mac = HmacSha512::new_from_slice(secret.expose())
        .map_err(|e| CryptoError::Mac(e.to_string()))?;
    mac.update(&message);
    let digest = mac.finalize().into_bytes();

    let mut bytes = [0u8; ENTROPY_LEN];
    bytes.copy_from_slice(&digest);
    Ok(Entropy(bytes))
}
