use std::fmt;

use secrecy::{ExposeSecret, SecretSlice};

use crate::error::CryptoError;

/// The root secret every chain key is derived from.
///
/// Supplied by the caller and held only in memory. The bytes are zeroed when
/// the value is dropped and never appear in `Debug` output.
pub struct MasterSecret(SecretSlice<u8>);

impl MasterSecret {
    /// Takes ownership of `bytes`. Empty secrets are rejected.
    pub fn new(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self(bytes.into()))
    }

    /// Copies `bytes` into a new secret. The caller remains responsible for
    /// wiping its own copy.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        Self::new(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl TryFrom<Vec<u8>> for MasterSecret {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(bytes)
    }
}

impl TryFrom<&[u8]> for MasterSecret {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret([REDACTED])")
    }
}
