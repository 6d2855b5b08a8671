use std::error::Error as StdError;
use std::fmt;

use crypto_utils::CryptoError;
use thiserror::Error;

use crate::adapter::Capability;

pub type WalletResult<T> = Result<T, WalletError>;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid derive params: {field} {reason}")]
    InvalidDeriveParams { field: String, reason: String },

    #[error("Invalid master secret: {0}")]
    InvalidMasterSecret(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Address derivation failed for {chain}: {reason}")]
    AddressDerivation { chain: String, reason: String },

    #[error("Invalid {chain} address: {reason}")]
    InvalidAddress { chain: String, reason: String },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No adapter registered for chain {0}")]
    AdapterNotRegistered(String),

    #[error("Adapter for chain {0} has been shut down")]
    AdapterShutdown(String),

    #[error("An adapter for chain {0} is already registered")]
    DuplicateAdapter(String),

    #[error("Adapter for chain {chain} does not support {capability}")]
    CapabilityNotSupported { chain: String, capability: Capability },

    /// Failure reported by a chain adapter. The adapter's error is carried
    /// as-is and reachable through `source()`.
    #[error("{chain} adapter: {source}")]
    Adapter {
        chain: String,
        #[source]
        source: AdapterError,
    },

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WalletError {
    pub(crate) fn invalid_params(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WalletError::InvalidDeriveParams {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn derivation(chain: impl fmt::Display, reason: impl fmt::Display) -> Self {
        WalletError::AddressDerivation {
            chain: chain.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_address(chain: impl fmt::Display, reason: impl fmt::Display) -> Self {
        WalletError::InvalidAddress {
            chain: chain.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The adapter's own error, if this is an adapter failure.
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            WalletError::Adapter { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::EmptySecret => {
                WalletError::InvalidMasterSecret("master secret must not be empty".into())
            }
            CryptoError::EmptyField(field) => WalletError::invalid_params(field, "must not be empty"),
            CryptoError::FieldTooLong(field) => {
                WalletError::invalid_params(field, "exceeds the maximum encodable length")
            }
            CryptoError::Mac(reason) => WalletError::InvalidMasterSecret(reason),
        }
    }
}

/// Opaque error raised by a chain adapter.
///
/// Adapters wrap whatever their backend produced; the wallet never rewrites
/// it. Callers that know the adapter can downcast to the concrete type.
pub struct AdapterError(Box<dyn StdError + Send + Sync + 'static>);

impl AdapterError {
    /// Wraps any error, or a plain message.
    pub fn new(error: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self(error.into())
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.0
    }
}

impl fmt::Debug for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for AdapterError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}
