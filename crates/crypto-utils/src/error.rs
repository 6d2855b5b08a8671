use thiserror::Error;

/// Errors raised while handling secret material.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("master secret must not be empty")]
    EmptySecret,

    #[error("derivation field '{0}' must not be empty")]
    EmptyField(String),

    #[error("derivation field '{0}' is too long")]
    FieldTooLong(String),

    #[error("keyed hash failed: {0}")]
    Mac(String),
}
