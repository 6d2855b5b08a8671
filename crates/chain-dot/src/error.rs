use thiserror::Error;

/// Substrate key and address errors.
#[derive(Debug, Error)]
pub enum DotError {
    #[error("invalid mini secret: {0}")]
    InvalidSecret(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported ss58 prefix: {0}")]
    UnsupportedPrefix(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_secret() {
        let err = DotError::InvalidSecret("wrong length".into());
        assert_eq!(err.to_string(), "invalid mini secret: wrong length");
    }

    #[test]
    fn display_invalid_address() {
        let err = DotError::InvalidAddress("checksum mismatch".into());
        assert_eq!(err.to_string(), "invalid address: checksum mismatch");
    }

    #[test]
    fn display_unsupported_prefix() {
        assert_eq!(
            DotError::UnsupportedPrefix(20000).to_string(),
            "unsupported ss58 prefix: 20000"
        );
    }
}
