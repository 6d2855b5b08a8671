use bip39::{Language, Mnemonic};
use crypto_utils::MasterSecret;
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// Master secret from a BIP-39 phrase: the 64-byte seed of mnemonic +
/// passphrase.
pub fn master_secret_from_mnemonic(phrase: &str, passphrase: &str) -> WalletResult<MasterSecret> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    let seed = Zeroizing::new(mnemonic.to_seed(passphrase));
    Ok(MasterSecret::from_slice(seed.as_slice())?)
}
