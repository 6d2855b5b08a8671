use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};

/// Chain identifier, e.g. `"ethereum"` or `"bitcoin-testnet"`.
///
/// The set is open: any lowercase id can be named, and it is the key mapper
/// and adapter registry that decide whether a chain is actually supported.
/// Ids are normalized to lowercase on construction, so `"Ethereum"` and
/// `"ethereum"` name the same chain and feed the same entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Chain(Cow<'static, str>);

impl Chain {
    pub const ETHEREUM: Chain = Chain(Cow::Borrowed("ethereum"));
    pub const POLYGON: Chain = Chain(Cow::Borrowed("polygon"));
    pub const BSC: Chain = Chain(Cow::Borrowed("bsc"));
    pub const ARBITRUM: Chain = Chain(Cow::Borrowed("arbitrum"));
    pub const OPTIMISM: Chain = Chain(Cow::Borrowed("optimism"));
    pub const BASE: Chain = Chain(Cow::Borrowed("base"));
    pub const AVALANCHE: Chain = Chain(Cow::Borrowed("avalanche"));
    pub const SOLANA: Chain = Chain(Cow::Borrowed("solana"));
    pub const POLKADOT: Chain = Chain(Cow::Borrowed("polkadot"));
    pub const KUSAMA: Chain = Chain(Cow::Borrowed("kusama"));
    pub const BITCOIN: Chain = Chain(Cow::Borrowed("bitcoin"));
    pub const BITCOIN_TESTNET: Chain = Chain(Cow::Borrowed("bitcoin-testnet"));
    pub const LIGHTNING: Chain = Chain(Cow::Borrowed("lightning"));

    /// Every chain the default key mapper knows how to derive for.
    pub const BUILTIN: [Chain; 13] = [
        Chain::ETHEREUM,
        Chain::POLYGON,
        Chain::BSC,
        Chain::ARBITRUM,
        Chain::OPTIMISM,
        Chain::BASE,
        Chain::AVALANCHE,
        Chain::SOLANA,
        Chain::POLKADOT,
        Chain::KUSAMA,
        Chain::BITCOIN,
        Chain::BITCOIN_TESTNET,
        Chain::LIGHTNING,
    ];

    /// Builds a chain id, trimming whitespace and lowercasing.
    ///
    /// Fails only on an empty id; whether the chain is supported is decided
    /// later, at lookup time.
    pub fn new(id: impl AsRef<str>) -> WalletResult<Self> {
        let normalized = id.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(WalletError::invalid_params("chain", "must not be empty"));
        }
        Ok(Self::from_normalized(normalized))
    }

    /// Wraps an id that is already lowercase, trimmed and non-empty.
    pub(crate) const fn from_static(id: &'static str) -> Self {
        debug_assert!(is_normalized(id), "chain id must be normalized");
        Chain(Cow::Borrowed(id))
    }

    fn from_normalized(id: String) -> Self {
        match Self::BUILTIN.iter().find(|c| c.0 == id.as_str()) {
            Some(builtin) => builtin.clone(),
            None => Chain(Cow::Owned(id)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

const fn is_normalized(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.is_empty()
        || bytes[0].is_ascii_whitespace()
        || bytes[bytes.len() - 1].is_ascii_whitespace()
    {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_uppercase() {
            return false;
        }
        i += 1;
    }
    true
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Chain {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::new(s)
    }
}

impl TryFrom<String> for Chain {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Chain::new(value)
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.0.into_owned()
    }
}

/// Signature curve a chain's keys live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveFamily {
    /// Raw secp256k1 scalar taken straight from the entropy.
    Secp256k1,
    Ed25519,
    Sr25519,
    /// secp256k1 reached through BIP-32 child derivation.
    Bip32Secp256k1,
}

/// How a public key is turned into the address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressEncoding {
    /// Keccak-256 of the uncompressed key, last 20 bytes, EIP-55 cased.
    HexKeccak,
    /// Base58 of the raw 32-byte public key.
    Base58,
    Ss58 { prefix: u16 },
    /// BIP-86 key-path-only taproot, bech32m.
    Taproot,
    /// Lowercase hex of the 33-byte compressed public key.
    HexCompressedPubkey,
}

/// Static description of one supported chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainProfile {
    pub curve: CurveFamily,
    pub encoding: AddressEncoding,
    pub display_name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// The derivation tuple. Every field takes part in the keyed hash, so any
/// change to any of them yields an unrelated key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeriveParams {
    pub scope: String,
    pub user_id: String,
    pub chain: Chain,
    pub index: String,
}

impl DeriveParams {
    pub fn new(
        scope: impl Into<String>,
        user_id: impl Into<String>,
        chain: Chain,
        index: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            user_id: user_id.into(),
            chain,
            index: index.into(),
        }
    }

    /// Same tuple on another chain.
    pub fn with_chain(&self, chain: Chain) -> Self {
        Self {
            chain,
            ..self.clone()
        }
    }

    /// Rejects empty fields, naming the first offender.
    pub fn validate(&self) -> WalletResult<()> {
        for (name, value) in self.canonical_fields() {
            if value.is_empty() {
                return Err(WalletError::invalid_params(name, "must not be empty"));
            }
        }
        Ok(())
    }

    /// Fields in the fixed order they are fed to the entropy engine.
    pub(crate) fn canonical_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("scope", self.scope.as_str()),
            ("user_id", self.user_id.as_str()),
            ("chain", self.chain.as_str()),
            ("index", self.index.as_str()),
        ]
    }
}

/// A derived address. Carries no key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub chain: Chain,
    pub address: String,
    /// BIP-32 path, for chains that derive hierarchically.
    pub derivation_path: Option<String>,
}
