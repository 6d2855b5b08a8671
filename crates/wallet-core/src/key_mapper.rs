//! Entropy to chain key mapping.
//!
//! Each supported chain is backed by one [`KeyStrategy`]. The mapper owns the
//! strategy table; adding a chain means registering one more strategy.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crypto_utils::{derive_entropy, Entropy, MasterSecret};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};
use crate::strategies::{
    Ed25519Strategy, EvmStrategy, NodeIdStrategy, Sr25519Strategy, TaprootStrategy,
};
use crate::types::{
    AddressEncoding, Chain, ChainProfile, CurveFamily, DeriveParams, DerivedAddress,
};

/// Private key, public key and address for one chain.
///
/// The private key is zeroed when the value is dropped. Not `Clone`: callers
/// hold it only for the duration of a signing call.
pub struct ChainKey {
    chain: Chain,
    private_key: Zeroizing<[u8; 32]>,
    public_key: Vec<u8>,
    address: String,
    derivation_path: Option<String>,
}

impl ChainKey {
    pub fn new(
        chain: Chain,
        private_key: [u8; 32],
        public_key: Vec<u8>,
        address: String,
        derivation_path: Option<String>,
    ) -> Self {
        Self {
            chain,
            private_key: Zeroizing::new(private_key),
            public_key,
            address,
            derivation_path,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Raw private key bytes: a secp256k1 scalar, an Ed25519 seed or an
    /// sr25519 mini secret depending on the chain's curve.
    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn derivation_path(&self) -> Option<&str> {
        self.derivation_path.as_deref()
    }

    /// Drops the private half.
    pub fn to_derived_address(&self) -> DerivedAddress {
        DerivedAddress {
            chain: self.chain.clone(),
            address: self.address.clone(),
            derivation_path: self.derivation_path.clone(),
        }
    }
}

impl fmt::Debug for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainKey")
            .field("chain", &self.chain)
            .field("private_key", &"[REDACTED]")
            .field("public_key", &hex::encode(&self.public_key))
            .field("address", &self.address)
            .field("derivation_path", &self.derivation_path)
            .finish()
    }
}

/// Maps 64 bytes of entropy onto one chain's key scheme.
pub trait KeyStrategy: Send + Sync {
    fn profile(&self) -> ChainProfile;

    fn curve(&self) -> CurveFamily {
        self.profile().curve
    }

    fn encoding(&self) -> AddressEncoding {
        self.profile().encoding
    }

    /// Turns entropy into a key for `chain`. Must be a pure function of its
    /// inputs.
    fn derive_key(&self, chain: &Chain, entropy: &Entropy) -> WalletResult<ChainKey>;

    /// `Ok(true)` for a valid address on this chain, `Ok(false)` for one that
    /// is well formed but wrong (bad checksum casing, other network). Input
    /// that cannot be parsed at all is an error.
    fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool>;
}

/// Strategy table keyed by chain id.
#[derive(Clone)]
pub struct KeyMapper {
    strategies: HashMap<Chain, Arc<dyn KeyStrategy>>,
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::with_builtin_chains()
    }
}

impl KeyMapper {
    /// A mapper with no chains at all.
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// A mapper covering every chain in [`Chain::BUILTIN`].
    pub fn with_builtin_chains() -> Self {
        let mut mapper = Self::empty();
        for network in chain_eth::chains::all() {
            mapper.register_strategy(
                Chain::from_static(network.slug),
                Arc::new(EvmStrategy::new(network)),
            );
        }
        mapper.register_strategy(Chain::SOLANA, Arc::new(Ed25519Strategy));
        mapper.register_strategy(Chain::POLKADOT, Arc::new(Sr25519Strategy::polkadot()));
        mapper.register_strategy(Chain::KUSAMA, Arc::new(Sr25519Strategy::kusama()));
        mapper.register_strategy(Chain::BITCOIN, Arc::new(TaprootStrategy::mainnet()));
        mapper.register_strategy(Chain::BITCOIN_TESTNET, Arc::new(TaprootStrategy::testnet()));
        mapper.register_strategy(Chain::LIGHTNING, Arc::new(NodeIdStrategy));
        mapper
    }

    /// Adds or replaces the strategy for `chain`, returning the previous one.
    pub fn register_strategy(
        &mut self,
        chain: Chain,
        strategy: Arc<dyn KeyStrategy>,
    ) -> Option<Arc<dyn KeyStrategy>> {
        self.strategies.insert(chain, strategy)
    }

    pub fn strategy(&self, chain: &Chain) -> WalletResult<&Arc<dyn KeyStrategy>> {
        self.strategies
            .get(chain)
            .ok_or_else(|| WalletError::UnsupportedChain(chain.to_string()))
    }

    pub fn supports(&self, chain: &Chain) -> bool {
        self.strategies.contains_key(chain)
    }

    /// Supported chains, sorted by id.
    pub fn supported_chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.strategies.keys().cloned().collect();
        chains.sort();
        chains
    }

    pub fn profile(&self, chain: &Chain) -> WalletResult<ChainProfile> {
        self.strategy(chain).map(|s| s.profile())
    }

    /// Derives the full key for `params`.
    ///
    /// Unknown chains are rejected before any hashing happens.
    pub fn derive_for_chain(
        &self,
        secret: &MasterSecret,
        params: &DeriveParams,
    ) -> WalletResult<ChainKey> {
        params.validate()?;
        let strategy = self.strategy(&params.chain)?;

        tracing::debug!(
            chain = %params.chain,
            scope = %params.scope,
            index = %params.index,
            "deriving chain key"
        );

        let entropy = derive_entropy(secret, &params.canonical_fields())?;
        strategy.derive_key(&params.chain, &entropy)
    }

    /// Derives only the public address; the key is dropped before returning.
    pub fn derive_address(
        &self,
        secret: &MasterSecret,
        params: &DeriveParams,
    ) -> WalletResult<DerivedAddress> {
        self.derive_for_chain(secret, params)
            .map(|key| key.to_derived_address())
    }

    pub fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        self.strategy(chain)?.validate_address(chain, address)
    }
}

impl fmt::Debug for KeyMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMapper")
            .field("chains", &self.supported_chains())
            .finish()
    }
}
