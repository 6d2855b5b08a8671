//! Wallet facade.
//!
//! Ties the key mapper to the adapter registry. Holds the master secret and
//! no network state; keys are re-derived for every call and dropped when it
//! returns.

use std::fmt;
use std::sync::Arc;

use crypto_utils::MasterSecret;
use rust_decimal::Decimal;

use crate::adapter::{ChainAdapter, FeeQuote, HistoryEntry, IncomingCallback, TxReceipt};
use crate::config::WalletConfig;
use crate::error::{WalletError, WalletResult};
use crate::key_mapper::{ChainKey, KeyMapper};
use crate::mnemonic::master_secret_from_mnemonic;
use crate::registry::{AdapterRegistry, RegisteredAdapter};
use crate::subscription::SubscriptionHandle;
use crate::types::{Chain, DeriveParams, DerivedAddress};

pub struct Wallet {
    secret: MasterSecret,
    mapper: KeyMapper,
    registry: Arc<AdapterRegistry>,
    config: WalletConfig,
}

impl Wallet {
    pub fn new(secret: MasterSecret) -> Self {
        Self::with_config(secret, WalletConfig::default())
    }

    /// A wallet with its own registry built from `config`.
    pub fn with_config(secret: MasterSecret, config: WalletConfig) -> Self {
        let registry = Arc::new(AdapterRegistry::new(config.registry.duplicate_policy));
        Self {
            secret,
            mapper: KeyMapper::default(),
            registry,
            config,
        }
    }

    /// A wallet sharing an existing registry, e.g. one per tenant secret over
    /// a common set of network adapters.
    pub fn with_registry(secret: MasterSecret, registry: Arc<AdapterRegistry>) -> Self {
        Self {
            secret,
            mapper: KeyMapper::default(),
            registry,
            config: WalletConfig::default(),
        }
    }

    /// Uses the BIP-39 seed of `phrase` + `passphrase` as the master secret.
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> WalletResult<Self> {
        Ok(Self::new(master_secret_from_mnemonic(phrase, passphrase)?))
    }

    /// Replaces the key mapper, e.g. to add chains.
    pub fn with_key_mapper(mut self, mapper: KeyMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    pub fn key_mapper(&self) -> &KeyMapper {
        &self.mapper
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn register_adapter(
        &self,
        adapter: Arc<dyn ChainAdapter>,
    ) -> WalletResult<Arc<RegisteredAdapter>> {
        self.registry.register(adapter)
    }

    /// Pure derivation; needs no adapter.
    pub fn derive_address(&self, params: &DeriveParams) -> WalletResult<DerivedAddress> {
        self.mapper.derive_address(&self.secret, params)
    }

    pub(crate) fn derive_key(&self, params: &DeriveParams) -> WalletResult<ChainKey> {
        self.mapper.derive_for_chain(&self.secret, params)
    }

    pub fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        self.mapper.validate_address(chain, address)
    }

    pub async fn balance(&self, params: &DeriveParams) -> WalletResult<Decimal> {
        let address = self.derive_address(params)?;
        let adapter = self.registry.get(&params.chain)?;
        adapter.balance(&address.address).await
    }

    /// Derives the signing key for `params` and sends `amount` to `to`.
    ///
    /// The recipient and amount are checked before any key is derived.
    pub async fn send(
        &self,
        params: &DeriveParams,
        to: &str,
        amount: Decimal,
    ) -> WalletResult<TxReceipt> {
        self.check_recipient(&params.chain, to)?;
        check_amount(amount)?;
        let adapter = self.registry.get(&params.chain)?;
        let key = self.derive_key(params)?;
        adapter.send(&key, to, amount).await
    }

    /// Watches the address for `params`. Incoming transfers go to
    /// `on_incoming` until the handle is unsubscribed.
    pub async fn subscribe(
        &self,
        params: &DeriveParams,
        on_incoming: IncomingCallback,
    ) -> WalletResult<SubscriptionHandle> {
        let address = self.derive_address(params)?;
        let adapter = self.registry.get(&params.chain)?;
        adapter.subscribe(&address.address, on_incoming).await
    }

    pub async fn estimate_fee(
        &self,
        params: &DeriveParams,
        to: &str,
        amount: Decimal,
    ) -> WalletResult<FeeQuote> {
        self.check_recipient(&params.chain, to)?;
        check_amount(amount)?;
        let adapter = self.registry.get(&params.chain)?;
        let from = self.derive_address(params)?;
        adapter.estimate_fee(&from.address, to, amount).await
    }

    pub async fn history(&self, params: &DeriveParams) -> WalletResult<Vec<HistoryEntry>> {
        let address = self.derive_address(params)?;
        let adapter = self.registry.get(&params.chain)?;
        adapter.history(&address.address).await
    }

    pub async fn send_token(
        &self,
        params: &DeriveParams,
        token: &str,
        to: &str,
        amount: Decimal,
    ) -> WalletResult<TxReceipt> {
        self.check_recipient(&params.chain, to)?;
        check_amount(amount)?;
        let adapter = self.registry.get(&params.chain)?;
        let key = self.derive_key(params)?;
        adapter.send_token(&key, token, to, amount).await
    }

    fn check_recipient(&self, chain: &Chain, to: &str) -> WalletResult<()> {
        if self.mapper.validate_address(chain, to)? {
            Ok(())
        } else {
            Err(WalletError::invalid_address(
                chain,
                format!("{to} failed checksum or network check"),
            ))
        }
    }
}

fn check_amount(amount: Decimal) -> WalletResult<()> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(format!("{amount} is not positive")));
    }
    Ok(())
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("secret", &self.secret)
            .field("mapper", &self.mapper)
            .field("registry", &self.registry)
            .finish()
    }
}
