//! Adapter registry and per-adapter lifecycle.
//!
//! Lookups take a read lock and never wait on each other; registration and
//! removal take the write lock briefly. No lock is held across an await.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::adapter::{
    Capability, CapabilitySet, ChainAdapter, FeeQuote, HistoryEntry, IncomingCallback, TxReceipt,
};
use crate::error::{AdapterError, WalletError, WalletResult};
use crate::key_mapper::ChainKey;
use crate::subscription::SubscriptionHandle;
use crate::types::Chain;

/// What to do when a second adapter is registered for the same chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail with `DuplicateAdapter`.
    #[default]
    Reject,
    /// Shut the old adapter down and install the new one.
    Replace,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "replace" => Ok(DuplicatePolicy::Replace),
            other => Err(WalletError::Config(format!(
                "unknown duplicate policy {other:?}, expected \"reject\" or \"replace\""
            ))),
        }
    }
}

/// Lifecycle of a registered adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterState {
    /// Registered, no live subscriptions.
    Registered,
    /// At least one live subscription.
    Active,
    /// Terminal. Every operation fails with `AdapterShutdown`.
    Shutdown,
}

/// An adapter as seen through the registry.
///
/// Wraps each call with the lifecycle check, tracks subscriptions so shutdown
/// can close them, and tags adapter failures with the chain they came from.
pub struct RegisteredAdapter {
    chain: Chain,
    adapter: Arc<dyn ChainAdapter>,
    shut_down: AtomicBool,
    subscriptions: Mutex<Vec<SubscriptionHandle>>,
}

impl RegisteredAdapter {
    fn new(adapter: Arc<dyn ChainAdapter>) -> Self {
        Self {
            chain: adapter.chain(),
            adapter,
            shut_down: AtomicBool::new(false),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn adapter(&self) -> &Arc<dyn ChainAdapter> {
        &self.adapter
    }

    pub fn state(&self) -> AdapterState {
        if self.is_shut_down() {
            return AdapterState::Shutdown;
        }
        let mut subs = self.lock_subscriptions();
        subs.retain(SubscriptionHandle::is_active);
        if subs.is_empty() {
            AdapterState::Registered
        } else {
            AdapterState::Active
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.adapter.capabilities()
    }

    fn ensure_open(&self) -> WalletResult<()> {
        if self.is_shut_down() {
            Err(WalletError::AdapterShutdown(self.chain.to_string()))
        } else {
            Ok(())
        }
    }

    fn adapter_error(&self, source: AdapterError) -> WalletError {
        tracing::warn!(chain = %self.chain, error = %source, "adapter call failed");
        WalletError::Adapter {
            chain: self.chain.to_string(),
            source,
        }
    }

    fn unsupported(&self, capability: Capability) -> WalletError {
        WalletError::CapabilityNotSupported {
            chain: self.chain.to_string(),
            capability,
        }
    }

    fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, Vec<SubscriptionHandle>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn balance(&self, address: &str) -> WalletResult<Decimal> {
        self.ensure_open()?;
        self.adapter
            .balance(address)
            .await
            .map_err(|e| self.adapter_error(e))
    }

    pub async fn send(&self, key: &ChainKey, to: &str, amount: Decimal) -> WalletResult<TxReceipt> {
        self.ensure_open()?;
        let receipt = self
            .adapter
            .send(key, to, amount)
            .await
            .map_err(|e| self.adapter_error(e))?;
        tracing::info!(chain = %self.chain, tx_hash = %receipt.tx_hash, "transfer submitted");
        Ok(receipt)
    }

    pub async fn subscribe(
        &self,
        address: &str,
        on_incoming: IncomingCallback,
    ) -> WalletResult<SubscriptionHandle> {
        self.ensure_open()?;
        let handle = self
            .adapter
            .subscribe(address, on_incoming)
            .await
            .map_err(|e| self.adapter_error(e))?;

        let mut subs = self.lock_subscriptions();
        // Shutdown may have run while the adapter was subscribing.
        if self.is_shut_down() {
            drop(subs);
            handle.unsubscribe();
            return Err(WalletError::AdapterShutdown(self.chain.to_string()));
        }
        subs.retain(SubscriptionHandle::is_active);
        subs.push(handle.clone());
        drop(subs);

        tracing::debug!(chain = %self.chain, id = handle.id(), address, "subscribed");
        Ok(handle)
    }

    pub async fn estimate_fee(&self, from: &str, to: &str, amount: Decimal) -> WalletResult<FeeQuote> {
        self.ensure_open()?;
        match self.adapter.fee_estimator() {
            Some(estimator) => estimator
                .estimate_fee(from, to, amount)
                .await
                .map_err(|e| self.adapter_error(e)),
            None => Err(self.unsupported(Capability::EstimateFee)),
        }
    }

    pub async fn history(&self, address: &str) -> WalletResult<Vec<HistoryEntry>> {
        self.ensure_open()?;
        match self.adapter.history_provider() {
            Some(provider) => provider
                .history(address)
                .await
                .map_err(|e| self.adapter_error(e)),
            None => Err(self.unsupported(Capability::History)),
        }
    }

    pub async fn send_token(
        &self,
        key: &ChainKey,
        token: &str,
        to: &str,
        amount: Decimal,
    ) -> WalletResult<TxReceipt> {
        self.ensure_open()?;
        match self.adapter.token_sender() {
            Some(sender) => sender
                .send_token(key, token, to, amount)
                .await
                .map_err(|e| self.adapter_error(e)),
            None => Err(self.unsupported(Capability::SendToken)),
        }
    }

    /// Moves to `Shutdown`: closes every subscription and calls the adapter's
    /// shutdown hook. Later calls are no-ops.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let subs = std::mem::take(&mut *self.lock_subscriptions());
        let closed = subs.len();
        for handle in subs {
            handle.unsubscribe();
        }
        self.adapter.on_shutdown();
        tracing::info!(chain = %self.chain, subscriptions_closed = closed, "adapter shut down");
    }
}

impl fmt::Debug for RegisteredAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAdapter")
            .field("chain", &self.chain)
            .field("state", &self.state())
            .finish()
    }
}

/// Chain id to adapter map.
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<Chain, Arc<RegisteredAdapter>>>,
    policy: DuplicatePolicy,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl AdapterRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            adapters: RwLock::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Registers `adapter` under its chain id.
    ///
    /// An existing adapter that is already shut down never blocks
    /// registration. A live one is handled per [`DuplicatePolicy`].
    pub fn register(&self, adapter: Arc<dyn ChainAdapter>) -> WalletResult<Arc<RegisteredAdapter>> {
        let entry = Arc::new(RegisteredAdapter::new(adapter));
        let chain = entry.chain().clone();

        let replaced = {
            let mut adapters = self
                .adapters
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = adapters.get(&chain) {
                if !existing.is_shut_down() && self.policy == DuplicatePolicy::Reject {
                    return Err(WalletError::DuplicateAdapter(chain.to_string()));
                }
            }
            adapters.insert(chain.clone(), entry.clone())
        };

        if let Some(old) = replaced {
            old.shutdown();
            tracing::info!(chain = %chain, "adapter replaced");
        } else {
            tracing::info!(chain = %chain, "adapter registered");
        }
        Ok(entry)
    }

    /// Looks up the adapter for `chain`. A shut-down adapter is still
    /// returned; calls on it fail with `AdapterShutdown`.
    pub fn get(&self, chain: &Chain) -> WalletResult<Arc<RegisteredAdapter>> {
        self.adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(chain)
            .cloned()
            .ok_or_else(|| WalletError::AdapterNotRegistered(chain.to_string()))
    }

    /// Looks up by raw chain id.
    pub fn get_by_name(&self, name: &str) -> WalletResult<Arc<RegisteredAdapter>> {
        self.get(&Chain::new(name)?)
    }

    pub fn contains(&self, chain: &Chain) -> bool {
        self.adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(chain)
    }

    /// Registered chains, sorted by id.
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self
            .adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        chains.sort();
        chains
    }

    pub fn len(&self) -> usize {
        self.adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shuts the adapter down but keeps it registered.
    pub fn shutdown(&self, chain: &Chain) -> WalletResult<()> {
        self.get(chain)?.shutdown();
        Ok(())
    }

    /// Shuts the adapter down and removes it.
    pub fn unregister(&self, chain: &Chain) -> WalletResult<Arc<RegisteredAdapter>> {
        let removed = self
            .adapters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(chain)
            .ok_or_else(|| WalletError::AdapterNotRegistered(chain.to_string()))?;
        removed.shutdown();
        Ok(removed)
    }

    /// Shuts down and removes every adapter.
    pub fn shutdown_all(&self) {
        let drained: Vec<Arc<RegisteredAdapter>> = self
            .adapters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, adapter)| adapter)
            .collect();
        for adapter in drained {
            adapter.shutdown();
        }
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("policy", &self.policy)
            .field("chains", &self.chains())
            .finish()
    }
}
