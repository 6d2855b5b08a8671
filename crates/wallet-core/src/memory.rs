//! In-memory ledger adapter.
//!
//! Balances and transfers live in a process-local map. Useful for tests,
//! demos and as a template for real network adapters: it goes through the
//! same lifecycle, subscription and capability paths as one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::adapter::{
    AdapterResult, CapabilitySet, ChainAdapter, FeeEstimator, FeeQuote, HistoryEntry,
    HistoryProvider, IncomingCallback, IncomingTransfer, TokenSender, TransferDirection, TxReceipt,
};
use crate::config::SubscriptionConfig;
use crate::error::AdapterError;
use crate::key_mapper::ChainKey;
use crate::subscription::{spawn_polling, SubscriptionHandle};
use crate::types::Chain;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("key derived for {key_chain} cannot sign on {chain}")]
    WrongChain { key_chain: String, chain: String },

    #[error("ledger is offline")]
    Offline,
}

#[derive(Debug, Clone)]
struct LedgerEntry {
    tx_hash: String,
    from: Option<String>,
    to: String,
    amount: Decimal,
    token: Option<String>,
}

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<(String, Option<String>), Decimal>,
    entries: Vec<LedgerEntry>,
    nonce: u64,
}

impl Ledger {
    fn balance(&self, address: &str, token: Option<&str>) -> Decimal {
        self.balances
            .get(&(address.to_string(), token.map(str::to_string)))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn adjust(&mut self, address: &str, token: Option<&str>, delta: Decimal) {
        *self
            .balances
            .entry((address.to_string(), token.map(str::to_string)))
            .or_insert(Decimal::ZERO) += delta;
    }

    fn record(
        &mut self,
        chain: &Chain,
        from: Option<&str>,
        to: &str,
        amount: Decimal,
        token: Option<&str>,
    ) -> String {
        self.nonce += 1;

        let mut hasher = Sha256::new();
        hasher.update(chain.as_str().as_bytes());
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(from.unwrap_or_default().as_bytes());
        hasher.update(to.as_bytes());
        hasher.update(amount.to_string().as_bytes());
        hasher.update(token.unwrap_or_default().as_bytes());
        let tx_hash = format!("0x{}", hex::encode(hasher.finalize()));

        if let Some(from) = from {
            self.adjust(from, token, -amount);
        }
        self.adjust(to, token, amount);
        self.entries.push(LedgerEntry {
            tx_hash: tx_hash.clone(),
            from: from.map(str::to_string),
            to: to.to_string(),
            amount,
            token: token.map(str::to_string),
        });
        tx_hash
    }

    fn incoming(&self, address: &str) -> Vec<IncomingTransfer> {
        self.entries
            .iter()
            .filter(|e| e.to == address && e.token.is_none())
            .map(|e| IncomingTransfer {
                tx_hash: e.tx_hash.clone(),
                from: e.from.clone(),
                to: e.to.clone(),
                amount: e.amount,
            })
            .collect()
    }

    fn history(&self, address: &str) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .rev()
            .filter_map(|e| {
                let (direction, counterparty) = if e.from.as_deref() == Some(address) {
                    (TransferDirection::Outgoing, Some(e.to.clone()))
                } else if e.to == address {
                    (TransferDirection::Incoming, e.from.clone())
                } else {
                    return None;
                };
                Some(HistoryEntry {
                    tx_hash: e.tx_hash.clone(),
                    direction,
                    counterparty,
                    amount: e.amount,
                    token: e.token.clone(),
                })
            })
            .collect()
    }
}

/// A [`ChainAdapter`] backed by an in-process ledger.
pub struct MemoryLedgerAdapter {
    chain: Chain,
    symbol: String,
    fee: Decimal,
    poll_interval: Duration,
    capabilities: CapabilitySet,
    offline: AtomicBool,
    shutdown_calls: Mutex<u32>,
    ledger: Arc<Mutex<Ledger>>,
}

impl MemoryLedgerAdapter {
    /// An adapter polling at the default subscription interval.
    pub fn new(chain: Chain) -> Self {
        Self::with_config(chain, &SubscriptionConfig::default())
    }

    /// An adapter whose subscriptions poll at `config.poll_interval()`.
    pub fn with_config(chain: Chain, config: &SubscriptionConfig) -> Self {
        Self {
            symbol: chain.as_str().to_ascii_uppercase(),
            chain,
            fee: Decimal::ZERO,
            poll_interval: config.poll_interval(),
            capabilities: CapabilitySet {
                estimate_fee: true,
                history: true,
                send_token: true,
            },
            offline: AtomicBool::new(false),
            shutdown_calls: Mutex::new(0),
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// Flat fee charged to the sender on every transfer.
    pub fn with_fee(mut self, fee: Decimal, symbol: impl Into<String>) -> Self {
        self.fee = fee;
        self.symbol = symbol.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Restricts which optional features are advertised.
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// While offline every network call fails with [`LedgerError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    /// How many times the shutdown hook ran.
    pub fn shutdown_calls(&self) -> u32 {
        *self
            .shutdown_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Mints native funds to `address`. Returns the transfer hash.
    pub fn fund(&self, address: &str, amount: Decimal) -> String {
        self.lock().record(&self.chain, None, address, amount, None)
    }

    /// Mints `token` to `address`.
    pub fn fund_token(&self, address: &str, token: &str, amount: Decimal) -> String {
        self.lock()
            .record(&self.chain, None, address, amount, Some(token))
    }

    pub fn token_balance(&self, address: &str, token: &str) -> Decimal {
        self.lock().balance(address, Some(token))
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_online(&self) -> AdapterResult<()> {
        if self.offline.load(Ordering::Acquire) {
            Err(AdapterError::new(LedgerError::Offline))
        } else {
            Ok(())
        }
    }

    fn check_transfer(&self, key: &ChainKey, amount: Decimal) -> AdapterResult<()> {
        self.ensure_online()?;
        if key.chain() != &self.chain {
            return Err(AdapterError::new(LedgerError::WrongChain {
                key_chain: key.chain().to_string(),
                chain: self.chain.to_string(),
            }));
        }
        if amount <= Decimal::ZERO {
            return Err(AdapterError::new(LedgerError::NonPositiveAmount(amount)));
        }
        Ok(())
    }

    fn charge_fee(&self, ledger: &mut Ledger, from: &str) {
        if self.fee > Decimal::ZERO {
            ledger.adjust(from, None, -self.fee);
        }
    }
}

#[async_trait]
impl ChainAdapter for MemoryLedgerAdapter {
    fn chain(&self) -> Chain {
        self.chain.clone()
    }

    async fn balance(&self, address: &str) -> AdapterResult<Decimal> {
        self.ensure_online()?;
        Ok(self.lock().balance(address, None))
    }

    async fn send(&self, key: &ChainKey, to: &str, amount: Decimal) -> AdapterResult<TxReceipt> {
        self.check_transfer(key, amount)?;
        let from = key.address();

        let mut ledger = self.lock();
        let needed = amount + self.fee;
        let available = ledger.balance(from, None);
        if available < needed {
            return Err(AdapterError::new(LedgerError::InsufficientFunds { needed, available }));
        }
        self.charge_fee(&mut ledger, from);
        let tx_hash = ledger.record(&self.chain, Some(from), to, amount, None);
        Ok(TxReceipt { tx_hash })
    }

    async fn subscribe(
        &self,
        address: &str,
        on_incoming: IncomingCallback,
    ) -> AdapterResult<SubscriptionHandle> {
        self.ensure_online()?;
        let ledger = self.ledger.clone();
        let handle = spawn_polling(address, self.poll_interval, on_incoming, move |addr: String| {
            let snapshot = ledger
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .incoming(&addr);
            async move { Ok(snapshot) }
        })
        .await;
        Ok(handle)
    }

    fn fee_estimator(&self) -> Option<&dyn FeeEstimator> {
        self.capabilities.estimate_fee.then_some(self as &dyn FeeEstimator)
    }

    fn history_provider(&self) -> Option<&dyn HistoryProvider> {
        self.capabilities.history.then_some(self as &dyn HistoryProvider)
    }

    fn token_sender(&self) -> Option<&dyn TokenSender> {
        self.capabilities.send_token.then_some(self as &dyn TokenSender)
    }

    fn on_shutdown(&self) {
        *self
            .shutdown_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

#[async_trait]
impl FeeEstimator for MemoryLedgerAdapter {
    async fn estimate_fee(&self, _from: &str, _to: &str, amount: Decimal) -> AdapterResult<FeeQuote> {
        self.ensure_online()?;
        if amount <= Decimal::ZERO {
            return Err(AdapterError::new(LedgerError::NonPositiveAmount(amount)));
        }
        Ok(FeeQuote {
            fee: self.fee,
            symbol: self.symbol.clone(),
        })
    }
}

#[async_trait]
impl HistoryProvider for MemoryLedgerAdapter {
    async fn history(&self, address: &str) -> AdapterResult<Vec<HistoryEntry>> {
        self.ensure_online()?;
        Ok(self.lock().history(address))
    }
}

#[async_trait]
impl TokenSender for MemoryLedgerAdapter {
    async fn send_token(
        &self,
        key: &ChainKey,
        token: &str,
        to: &str,
        amount: Decimal,
    ) -> AdapterResult<TxReceipt> {
        self.check_transfer(key, amount)?;
        let from = key.address();

        let mut ledger = self.lock();
        let available = ledger.balance(from, Some(token));
        if available < amount {
            return Err(AdapterError::new(LedgerError::InsufficientFunds {
                needed: amount,
                available,
            }));
        }
        let native = ledger.balance(from, None);
        if native < self.fee {
            return Err(AdapterError::new(LedgerError::InsufficientFunds {
                needed: self.fee,
                available: native,
            }));
        }
        self.charge_fee(&mut ledger, from);
        let tx_hash = ledger.record(&self.chain, Some(from), to, amount, Some(token));
        Ok(TxReceipt { tx_hash })
    }
}
