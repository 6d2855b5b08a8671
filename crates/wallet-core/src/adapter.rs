//! Chain adapter contract.
//!
//! An adapter talks to one chain's network: balances, transfers and incoming
//! payment notifications. Key derivation never goes through an adapter; the
//! wallet hands it a ready [`ChainKey`] when something has to be signed.
//!
//! Optional features are separate traits reached through typed accessors on
//! [`ChainAdapter`], so a missing capability is a `None` and never a runtime
//! method probe.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crypto_utils::MasterSecret;

use crate::error::{AdapterError, WalletError, WalletResult};
use crate::key_mapper::{ChainKey, KeyMapper};
use crate::subscription::SubscriptionHandle;
use crate::types::{Chain, DeriveParams, DerivedAddress};

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Called once per incoming transfer.
pub type IncomingCallback = Arc<dyn Fn(IncomingTransfer) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingTransfer {
    pub tx_hash: String,
    pub from: Option<String>,
    pub to: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub fee: Decimal,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tx_hash: String,
    pub direction: TransferDirection,
    /// `None` when funds were minted rather than sent by an account.
    pub counterparty: Option<String>,
    pub amount: Decimal,
    /// `None` for the chain's native asset.
    pub token: Option<String>,
}

/// Optional adapter features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EstimateFee,
    History,
    SendToken,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::EstimateFee => "fee estimation",
            Capability::History => "transaction history",
            Capability::SendToken => "token transfers",
        };
        f.write_str(name)
    }
}

/// Which optional features an adapter offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub estimate_fee: bool,
    pub history: bool,
    pub send_token: bool,
}

impl CapabilitySet {
    pub fn contains(&self, capability: Capability) -> bool {
        match capability {
            Capability::EstimateFee => self.estimate_fee,
            Capability::History => self.history,
            Capability::SendToken => self.send_token,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        [Capability::EstimateFee, Capability::History, Capability::SendToken]
            .into_iter()
            .filter(|c| self.contains(*c))
    }
}

#[async_trait]
pub trait FeeEstimator: Send + Sync {
    async fn estimate_fee(&self, from: &str, to: &str, amount: Decimal) -> AdapterResult<FeeQuote>;
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Most recent first.
    async fn history(&self, address: &str) -> AdapterResult<Vec<HistoryEntry>>;
}

#[async_trait]
pub trait TokenSender: Send + Sync {
    async fn send_token(
        &self,
        key: &ChainKey,
        token: &str,
        to: &str,
        amount: Decimal,
    ) -> AdapterResult<TxReceipt>;
}

/// Network access for one chain.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Chain this adapter serves; also its registry name.
    fn chain(&self) -> Chain;

    /// Address for `params` on this adapter's chain. Local computation, no
    /// network access.
    fn derive_address(
        &self,
        mapper: &KeyMapper,
        secret: &MasterSecret,
        params: &DeriveParams,
    ) -> WalletResult<DerivedAddress> {
        let chain = self.chain();
        if params.chain != chain {
            return Err(WalletError::invalid_params(
                "chain",
                format!("{} does not match adapter chain {chain}", params.chain),
            ));
        }
        mapper.derive_address(secret, params)
    }

    async fn balance(&self, address: &str) -> AdapterResult<Decimal>;

    /// Signs with `key` and broadcasts a native transfer.
    async fn send(&self, key: &ChainKey, to: &str, amount: Decimal) -> AdapterResult<TxReceipt>;

    /// Starts watching `address`. `on_incoming` fires once per transfer until
    /// the returned handle is unsubscribed.
    async fn subscribe(
        &self,
        address: &str,
        on_incoming: IncomingCallback,
    ) -> AdapterResult<SubscriptionHandle>;

    fn fee_estimator(&self) -> Option<&dyn FeeEstimator> {
        None
    }

    fn history_provider(&self) -> Option<&dyn HistoryProvider> {
        None
    }

    fn token_sender(&self) -> Option<&dyn TokenSender> {
        None
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet {
            estimate_fee: self.fee_estimator().is_some(),
            history: self.history_provider().is_some(),
            send_token: self.token_sender().is_some(),
        }
    }

    /// Releases network resources. Called once, when the registry shuts the
    /// adapter down.
    fn on_shutdown(&self) {}
}
