//! # wallet-core
//!
//! Deterministic multi-chain keys from one master secret, plus the adapter
//! contract that network clients implement.
//!
//! ```text
//! MasterSecret + DeriveParams
//!        │  HMAC-SHA512 (crypto-utils)
//!        ▼
//!     Entropy ──► KeyStrategy (per chain) ──► ChainKey / DerivedAddress
//!                                                  │
//!                         Wallet ──► AdapterRegistry ──► ChainAdapter
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod key_mapper;
pub mod logging;
pub mod memory;
pub mod mnemonic;
pub mod registry;
pub mod strategies;
pub mod subscription;
pub mod types;
pub mod wallet;

pub use adapter::{
    Capability, CapabilitySet, ChainAdapter, FeeEstimator, FeeQuote, HistoryEntry,
    HistoryProvider, IncomingCallback, IncomingTransfer, TokenSender, TransferDirection,
    TxReceipt,
};
pub use config::{LogFormat, LoggingConfig, RegistryConfig, SubscriptionConfig, WalletConfig};
pub use crypto_utils::MasterSecret;
pub use error::{AdapterError, WalletError, WalletResult};
pub use key_mapper::{ChainKey, KeyMapper, KeyStrategy};
pub use memory::MemoryLedgerAdapter;
pub use registry::{AdapterRegistry, AdapterState, DuplicatePolicy, RegisteredAdapter};
pub use subscription::SubscriptionHandle;
pub use types::{AddressEncoding, Chain, ChainProfile, CurveFamily, DeriveParams, DerivedAddress};
pub use wallet::Wallet;
