//! Built-in key strategies.
//!
//! Non-HD chains consume only the first 32 bytes of entropy. Bitcoin treats
//! all 64 bytes as a BIP-32 master seed.

use chain_btc::{hd, lightning, BtcNetwork};
use chain_dot::{Sr25519Keypair, KUSAMA_PREFIX, POLKADOT_PREFIX};
use chain_eth::chains::EvmNetwork;
use chain_eth::EthKeypair;
use chain_sol::SolKeypair;
use crypto_utils::Entropy;

use crate::error::{WalletError, WalletResult};
use crate::key_mapper::{ChainKey, KeyStrategy};
use crate::types::{AddressEncoding, Chain, ChainProfile, CurveFamily};

/// secp256k1 scalar, Keccak-256 address with EIP-55 casing.
#[derive(Debug, Clone, Copy)]
pub struct EvmStrategy {
    network: &'static EvmNetwork,
}

impl EvmStrategy {
    pub fn new(network: &'static EvmNetwork) -> Self {
        Self { network }
    }
}

impl KeyStrategy for EvmStrategy {
    fn profile(&self) -> ChainProfile {
        ChainProfile {
            curve: CurveFamily::Secp256k1,
            encoding: AddressEncoding::HexKeccak,
            display_name: self.network.name,
            symbol: self.network.symbol,
            decimals: self.network.decimals,
        }
    }

    fn derive_key(&self, chain: &Chain, entropy: &Entropy) -> WalletResult<ChainKey> {
        let keypair = EthKeypair::from_secret(entropy.key_material())
            .map_err(|e| WalletError::derivation(chain, e))?;
        let address = keypair
            .address()
            .map_err(|e| WalletError::derivation(chain, e))?;

        Ok(ChainKey::new(
            chain.clone(),
            *keypair.private_key(),
            keypair.public_key_compressed().to_vec(),
            address,
            None,
        ))
    }

    fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        chain_eth::validate_address(address).map_err(|e| WalletError::invalid_address(chain, e))
    }
}

/// Ed25519 seed, Base58 public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Strategy;

impl KeyStrategy for Ed25519Strategy {
    fn profile(&self) -> ChainProfile {
        ChainProfile {
            curve: CurveFamily::Ed25519,
            encoding: AddressEncoding::Base58,
            display_name: "Solana",
            symbol: "SOL",
            decimals: 9,
        }
    }

    fn derive_key(&self, chain: &Chain, entropy: &Entropy) -> WalletResult<ChainKey> {
        let keypair = SolKeypair::from_seed(entropy.key_material());
        Ok(ChainKey::new(
            chain.clone(),
            *keypair.seed(),
            keypair.public_key().to_vec(),
            keypair.address(),
            None,
        ))
    }

    fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        chain_sol::validate_address(address).map_err(|e| WalletError::invalid_address(chain, e))
    }
}

/// sr25519 mini secret (Ed25519 expansion), SS58 under a fixed prefix.
#[derive(Debug, Clone, Copy)]
pub struct Sr25519Strategy {
    prefix: u16,
    display_name: &'static str,
    symbol: &'static str,
    decimals: u8,
}

impl Sr25519Strategy {
    pub fn polkadot() -> Self {
        Self::with_prefix(POLKADOT_PREFIX, "Polkadot", "DOT", 10)
    }

    pub fn kusama() -> Self {
        Self::with_prefix(KUSAMA_PREFIX, "Kusama", "KSM", 12)
    }

    /// Any other Substrate network.
    pub fn with_prefix(
        prefix: u16,
        display_name: &'static str,
        symbol: &'static str,
        decimals: u8,
    ) -> Self {
        Self {
            prefix,
            display_name,
            symbol,
            decimals,
        }
    }
}

impl KeyStrategy for Sr25519Strategy {
    fn profile(&self) -> ChainProfile {
        ChainProfile {
            curve: CurveFamily::Sr25519,
            encoding: AddressEncoding::Ss58 {
                prefix: self.prefix,
            },
            display_name: self.display_name,
            symbol: self.symbol,
            decimals: self.decimals,
        }
    }

    fn derive_key(&self, chain: &Chain, entropy: &Entropy) -> WalletResult<ChainKey> {
        let keypair = Sr25519Keypair::from_mini_secret(entropy.key_material())
            .map_err(|e| WalletError::derivation(chain, e))?;
        let address = keypair
            .address(self.prefix)
            .map_err(|e| WalletError::derivation(chain, e))?;

        Ok(ChainKey::new(
            chain.clone(),
            *keypair.mini_secret(),
            keypair.public_key().to_vec(),
            address,
            None,
        ))
    }

    fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        chain_dot::validate_address(address, self.prefix)
            .map_err(|e| WalletError::invalid_address(chain, e))
    }
}

/// BIP-32 from the full 64-byte entropy, BIP-86 taproot address.
#[derive(Debug, Clone, Copy)]
pub struct TaprootStrategy {
    network: BtcNetwork,
}

impl TaprootStrategy {
    pub fn new(network: BtcNetwork) -> Self {
        Self { network }
    }

    pub fn mainnet() -> Self {
        Self::new(BtcNetwork::Mainnet)
    }

    pub fn testnet() -> Self {
        Self::new(BtcNetwork::Testnet)
    }
}

impl KeyStrategy for TaprootStrategy {
    fn profile(&self) -> ChainProfile {
        let (display_name, symbol) = match self.network {
            BtcNetwork::Mainnet => ("Bitcoin", "BTC"),
            BtcNetwork::Testnet => ("Bitcoin Testnet", "tBTC"),
        };
        ChainProfile {
            curve: CurveFamily::Bip32Secp256k1,
            encoding: AddressEncoding::Taproot,
            display_name,
            symbol,
            decimals: 8,
        }
    }

    fn derive_key(&self, chain: &Chain, entropy: &Entropy) -> WalletResult<ChainKey> {
        let path = hd::taproot_path(self.network);
        let child = hd::derive_child(entropy.as_bytes(), &path)
            .map_err(|e| WalletError::derivation(chain, e))?;
        let address = chain_btc::address::pubkey_to_p2tr_address(
            &child.public_key_compressed,
            self.network,
        )
        .map_err(|e| WalletError::derivation(chain, e))?;

        Ok(ChainKey::new(
            chain.clone(),
            child.private_key,
            child.public_key_compressed.to_vec(),
            address,
            Some(path),
        ))
    }

    fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        chain_btc::address::validate_address(address, self.network)
            .map_err(|e| WalletError::invalid_address(chain, e))
    }
}

/// secp256k1 scalar, node id as hex of the compressed public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeIdStrategy;

impl KeyStrategy for NodeIdStrategy {
    fn profile(&self) -> ChainProfile {
        ChainProfile {
            curve: CurveFamily::Secp256k1,
            encoding: AddressEncoding::HexCompressedPubkey,
            display_name: "Lightning",
            symbol: "BTC",
            // millisatoshi precision
            decimals: 11,
        }
    }

    fn derive_key(&self, chain: &Chain, entropy: &Entropy) -> WalletResult<ChainKey> {
        let secret = entropy.key_material();
        let pubkey =
            lightning::secret_to_pubkey(secret).map_err(|e| WalletError::derivation(chain, e))?;

        Ok(ChainKey::new(
            chain.clone(),
            *secret,
            pubkey.to_vec(),
            lightning::pubkey_to_node_id(&pubkey),
            None,
        ))
    }

    fn validate_address(&self, chain: &Chain, address: &str) -> WalletResult<bool> {
        lightning::validate_node_id(address).map_err(|e| WalletError::invalid_address(chain, e))
    }
}
