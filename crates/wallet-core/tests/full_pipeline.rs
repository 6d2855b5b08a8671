//! Cross-crate integration tests exercising the full pipeline:
//! master secret -> entropy -> chain key -> adapter registry -> facade.
//!
//! Golden values are pinned for the all-zero 32-byte master secret with
//! scope "wallet", user "u1", index "0".

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use wallet_core::memory::LedgerError;
use wallet_core::*;

fn zero_wallet() -> Wallet {
    Wallet::new(MasterSecret::from_slice(&[0u8; 32]).unwrap())
}

fn params(chain: Chain) -> DeriveParams {
    DeriveParams::new("wallet", "u1", chain, "0")
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn is_base58(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

// ─── Golden vectors ─────────────────────────────────────────────────

#[test]
fn zero_secret_golden_addresses() {
    let wallet = zero_wallet();
    let cases = [
        (Chain::ETHEREUM, "0x883917cd7ba857107A7Fcc0607ce50db27308e82"),
        (Chain::POLYGON, "0xfbFfEAB0B8068c98c17b133AaEA6910b7266739F"),
        (Chain::SOLANA, "9iwnyemN7izWWCwfYxv5JtUTPoDsxSzGrm43LGzNLPCA"),
        (
            Chain::LIGHTNING,
            "03c3eae9d4f59fabedc4565df43c8b52a0137b33c71a0cdb57ea1a0fedd89acf08",
        ),
        (
            Chain::BITCOIN,
            "bc1pcsgh9kspfz5tnarfgelp702esg2ca2uxtnjgegqm69hdgcz267nqjhau3w",
        ),
        (
            Chain::BITCOIN_TESTNET,
            "tb1puag3taxkvch6k4h9rpuj8ts0ddrwpdy6nxvknmy3n8d8ljrjl6kq5rnyrp",
        ),
    ];
    for (chain, expected) in cases {
        let derived = wallet.derive_address(&params(chain.clone())).unwrap();
        assert_eq!(derived.address, expected, "golden mismatch for {chain}");
    }
}

#[test]
fn ethereum_and_solana_scenario() {
    let wallet = zero_wallet();
    let eth = wallet.derive_address(&params(Chain::ETHEREUM)).unwrap();
    let sol = wallet.derive_address(&params(Chain::SOLANA)).unwrap();

    assert!(eth.address.starts_with("0x"));
    assert_eq!(eth.address.len(), 42);
    assert!((32..=44).contains(&sol.address.len()));
    assert!(is_base58(&sol.address));
    assert_ne!(eth.address, sol.address);
}

// ─── Derivation properties ──────────────────────────────────────────

#[test]
fn derivation_is_deterministic_for_every_chain() {
    let mapper = KeyMapper::default();
    let secret = MasterSecret::from_slice(b"a thirty-two byte master secret!").unwrap();
    for chain in Chain::BUILTIN {
        let a = mapper.derive_for_chain(&secret, &params(chain.clone())).unwrap();
        let b = mapper.derive_for_chain(&secret, &params(chain.clone())).unwrap();
        assert_eq!(a.private_key(), b.private_key(), "{chain}");
        assert_eq!(a.address(), b.address(), "{chain}");
    }
}

#[test]
fn delimiter_boundaries_do_not_collide() {
    let wallet = zero_wallet();
    for chain in [Chain::ETHEREUM, Chain::SOLANA, Chain::POLKADOT, Chain::BITCOIN] {
        let a = DeriveParams::new("a", "b:c", chain.clone(), "0");
        let b = DeriveParams::new("a:b", "c", chain.clone(), "0");
        assert_ne!(
            wallet.derive_address(&a).unwrap().address,
            wallet.derive_address(&b).unwrap().address,
            "{chain}"
        );
    }
}

#[test]
fn every_field_changes_the_address() {
    let wallet = zero_wallet();
    let base = params(Chain::ETHEREUM);
    let variants = [
        DeriveParams::new("wallet2", "u1", Chain::ETHEREUM, "0"),
        DeriveParams::new("wallet", "u2", Chain::ETHEREUM, "0"),
        DeriveParams::new("wallet", "u1", Chain::ETHEREUM, "1"),
        DeriveParams::new("wallet", "u1", Chain::ETHEREUM, "00"),
    ];
    let base_address = wallet.derive_address(&base).unwrap().address;
    for variant in variants {
        assert_ne!(wallet.derive_address(&variant).unwrap().address, base_address);
    }
}

#[test]
fn chains_get_independent_keys() {
    let mapper = KeyMapper::default();
    let secret = MasterSecret::from_slice(&[0u8; 32]).unwrap();
    let keys: Vec<ChainKey> = Chain::BUILTIN
        .iter()
        .map(|chain| mapper.derive_for_chain(&secret, &params(chain.clone())).unwrap())
        .collect();

    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(
                a.private_key()[..8],
                b.private_key()[..8],
                "{} and {} share a key prefix",
                a.chain(),
                b.chain()
            );
        }
    }
}

#[test]
fn address_formats_conform() {
    let wallet = zero_wallet();
    let address = |chain: Chain| wallet.derive_address(&params(chain)).unwrap().address;

    for chain in [
        Chain::ETHEREUM,
        Chain::POLYGON,
        Chain::BSC,
        Chain::ARBITRUM,
        Chain::OPTIMISM,
        Chain::BASE,
        Chain::AVALANCHE,
    ] {
        let a = address(chain);
        assert_eq!(a.len(), 42);
        assert!(a[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    let sol = address(Chain::SOLANA);
    assert!((32..=44).contains(&sol.len()) && is_base58(&sol));

    let dot = address(Chain::POLKADOT);
    assert!(dot.starts_with('1') && is_base58(&dot));
    let ksm = address(Chain::KUSAMA);
    assert!(ksm.chars().next().unwrap().is_ascii_uppercase() && is_base58(&ksm));

    let btc = address(Chain::BITCOIN);
    assert!(btc.starts_with("bc1p") && btc.len() == 62);
    let tbtc = address(Chain::BITCOIN_TESTNET);
    assert!(tbtc.starts_with("tb1p") && tbtc.len() == 62);

    let node = address(Chain::LIGHTNING);
    assert_eq!(node.len(), 66);
    assert!(node.starts_with("02") || node.starts_with("03"));
}

#[test]
fn derived_addresses_validate_on_their_own_chain() {
    let wallet = zero_wallet();
    for chain in Chain::BUILTIN {
        let derived = wallet.derive_address(&params(chain.clone())).unwrap();
        assert!(
            wallet.validate_address(&chain, &derived.address).unwrap(),
            "{chain} rejected its own address"
        );
    }
}

#[test]
fn unsupported_chain_and_empty_fields() {
    let wallet = zero_wallet();
    let err = wallet
        .derive_address(&params("tron".parse().unwrap()))
        .unwrap_err();
    assert!(matches!(err, WalletError::UnsupportedChain(ref c) if c == "tron"));

    let err = wallet
        .derive_address(&DeriveParams::new("wallet", "", Chain::ETHEREUM, "0"))
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidDeriveParams { ref field, .. } if field == "user_id"));
}

#[test]
fn concurrent_derivation_agrees() {
    let wallet = zero_wallet();
    let expected = wallet.derive_address(&params(Chain::KUSAMA)).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| wallet.derive_address(&params(Chain::KUSAMA)).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn mnemonic_wallet_matches_seed_wallet() {
    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    let from_phrase = Wallet::from_mnemonic(PHRASE, "").unwrap();
    let seed = hex::decode(
        "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
         9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4",
    )
    .unwrap();
    let from_seed = Wallet::new(MasterSecret::new(seed).unwrap());

    for chain in [Chain::ETHEREUM, Chain::SOLANA, Chain::BITCOIN] {
        assert_eq!(
            from_phrase.derive_address(&params(chain.clone())).unwrap(),
            from_seed.derive_address(&params(chain)).unwrap()
        );
    }
}

// ─── Registry and lifecycle ─────────────────────────────────────────

#[test]
fn registry_returns_the_registered_instance() {
    let wallet = zero_wallet();
    let adapter: Arc<dyn ChainAdapter> = Arc::new(MemoryLedgerAdapter::new(Chain::ETHEREUM));
    wallet.register_adapter(adapter.clone()).unwrap();

    let found = wallet.registry().get(&Chain::ETHEREUM).unwrap();
    assert_eq!(
        Arc::as_ptr(found.adapter()) as *const (),
        Arc::as_ptr(&adapter) as *const ()
    );
}

#[test]
fn late_registration_is_visible() {
    let wallet = zero_wallet();
    assert!(wallet.registry().get(&Chain::SOLANA).is_err());
    wallet
        .register_adapter(Arc::new(MemoryLedgerAdapter::new(Chain::SOLANA)))
        .unwrap();
    assert!(wallet.registry().get(&Chain::SOLANA).is_ok());
}

#[test]
fn adapter_derive_address_checks_chain() {
    let adapter = MemoryLedgerAdapter::new(Chain::SOLANA);
    let mapper = KeyMapper::default();
    let secret = MasterSecret::from_slice(&[0u8; 32]).unwrap();

    let derived = adapter
        .derive_address(&mapper, &secret, &params(Chain::SOLANA))
        .unwrap();
    assert_eq!(derived.address, "9iwnyemN7izWWCwfYxv5JtUTPoDsxSzGrm43LGzNLPCA");

    let err = adapter
        .derive_address(&mapper, &secret, &params(Chain::ETHEREUM))
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidDeriveParams { ref field, .. } if field == "chain"));
}

#[tokio::test]
async fn shutdown_closes_everything_once() {
    let wallet = zero_wallet();
    let ledger = Arc::new(MemoryLedgerAdapter::new(Chain::POLKADOT));
    let entry = wallet.register_adapter(ledger.clone()).unwrap();

    let handle = wallet
        .subscribe(&params(Chain::POLKADOT), Arc::new(|_| {}))
        .await
        .unwrap();
    assert_eq!(entry.state(), AdapterState::Active);

    wallet.registry().shutdown(&Chain::POLKADOT).unwrap();
    wallet.registry().shutdown(&Chain::POLKADOT).unwrap();
    assert_eq!(ledger.shutdown_calls(), 1);
    assert!(!handle.is_active());

    let err = wallet.balance(&params(Chain::POLKADOT)).await.unwrap_err();
    assert!(matches!(err, WalletError::AdapterShutdown(ref c) if c == "polkadot"));

    // Still safe after the adapter closed it.
    handle.unsubscribe();
}

#[test]
fn replace_policy_from_config() {
    let config = WalletConfig::from_toml_str("[registry]\nduplicate_policy = \"replace\"").unwrap();
    let wallet = Wallet::with_config(MasterSecret::from_slice(&[0u8; 32]).unwrap(), config);

    let old = Arc::new(MemoryLedgerAdapter::new(Chain::BASE));
    wallet.register_adapter(old.clone()).unwrap();
    wallet
        .register_adapter(Arc::new(MemoryLedgerAdapter::new(Chain::BASE)))
        .unwrap();
    assert_eq!(old.shutdown_calls(), 1);
    assert_eq!(wallet.registry().len(), 1);
}

#[test]
fn wallets_can_share_a_registry() {
    let registry = Arc::new(AdapterRegistry::default());
    registry
        .register(Arc::new(MemoryLedgerAdapter::new(Chain::ETHEREUM)))
        .unwrap();

    let a = Wallet::with_registry(MasterSecret::from_slice(&[1u8; 32]).unwrap(), registry.clone());
    let b = Wallet::with_registry(MasterSecret::from_slice(&[2u8; 32]).unwrap(), registry);

    assert!(a.registry().contains(&Chain::ETHEREUM));
    assert!(b.registry().contains(&Chain::ETHEREUM));
    assert_ne!(
        a.derive_address(&params(Chain::ETHEREUM)).unwrap(),
        b.derive_address(&params(Chain::ETHEREUM)).unwrap()
    );
}

// ─── Facade over the in-memory ledger ───────────────────────────────

#[tokio::test]
async fn fund_send_and_history() {
    let wallet = zero_wallet();
    let ledger = Arc::new(MemoryLedgerAdapter::new(Chain::ETHEREUM).with_fee(dec("0.001"), "ETH"));
    wallet.register_adapter(ledger.clone()).unwrap();

    let alice = params(Chain::ETHEREUM);
    let bob = DeriveParams::new("wallet", "u2", Chain::ETHEREUM, "0");
    let alice_address = wallet.derive_address(&alice).unwrap().address;
    let bob_address = wallet.derive_address(&bob).unwrap().address;

    ledger.fund(&alice_address, dec("1"));
    assert_eq!(wallet.balance(&alice).await.unwrap(), dec("1"));

    let quote = wallet
        .estimate_fee(&alice, &bob_address, dec("0.25"))
        .await
        .unwrap();
    assert_eq!(quote.fee, dec("0.001"));
    assert_eq!(quote.symbol, "ETH");

    let receipt = wallet.send(&alice, &bob_address, dec("0.25")).await.unwrap();
    assert_eq!(wallet.balance(&alice).await.unwrap(), dec("0.749"));
    assert_eq!(wallet.balance(&bob).await.unwrap(), dec("0.25"));

    let history = wallet.history(&bob).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].tx_hash, receipt.tx_hash);
    assert_eq!(history[0].direction, TransferDirection::Incoming);
    assert_eq!(history[0].counterparty.as_deref(), Some(alice_address.as_str()));
}

#[tokio::test]
async fn token_send_through_facade() {
    let wallet = zero_wallet();
    let ledger = Arc::new(MemoryLedgerAdapter::new(Chain::SOLANA));
    wallet.register_adapter(ledger.clone()).unwrap();

    let sender = params(Chain::SOLANA);
    let from = wallet.derive_address(&sender).unwrap().address;
    let to = wallet
        .derive_address(&DeriveParams::new("wallet", "u1", Chain::SOLANA, "1"))
        .unwrap()
        .address;

    ledger.fund_token(&from, "USDC", dec("10"));
    wallet.send_token(&sender, "USDC", &to, dec("4")).await.unwrap();
    assert_eq!(ledger.token_balance(&to, "USDC"), dec("4"));
}

#[tokio::test]
async fn adapter_errors_pass_through_unmodified() {
    let wallet = zero_wallet();
    let ledger = Arc::new(MemoryLedgerAdapter::new(Chain::BITCOIN));
    wallet.register_adapter(ledger.clone()).unwrap();

    let to = wallet
        .derive_address(&DeriveParams::new("wallet", "u9", Chain::BITCOIN, "0"))
        .unwrap()
        .address;
    let err = wallet
        .send(&params(Chain::BITCOIN), &to, dec("0.1"))
        .await
        .unwrap_err();
    let source = err.adapter_error().expect("adapter error");
    assert!(matches!(
        source.downcast_ref::<LedgerError>(),
        Some(LedgerError::InsufficientFunds { .. })
    ));

    ledger.set_offline(true);
    let err = wallet.balance(&params(Chain::BITCOIN)).await.unwrap_err();
    assert_eq!(
        err.adapter_error().and_then(|e| e.downcast_ref::<LedgerError>()),
        Some(&LedgerError::Offline)
    );
}

#[tokio::test(start_paused = true)]
async fn subscription_delivers_until_unsubscribed() {
    let config = WalletConfig::from_toml_str("[subscription]\npoll_interval_ms = 100\n").unwrap();
    let wallet = Wallet::with_config(MasterSecret::from_slice(&[0u8; 32]).unwrap(), config);
    let ledger = Arc::new(MemoryLedgerAdapter::with_config(
        Chain::LIGHTNING,
        &wallet.config().subscription,
    ));
    assert_eq!(ledger.poll_interval(), Duration::from_millis(100));
    wallet.register_adapter(ledger.clone()).unwrap();

    let received: Arc<Mutex<Vec<IncomingTransfer>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let handle = wallet
        .subscribe(
            &params(Chain::LIGHTNING),
            Arc::new(move |t| sink.lock().unwrap().push(t)),
        )
        .await
        .unwrap();

    let node_id = wallet.derive_address(&params(Chain::LIGHTNING)).unwrap().address;
    let tx_hash = ledger.fund(&node_id, dec("0.0005"));
    tokio::time::sleep(Duration::from_millis(350)).await;

    {
        let got = received.lock().unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].tx_hash, tx_hash);
        assert_eq!(got[0].amount, dec("0.0005"));
    }

    handle.unsubscribe();
    handle.unsubscribe();
    ledger.fund(&node_id, dec("1"));
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_subscriptions_are_independent() {
    let wallet = zero_wallet();
    let ledger = Arc::new(
        MemoryLedgerAdapter::new(Chain::KUSAMA).with_poll_interval(Duration::from_millis(100)),
    );
    wallet.register_adapter(ledger.clone()).unwrap();

    let count_a = Arc::new(Mutex::new(0usize));
    let count_b = Arc::new(Mutex::new(0usize));
    let (ca, cb) = (count_a.clone(), count_b.clone());

    let a = wallet
        .subscribe(&params(Chain::KUSAMA), Arc::new(move |_| *ca.lock().unwrap() += 1))
        .await
        .unwrap();
    let b = wallet
        .subscribe(&params(Chain::KUSAMA), Arc::new(move |_| *cb.lock().unwrap() += 1))
        .await
        .unwrap();
    assert_ne!(a.id(), b.id());

    let address = wallet.derive_address(&params(Chain::KUSAMA)).unwrap().address;
    ledger.fund(&address, dec("2"));
    tokio::time::sleep(Duration::from_millis(250)).await;

    a.unsubscribe();
    ledger.fund(&address, dec("3"));
    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(*count_a.lock().unwrap(), 1);
    assert_eq!(*count_b.lock().unwrap(), 2);
    b.unsubscribe();
}

#[tokio::test]
async fn capability_checks_go_through_the_facade() {
    let wallet = zero_wallet();
    let ledger = MemoryLedgerAdapter::new(Chain::OPTIMISM).with_capabilities(CapabilitySet {
        estimate_fee: false,
        history: true,
        send_token: false,
    });
    let entry = wallet.register_adapter(Arc::new(ledger)).unwrap();
    assert_eq!(
        entry.capabilities().iter().collect::<Vec<_>>(),
        vec![Capability::History]
    );

    let to = wallet
        .derive_address(&DeriveParams::new("wallet", "u3", Chain::OPTIMISM, "0"))
        .unwrap()
        .address;
    let err = wallet
        .estimate_fee(&params(Chain::OPTIMISM), &to, dec("1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::CapabilityNotSupported { capability: Capability::EstimateFee, .. }
    ));
    let err = wallet
        .send_token(&params(Chain::OPTIMISM), "USDC", &to, dec("1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WalletError::CapabilityNotSupported { capability: Capability::SendToken, .. }
    ));
    assert!(wallet.history(&params(Chain::OPTIMISM)).await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_chain_runs_end_to_end() {
    use wallet_core::strategies::Sr25519Strategy;

    let westend = Chain::new("Westend").unwrap();
    let mut mapper = KeyMapper::default();
    mapper.register_strategy(
        westend.clone(),
        Arc::new(Sr25519Strategy::with_prefix(
            chain_dot::ss58::SUBSTRATE_PREFIX,
            "Westend",
            "WND",
            12,
        )),
    );
    let wallet = zero_wallet().with_key_mapper(mapper);

    let ledger = Arc::new(MemoryLedgerAdapter::new(westend.clone()));
    wallet.register_adapter(ledger.clone()).unwrap();

    let from = wallet.derive_address(&params(westend.clone())).unwrap().address;
    let to = wallet
        .derive_address(&DeriveParams::new("wallet", "u2", westend.clone(), "0"))
        .unwrap()
        .address;
    assert!(wallet.validate_address(&westend, &to).unwrap());
    assert!(!wallet
        .validate_address(&Chain::POLKADOT, &to)
        .unwrap_or(false));

    ledger.fund(&from, dec("3"));
    wallet.send(&params(westend.clone()), &to, dec("1")).await.unwrap();
    assert_eq!(wallet.balance(&params(westend)).await.unwrap(), dec("2"));
}
