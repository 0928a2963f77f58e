//! Wiring from configuration: config file, key directory, registry index and node.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy::dyn_abi::DynSolValue;
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, U256};
use serde_json::json;
use txmanager::config::{load_config, ClientConfig, GasPolicyKind};
use txmanager::contract::{ContractRegistry, RegistryError, RegistryWatcher};
use txmanager::keystore::{FileKeystore, KeyCustody};
use txmanager::manager::{ContractCall, ManagerError, TxManager};
use txmanager::observability::logging;
use txmanager::rpc::RpcError;

mod common;

fn write_index(dir: &Path, entries: serde_json::Value) -> std::path::PathBuf {
    std::fs::write(dir.join("token.json"), common::TOKEN_ABI).unwrap();
    let index = dir.join("contracts.json");
    std::fs::write(&index, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    index
}

fn token_entry() -> serde_json::Value {
    json!({"address": common::token_address().to_string(), "fileName": "token.json"})
}

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("txmanager.toml");
    std::fs::write(
        &path,
        r#"
        [keystore]
        dir = "/srv/keys"

        [chain]
        rpc_url = "http://10.0.0.5:8545"
        failover_urls = ["http://10.0.0.6:8545"]
        chain_id = 56

        [gas]
        policy = "network"
        max_price_gwei = 200

        [contracts]
        index_path = "/srv/contracts.json"
        watch = true
        "#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.chain.chain_id, 56);
    assert_eq!(config.chain.failover_urls.len(), 1);
    assert_eq!(config.gas.policy, GasPolicyKind::Network);
    assert_eq!(config.gas.max_price_gwei, 200);
    assert_eq!(config.gas.bump_cap_gwei, 50);
    assert_eq!(config.contracts.index_path.as_deref(), Some("/srv/contracts.json"));
    assert!(config.contracts.watch);
}

#[test]
fn test_logging_init_is_idempotent() {
    let config = ClientConfig::default();
    logging::init(&config.observability);
    assert!(!logging::init(&config.observability));
}

#[tokio::test]
async fn test_connect_and_submit() {
    let node = common::start_mock_node(|method, params| match method {
        "eth_chainId" => Ok(json!("0x7a69")),
        "eth_getTransactionCount" => Ok(json!("0x0")),
        "eth_call" => Ok(json!(common::uint_word(42))),
        "eth_sendRawTransaction" => Ok(json!(alloy::primitives::keccak256(
            serde_json::from_value::<alloy::primitives::Bytes>(params[0].clone()).unwrap()
        ))),
        _ => Err((-32601, "method not found".to_string())),
    })
    .await;

    let dir = tempfile::tempdir().unwrap();
    let keys = dir.path().join("keys");
    std::fs::create_dir_all(&keys).unwrap();
    let from = FileKeystore::open(&keys).unwrap().create_account("pw").unwrap();
    let index = write_index(dir.path(), json!({ "token": token_entry() }));

    let mut config = ClientConfig::default();
    config.keystore.dir = keys.display().to_string();
    config.chain.rpc_url = node.url.clone();
    config.chain.chain_id = 31337;
    config.contracts.index_path = Some(index.display().to_string());

    let manager = TxManager::connect(&config).await.unwrap();
    assert_eq!(manager.registry().names(), vec!["token".to_string()]);
    assert_eq!(manager.signer().chain_id().0, 31337);

    let balance = ContractCall::new("token", "balanceOf", vec![DynSolValue::Address(from)]);
    let values = manager
        .send_contract_call(from, &balance, BlockNumberOrTag::Latest)
        .await
        .unwrap();
    assert_eq!(values, vec![DynSolValue::Uint(U256::from(42), 256)]);

    let transfer = ContractCall::new(
        "token",
        "transfer",
        vec![
            DynSolValue::Address(Address::repeat_byte(3)),
            DynSolValue::Uint(U256::from(1), 256),
        ],
    );
    let err = manager
        .send_contract_raw_transaction(from, &transfer, U256::ZERO, 60_000)
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::Transaction(_)));

    manager.signer().custody().unlock(from, "pw").unwrap();
    manager
        .send_contract_raw_transaction(from, &transfer, U256::ZERO, 60_000)
        .await
        .unwrap();
    assert_eq!(
        node.methods().last().map(String::as_str),
        Some("eth_sendRawTransaction")
    );
}

#[tokio::test]
async fn test_connect_rejects_wrong_chain() {
    let node = common::start_mock_node(|method, _| match method {
        "eth_chainId" => Ok(json!("0x1")),
        _ => Err((-32601, "method not found".to_string())),
    })
    .await;
    let dir = tempfile::tempdir().unwrap();

    let mut config = ClientConfig::default();
    config.keystore.dir = dir.path().display().to_string();
    config.chain.rpc_url = node.url.clone();
    config.chain.chain_id = 5;

    let err = TxManager::connect(&config).await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Rpc(RpcError::ChainMismatch { expected: 5, actual: 1 })
    ));
}

#[tokio::test]
async fn test_watcher_reloads_changed_index() {
    let dir = tempfile::tempdir().unwrap();
    let index = write_index(dir.path(), json!({ "token": token_entry() }));
    let (registry, report) = ContractRegistry::from_index(&index).unwrap();
    assert!(report.is_complete());
    let registry = Arc::new(registry);

    let (watcher, mut reports) = RegistryWatcher::new(&index, registry.clone());
    let _handle = watcher.run().unwrap();

    write_index(
        dir.path(),
        json!({
            "token": token_entry(),
            "vault": {"address": Address::repeat_byte(0x71).to_string(), "fileName": "token.json"},
            "broken": {"address": Address::ZERO.to_string(), "fileName": "missing.json"}
        }),
    );

    let report = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let report = reports.recv().await.unwrap();
            if report.loaded.contains(&"vault".to_string()) {
                return report;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(report.loaded, vec!["token".to_string(), "vault".to_string()]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "broken");
    assert_eq!(registry.get("vault").unwrap().address(), Address::repeat_byte(0x71));
    assert!(matches!(
        registry.get("broken"),
        Err(RegistryError::ContractNotFound(_))
    ));
}
