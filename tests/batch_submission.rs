//! RPC client and batch tests against a mock JSON-RPC node.

use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use serde_json::{json, Value};
use txmanager::config::ChainConfig;
use txmanager::contract::{ContractRegistry, RegistryError};
use txmanager::keystore::StaticKeyring;
use txmanager::manager::{ContractCall, ManagerError, TxManager};
use txmanager::rpc::{BatchRequest, ChainClient, RpcError};
use txmanager::transaction::{Transaction, TxSigner};

mod common;

fn chain_config(url: &str) -> ChainConfig {
    ChainConfig {
        rpc_url: url.to_string(),
        failover_urls: Vec::new(),
        chain_id: 31337,
        rpc_timeout_secs: 5,
        verify_chain_id: true,
    }
}

/// A node for chain 31337 that fails every `eth_call`.
fn standard_node(method: &str, params: &Value) -> Result<Value, (i64, String)> {
    match method {
        "eth_chainId" => Ok(json!("0x7a69")),
        "eth_blockNumber" => Ok(json!("0x10")),
        "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
        "eth_getTransactionCount" => Ok(json!("0x3")),
        "eth_gasPrice" => Ok(json!("0x3b9aca00")),
        "eth_call" => Err((-32000, "execution reverted".to_string())),
        "eth_sendRawTransaction" => {
            let raw: Bytes = serde_json::from_value(params[0].clone()).unwrap();
            Ok(json!(keccak256(&raw)))
        }
        _ => Err((-32601, "method not found".to_string())),
    }
}

#[tokio::test]
async fn test_client_queries_and_verification() {
    let node = common::start_mock_node(standard_node).await;
    let client = ChainClient::new(chain_config(&node.url)).await.unwrap();

    assert_eq!(client.get_chain_id().await.unwrap().0, 31337);
    assert_eq!(client.get_block_number().await.unwrap(), 16);
    assert_eq!(
        client
            .get_transaction_count(Address::ZERO, BlockNumberOrTag::Latest)
            .await
            .unwrap(),
        3
    );
    assert_eq!(client.get_gas_price().await.unwrap(), U256::from(1_000_000_000u64));
    assert_eq!(
        client.get_balance(Address::ZERO, BlockNumberOrTag::Latest).await.unwrap(),
        U256::from(1_000_000_000_000_000_000u128)
    );
    assert!(client.is_healthy().await);
}

#[tokio::test]
async fn test_chain_mismatch_is_fatal() {
    let node = common::start_mock_node(standard_node).await;
    let mut config = chain_config(&node.url);
    config.chain_id = 1;

    let err = ChainClient::new(config).await.unwrap_err();
    assert!(matches!(err, RpcError::ChainMismatch { expected: 1, actual: 31337 }));
}

#[tokio::test]
async fn test_reads_fail_over_but_submissions_do_not() {
    let node = common::start_mock_node(standard_node).await;
    let mut config = chain_config("http://127.0.0.1:1");
    config.failover_urls.push(node.url.clone());
    config.verify_chain_id = false;

    let client = ChainClient::new(config).await.unwrap();
    assert_eq!(client.get_block_number().await.unwrap(), 16);

    let err = client
        .send_raw_transaction(&Bytes::from_static(&[0xc0]))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)));
    assert!(!node.methods().contains(&"eth_sendRawTransaction".to_string()));
}

#[tokio::test]
async fn test_error_response_is_not_failed_over() {
    let node = common::start_mock_node(standard_node).await;
    let client = ChainClient::new(chain_config(&node.url)).await.unwrap();

    let err = client
        .call(&Default::default(), BlockNumberOrTag::Latest)
        .await
        .unwrap_err();
    match err {
        RpcError::Response(error) => {
            assert_eq!(error.code, -32000);
            assert_eq!(error.message, "execution reverted");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_batch_keeps_order_when_middle_entry_fails() {
    let node = common::start_mock_node(standard_node).await;
    let client = ChainClient::new(chain_config(&node.url)).await.unwrap();

    let mut batch = BatchRequest::new();
    batch.add_request("eth_blockNumber", json!([]));
    batch.add_request("eth_call", json!([{"from": Address::ZERO, "to": Address::ZERO}, "latest"]));
    batch.add_request("eth_getTransactionCount", json!([Address::ZERO, "latest"]));

    let results = client.batch_send(batch.calls()).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok(json!("0x10")));
    assert_eq!(results[1].as_ref().unwrap_err().code, -32000);
    assert_eq!(results[2], Ok(json!("0x3")));
}

#[tokio::test]
async fn test_manager_batch_over_rpc() {
    let node = common::start_mock_node(|method, params| match method {
        "eth_call" => Ok(json!(common::uint_word(500))),
        _ => standard_node(method, params),
    })
    .await;
    let client = ChainClient::new(chain_config(&node.url)).await.unwrap();

    let keyring = Arc::new(StaticKeyring::from_private_key(common::TEST_PRIVATE_KEY).unwrap());
    let registry = Arc::new(ContractRegistry::new());
    registry.insert(common::token_contract());
    let manager = TxManager::new(client, TxSigner::new(keyring, 31337u64), registry);
    let from = common::test_address();

    let balance_call = ContractCall::new(
        "token",
        "balanceOf",
        vec![DynSolValue::Address(from)],
    );
    let transfer = ContractCall::new(
        "token",
        "transfer",
        vec![
            DynSolValue::Address(Address::repeat_byte(2)),
            DynSolValue::Uint(U256::from(5), 256),
        ],
    );

    let mut batch = manager.new_batch();
    let block = manager.add_get_block_number(&mut batch);
    let call = manager
        .add_contract_call(&mut batch, from, &balance_call, BlockNumberOrTag::Latest)
        .unwrap();
    let submit = manager
        .add_contract_raw_transaction(&mut batch, from, &transfer, U256::ZERO, 60_000, 3)
        .await
        .unwrap();

    let results = manager.send_batch(batch).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[block], Ok(json!("0x10")));
    assert_eq!(
        manager.unpack_result(&results[call], "token", "balanceOf").unwrap(),
        vec![DynSolValue::Uint(U256::from(500), 256)]
    );
    let hash: B256 = serde_json::from_value(results[submit].clone().unwrap()).unwrap();
    assert_ne!(hash, B256::ZERO);

    // Errors inside the batch surface through unpack_result.
    let entry = Err(txmanager::rpc::RpcErrorObject {
        code: 3,
        message: "execution reverted".to_string(),
        data: None,
    });
    assert!(matches!(
        manager.unpack_result(&entry, "token", "balanceOf"),
        Err(ManagerError::Rpc(RpcError::Response(_)))
    ));
    assert!(matches!(
        manager.unpack_result(&Ok(Value::Null), "token", "balanceOf"),
        Err(ManagerError::Registry(RegistryError::EmptyResponse))
    ));
}

#[tokio::test]
async fn test_empty_batch_returns_no_results() {
    let node = common::start_mock_node(standard_node).await;
    let client = ChainClient::new(chain_config(&node.url)).await.unwrap();
    let methods_before = node.methods().len();

    assert!(client.batch_send(&[]).await.unwrap().is_empty());
    assert_eq!(node.methods().len(), methods_before);
}

#[tokio::test]
async fn test_submitted_bytes_reach_the_node() {
    let node = common::start_mock_node(standard_node).await;
    let client = ChainClient::new(chain_config(&node.url)).await.unwrap();

    let keyring = Arc::new(StaticKeyring::from_private_key(common::TEST_PRIVATE_KEY).unwrap());
    let registry = Arc::new(ContractRegistry::new());
    let manager = TxManager::new(client, TxSigner::new(keyring, 31337u64), registry);

    let hash = manager
        .send_raw_transaction(
            common::test_address(),
            Some(Address::repeat_byte(0xaa)),
            U256::from(1),
            21_000,
            Bytes::new(),
        )
        .await
        .unwrap();

    let methods = node.methods();
    assert!(methods.contains(&"eth_getTransactionCount".to_string()));
    assert_eq!(methods.last().map(String::as_str), Some("eth_sendRawTransaction"));
    assert_ne!(hash, B256::ZERO);

    // The node's hash is the hash of the signed encoding.
    let draft = Transaction::new_transfer(
        3,
        Address::repeat_byte(0xaa),
        U256::from(1),
        U256::from(21_000),
        U256::from(20_000_000_000u64),
        Bytes::new(),
    );
    let signed = manager.signer().sign_transaction(&draft, common::test_address()).unwrap();
    assert_eq!(signed.tx_hash().unwrap(), hash);
}
