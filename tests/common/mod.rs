//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy::eips::BlockNumberOrTag;
use alloy::json_abi::JsonAbi;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use txmanager::contract::Contract;
use txmanager::rpc::{BatchEntry, CallRequest, ChainState, RpcCall, RpcErrorObject, RpcResult};

// Well-known test private key (Anvil's first account)
pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn test_address() -> Address {
    "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap()
}

pub const TOKEN_ABI: &str = r#"[
    {"type":"constructor","stateMutability":"nonpayable",
     "inputs":[{"name":"supply","type":"uint256"}]},
    {"type":"function","name":"balanceOf","stateMutability":"view",
     "inputs":[{"name":"owner","type":"address"}],
     "outputs":[{"name":"","type":"uint256"}]},
    {"type":"function","name":"transfer","stateMutability":"nonpayable",
     "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
     "outputs":[{"name":"","type":"bool"}]}
]"#;

pub fn token_address() -> Address {
    Address::repeat_byte(0x70)
}

pub fn token_contract() -> Contract {
    let abi: JsonAbi = serde_json::from_str(TOKEN_ABI).unwrap();
    Contract::new("token", abi, token_address())
}

/// ABI encoding of a single uint256 return value.
pub fn uint_word(value: u64) -> Bytes {
    Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec())
}

// ---------------------------------------------------------------------------
// Mock JSON-RPC node
// ---------------------------------------------------------------------------

type Handler = dyn Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync;

#[derive(Clone)]
struct MockState {
    handler: Arc<Handler>,
    methods: Arc<Mutex<Vec<String>>>,
}

/// A running mock node.
pub struct MockNode {
    pub url: String,
    methods: Arc<Mutex<Vec<String>>>,
}

impl MockNode {
    /// Methods received so far, in arrival order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

/// Start a JSON-RPC node on an ephemeral port. `handler` answers each call
/// (single or batched) with a result or an `(code, message)` error.
pub async fn start_mock_node<F>(handler: F) -> MockNode
where
    F: Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = MockState {
        handler: Arc::new(handler),
        methods: Arc::new(Mutex::new(Vec::new())),
    };
    let methods = state.methods.clone();

    let app = Router::new().route("/", post(handle_rpc)).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode {
        url: format!("http://{}", addr),
        methods,
    }
}

async fn handle_rpc(State(state): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    match body {
        Value::Array(requests) => Json(Value::Array(
            requests.iter().map(|request| answer(&state, request)).collect(),
        )),
        request => Json(answer(&state, &request)),
    }
}

fn answer(state: &MockState, request: &Value) -> Value {
    let method = request["method"].as_str().unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);
    state.methods.lock().unwrap().push(method.to_string());

    let id = request["id"].clone();
    match (state.handler)(method, &params) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message}
        }),
    }
}

// ---------------------------------------------------------------------------
// In-memory chain state
// ---------------------------------------------------------------------------

/// Records everything the manager sends and answers from fixed values.
pub struct MockChain {
    pub nonce: u64,
    pub gas_price: U256,
    pub call_result: Bytes,
    pub submitted: Mutex<Vec<Bytes>>,
    pub calls: Mutex<Vec<CallRequest>>,
    pub batches: Mutex<Vec<Vec<RpcCall>>>,
    /// Position of a batch entry that answers with an error.
    pub failing_entry: Option<usize>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            nonce: 7,
            gas_price: U256::from(10_000_000_000u64),
            call_result: uint_word(0),
            submitted: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            failing_entry: None,
        }
    }
}

impl MockChain {
    pub fn submitted(&self) -> Vec<Bytes> {
        self.submitted.lock().unwrap().clone()
    }
}

impl ChainState for MockChain {
    async fn get_transaction_count(&self, _address: Address, _block: BlockNumberOrTag) -> RpcResult<u64> {
        Ok(self.nonce)
    }

    async fn get_gas_price(&self) -> RpcResult<U256> {
        Ok(self.gas_price)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<B256> {
        let hash = keccak256(&raw);
        self.submitted.lock().unwrap().push(raw);
        Ok(hash)
    }

    async fn call(&self, request: CallRequest, _block: BlockNumberOrTag) -> RpcResult<Bytes> {
        self.calls.lock().unwrap().push(request);
        Ok(self.call_result.clone())
    }

    async fn batch_send(&self, calls: Vec<RpcCall>) -> RpcResult<Vec<BatchEntry>> {
        let entries = calls
            .iter()
            .enumerate()
            .map(|(i, call)| {
                if Some(i) == self.failing_entry {
                    Err(RpcErrorObject {
                        code: -32000,
                        message: "execution reverted".to_string(),
                        data: None,
                    })
                } else if call.method == "eth_call" {
                    Ok(json!(self.call_result))
                } else {
                    Ok(json!("0x1"))
                }
            })
            .collect();
        self.batches.lock().unwrap().push(calls);
        Ok(entries)
    }
}
