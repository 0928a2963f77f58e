//! JSON-RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Connect to a primary endpoint plus optional failovers
//! - Query chain state (nonce, gas price, balance, block number, chain id)
//! - Submit raw transactions and batches to the primary endpoint only
//! - Report every request to metrics
//!
//! Read queries fail over to the next endpoint on transport errors and
//! timeouts. A JSON-RPC error response is an answer, not an outage, and is
//! returned as-is. Submissions never fail over, so a transaction is never
//! sent twice behind the caller's back.

use std::time::{Duration, Instant};

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, B256, U256, U64};
use alloy::rpc::client::{ClientBuilder, RpcClient, Waiter};
use alloy::rpc::json_rpc::RpcRecv;
use futures_util::future::join_all;
use serde_json::{json, Value};
use tokio::time::timeout;

use crate::config::ChainConfig;
use crate::observability::metrics;
use crate::rpc::batch::{BatchEntry, RpcCall};
use crate::rpc::state::ChainState;
use crate::rpc::types::{CallRequest, RpcError, RpcErrorObject, RpcResult};
use crate::transaction::ChainId;

/// JSON-RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// Primary endpoint first, then failovers.
    clients: Vec<RpcClient>,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a client for `config`.
    ///
    /// When `verify_chain_id` is set the endpoint's chain id is checked. A
    /// mismatch is an error; an unreachable endpoint is only logged so the
    /// client can start before the node does.
    pub async fn new(config: ChainConfig) -> RpcResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut clients = Vec::with_capacity(1 + config.failover_urls.len());

        // 1. Primary endpoint
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e: url::ParseError| RpcError::InvalidUrl {
            url: config.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        clients.push(ClientBuilder::default().http(primary_url));

        // 2. Failover endpoints
        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => clients.push(ClientBuilder::default().http(url)),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let client = Self {
            clients,
            config,
            timeout_duration,
        };

        if client.config.verify_chain_id {
            match client.verify_chain_id().await {
                Ok(()) => {}
                Err(e @ RpcError::ChainMismatch { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "Chain client initialized but chain verification failed");
                }
            }
        }

        tracing::info!(
            rpc_url = %client.config.rpc_url,
            failovers = client.clients.len() - 1,
            chain_id = client.config.chain_id,
            "Chain client initialized"
        );
        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> RpcResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(RpcError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    pub async fn get_chain_id(&self) -> RpcResult<ChainId> {
        let id: U64 = self.read("eth_chainId", json!([])).await?;
        Ok(ChainId(id.to()))
    }

    pub async fn get_block_number(&self) -> RpcResult<u64> {
        let number: U64 = self.read("eth_blockNumber", json!([])).await?;
        Ok(number.to())
    }

    pub async fn get_balance(&self, address: Address, block: BlockNumberOrTag) -> RpcResult<U256> {
        self.read("eth_getBalance", json!([address, block])).await
    }

    /// Nonce of `address` at `block`.
    pub async fn get_transaction_count(&self, address: Address, block: BlockNumberOrTag) -> RpcResult<u64> {
        let count: U64 = self
            .read("eth_getTransactionCount", json!([address, block]))
            .await?;
        Ok(count.to())
    }

    /// Current gas price in wei.
    pub async fn get_gas_price(&self) -> RpcResult<U256> {
        self.read("eth_gasPrice", json!([])).await
    }

    /// Simulate a call. Execution errors come back as `RpcError::Response`.
    pub async fn call(&self, request: &CallRequest, block: BlockNumberOrTag) -> RpcResult<Bytes> {
        self.read("eth_call", json!([request, block])).await
    }

    /// Submit signed bytes to the primary endpoint.
    pub async fn send_raw_transaction(&self, raw: &Bytes) -> RpcResult<B256> {
        let hash: B256 = self
            .request_once(&self.clients[0], "eth_sendRawTransaction", json!([raw]))
            .await?;
        tracing::info!(tx_hash = %hash, "Transaction submitted");
        Ok(hash)
    }

    /// Send `calls` as one batch to the primary endpoint.
    ///
    /// A transport failure fails the whole batch. Per-entry error objects
    /// land in their own slot without affecting the others.
    pub async fn batch_send(&self, calls: &[RpcCall]) -> RpcResult<Vec<BatchEntry>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        metrics::record_batch(calls.len());

        let mut batch = self.clients[0].new_batch();
        let mut waiters: Vec<Waiter<Value>> = Vec::with_capacity(calls.len());
        for call in calls {
            waiters.push(batch.add_call(call.method.clone(), &call.params)?);
        }

        let started = Instant::now();
        let sent = match timeout(self.timeout_duration, batch.send()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RpcError::Transport(e.to_string())),
            Err(_) => Err(RpcError::Timeout(self.config.rpc_timeout_secs)),
        };
        metrics::record_rpc_request("batch", sent.is_ok(), started.elapsed());
        sent?;

        let entries = join_all(waiters)
            .await
            .into_iter()
            .map(|result| result.map_err(|e| RpcErrorObject::from_transport(&e)))
            .collect();
        Ok(entries)
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.get_block_number().await.is_ok()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Read query with failover across endpoints.
    async fn read<R: RpcRecv>(&self, method: &'static str, params: Value) -> RpcResult<R> {
        let mut last_error = None;
        for (i, client) in self.clients.iter().enumerate() {
            match self.request_once(client, method, params.clone()).await {
                Ok(result) => return Ok(result),
                Err(e @ RpcError::Response(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC failed, trying next provider");
                    last_error = Some(e);
                }
            }
        }
        Err(RpcError::AllProvidersFailed(
            last_error.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }

    async fn request_once<R: RpcRecv>(&self, client: &RpcClient, method: &'static str, params: Value) -> RpcResult<R> {
        let started = Instant::now();
        let result = match timeout(self.timeout_duration, client.request::<Value, R>(method, params)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(RpcError::from(e)),
            Err(_) => Err(RpcError::Timeout(self.config.rpc_timeout_secs)),
        };
        metrics::record_rpc_request(method, result.is_ok(), started.elapsed());
        result
    }
}

impl ChainState for ChainClient {
    async fn get_transaction_count(&self, address: Address, block: BlockNumberOrTag) -> RpcResult<u64> {
        ChainClient::get_transaction_count(self, address, block).await
    }

    async fn get_gas_price(&self) -> RpcResult<U256> {
        ChainClient::get_gas_price(self).await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> RpcResult<B256> {
        ChainClient::send_raw_transaction(self, &raw).await
    }

    async fn call(&self, request: CallRequest, block: BlockNumberOrTag) -> RpcResult<Bytes> {
        ChainClient::call(self, &request, block).await
    }

    async fn batch_send(&self, calls: Vec<RpcCall>) -> RpcResult<Vec<BatchEntry>> {
        ChainClient::batch_send(self, &calls).await
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
