//! The chain-state capability the transaction manager depends on.

use std::future::Future;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, B256, U256};

use crate::rpc::batch::{BatchEntry, RpcCall};
use crate::rpc::types::{CallRequest, RpcResult};

/// Queries and submissions against a node.
///
/// [`ChainClient`](crate::rpc::ChainClient) is the production
/// implementation; tests substitute in-memory doubles.
pub trait ChainState: Send + Sync {
    fn get_transaction_count(
        &self,
        address: Address,
        block: BlockNumberOrTag,
    ) -> impl Future<Output = RpcResult<u64>> + Send;

    fn get_gas_price(&self) -> impl Future<Output = RpcResult<U256>> + Send;

    /// Submit signed bytes; returns the transaction hash reported by the node.
    fn send_raw_transaction(&self, raw: Bytes) -> impl Future<Output = RpcResult<B256>> + Send;

    /// Simulate a call and return its raw result.
    fn call(
        &self,
        request: CallRequest,
        block: BlockNumberOrTag,
    ) -> impl Future<Output = RpcResult<Bytes>> + Send;

    /// Send calls as one batch; results are positional.
    fn batch_send(&self, calls: Vec<RpcCall>) -> impl Future<Output = RpcResult<Vec<BatchEntry>>> + Send;
}
