//! Batched submission helpers.
//!
//! Each `add_*` appends one entry and returns its position; results from
//! [`TxManager::send_batch`] are read back by that position.

use alloy::dyn_abi::DynSolValue;
use alloy::eips::BlockNumberOrTag;
use alloy::hex;
use alloy::primitives::{Address, Bytes, U256};
use serde_json::{json, Value};

use crate::contract::RegistryError;
use crate::manager::tx_manager::TxManager;
use crate::manager::types::{ContractCall, ManagerError, ManagerResult};
use crate::rpc::{BatchEntry, BatchRequest, ChainState, RpcError};

impl<C: ChainState> TxManager<C> {
    pub fn new_batch(&self) -> BatchRequest {
        BatchRequest::new()
    }

    pub fn add_get_block_number(&self, batch: &mut BatchRequest) -> usize {
        batch.add_request("eth_blockNumber", json!([]))
    }

    pub fn add_get_balance(&self, batch: &mut BatchRequest, address: Address, block: BlockNumberOrTag) -> usize {
        batch.add_request("eth_getBalance", json!([address, block]))
    }

    pub fn add_get_transaction_count(
        &self,
        batch: &mut BatchRequest,
        address: Address,
        block: BlockNumberOrTag,
    ) -> usize {
        batch.add_request("eth_getTransactionCount", json!([address, block]))
    }

    /// Queue a read-only `eth_call` of `call`.
    pub fn add_contract_call(
        &self,
        batch: &mut BatchRequest,
        from: Address,
        call: &ContractCall,
        block: BlockNumberOrTag,
    ) -> ManagerResult<usize> {
        let request = self.call_request(from, call)?;
        Ok(batch.add_request("eth_call", json!([request, block])))
    }

    /// Queue submission of already-signed bytes.
    pub fn add_raw_transaction(&self, batch: &mut BatchRequest, raw: &Bytes) -> usize {
        batch.add_request("eth_sendRawTransaction", json!([raw]))
    }

    /// Sign a contract transaction with an explicit nonce and queue it.
    ///
    /// Nothing is appended if packing or signing fails.
    pub async fn add_contract_raw_transaction(
        &self,
        batch: &mut BatchRequest,
        from: Address,
        call: &ContractCall,
        value: U256,
        gas_limit: u64,
        nonce: u64,
    ) -> ManagerResult<usize> {
        let raw = self
            .signed_contract_transaction(from, call, value, gas_limit, nonce)
            .await?;
        Ok(self.add_raw_transaction(batch, &raw))
    }

    /// Send `batch` in one round trip. Result `i` answers entry `i`.
    pub async fn send_batch(&self, batch: BatchRequest) -> ManagerResult<Vec<BatchEntry>> {
        let size = batch.len();
        let entries = self.chain().batch_send(batch.into_calls()).await?;
        if entries.len() != size {
            return Err(RpcError::InvalidResponse {
                method: "batch".to_string(),
                reason: format!("{} results for {} requests", entries.len(), size),
            }
            .into());
        }

        let failed = entries.iter().filter(|entry| entry.is_err()).count();
        tracing::debug!(size, failed, "Batch sent");
        Ok(entries)
    }

    /// Decode the result of a queued contract call.
    pub fn unpack_result(
        &self,
        entry: &BatchEntry,
        contract: &str,
        function: &str,
    ) -> ManagerResult<Vec<DynSolValue>> {
        let data = match entry {
            Err(error) => return Err(RpcError::Response(error.clone()).into()),
            Ok(Value::Null) => return Err(RegistryError::EmptyResponse.into()),
            Ok(Value::String(encoded)) => hex::decode(encoded).map_err(|e| invalid_call_result(e.to_string()))?,
            Ok(other) => return Err(invalid_call_result(format!("expected hex string, got {}", other))),
        };

        Ok(self.registry().unpack(contract, function, &data)?)
    }
}

fn invalid_call_result(reason: String) -> ManagerError {
    RpcError::InvalidResponse {
        method: "eth_call".to_string(),
        reason,
    }
    .into()
}
