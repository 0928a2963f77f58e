//! Ordered JSON-RPC batches.

use serde_json::Value;

use crate::rpc::types::RpcErrorObject;

/// One `(method, params)` entry of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcCall {
    pub method: String,
    pub params: Value,
}

/// Result of one batch entry: the node's `result`, or its error object.
pub type BatchEntry = Result<Value, RpcErrorObject>;

/// Append-only list of calls sent as one round trip.
///
/// Entries have no identity beyond their position: result `i` of a send
/// answers call `i`. Sending consumes the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    calls: Vec<RpcCall>,
}

impl BatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call; returns its position.
    pub fn add_request(&mut self, method: impl Into<String>, params: Value) -> usize {
        self.calls.push(RpcCall {
            method: method.into(),
            params,
        });
        self.calls.len() - 1
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn calls(&self) -> &[RpcCall] {
        &self.calls
    }

    pub fn into_calls(self) -> Vec<RpcCall> {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positions_follow_insertion() {
        let mut batch = BatchRequest::new();
        assert!(batch.is_empty());

        assert_eq!(batch.add_request("eth_blockNumber", json!([])), 0);
        assert_eq!(batch.add_request("eth_gasPrice", json!([])), 1);

        let methods: Vec<_> = batch.calls().iter().map(|c| c.method.as_str()).collect();
        assert_eq!(methods, vec!["eth_blockNumber", "eth_gasPrice"]);
        assert_eq!(batch.into_calls().len(), 2);
    }
}
