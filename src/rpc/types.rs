//! JSON-RPC message types and error definitions.

use alloy::primitives::{Address, Bytes, U256, U64};
use alloy::transports::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error object returned by a node, either for a single call or for one
/// entry of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObject {
    /// The node's error payload, or a synthetic internal error (-32603) for
    /// failures that never reached the node.
    pub fn from_transport(err: &TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self {
                code: payload.code,
                message: payload.message.to_string(),
                data: payload
                    .data
                    .as_ref()
                    .and_then(|raw| serde_json::from_str(raw.get()).ok()),
            },
            None => Self {
                code: -32603,
                message: err.to_string(),
                data: None,
            },
        }
    }
}

impl std::fmt::Display for RpcErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The node answered with a JSON-RPC error.
    #[error("RPC error response: {0}")]
    Response(RpcErrorObject),

    /// Connection, HTTP or serialization failure.
    #[error("RPC error: {0}")]
    Transport(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Every configured endpoint failed.
    #[error("All RPC providers failed: {0}")]
    AllProvidersFailed(String),

    /// An endpoint URL could not be parsed.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The node's result did not have the expected shape.
    #[error("Unexpected result for {method}: {reason}")]
    InvalidResponse { method: String, reason: String },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        if err.as_error_resp().is_some() {
            Self::Response(RpcErrorObject::from_transport(&err))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Message for `eth_call`.
///
/// `to` is always sent (as `null` for creation simulations); the optional
/// fields are omitted when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub from: Address,
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}
