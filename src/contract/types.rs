//! Contract registry types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading contracts or encoding calls.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No descriptor is registered under this name (or it failed to load).
    #[error("contract {0} does not exist")]
    ContractNotFound(String),

    /// The contract's interface has no function with this name.
    #[error("function {function} not found in contract {contract}")]
    FunctionNotFound { contract: String, function: String },

    /// Arguments do not match the function's inputs.
    #[error("ABI encoding failed: {0}")]
    AbiEncode(String),

    /// Return data does not match the function's outputs.
    #[error("ABI decoding failed: {0}")]
    AbiDecode(String),

    /// A call returned no data to decode.
    #[error("empty response")]
    EmptyResponse,

    /// One registry entry could not be loaded.
    #[error("failed to load contract {name}: {reason}")]
    RegistryLoad { name: String, reason: String },

    /// The registry index or a description file could not be read or written.
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The registry index is not valid JSON.
    #[error("registry index is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// One entry of the registry index: `name → {address, fileName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractEntry {
    pub address: String,
    /// Interface description file, relative to the index file.
    pub file_name: String,
}

/// An index entry that was skipped during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// Outcome of a best-effort registry load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Names now registered, sorted.
    pub loaded: Vec<String>,
    /// Entries that failed and were dropped from the registry.
    pub skipped: Vec<SkippedEntry>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_uses_camel_case() {
        let entry: ContractEntry =
            serde_json::from_str(r#"{"address":"0x01","fileName":"token.json"}"#).unwrap();
        assert_eq!(entry.file_name, "token.json");

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"fileName\""));
    }

    #[test]
    fn test_error_display() {
        let err = RegistryError::ContractNotFound("token".to_string());
        assert_eq!(err.to_string(), "contract token does not exist");

        let err = RegistryError::RegistryLoad {
            name: "vault".to_string(),
            reason: "missing file".to_string(),
        };
        assert!(err.to_string().contains("vault"));
    }
}
