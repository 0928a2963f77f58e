//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the transaction client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Encrypted key storage settings.
    pub keystore: KeystoreConfig,

    /// Chain endpoint and identity.
    pub chain: ChainConfig,

    /// Gas price policy.
    pub gas: GasConfig,

    /// Contract registry index.
    pub contracts: ContractsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Key storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Directory holding encrypted key files.
    pub dir: String,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            dir: "./keystore".to_string(),
        }
    }
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs (read queries only).
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID bound into every signature (0 disables replay protection).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Check the endpoint's chain ID against `chain_id` on connect.
    pub verify_chain_id: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            verify_chain_id: true,
        }
    }
}

/// How the gas price of outgoing transactions is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GasPolicyKind {
    /// Always use `fixed_price_gwei`.
    Fixed,
    /// Query the node and add a capped bump.
    Network,
}

/// Gas price configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasConfig {
    pub policy: GasPolicyKind,

    /// Price used by the fixed policy, in gwei.
    pub fixed_price_gwei: u64,

    /// Upper bound of the bump added to the node's price, in gwei.
    pub bump_cap_gwei: u64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_price_gwei: u64,

    /// Gas limit attached to read-only `eth_call` simulations.
    pub call_gas_limit: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            policy: GasPolicyKind::Fixed,
            fixed_price_gwei: 20,
            bump_cap_gwei: 50,
            max_price_gwei: 500,
            call_gas_limit: 6_750_000,
        }
    }
}

/// Contract registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Path to the JSON index mapping contract name to address and ABI file.
    pub index_path: Option<String>,

    /// Reload the registry when the index file changes.
    pub watch: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Enable Prometheus metrics export.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "txmanager=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}
