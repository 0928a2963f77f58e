//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → TxManager::connect wires keystore, registry, RPC client, gas policy
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the contract registry reloads
//!   (see `contract::watcher`)
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::ChainConfig;
pub use schema::ContractsConfig;
pub use schema::GasConfig;
pub use schema::GasPolicyKind;
pub use schema::KeystoreConfig;
pub use schema::ObservabilityConfig;
