//! Transaction manager subsystem.
//!
//! # Data Flow
//! ```text
//! caller (from, contract call | transfer | deployment)
//!     → ChainState (nonce at latest block, gas price per policy)
//!     → ContractRegistry (pack / deploy)
//!     → TxSigner (draft → signed bytes)
//!     → ChainState::send_raw_transaction  or  BatchRequest → send_batch
//! ```
//!
//! Read-only calls (`send_contract_call`, `add_contract_call`) never reach
//! the signer or the key custodian.

pub mod batch;
pub mod gas;
pub mod tx_manager;
pub mod types;

pub use gas::GasPricePolicy;
pub use tx_manager::{TxManager, DEFAULT_CALL_GAS_LIMIT};
pub use types::{ContractCall, ManagerError, ManagerResult};
