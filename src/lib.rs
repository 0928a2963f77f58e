//! Transaction construction, signing and submission for account-based chains.

pub mod config;
pub mod contract;
pub mod keystore;
pub mod manager;
pub mod observability;
pub mod rpc;
pub mod transaction;

pub use config::schema::ClientConfig;
pub use contract::{Contract, ContractRegistry};
pub use keystore::{FileKeystore, KeyCustody, StaticKeyring};
pub use manager::{ContractCall, TxManager};
pub use rpc::{BatchRequest, ChainClient, ChainState};
pub use transaction::{Transaction, TxSigner};
