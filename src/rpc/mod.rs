//! Chain RPC subsystem.
//!
//! # Data Flow
//! ```text
//! TxManager
//!     → state.rs (ChainState capability)
//!     → client.rs (alloy JSON-RPC client, timeouts, read failover)
//!     → batch.rs (ordered calls → positional results)
//! ```
//!
//! # Constraints
//! - All RPC calls have configurable timeouts
//! - No internal retries of submissions

pub mod batch;
pub mod client;
pub mod state;
pub mod types;

pub use batch::{BatchEntry, BatchRequest, RpcCall};
pub use client::ChainClient;
pub use state::ChainState;
pub use types::{CallRequest, RpcError, RpcErrorObject, RpcResult};
