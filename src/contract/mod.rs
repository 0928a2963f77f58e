//! Contract registry subsystem.
//!
//! # Data Flow
//! ```text
//! contracts.json (name → address, fileName)
//!     → registry.rs (best-effort load, LoadReport)
//!     → descriptor.rs (JSON ABI per contract)
//!     → pack / unpack / deploy (dyn-abi encoding)
//! ```
//!
//! watcher.rs reloads the registry when the index file changes.

pub mod descriptor;
pub mod registry;
pub mod types;
pub mod watcher;

pub use descriptor::Contract;
pub use registry::ContractRegistry;
pub use types::{ContractEntry, LoadReport, RegistryError, RegistryResult, SkippedEntry};
pub use watcher::RegistryWatcher;
