//! Transaction encoding and signing subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction draft
//!     → codec.rs (signing RLP [.., chainId, 0, 0] → keccak256)
//!     → KeyCustody::sign_digest (65-byte raw signature)
//!     → signature.rs (r, s, chain-id bound v)
//!     → codec.rs (wire RLP [.., v, r, s])
//! ```
//!
//! # Invariants
//! - An unsigned draft is never encoded for the wire
//! - A malformed raw signature aborts signing; nothing is emitted

pub mod codec;
pub mod signature;
pub mod signer;
pub mod types;

pub use codec::Transaction;
pub use signature::derive_signature_values;
pub use signer::{sign_transaction, RawTxParams, TxSigner};
pub use types::{ChainId, SignatureValues, TransactionError, TransactionResult, TxType};
