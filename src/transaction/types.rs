//! Transaction kinds, signature values and error definitions.

use alloy::primitives::U256;
use thiserror::Error;

use crate::keystore::KeystoreError;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric discriminant of the transaction variant. The set is open:
/// unknown values are carried and encoded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxType(pub u64);

impl TxType {
    /// Plain value transfer or contract interaction.
    pub const NORMAL: TxType = TxType(1);
    /// Privacy-preserving transfer.
    pub const PRIVACY: TxType = TxType(6);
    /// Proof-of-stake operation.
    pub const POS: TxType = TxType(7);

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match *self {
            Self::NORMAL => "normal",
            Self::PRIVACY => "privacy",
            Self::POS => "pos",
            _ => "other",
        }
    }
}

impl Default for TxType {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// The `(r, s, v)` triple carried by a signed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureValues {
    pub r: U256,
    pub s: U256,
    pub v: U256,
}

/// Errors that can occur while encoding or signing transactions.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The key custodian refused or failed to sign.
    #[error(transparent)]
    Custody(#[from] KeystoreError),

    /// The signing primitive returned a malformed signature.
    #[error("invalid signature length: got {got} bytes, want 65")]
    InvalidSignatureLength { got: usize },

    /// A signed-only operation was attempted on an unsigned draft.
    #[error("transaction is not signed")]
    Unsigned,

    /// `v` does not belong to the chain id it was checked against.
    #[error("invalid recovery value {v} for chain id {chain_id}")]
    InvalidRecoveryValue { v: U256, chain_id: u64 },

    /// The sender could not be recovered from the signature.
    #[error("sender recovery failed: {0}")]
    Recovery(String),

    /// Bytes are not a well-formed signed transaction.
    #[error("malformed transaction encoding: {0}")]
    Decode(#[from] alloy::rlp::Error),
}

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
