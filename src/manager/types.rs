//! Transaction manager types and error definitions.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::Address;
use thiserror::Error;

use crate::contract::RegistryError;
use crate::keystore::KeystoreError;
use crate::rpc::RpcError;
use crate::transaction::TransactionError;

/// Errors surfaced by the transaction manager.
///
/// Lower-level errors are wrapped transparently so custody, ABI and node
/// errors reach the caller unchanged.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// The manager could not be wired from configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// A contract function together with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    pub contract: String,
    pub function: String,
    pub args: Vec<DynSolValue>,
    /// Call this address instead of the one registered for `contract`.
    pub to: Option<Address>,
}

impl ContractCall {
    pub fn new(contract: impl Into<String>, function: impl Into<String>, args: Vec<DynSolValue>) -> Self {
        Self {
            contract: contract.into(),
            function: function.into(),
            args,
            to: None,
        }
    }

    /// Target `address` instead of the registered one.
    pub fn at(mut self, address: Address) -> Self {
        self.to = Some(address);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManagerError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert!(err.to_string().contains("600"));

        let err = ManagerError::from(RegistryError::ContractNotFound("token".to_string()));
        assert_eq!(err.to_string(), "contract token does not exist");
    }

    #[test]
    fn test_call_target_override() {
        let call = ContractCall::new("token", "balanceOf", vec![]);
        assert_eq!(call.to, None);
        assert_eq!(call.at(Address::ZERO).to, Some(Address::ZERO));
    }
}
