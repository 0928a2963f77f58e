//! Binds key custody to the transaction codec.
//!
//! Signing never mutates the caller's draft: a signed copy is returned, so a
//! corrected draft can always be re-signed.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};

use crate::keystore::KeyCustody;
use crate::observability::metrics;
use crate::transaction::codec::Transaction;
use crate::transaction::signature::derive_signature_values;
use crate::transaction::types::{ChainId, TransactionResult};

/// Sign `tx` for `chain_id` with the key of `from`, returning a signed copy.
///
/// Custody errors (`Locked`, `KeyNotFound`, `AddressMismatch`, ...) are
/// returned unchanged.
pub fn sign_transaction(
    custody: &dyn KeyCustody,
    tx: &Transaction,
    chain_id: u64,
    from: Address,
) -> TransactionResult<Transaction> {
    let digest = tx.unsigned_hash(chain_id);
    let raw = custody.sign_digest(digest.as_slice(), from)?;
    let values = derive_signature_values(&raw, chain_id)?;

    metrics::record_transaction_signed(tx.kind.label());
    tracing::debug!(
        from = %from,
        nonce = tx.nonce,
        kind = tx.kind.label(),
        chain_id = chain_id,
        "Transaction signed"
    );

    Ok(tx.with_signature(values))
}

/// Field set of a transaction to build and sign in one step.
#[derive(Debug, Clone, Default)]
pub struct RawTxParams {
    pub nonce: u64,
    /// `None` deploys `input` as init code.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub input: Bytes,
}

/// Signs drafts for one chain through a key custodian.
#[derive(Clone)]
pub struct TxSigner {
    custody: Arc<dyn KeyCustody>,
    chain_id: ChainId,
}

impl TxSigner {
    pub fn new(custody: Arc<dyn KeyCustody>, chain_id: impl Into<ChainId>) -> Self {
        Self {
            custody,
            chain_id: chain_id.into(),
        }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// The custodian backing this signer.
    pub fn custody(&self) -> &Arc<dyn KeyCustody> {
        &self.custody
    }

    /// Sign `tx` and return a signed copy.
    pub fn sign_transaction(&self, tx: &Transaction, from: Address) -> TransactionResult<Transaction> {
        sign_transaction(self.custody.as_ref(), tx, self.chain_id.0, from)
    }

    /// Sign `tx` and return its wire encoding.
    pub fn sign(&self, tx: &Transaction, from: Address) -> TransactionResult<Bytes> {
        self.sign_transaction(tx, from)?.encode_signed()
    }

    /// Build a draft from `params` and sign it. A missing recipient builds a
    /// contract creation.
    pub fn create_raw_transaction(&self, from: Address, params: RawTxParams) -> TransactionResult<Bytes> {
        let tx = match params.to {
            Some(to) => Transaction::new_transfer(
                params.nonce,
                to,
                params.value,
                params.gas_limit,
                params.gas_price,
                params.input,
            ),
            None => Transaction::new_contract_creation(
                params.nonce,
                params.value,
                params.gas_limit,
                params.gas_price,
                params.input,
            ),
        };
        self.sign(&tx, from)
    }
}

impl std::fmt::Debug for TxSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSigner")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
