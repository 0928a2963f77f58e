//! Chain-id bound signature values.
//!
//! | chain id | v                        |
//! |----------|--------------------------|
//! | 0        | recovery id + 27         |
//! | c > 0    | recovery id + 35 + 2 * c |

use alloy::primitives::U256;

use crate::keystore::unlock::RAW_SIGNATURE_LEN;
use crate::transaction::types::{SignatureValues, TransactionError, TransactionResult};

/// Split a raw `[R || S || recovery id]` signature and bind it to `chain_id`.
///
/// Anything other than exactly 65 bytes aborts signing.
pub fn derive_signature_values(raw: &[u8], chain_id: u64) -> TransactionResult<SignatureValues> {
    if raw.len() != RAW_SIGNATURE_LEN {
        return Err(TransactionError::InvalidSignatureLength { got: raw.len() });
    }

    Ok(SignatureValues {
        r: U256::from_be_slice(&raw[..32]),
        s: U256::from_be_slice(&raw[32..64]),
        v: recovery_value(raw[64], chain_id),
    })
}

/// `v` for a base recovery id under `chain_id`.
pub fn recovery_value(recovery_id: u8, chain_id: u64) -> U256 {
    let id = U256::from(recovery_id);
    if chain_id == 0 {
        id + U256::from(27)
    } else {
        // U256 so that 2 * chain_id cannot overflow.
        id + U256::from(35) + U256::from(chain_id) * U256::from(2)
    }
}

/// Inverse of [`recovery_value`]: the y-parity encoded in `v`.
pub fn recovery_parity(v: U256, chain_id: u64) -> TransactionResult<bool> {
    let base = if chain_id == 0 {
        U256::from(27)
    } else {
        U256::from(35) + U256::from(chain_id) * U256::from(2)
    };

    match v.checked_sub(base) {
        Some(id) if id == U256::ZERO => Ok(false),
        Some(id) if id == U256::from(1) => Ok(true),
        _ => Err(TransactionError::InvalidRecoveryValue { v, chain_id }),
    }
}
