//! Time-bounded unlock grants.
//!
//! Grants are `address → (signer, expiry)` entries checked lazily at signing
//! time; there is no eviction thread. An expired grant is removed by the
//! first signing attempt that observes it.

use std::time::{Duration, Instant};

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::keystore::types::{KeystoreError, KeystoreResult};

/// Length of a raw `[R || S || recovery id]` signature.
pub const RAW_SIGNATURE_LEN: usize = 65;

struct Grant {
    signer: PrivateKeySigner,
    /// `None` means unlocked until locked explicitly or dropped.
    expires_at: Option<Instant>,
}

impl Grant {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Process-wide table of unlocked keys.
#[derive(Default)]
pub struct UnlockTable {
    grants: DashMap<Address, Grant>,
}

impl UnlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant signing rights for `duration`; `Duration::ZERO` means indefinitely.
    ///
    /// A finite grant never shortens an existing indefinite one.
    pub fn grant(&self, signer: PrivateKeySigner, duration: Duration) {
        let address = signer.address();
        let expires_at = if duration.is_zero() {
            None
        } else {
            Some(Instant::now() + duration)
        };

        match self.grants.entry(address) {
            Entry::Occupied(mut entry) => {
                if entry.get().expires_at.is_none() && expires_at.is_some() {
                    tracing::debug!(account = %address, "Account already unlocked indefinitely");
                    return;
                }
                entry.insert(Grant { signer, expires_at });
            }
            Entry::Vacant(entry) => {
                entry.insert(Grant { signer, expires_at });
            }
        }
    }

    /// Drop the grant for `address`. Returns whether one existed.
    pub fn revoke(&self, address: &Address) -> bool {
        self.grants.remove(address).is_some()
    }

    /// Whether `address` currently holds a valid grant.
    pub fn is_unlocked(&self, address: &Address) -> bool {
        self.grants
            .get(address)
            .is_some_and(|grant| !grant.is_expired(Instant::now()))
    }

    /// Sign a 32-byte digest with the unlocked key of `address`.
    ///
    /// Returns `[R(32) || S(32) || recovery id(1)]` with a recovery id of 0 or 1.
    pub fn sign(&self, address: Address, digest: &B256) -> KeystoreResult<Vec<u8>> {
        let now = Instant::now();
        match self.grants.get(&address) {
            Some(grant) if !grant.is_expired(now) => {
                let signature = grant
                    .signer
                    .sign_hash_sync(digest)
                    .map_err(|e| KeystoreError::Signing(e.to_string()))?;

                let mut raw = Vec::with_capacity(RAW_SIGNATURE_LEN);
                raw.extend_from_slice(&signature.r().to_be_bytes::<32>());
                raw.extend_from_slice(&signature.s().to_be_bytes::<32>());
                raw.push(signature.v() as u8);
                return Ok(raw);
            }
            Some(_) => {}
            None => return Err(KeystoreError::Locked(address)),
        }

        if self.grants.remove_if(&address, |_, grant| grant.is_expired(now)).is_some() {
            tracing::info!(account = %address, "Unlock expired");
        }
        Err(KeystoreError::Locked(address))
    }
}
