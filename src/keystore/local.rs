//! Encrypted key files on disk.
//!
//! # Layout
//! One Web3 Secret Storage (v3) JSON file per account, named
//! `UTC--<unix seconds>--<hex address>`. Files written by other tools are
//! found either by that naming convention or by an `address` field in the
//! JSON body.
//!
//! # Security
//! - Files are encrypted under [`derive_passphrase`], not the literal passphrase
//! - A decrypted key must belong to the requested address (no swap attacks)
//! - Decryption runs scrypt; call from `spawn_blocking` inside async code

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use alloy::hex;
use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;

use crate::keystore::custody::KeyCustody;
use crate::keystore::passphrase::derive_passphrase;
use crate::keystore::types::{KeystoreError, KeystoreResult};
use crate::keystore::unlock::UnlockTable;
use crate::observability::metrics;

/// Directory-backed key store with time-bounded unlocking.
pub struct FileKeystore {
    dir: PathBuf,
    unlocked: UnlockTable,
}

impl FileKeystore {
    /// Open (creating if needed) the key directory at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> KeystoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "Keystore opened");
        Ok(Self {
            dir,
            unlocked: UnlockTable::new(),
        })
    }

    /// The directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Addresses of every recognisable key file, sorted.
    pub fn accounts(&self) -> KeystoreResult<Vec<Address>> {
        let mut accounts: Vec<Address> = self
            .key_files()?
            .iter()
            .filter_map(|path| key_file_address(path))
            .collect();
        accounts.sort();
        accounts.dedup();
        Ok(accounts)
    }

    /// Locate the key file for `address`.
    pub fn find(&self, address: Address) -> KeystoreResult<PathBuf> {
        self.key_files()?
            .into_iter()
            .find(|path| key_file_address(path) == Some(address))
            .ok_or(KeystoreError::KeyNotFound(address))
    }

    /// Whether `address` currently holds a valid unlock grant.
    pub fn is_unlocked(&self, address: &Address) -> bool {
        self.unlocked.is_unlocked(address)
    }

    fn key_files(&self) -> KeystoreResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            // Editors and tools leave hidden or temporary files behind.
            if name.to_string_lossy().starts_with('.') || name.to_string_lossy().ends_with('~') {
                continue;
            }
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Decrypt the key of `address` and check that it really is that account.
    fn decrypt(&self, address: Address, passphrase: &str) -> KeystoreResult<PrivateKeySigner> {
        let path = self.find(address)?;
        let derived = derive_passphrase(passphrase);
        let signer = PrivateKeySigner::decrypt_keystore(&path, &derived)
            .map_err(|e| KeystoreError::DecryptionFailed(e.to_string()))?;

        if signer.address() != address {
            tracing::warn!(
                file = %path.display(),
                have = %signer.address(),
                want = %address,
                "Key file content does not match its account"
            );
            return Err(KeystoreError::AddressMismatch {
                have: signer.address(),
                want: address,
            });
        }
        Ok(signer)
    }
}

impl KeyCustody for FileKeystore {
    fn timed_unlock(&self, address: Address, passphrase: &str, duration: Duration) -> KeystoreResult<()> {
        match self.decrypt(address, passphrase) {
            Ok(signer) => {
                self.unlocked.grant(signer, duration);
                metrics::record_unlock("ok");
                tracing::info!(
                    account = %address,
                    duration_ms = duration.as_millis() as u64,
                    "Account unlocked"
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_unlock("error");
                tracing::warn!(account = %address, error = %e, "Unlock failed");
                Err(e)
            }
        }
    }

    fn lock(&self, address: Address) -> KeystoreResult<()> {
        if self.unlocked.revoke(&address) {
            tracing::info!(account = %address, "Account locked");
        }
        Ok(())
    }

    fn sign_digest(&self, digest: &[u8], address: Address) -> KeystoreResult<Vec<u8>> {
        if digest.len() != 32 {
            return Err(KeystoreError::InvalidDigestLength(digest.len()));
        }
        self.unlocked.sign(address, &B256::from_slice(digest))
    }

    fn create_account(&self, passphrase: &str) -> KeystoreResult<Address> {
        let derived = derive_passphrase(passphrase);
        let signer = PrivateKeySigner::random();
        let address = signer.address();

        let created = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let name = format!("UTC--{}--{}", created, hex::encode(address));

        PrivateKeySigner::encrypt_keystore(
            &self.dir,
            &mut rand::thread_rng(),
            signer.to_bytes(),
            &derived,
            Some(name.as_str()),
        )
        .map_err(|e| KeystoreError::Storage(std::io::Error::other(e.to_string())))?;

        tracing::info!(account = %address, file = %name, "Account created");
        Ok(address)
    }
}

impl std::fmt::Debug for FileKeystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKeystore")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct KeyFileHeader {
    address: Option<String>,
}

/// Address a key file belongs to, from its name or its JSON body.
fn key_file_address(path: &Path) -> Option<Address> {
    let name = path.file_name()?.to_str()?;
    if let Some((_, suffix)) = name.rsplit_once("--") {
        if let Ok(address) = suffix.trim_end_matches(".json").parse::<Address>() {
            return Some(address);
        }
    }

    let content = fs::read_to_string(path).ok()?;
    let header: KeyFileHeader = serde_json::from_str(&content).ok()?;
    header.address?.parse().ok()
}
