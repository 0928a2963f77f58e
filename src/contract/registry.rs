//! Name → contract registry backed by a JSON index file.
//!
//! # Index format
//! ```json
//! { "token": { "address": "0x…", "fileName": "token.json" } }
//! ```
//! Description files are resolved relative to the index file.
//!
//! # Concurrency
//! Readers (`pack`, `unpack`, `deploy`) take a lock-free snapshot of the
//! map. Writers (`load`, `save`, `register`) are serialized by a mutex and
//! publish a new map atomically.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, Bytes};
use arc_swap::ArcSwap;

use crate::contract::descriptor::Contract;
use crate::contract::types::{
    ContractEntry, LoadReport, RegistryError, RegistryResult, SkippedEntry,
};
use crate::observability::metrics;

type ContractMap = HashMap<String, Arc<Contract>>;

/// Process-wide store of contract descriptors.
#[derive(Default)]
pub struct ContractRegistry {
    contracts: ArcSwap<ContractMap>,
    writer: Mutex<()>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry and load `index_path` into it.
    pub fn from_index(index_path: impl AsRef<Path>) -> RegistryResult<(Self, LoadReport)> {
        let registry = Self::new();
        let report = registry.load(index_path)?;
        Ok((registry, report))
    }

    /// Load every entry of the index at `index_path`.
    ///
    /// Entries that cannot be loaded are logged, reported in
    /// [`LoadReport::skipped`] and removed from the registry, so later lookups
    /// fail with `ContractNotFound`. Names absent from the index are kept.
    /// Only an unreadable or malformed index fails the whole load.
    pub fn load(&self, index_path: impl AsRef<Path>) -> RegistryResult<LoadReport> {
        let index_path = index_path.as_ref();
        let index = read_index(index_path)?;
        let base = base_dir(index_path);

        let mut report = LoadReport::default();
        let mut loaded = Vec::with_capacity(index.len());
        for (name, entry) in &index {
            match load_entry(name, entry, &base) {
                Ok(contract) => loaded.push(contract),
                Err(e) => {
                    tracing::warn!(contract = %name, error = %e, "Skipping registry entry");
                    report.skipped.push(SkippedEntry {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let _guard = self.lock_writer();
        let mut next = ContractMap::clone(&self.contracts.load());
        for skipped in &report.skipped {
            next.remove(&skipped.name);
        }
        for contract in loaded {
            report.loaded.push(contract.name().to_string());
            next.insert(contract.name().to_string(), Arc::new(contract));
        }
        self.contracts.store(Arc::new(next));

        report.loaded.sort();
        metrics::record_registry_load(report.loaded.len(), report.skipped.len());
        tracing::info!(
            index = %index_path.display(),
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "Contract registry loaded"
        );
        Ok(report)
    }

    /// Persist addresses and description files into the index at `index_path`.
    ///
    /// The existing index is read and merged; contracts it does not list yet
    /// get a `<name>.json` description file.
    pub fn save(&self, index_path: impl AsRef<Path>) -> RegistryResult<()> {
        let index_path = index_path.as_ref();
        let _guard = self.lock_writer();

        let mut index = read_index(index_path)?;
        let base = base_dir(index_path);
        let contracts = self.contracts.load();

        for (name, contract) in contracts.iter() {
            let entry = index.entry(name.clone()).or_insert_with(|| ContractEntry {
                address: String::new(),
                file_name: format!("{}.json", name),
            });
            entry.address = contract.address().to_string();

            let abi = serde_json::to_string_pretty(contract.abi())?;
            std::fs::write(base.join(&entry.file_name), abi)?;
        }

        std::fs::write(index_path, serde_json::to_string_pretty(&index)?)?;
        tracing::info!(index = %index_path.display(), contracts = contracts.len(), "Contract registry saved");
        Ok(())
    }

    /// Register one contract from a description file.
    pub fn register(&self, name: &str, abi_path: impl AsRef<Path>, address: Address) -> RegistryResult<()> {
        let contract = Contract::from_abi_file(name, abi_path.as_ref(), address).map_err(|e| {
            RegistryError::RegistryLoad {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.insert(contract);
        Ok(())
    }

    /// Register an already-built descriptor, replacing any of the same name.
    pub fn insert(&self, contract: Contract) {
        let _guard = self.lock_writer();
        let mut next = ContractMap::clone(&self.contracts.load());
        tracing::debug!(contract = %contract.name(), address = %contract.address(), "Contract registered");
        next.insert(contract.name().to_string(), Arc::new(contract));
        self.contracts.store(Arc::new(next));
    }

    pub fn get(&self, name: &str) -> RegistryResult<Arc<Contract>> {
        self.contracts
            .load()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ContractNotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.contracts.load().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.contracts.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode a call; returns the contract's address (the call target) and
    /// the call data.
    pub fn pack(&self, name: &str, function: &str, args: &[DynSolValue]) -> RegistryResult<(Address, Bytes)> {
        let contract = self.get(name)?;
        let data = contract.pack(function, args)?;
        Ok((contract.address(), data))
    }

    /// Decode the return data of a call.
    pub fn unpack(&self, name: &str, function: &str, data: &[u8]) -> RegistryResult<Vec<DynSolValue>> {
        self.get(name)?.unpack(function, data)
    }

    /// Init code for deploying `name`: `bytecode ++ constructor arguments`.
    pub fn deploy(&self, name: &str, bytecode: &[u8], args: &[DynSolValue]) -> RegistryResult<Bytes> {
        self.get(name)?.deploy(bytecode, args)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock holds no broken state.
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ContractRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractRegistry")
            .field("contracts", &self.names())
            .finish()
    }
}

fn read_index(path: &Path) -> RegistryResult<BTreeMap<String, ContractEntry>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn base_dir(index_path: &Path) -> PathBuf {
    index_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn load_entry(name: &str, entry: &ContractEntry, base: &Path) -> RegistryResult<Contract> {
    let address: Address = entry.address.parse().map_err(|e| RegistryError::RegistryLoad {
        name: name.to_string(),
        reason: format!("invalid address '{}': {}", entry.address, e),
    })?;

    Contract::from_abi_file(name, &base.join(&entry.file_name), address).map_err(|e| {
        RegistryError::RegistryLoad {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })
}
