//! Transaction orchestration.
//!
//! # Responsibilities
//! - Resolve nonce (chain query or caller-supplied) and gas price
//! - Encode contract calls and deployments through the registry
//! - Sign through [`TxSigner`] and submit through [`ChainState`]
//!
//! Every sender follows the same order: pack → build draft → sign → submit.
//! Failures are returned as-is; nothing is retried or resubmitted here.

use std::path::Path;
use std::sync::Arc;

use alloy::dyn_abi::DynSolValue;
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, B256, U256, U64};
use notify::RecommendedWatcher;

use crate::config::ClientConfig;
use crate::contract::{ContractRegistry, LoadReport, RegistryWatcher};
use crate::keystore::FileKeystore;
use crate::manager::gas::GasPricePolicy;
use crate::manager::types::{ContractCall, ManagerError, ManagerResult};
use crate::observability::metrics;
use crate::rpc::{CallRequest, ChainClient, ChainState};
use crate::transaction::{RawTxParams, TxSigner};

/// Gas limit attached to read-only call simulations.
pub const DEFAULT_CALL_GAS_LIMIT: u64 = 6_750_000;

/// Builds, signs and submits transactions for accounts held by one custodian.
pub struct TxManager<C: ChainState = ChainClient> {
    chain: C,
    signer: TxSigner,
    registry: Arc<ContractRegistry>,
    gas_policy: GasPricePolicy,
    call_gas_limit: u64,
    /// Keeps the registry hot-reload running for the manager's lifetime.
    _registry_watcher: Option<RecommendedWatcher>,
}

impl TxManager<ChainClient> {
    /// Wire a manager from configuration: key directory, contract registry,
    /// RPC client, signer and gas policy.
    ///
    /// Must be called inside a tokio runtime when registry watching is enabled.
    pub async fn connect(config: &ClientConfig) -> ManagerResult<Self> {
        if config.observability.metrics_enabled {
            let addr = config
                .observability
                .metrics_address
                .parse()
                .map_err(|e| ManagerError::Config(format!("invalid metrics address: {}", e)))?;
            metrics::init_metrics(addr);
        }

        let keystore = FileKeystore::open(&config.keystore.dir)?;
        let registry = Arc::new(ContractRegistry::new());
        let mut watcher = None;

        if let Some(index_path) = &config.contracts.index_path {
            registry.load(index_path)?;

            if config.contracts.watch {
                let (registry_watcher, mut reports) =
                    RegistryWatcher::new(Path::new(index_path), registry.clone());
                watcher = Some(
                    registry_watcher
                        .run()
                        .map_err(|e| ManagerError::Config(format!("cannot watch registry index: {}", e)))?,
                );
                tokio::spawn(async move {
                    while let Some(report) = reports.recv().await {
                        log_reload(&report);
                    }
                });
            }
        }

        let chain = ChainClient::new(config.chain.clone()).await?;
        let signer = TxSigner::new(Arc::new(keystore), config.chain.chain_id);

        let mut manager = Self::new(chain, signer, registry)
            .with_gas_policy(GasPricePolicy::from_config(&config.gas))
            .with_call_gas_limit(config.gas.call_gas_limit);
        manager._registry_watcher = watcher;
        Ok(manager)
    }
}

impl<C: ChainState> TxManager<C> {
    pub fn new(chain: C, signer: TxSigner, registry: Arc<ContractRegistry>) -> Self {
        Self {
            chain,
            signer,
            registry,
            gas_policy: GasPricePolicy::default(),
            call_gas_limit: DEFAULT_CALL_GAS_LIMIT,
            _registry_watcher: None,
        }
    }

    pub fn with_gas_policy(mut self, policy: GasPricePolicy) -> Self {
        self.gas_policy = policy;
        self
    }

    pub fn with_call_gas_limit(mut self, limit: u64) -> Self {
        self.call_gas_limit = limit;
        self
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    pub fn signer(&self) -> &TxSigner {
        &self.signer
    }

    pub fn registry(&self) -> &Arc<ContractRegistry> {
        &self.registry
    }

    pub fn gas_policy(&self) -> GasPricePolicy {
        self.gas_policy
    }

    /// Gas price for the next transaction.
    pub async fn gas_price(&self) -> ManagerResult<U256> {
        self.gas_policy.resolve(&self.chain).await
    }

    /// Nonce of `from` at the latest block.
    pub async fn nonce(&self, from: Address) -> ManagerResult<u64> {
        Ok(self
            .chain
            .get_transaction_count(from, BlockNumberOrTag::Latest)
            .await?)
    }

    /// Sign and submit a plain transaction; `to = None` creates a contract.
    pub async fn send_raw_transaction(
        &self,
        from: Address,
        to: Option<Address>,
        value: U256,
        gas_limit: u64,
        data: Bytes,
    ) -> ManagerResult<B256> {
        let nonce = self.nonce(from).await?;
        let gas_price = self.gas_price().await?;
        let raw = self.signer.create_raw_transaction(
            from,
            RawTxParams {
                nonce,
                to,
                value,
                gas_price,
                gas_limit: U256::from(gas_limit),
                input: data,
            },
        )?;
        self.submit(raw).await
    }

    /// Call `call.function` in a signed transaction, using the chain's nonce.
    pub async fn send_contract_raw_transaction(
        &self,
        from: Address,
        call: &ContractCall,
        value: U256,
        gas_limit: u64,
    ) -> ManagerResult<B256> {
        let nonce = self.nonce(from).await?;
        self.send_contract_raw_transaction_with_nonce(from, call, value, gas_limit, nonce)
            .await
    }

    /// Like [`send_contract_raw_transaction`](Self::send_contract_raw_transaction)
    /// with a caller-managed nonce, for queuing or out-of-order submission.
    pub async fn send_contract_raw_transaction_with_nonce(
        &self,
        from: Address,
        call: &ContractCall,
        value: U256,
        gas_limit: u64,
        nonce: u64,
    ) -> ManagerResult<B256> {
        let raw = self
            .signed_contract_transaction(from, call, value, gas_limit, nonce)
            .await?;
        self.submit(raw).await
    }

    /// Deploy `contract` from `bytecode` and constructor `args`.
    ///
    /// Returns the address the contract will have (derived from `from` and
    /// the nonce used) and the transaction hash.
    pub async fn deploy_contract_raw_transaction(
        &self,
        from: Address,
        contract: &str,
        bytecode: &[u8],
        args: &[DynSolValue],
        value: U256,
        gas_limit: u64,
    ) -> ManagerResult<(Address, B256)> {
        let init_code = self.registry.deploy(contract, bytecode, args)?;
        let nonce = self.nonce(from).await?;
        let gas_price = self.gas_price().await?;

        let raw = self.signer.create_raw_transaction(
            from,
            RawTxParams {
                nonce,
                to: None,
                value,
                gas_price,
                gas_limit: U256::from(gas_limit),
                input: init_code,
            },
        )?;
        let address = from.create(nonce);
        let hash = self.submit(raw).await?;

        tracing::info!(contract = %contract, address = %address, tx_hash = %hash, "Contract deployment submitted");
        Ok((address, hash))
    }

    /// Simulate `call` at `block` and decode its result. Never signs.
    pub async fn send_contract_call(
        &self,
        from: Address,
        call: &ContractCall,
        block: BlockNumberOrTag,
    ) -> ManagerResult<Vec<DynSolValue>> {
        let request = self.call_request(from, call)?;
        let output = self.chain.call(request, block).await?;
        Ok(self.registry.unpack(&call.contract, &call.function, &output)?)
    }

    /// Build the `eth_call` message for `call`.
    pub(crate) fn call_request(&self, from: Address, call: &ContractCall) -> ManagerResult<CallRequest> {
        let (target, data) = self.registry.pack(&call.contract, &call.function, &call.args)?;
        Ok(CallRequest {
            from,
            to: Some(call.to.unwrap_or(target)),
            gas: Some(U64::from(self.call_gas_limit)),
            gas_price: self.gas_policy.call_price(),
            value: None,
            data: Some(data),
        })
    }

    /// Pack, price and sign a contract transaction with an explicit nonce.
    pub(crate) async fn signed_contract_transaction(
        &self,
        from: Address,
        call: &ContractCall,
        value: U256,
        gas_limit: u64,
        nonce: u64,
    ) -> ManagerResult<Bytes> {
        let (target, data) = self.registry.pack(&call.contract, &call.function, &call.args)?;
        let gas_price = self.gas_price().await?;

        Ok(self.signer.create_raw_transaction(
            from,
            RawTxParams {
                nonce,
                to: Some(call.to.unwrap_or(target)),
                value,
                gas_price,
                gas_limit: U256::from(gas_limit),
                input: data,
            },
        )?)
    }

    async fn submit(&self, raw: Bytes) -> ManagerResult<B256> {
        Ok(self.chain.send_raw_transaction(raw).await?)
    }
}

impl<C: ChainState> std::fmt::Debug for TxManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxManager")
            .field("chain_id", &self.signer.chain_id())
            .field("gas_policy", &self.gas_policy)
            .field("contracts", &self.registry.len())
            .finish_non_exhaustive()
    }
}

fn log_reload(report: &LoadReport) {
    if report.is_complete() {
        tracing::info!(contracts = report.loaded.len(), "Contract registry reloaded");
    } else {
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.name.as_str()).collect();
        tracing::warn!(
            contracts = report.loaded.len(),
            skipped = ?skipped,
            "Contract registry reloaded with skipped entries"
        );
    }
}
