//! Gas price policy.

use alloy::primitives::U256;

use crate::config::{GasConfig, GasPolicyKind};
use crate::manager::types::{ManagerError, ManagerResult};
use crate::rpc::ChainState;

pub const GWEI: u64 = 1_000_000_000;

/// How outgoing transactions are priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPricePolicy {
    /// Always this price, in wei.
    Fixed(U256),
    /// The node's price plus `min(price / 2, bump_cap)`, rejected above `max_price`.
    Network { bump_cap: U256, max_price: U256 },
}

impl Default for GasPricePolicy {
    fn default() -> Self {
        Self::Fixed(gwei(20))
    }
}

impl GasPricePolicy {
    pub fn from_config(config: &GasConfig) -> Self {
        match config.policy {
            GasPolicyKind::Fixed => Self::Fixed(gwei(config.fixed_price_gwei)),
            GasPolicyKind::Network => Self::Network {
                bump_cap: gwei(config.bump_cap_gwei),
                max_price: gwei(config.max_price_gwei),
            },
        }
    }

    /// Price for a new transaction. The fixed policy never queries the node.
    pub async fn resolve<C: ChainState>(&self, chain: &C) -> ManagerResult<U256> {
        match *self {
            Self::Fixed(price) => Ok(price),
            Self::Network { bump_cap, max_price } => {
                let network = chain.get_gas_price().await?;
                let price = bumped_price(network, bump_cap);
                if price > max_price {
                    tracing::warn!(price = %price, max_price = %max_price, "Gas price above ceiling");
                    return Err(ManagerError::GasPriceTooHigh {
                        current_gwei: to_gwei(price),
                        max_gwei: to_gwei(max_price),
                    });
                }
                Ok(price)
            }
        }
    }

    /// Price attached to read-only call simulations, when known without a query.
    pub fn call_price(&self) -> Option<U256> {
        match *self {
            Self::Fixed(price) => Some(price),
            Self::Network { .. } => None,
        }
    }
}

/// `price + min(price / 2, cap)`.
pub fn bumped_price(price: U256, cap: U256) -> U256 {
    price.saturating_add((price / U256::from(2)).min(cap))
}

fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::from(GWEI)
}

fn to_gwei(wei: U256) -> u64 {
    (wei / U256::from(GWEI)).saturating_to()
}
