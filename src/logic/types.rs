use super::errors::CalculationError;
use super::graph::ArbPath;
use crate::data_sync::FetchError;
use crate::utils::constants::WETH;
use ahash::RandomState;
use alloy_primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use strum_macros::{Display, EnumString, VariantNames};

pub type FastHasher = RandomState;
/// FastHashMap using ahash
pub type FastHashMap<K, V> = HashMap<K, V, FastHasher>;

/// Square root prices (Q64.96) of a set of pools, captured at one point in time.
///
/// A snapshot is never modified once built; evaluations only read from it and may share it across threads.
#[derive(Debug, Clone, Default)]
pub struct PriceState {
    sqrt_prices: FastHashMap<Address, U256>,
    block_number: Option<u64>,
}

impl PriceState {
    pub fn from_sqrt_prices<I: IntoIterator<Item = (Address, U256)>>(sqrt_prices: I) -> Self {
        Self { sqrt_prices: sqrt_prices.into_iter().collect(), block_number: None }
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        Self { block_number: Some(block_number), ..self }
    }

    /// Combine two disjoint snapshots taken at the same block.
    ///
    /// An untagged snapshot takes the other's block number; two different block numbers are rejected.
    pub fn merge(mut self, other: PriceState) -> Result<Self, FetchError> {
        match (self.block_number, other.block_number) {
            (Some(expected), Some(found)) if expected != found => {
                return Err(FetchError::InconsistentBlocks { expected, found });
            }
            _ => {}
        }
        self.sqrt_prices.extend(other.sqrt_prices);
        self.block_number = self.block_number.or(other.block_number);
        Ok(self)
    }

    pub fn sqrt_price_x96(&self, pool: &Address) -> Result<U256, CalculationError> {
        self.sqrt_prices.get(pool).copied().ok_or(CalculationError::MissingPriceState(*pool))
    }

    pub fn get(&self, pool: &Address) -> Option<U256> {
        self.sqrt_prices.get(pool).copied()
    }

    pub fn contains(&self, pool: &Address) -> bool {
        self.sqrt_prices.contains_key(pool)
    }

    /// Requested pools this snapshot has no price for, in request order.
    pub fn missing(&self, pools: &[Address]) -> Vec<Address> {
        pools.iter().filter(|pool| !self.contains(pool)).copied().collect()
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn len(&self) -> usize {
        self.sqrt_prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sqrt_prices.is_empty()
    }
}

/// How the optimizer picks the trade size of a route.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Default, EnumString, VariantNames, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStrategy {
    /// Step through `0..max_amount_in` until profit drops.
    #[default]
    LinearScan,
    /// Cap the scan at the first hop's slippage-bounded size, found by binary search.
    SlippageBounded,
}

/// Best trade size found for a route.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedAmount {
    /// Input in whole base token units
    pub amount_in: u64,
    /// Profit in whole base token units
    pub profit: f64,
    /// Profit in the base token's smallest unit
    pub profit_raw: I256,
}

impl OptimizedAmount {
    pub fn zero() -> Self {
        Self { amount_in: 0, profit: 0.0, profit_raw: I256::ZERO }
    }
}

/// Represents a profitable arbitrage opportunity discovered by the engine
#[derive(Debug, Clone)]
pub struct ArbitrageOpportunity {
    pub path: ArbPath,
    pub optimal_amount_in: u64,
    pub profit: f64,
    pub profit_raw: I256,
    /// Block of the price state the opportunity was evaluated against
    pub block_number: Option<u64>,
    pub discovered_at: Instant,
}

impl ArbitrageOpportunity {
    pub fn new(path: ArbPath, optimized: &OptimizedAmount, block_number: Option<u64>) -> Self {
        Self {
            path,
            optimal_amount_in: optimized.amount_in,
            profit: optimized.profit,
            profit_raw: optimized.profit_raw,
            block_number,
            discovered_at: Instant::now(),
        }
    }

    pub fn is_profitable(&self, min_profit: f64) -> bool {
        self.profit > min_profit
    }
}

/// Result of profit calculation for a single path
#[derive(Debug, Clone)]
pub struct ProfitCalculationResult {
    pub path: ArbPath,
    pub optimized: OptimizedAmount,
    pub block_number: Option<u64>,
    pub calculation_successful: bool,
    pub error: Option<CalculationError>,
}

impl ProfitCalculationResult {
    pub fn success(path: ArbPath, optimized: OptimizedAmount, block_number: Option<u64>) -> Self {
        Self { path, optimized, block_number, calculation_successful: true, error: None }
    }

    pub fn failure(path: ArbPath, error: CalculationError) -> Self {
        Self { path, optimized: OptimizedAmount::zero(), block_number: None, calculation_successful: false, error: Some(error) }
    }

    pub fn to_opportunity(&self, min_profit: f64) -> Option<ArbitrageOpportunity> {
        if self.calculation_successful && self.optimized.profit > min_profit {
            Some(ArbitrageOpportunity::new(self.path.clone(), &self.optimized, self.block_number))
        } else {
            None
        }
    }
}

/// Configuration for the arbitrage engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrageConfig {
    /// Token every route starts from and returns to
    pub base_token: Address,
    /// Upper bound (exclusive) of the trade size scan, in whole base token units
    pub max_amount_in: u64,
    /// Scan increment, in whole base token units
    pub step_size: u64,
    pub strategy: OptimizationStrategy,
    /// Slippage window used by [`OptimizationStrategy::SlippageBounded`]
    pub slippage_lower: f64,
    pub slippage_upper: f64,
    /// Minimum profit in whole base token units to report an opportunity
    pub min_profit: f64,
    /// Also search `base -> token -> base` routes through two different pools
    pub include_two_hop: bool,
    /// Routes touching any of these tokens are dropped
    pub blacklist_tokens: Vec<Address>,
    /// Maximum number of routes kept by the pathfinder
    pub max_paths_limit: usize,
    /// Enable parallel profit calculation
    pub enable_parallel_calculation: bool,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            base_token: WETH,
            max_amount_in: 10_000,
            step_size: 100,
            strategy: OptimizationStrategy::LinearScan,
            // below 0.1% slippage
            slippage_lower: 0.0,
            slippage_upper: 0.001,
            min_profit: 0.0,
            include_two_hop: false,
            blacklist_tokens: Vec::new(),
            max_paths_limit: 50_000,
            enable_parallel_calculation: true,
        }
    }
}
