use super::errors::CalculationError;
use super::graph::ArbPath;
use super::pathfinder::{Pathfinder, required_pools};
use super::pools::UniswapV3Pool;
use super::profit_calculator::ProfitCalculator;
use super::types::{ArbitrageConfig, ArbitrageOpportunity, OptimizationStrategy, PriceState};
use crate::data_sync::PriceStateProvider;
use alloy_primitives::Address;
use eyre::{Result, eyre};
use tracing::{info, warn};

/// ArbitrageEngine ties path discovery and profit calculation together
///
/// 1. Path discovery runs once in [`ArbitrageEngine::initialize`] from pool metadata.
/// 2. Every price snapshot is then evaluated against the pre-computed paths.
pub struct ArbitrageEngine {
    config: ArbitrageConfig,
    precomputed_paths: Vec<ArbPath>,
    /// Pools referenced by the pre-computed paths, what a provider has to fetch
    required_pools: Vec<Address>,
    profit_calculator: ProfitCalculator,
    is_initialized: bool,
}

impl ArbitrageEngine {
    pub fn new(config: ArbitrageConfig) -> Self {
        let profit_calculator = ProfitCalculator::new(config.clone());

        Self { config, precomputed_paths: Vec::new(), required_pools: Vec::new(), profit_calculator, is_initialized: false }
    }

    /// Pre-compute every route from the configured base token back to itself.
    pub fn initialize(&mut self, pools: &[UniswapV3Pool]) -> Result<()> {
        if self.is_initialized {
            warn!("Arbitrage engine already initialized, skipping");
            return Ok(());
        }

        for pool in pools {
            pool.validate()?;
        }

        let pathfinder = Pathfinder::from_config(&self.config);
        let paths = pathfinder.find_paths(pools, self.config.base_token);
        if paths.is_empty() {
            return Err(eyre!("no arbitrage path found for base token {} in {} pools", self.config.base_token, pools.len()));
        }

        self.required_pools = required_pools(&paths);
        self.precomputed_paths = paths;
        self.is_initialized = true;

        info!(
            paths = self.precomputed_paths.len(),
            required_pools = self.required_pools.len(),
            strategy = %self.config.strategy,
            min_profit = self.config.min_profit,
            "Arbitrage engine initialized"
        );
        Ok(())
    }

    pub fn required_pools(&self) -> &[Address] {
        &self.required_pools
    }

    pub fn precomputed_paths(&self) -> &[ArbPath] {
        &self.precomputed_paths
    }

    pub fn config(&self) -> &ArbitrageConfig {
        &self.config
    }

    /// Evaluate every pre-computed path against one snapshot.
    ///
    /// Paths that fail (a missing price, an overflow) are skipped. Opportunities above `min_profit` are returned,
    /// most profitable first.
    pub fn evaluate(&self, price_state: &PriceState) -> Result<Vec<ArbitrageOpportunity>> {
        if !self.is_initialized {
            return Err(eyre!("engine not initialized, call initialize() first"));
        }

        let results = self.profit_calculator.calculate_profits_parallel(&self.precomputed_paths, price_state);
        let mut opportunities: Vec<ArbitrageOpportunity> =
            results.iter().filter_map(|result| result.to_opportunity(self.config.min_profit)).collect();
        opportunities.sort_by(|a, b| b.profit.total_cmp(&a.profit));

        if !opportunities.is_empty() {
            info!(opportunities = opportunities.len(), block = ?price_state.block_number(), "Found arbitrage opportunities");
        }
        Ok(opportunities)
    }

    /// Fetch the required pools from `provider` and evaluate the snapshot.
    ///
    /// A fetch error is returned as a [`CalculationError::Fetch`] without evaluating anything.
    pub async fn run_once<P: PriceStateProvider + ?Sized>(&self, provider: &P) -> Result<Vec<ArbitrageOpportunity>> {
        if !self.is_initialized {
            return Err(eyre!("engine not initialized, call initialize() first"));
        }

        let price_state = provider.fetch_price_state(&self.required_pools).await.map_err(CalculationError::from)?;
        self.evaluate(&price_state)
    }

    /// Get statistics about the engine's current state
    pub fn get_statistics(&self) -> ArbitrageEngineStats {
        ArbitrageEngineStats {
            is_initialized: self.is_initialized,
            precomputed_paths_count: self.precomputed_paths.len(),
            required_pools_count: self.required_pools.len(),
            strategy: self.config.strategy,
            min_profit: self.config.min_profit,
            parallel_calculation_enabled: self.config.enable_parallel_calculation,
        }
    }
}

/// Statistics about the ArbitrageEngine's current state
#[derive(Debug, Clone)]
pub struct ArbitrageEngineStats {
    pub is_initialized: bool,
    pub precomputed_paths_count: usize,
    pub required_pools_count: usize,
    pub strategy: OptimizationStrategy,
    pub min_profit: f64,
    pub parallel_calculation_enabled: bool,
}

/// Builder pattern for creating and configuring an ArbitrageEngine
pub struct ArbitrageEngineBuilder {
    config: ArbitrageConfig,
}

impl ArbitrageEngineBuilder {
    pub fn new() -> Self {
        Self { config: ArbitrageConfig::default() }
    }

    pub fn with_config(config: ArbitrageConfig) -> Self {
        Self { config }
    }

    pub fn with_base_token(mut self, base_token: Address) -> Self {
        self.config.base_token = base_token;
        self
    }

    pub fn with_min_profit(mut self, min_profit: f64) -> Self {
        self.config.min_profit = min_profit;
        self
    }

    pub fn with_scan(mut self, max_amount_in: u64, step_size: u64) -> Self {
        self.config.max_amount_in = max_amount_in;
        self.config.step_size = step_size;
        self
    }

    pub fn with_strategy(mut self, strategy: OptimizationStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_two_hop(mut self, enabled: bool) -> Self {
        self.config.include_two_hop = enabled;
        self
    }

    pub fn with_parallel_calculation(mut self, enabled: bool) -> Self {
        self.config.enable_parallel_calculation = enabled;
        self
    }

    pub fn build(self) -> ArbitrageEngine {
        ArbitrageEngine::new(self.config)
    }
}

impl Default for ArbitrageEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
