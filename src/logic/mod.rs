/// Logic Layer - Arbitrage Engine
///
/// This layer is responsible for:
/// - Uniswap V3 price and swap arithmetic
/// - Closed route discovery from pool metadata
/// - Route simulation and trade size optimization against a price snapshot
///
/// Routes are computed once; every new snapshot is evaluated against them, in parallel.
pub mod arbitrage_engine;
pub mod errors;
pub mod graph;
pub mod math;
pub mod pathfinder;
pub mod pools;
pub mod profit_calculator;
pub mod simulator;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export key components from the logic layer
pub use arbitrage_engine::{ArbitrageEngine, ArbitrageEngineBuilder, ArbitrageEngineStats};
pub use errors::CalculationError;
pub use graph::{ArbPath, ArbPathHash, Hop};
pub use pathfinder::{Pathfinder, generate_triangular_paths, generate_two_hop_paths, required_pools};
pub use pools::UniswapV3Pool;
pub use profit_calculator::{ProfitCalculator, optimize_amount_in, optimize_amount_in_within_slippage};
pub use simulator::{simulate_path, simulate_path_human};
pub use types::{
    ArbitrageConfig, ArbitrageOpportunity, FastHashMap, OptimizationStrategy, OptimizedAmount, PriceState,
    ProfitCalculationResult,
};
