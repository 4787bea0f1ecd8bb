// Two-Layer Architecture
pub mod data_sync; // Data Layer: pool registry, price snapshots
pub mod logic; // Logic Layer: AMM math, path finding, profit optimization

// Common utilities and constants
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    BatchedPriceStateProvider, ContractCaller, DataSyncConfig, FetchError, JsonPoolRegistry, MulticallPriceStateProvider,
    PoolRegistry, PriceStateProvider, SnapshotPriceStateProvider,
};
pub use logic::math::{
    compute_amount_in, compute_amount_out, compute_amount_out_with_price_target, search_max_amount_in_within_slippage,
    sqrt_price_x96_to_price, tick_to_sqrt_price_x96,
};
pub use logic::{
    ArbPath, ArbitrageConfig, ArbitrageEngine, ArbitrageEngineBuilder, ArbitrageOpportunity, CalculationError, Hop,
    OptimizationStrategy, OptimizedAmount, Pathfinder, PriceState, ProfitCalculationResult, ProfitCalculator,
    UniswapV3Pool, generate_triangular_paths, generate_two_hop_paths, optimize_amount_in,
    optimize_amount_in_within_slippage, required_pools, simulate_path, simulate_path_human,
};
