use super::errors::CalculationError;
use super::graph::{ArbPath, Hop};
use super::math::{
    exp10, f64_to_i256, ratio_to_f64, search_max_amount_in_within_slippage, sqrt_price_x96_to_price, u256_to_f64,
};
use super::simulator::simulate_path;
use super::types::{ArbitrageConfig, OptimizationStrategy, OptimizedAmount, PriceState, ProfitCalculationResult};
use alloy_primitives::{I256, Sign, U256};
use rayon::prelude::*;
use tracing::debug;

fn scaled_amount(amount: u64, decimals: u8) -> Result<I256, CalculationError> {
    let abs = U256::from(amount).checked_mul(exp10(decimals)?).ok_or(CalculationError::Overflow)?;
    I256::checked_from_sign_and_abs(Sign::Positive, abs).ok_or(CalculationError::Overflow)
}

/// Brute force the trade size of `path` over `0, step_size, 2 * step_size, ..` below `max_amount_in`.
///
/// Amounts are whole base token units. The scan keeps the latest candidate whose profit is at least the best so
/// far and stops at the first strict decrease, so it finds the first local maximum. A degenerate swap ends the
/// scan as if the profit had dropped; a missing price propagates.
pub fn optimize_amount_in(
    path: &ArbPath,
    max_amount_in: u64,
    step_size: u64,
    price_state: &PriceState,
) -> Result<OptimizedAmount, CalculationError> {
    if step_size == 0 {
        return Err(CalculationError::InvalidParameter("step_size must be positive".to_string()));
    }
    let step = usize::try_from(step_size).map_err(|_| CalculationError::InvalidParameter(format!("step_size {step_size} too large")))?;
    let decimals = path.base_decimals();

    let mut best_amount_in = 0u64;
    let mut best_profit = I256::ZERO;
    for amount_in in (0..max_amount_in).step_by(step) {
        let amount_in_scaled = scaled_amount(amount_in, decimals)?;
        let amount_out = match simulate_path(path, amount_in_scaled, price_state) {
            Ok(amount_out) => amount_out,
            Err(e) if e.is_degenerate() => {
                debug!(%path, amount_in, error = %e, "degenerate swap, scan stopped");
                break;
            }
            Err(e) => return Err(e),
        };

        let profit = amount_out.checked_sub(amount_in_scaled).ok_or(CalculationError::Overflow)?;
        if profit >= best_profit {
            best_amount_in = amount_in;
            best_profit = profit;
        } else {
            break;
        }
    }

    Ok(OptimizedAmount {
        amount_in: best_amount_in,
        profit: ratio_to_f64(best_profit, exp10(decimals)?),
        profit_raw: best_profit,
    })
}

/// Largest first hop input, in whole base token units, whose slippage stays inside `[slippage_lower, slippage_upper]`.
fn first_hop_slippage_cap(
    hop: &Hop,
    price_state: &PriceState,
    max_amount_in: u64,
    step_size: u64,
    slippage_lower: f64,
    slippage_upper: f64,
    decimals: u8,
) -> Result<u64, CalculationError> {
    let pool = hop.pool();
    let sqrt_price_current_x96 = price_state.sqrt_price_x96(&pool.address)?;
    let target_price = sqrt_price_x96_to_price(sqrt_price_current_x96, pool.decimals0, pool.decimals1, hop.token0_is_input())?;
    let (_, sqrt_price_target_x96) = f64_to_i256(target_price)?.into_sign_and_abs();

    let scale = u256_to_f64(exp10(decimals)?);
    let cap = search_max_amount_in_within_slippage(
        sqrt_price_current_x96,
        sqrt_price_target_x96,
        pool.liquidity,
        hop.fee(),
        hop.token0_is_input(),
        max_amount_in as f64 * scale,
        step_size as f64 * scale,
        slippage_lower,
        slippage_upper,
    )?;
    // float to int casts saturate
    Ok((cap / scale).floor() as u64)
}

/// [`optimize_amount_in`] over a range capped by the first hop's slippage window.
///
/// The cap comes from [`search_max_amount_in_within_slippage`] on the first pool, with the same target the simulator
/// uses. The cap itself stays a candidate. A degenerate first hop makes the route unprofitable.
pub fn optimize_amount_in_within_slippage(
    path: &ArbPath,
    max_amount_in: u64,
    step_size: u64,
    price_state: &PriceState,
    slippage_lower: f64,
    slippage_upper: f64,
) -> Result<OptimizedAmount, CalculationError> {
    if step_size == 0 {
        return Err(CalculationError::InvalidParameter("step_size must be positive".to_string()));
    }
    if max_amount_in == 0 {
        return Ok(OptimizedAmount::zero());
    }

    let first_hop = &path.hops()[0];
    let cap = match first_hop_slippage_cap(
        first_hop,
        price_state,
        max_amount_in,
        step_size,
        slippage_lower,
        slippage_upper,
        path.base_decimals(),
    ) {
        Ok(cap) => cap,
        Err(e) if e.is_degenerate() => {
            debug!(%path, error = %e, "degenerate first hop, no slippage cap");
            return Ok(OptimizedAmount::zero());
        }
        Err(e) => return Err(e),
    };

    let capped_max = max_amount_in.min(cap.saturating_add(1));
    debug!(%path, cap, capped_max, "slippage bounded scan");
    optimize_amount_in(path, capped_max, step_size, price_state)
}

/// ProfitCalculator is the "hot path" component responsible for profit evaluation
///
/// It takes pre-computed paths and evaluates them against one price snapshot. Routes are independent, so with
/// `enable_parallel_calculation` they are spread over the rayon thread pool.
pub struct ProfitCalculator {
    config: ArbitrageConfig,
}

impl ProfitCalculator {
    pub fn new(config: ArbitrageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArbitrageConfig {
        &self.config
    }

    /// Calculate profits for all paths in parallel
    ///
    /// One result per path, in input order. A failing path gives a failure result and never aborts the batch.
    pub fn calculate_profits_parallel(&self, paths: &[ArbPath], price_state: &PriceState) -> Vec<ProfitCalculationResult> {
        if !self.config.enable_parallel_calculation {
            return self.calculate_profits_sequential(paths, price_state);
        }

        debug!(paths = paths.len(), "parallel profit calculation started");

        let results: Vec<ProfitCalculationResult> =
            paths.par_iter().map(|path| self.calculate_path_profit(path, price_state)).collect();

        self.log_summary(&results);
        results
    }

    /// Sequential profit calculation (fallback for debugging)
    fn calculate_profits_sequential(&self, paths: &[ArbPath], price_state: &PriceState) -> Vec<ProfitCalculationResult> {
        debug!(paths = paths.len(), "sequential profit calculation started");

        let results: Vec<ProfitCalculationResult> =
            paths.iter().map(|path| self.calculate_path_profit(path, price_state)).collect();

        self.log_summary(&results);
        results
    }

    /// Optimize a single path with the configured strategy
    pub fn calculate_path_profit(&self, path: &ArbPath, price_state: &PriceState) -> ProfitCalculationResult {
        let optimized = match self.config.strategy {
            OptimizationStrategy::LinearScan => {
                optimize_amount_in(path, self.config.max_amount_in, self.config.step_size, price_state)
            }
            OptimizationStrategy::SlippageBounded => optimize_amount_in_within_slippage(
                path,
                self.config.max_amount_in,
                self.config.step_size,
                price_state,
                self.config.slippage_lower,
                self.config.slippage_upper,
            ),
        };

        match optimized {
            Ok(optimized) => ProfitCalculationResult::success(path.clone(), optimized, price_state.block_number()),
            Err(e) => {
                debug!(%path, error = %e, "profit calculation failed");
                ProfitCalculationResult::failure(path.clone(), e)
            }
        }
    }

    fn log_summary(&self, results: &[ProfitCalculationResult]) {
        let failed = results.iter().filter(|r| !r.calculation_successful).count();
        let profitable = results.iter().filter(|r| r.to_opportunity(self.config.min_profit).is_some()).count();
        debug!(total = results.len(), profitable, failed, "profit calculation finished");
    }
}
