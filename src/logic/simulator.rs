use super::errors::CalculationError;
use super::graph::ArbPath;
use super::math::{compute_amount_out_with_price_target, f64_to_i256, sqrt_price_x96_to_price};
use super::types::PriceState;
use alloy_primitives::I256;
use tracing::trace;

/// Push `amount_in` (smallest unit of the base token) through every hop of `path`.
///
/// Each hop reads the pool's current square root price from `price_state` and uses that pool's human scale price
/// (decimals0 and decimals1, quoted in the hop's direction) as the swap target. Every hop's output, fee
/// included and possibly negative, becomes the next hop's input. Returns the last hop's output.
pub fn simulate_path(path: &ArbPath, amount_in: I256, price_state: &PriceState) -> Result<I256, CalculationError> {
    let mut amount = amount_in;

    for (i, hop) in path.hops().iter().enumerate() {
        let pool = hop.pool();
        let sqrt_price_current_x96 = price_state.sqrt_price_x96(&pool.address)?;
        let target_price =
            sqrt_price_x96_to_price(sqrt_price_current_x96, pool.decimals0, pool.decimals1, hop.token0_is_input())?;

        let amount_out =
            compute_amount_out_with_price_target(amount, sqrt_price_current_x96, target_price, pool.liquidity, hop.fee())?;
        trace!(hop = i, pool = %pool.address, %amount, %amount_out, "simulated hop");
        amount = amount_out;
    }

    Ok(amount)
}

/// [`simulate_path`] for an amount in whole base token units, scaled by the base token's decimals.
pub fn simulate_path_human(path: &ArbPath, amount_in: f64, price_state: &PriceState) -> Result<I256, CalculationError> {
    let scaled = f64_to_i256(amount_in * 10f64.powi(path.base_decimals() as i32))?;
    simulate_path(path, scaled, price_state)
}
