use super::conversions::{f64_to_i256, floor_div_f64, i256_to_f64, narrow, signed, u256_to_f64, widen};
use super::sqrt_price_math::sqrt_price_x96_to_price;
use crate::logic::errors::CalculationError;
use crate::utils::constants::FEE_DENOMINATOR_PPM;
use alloy_primitives::{I256, Sign, U256, U512};
use tracing::trace;

/// `floor(liquidity * (current - target) / (current * target))`, signed.
///
/// Products are taken in 512 bits: liquidity is up to 128 bits and the square root prices up to 160.
fn gross_amount(sqrt_price_current_x96: U256, sqrt_price_target_x96: U256, liquidity: u128) -> Result<I256, CalculationError> {
    let denominator = widen(sqrt_price_current_x96) * widen(sqrt_price_target_x96);
    if denominator.is_zero() {
        return Err(CalculationError::DegenerateSwap("zero sqrt price"));
    }

    let (sign, diff) = if sqrt_price_current_x96 >= sqrt_price_target_x96 {
        (Sign::Positive, sqrt_price_current_x96 - sqrt_price_target_x96)
    } else {
        (Sign::Negative, sqrt_price_target_x96 - sqrt_price_current_x96)
    };
    let numerator = widen(diff) * U512::from(liquidity);

    let mut quotient = numerator / denominator;
    if sign.is_negative() && !(numerator % denominator).is_zero() {
        quotient += U512::from(1u8);
    }
    signed(sign, narrow(quotient)?)
}

/// `floor(amount * fee_ppm / 1_000_000)`.
fn fee_amount(amount: I256, fee_ppm: u32) -> Result<I256, CalculationError> {
    let (sign, abs) = amount.into_sign_and_abs();
    let numerator = widen(abs) * U512::from(fee_ppm);
    let denominator = U512::from(FEE_DENOMINATOR_PPM);

    let mut quotient = numerator / denominator;
    if sign.is_negative() && !(numerator % denominator).is_zero() {
        quotient += U512::from(1u8);
    }
    signed(sign, narrow(quotient)?)
}

/// Output of a swap moving the pool from `sqrt_price_current_x96` to `sqrt_price_target_x96`, net of the fee
/// charged on `amount_in`.
///
/// The result is negative when the target sits on the wrong side of the current price for the trade
/// direction, or when the price does not move at all. It is not clamped.
pub fn compute_amount_out(
    amount_in: I256,
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    fee_ppm: u32,
) -> Result<I256, CalculationError> {
    let gross_out = gross_amount(sqrt_price_current_x96, sqrt_price_target_x96, liquidity)?;
    let fee = fee_amount(amount_in, fee_ppm)?;
    gross_out.checked_sub(fee).ok_or(CalculationError::Overflow)
}

/// Input needed for `amount_out`: the same price-move amount with the fee on `amount_out` added.
pub fn compute_amount_in(
    amount_out: I256,
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    fee_ppm: u32,
) -> Result<I256, CalculationError> {
    let gross_in = gross_amount(sqrt_price_current_x96, sqrt_price_target_x96, liquidity)?;
    let fee = fee_amount(amount_out, fee_ppm)?;
    gross_in.checked_add(fee).ok_or(CalculationError::Overflow)
}

/// [`compute_amount_out`] against a target that is a human scale price rather than a Q64.96 square root.
///
/// Path simulation feeds the output of [`sqrt_price_x96_to_price`] here as the target, so the formula is
/// evaluated in double precision: `floor_div(L * (current - target), current * target)` with floored
/// division, minus `trunc(amount_in * fee)`, truncated toward zero. The two units do not mix meaningfully;
/// the numbers are kept as they are so that any change to them is deliberate.
pub fn compute_amount_out_with_price_target(
    amount_in: I256,
    sqrt_price_current_x96: U256,
    target_price: f64,
    liquidity: u128,
    fee_ppm: u32,
) -> Result<I256, CalculationError> {
    let fee_fraction = fee_ppm as f64 / FEE_DENOMINATOR_PPM as f64;
    let current = u256_to_f64(sqrt_price_current_x96);

    let numerator = liquidity as f64 * (current - target_price);
    let denominator = current * target_price;
    let gross_out = floor_div_f64(numerator, denominator)?;
    let fee = (i256_to_f64(amount_in) * fee_fraction).trunc();

    trace!(%amount_in, gross_out, fee, "amount out against price target");
    f64_to_i256(gross_out - fee)
}

/// Largest `amount_in` (a multiple of `step_size`) whose realized rate stays within the slippage window.
///
/// The quote is the fee-discounted spot rate from `sqrt_price_current_x96`; slippage is
/// `(quote - rate) / quote` where `rate = amount_out / amount_in`. When `max_amount_in` itself slips less
/// than `slippage_lower` it is returned without searching. Otherwise a binary search on the step grid
/// returns the first candidate inside `[slippage_lower, slippage_upper]`, or, once the window collapses,
/// the largest candidate seen below `slippage_lower` (0 if none).
#[allow(clippy::too_many_arguments)]
pub fn search_max_amount_in_within_slippage(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    fee_ppm: u32,
    token0_is_input: bool,
    max_amount_in: f64,
    step_size: f64,
    slippage_lower: f64,
    slippage_upper: f64,
) -> Result<f64, CalculationError> {
    if !(max_amount_in.is_finite() && max_amount_in > 0.0) {
        return Err(CalculationError::InvalidParameter(format!("max_amount_in must be positive, got {max_amount_in}")));
    }
    if !(step_size.is_finite() && step_size > 0.0) {
        return Err(CalculationError::InvalidParameter(format!("step_size must be positive, got {step_size}")));
    }
    if slippage_lower > slippage_upper {
        return Err(CalculationError::InvalidParameter(format!(
            "slippage window is empty: [{slippage_lower}, {slippage_upper}]"
        )));
    }

    let fee_fraction = fee_ppm as f64 / FEE_DENOMINATOR_PPM as f64;
    let quote = sqrt_price_x96_to_price(sqrt_price_current_x96, 0, 0, token0_is_input)? * (1.0 - fee_fraction);
    if quote == 0.0 {
        return Err(CalculationError::DegenerateSwap("zero price quote"));
    }
    let gross_out = gross_amount(sqrt_price_current_x96, sqrt_price_target_x96, liquidity)?;

    let slippage_at = |amount_in: f64| -> Result<f64, CalculationError> {
        let fee = f64_to_i256(amount_in * fee_fraction)?;
        let amount_out = gross_out.checked_sub(fee).ok_or(CalculationError::Overflow)?;
        let rate = i256_to_f64(amount_out) / amount_in;
        Ok((quote - rate) / quote)
    };

    if slippage_at(max_amount_in)? < slippage_lower {
        return Ok(max_amount_in);
    }

    let mut best = 0.0f64;
    let mut left = 0.0f64;
    let mut right = max_amount_in;
    while left <= right {
        let mid = floor_div_f64((left + right) / 2.0, step_size)? / (1.0 / step_size);
        if mid <= 0.0 {
            // a zero trade has no rate
            left = step_size;
            continue;
        }

        let slippage = slippage_at(mid)?;
        trace!(mid, slippage, "slippage search step");
        if (slippage_lower..=slippage_upper).contains(&slippage) {
            return Ok(mid);
        }
        if slippage < slippage_lower {
            best = best.max(mid);
            left = mid + step_size;
        } else {
            right = mid - step_size;
        }
    }

    Ok(best)
}
