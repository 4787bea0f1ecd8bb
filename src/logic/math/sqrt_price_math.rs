use super::conversions::{exp10, u512_to_f64, widen};
use crate::logic::errors::CalculationError;
use crate::utils::constants::Q96;
use alloy_primitives::{U256, U512};

/// Converts a Q64.96 square root price to a human scale rate.
///
/// `(Q96 * Q96 * 10^decimals_out) / sqrt / sqrt / 10^decimals_in` is evaluated with integer division at every
/// step, in that order, before the single conversion to `f64`. The rounding of the intermediate quotients is
/// part of the result. With `token0_is_input` the reciprocal of `scaled / 2^96` is returned.
pub fn sqrt_price_x96_to_price(
    sqrt_price_x96: U256,
    decimals_in: u8,
    decimals_out: u8,
    token0_is_input: bool,
) -> Result<f64, CalculationError> {
    if sqrt_price_x96.is_zero() {
        return Err(CalculationError::DegenerateSwap("zero sqrt price"));
    }

    let q96 = widen(Q96);
    let sqrt_price = widen(sqrt_price_x96);
    let scaled_numerator = (q96 * q96).checked_mul(widen(exp10(decimals_out)?)).ok_or(CalculationError::Overflow)?;
    let scaled: U512 = scaled_numerator / sqrt_price / sqrt_price / widen(exp10(decimals_in)?);

    let ratio = u512_to_f64(scaled) / 2f64.powi(96);
    if token0_is_input {
        if ratio == 0.0 {
            return Err(CalculationError::DegenerateSwap("zero price for token0 input"));
        }
        Ok(1.0 / ratio)
    } else {
        Ok(ratio)
    }
}
