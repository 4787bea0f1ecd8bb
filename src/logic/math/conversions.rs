//! Bridges between the big integer types and `f64`.
//!
//! Several quantities in the price pipeline are compared or chained as doubles, so the
//! conversions here are correctly rounded and the float helpers follow floored-division
//! semantics rather than Rust's truncating `%`.

use crate::logic::errors::CalculationError;
use alloy_primitives::{I256, Sign, U256, U512};

const TWO_POW_127: f64 = 170141183460469231731687303715884105728.0;

pub(crate) fn widen(value: U256) -> U512 {
    U512::from_limbs_slice(value.as_limbs())
}

pub(crate) fn narrow(value: U512) -> Result<U256, CalculationError> {
    U256::checked_from_limbs_slice(value.as_limbs()).ok_or(CalculationError::Overflow)
}

/// `10^decimals`, failing once it leaves 256 bits (78 decimals and up).
pub(crate) fn exp10(decimals: u8) -> Result<U256, CalculationError> {
    U256::from(10u8).checked_pow(U256::from(decimals)).ok_or(CalculationError::Overflow)
}

pub(crate) fn signed(sign: Sign, abs: U256) -> Result<I256, CalculationError> {
    I256::checked_from_sign_and_abs(sign, abs).ok_or(CalculationError::Overflow)
}

/// Correctly rounded, decimal strings parse to the nearest double.
pub(crate) fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::INFINITY)
}

pub(crate) fn u512_to_f64(value: U512) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::INFINITY)
}

pub(crate) fn i256_to_f64(value: I256) -> f64 {
    let (sign, abs) = value.into_sign_and_abs();
    let magnitude = u256_to_f64(abs);
    if sign.is_negative() { -magnitude } else { magnitude }
}

/// `numerator / denominator` rounded once to the nearest double.
///
/// The quotient is taken with 65 to 67 significant bits plus a sticky bit for the remainder, so the final
/// conversion to `f64` rounds exactly as a single division of the exact rational would.
pub(crate) fn ratio_to_f64(numerator: I256, denominator: U256) -> f64 {
    let (sign, abs) = numerator.into_sign_and_abs();
    if abs.is_zero() {
        return 0.0;
    }
    if denominator.is_zero() {
        return if sign.is_negative() { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let shift = 66 - (abs.bit_len() as i32 - denominator.bit_len() as i32);
    let (num, den) = if shift >= 0 {
        (widen(abs) << shift as usize, widen(denominator))
    } else {
        (widen(abs), widen(denominator) << (-shift) as usize)
    };
    let mut quotient = num / den;
    if !(num % den).is_zero() {
        quotient |= U512::from(1u8);
    }

    let magnitude = u512_to_f64(quotient) * 2f64.powi(-shift);
    if sign.is_negative() { -magnitude } else { magnitude }
}

/// Truncate toward zero and convert exactly.
pub(crate) fn f64_to_i256(value: f64) -> Result<I256, CalculationError> {
    if !value.is_finite() {
        return Err(CalculationError::Overflow);
    }
    let truncated = value.trunc();
    if truncated.abs() < TWO_POW_127 {
        return I256::try_from(truncated as i128).map_err(|_| CalculationError::Overflow);
    }

    // |value| >= 2^127, so the exponent is positive and the value is an integer
    let bits = truncated.abs().to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as usize - 1075;
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    if exponent + 53 > 255 {
        return Err(CalculationError::Overflow);
    }
    let abs = U256::from(mantissa) << exponent;
    let sign = if truncated.is_sign_negative() { Sign::Negative } else { Sign::Positive };
    signed(sign, abs)
}

/// Floored float division: the quotient is rounded toward negative infinity, computed from
/// the floating remainder so it agrees with `a - (a mod b)` exactly.
pub(crate) fn floor_div_f64(numerator: f64, denominator: f64) -> Result<f64, CalculationError> {
    if denominator == 0.0 {
        return Err(CalculationError::DegenerateSwap("float division by zero"));
    }
    let rem = numerator % denominator;
    let mut div = (numerator - rem) / denominator;
    if rem != 0.0 && (denominator < 0.0) != (rem < 0.0) {
        div -= 1.0;
    }
    if div == 0.0 {
        return Ok(0.0f64.copysign(numerator / denominator));
    }
    let mut floor = div.floor();
    if div - floor > 0.5 {
        floor += 1.0;
    }
    Ok(floor)
}
