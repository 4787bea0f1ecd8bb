use crate::logic::errors::CalculationError;
use crate::utils::constants::{MAX_TICK, MIN_TICK, Q192};
use alloy_primitives::U256;

/// `1 / sqrt(1.0001^(2^i))` in Q128.128 for bits 1..=19 of `|tick|`. Bit 0 seeds the accumulator.
const RATIO_MULTIPLIERS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

const TICK_ONE_MULTIPLIER: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// Calculates `sqrt(1.0001^tick) * 2^96`.
///
/// Non-positive ticks reproduce `TickMath.getSqrtRatioAtTick` bit for bit (the Q128.128 accumulator is
/// shifted down by 32 bits, rounding up). Positive ticks are the integer inverse `2^192 / ratio` of the
/// mirrored tick, so `f(t) * f(-t)` never exceeds `2^192` and falls short of it by less than `f(-t)`.
pub fn tick_to_sqrt_price_x96(tick: i32) -> Result<U256, CalculationError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(CalculationError::OutOfRange { tick });
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 { U256::from(TICK_ONE_MULTIPLIER) } else { U256::from(1u8) << 128 };
    for (bit, multiplier) in RATIO_MULTIPLIERS.iter().enumerate() {
        if abs_tick & (0x2 << bit) != 0 {
            // both factors are below 2^129, the product fits in 256 bits
            ratio = (ratio * U256::from(*multiplier)) >> 128;
        }
    }

    let round_up = if ratio & U256::from(u32::MAX) != U256::ZERO { U256::from(1u8) } else { U256::ZERO };
    let sqrt_price_x96 = (ratio >> 32) + round_up;

    if tick > 0 {
        return Ok(Q192 / sqrt_price_x96);
    }
    Ok(sqrt_price_x96)
}
