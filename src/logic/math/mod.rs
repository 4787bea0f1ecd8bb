//! Uniswap V3 price and swap arithmetic.

mod conversions;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;

pub(crate) use conversions::{exp10, f64_to_i256, ratio_to_f64, u256_to_f64};
pub use sqrt_price_math::sqrt_price_x96_to_price;
pub use swap_math::{compute_amount_in, compute_amount_out, compute_amount_out_with_price_target, search_max_amount_in_within_slippage};
pub use tick_math::tick_to_sqrt_price_x96;
