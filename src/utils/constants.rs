use alloy_primitives::{Address, U256, address};

/// 2^96, the Q64.96 fixed point unit.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// 2^192, the square of [`Q96`].
pub const Q192: U256 = U256::from_limbs([0, 0, 0, 1]);

/// Tick bounds supported by `getSqrtRatioAtTick`.
pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// sqrtPriceX96 at [`MIN_TICK`].
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);

/// Fee tiers are expressed in parts per million.
pub const FEE_DENOMINATOR_PPM: u32 = 1_000_000;

/// Largest pool set sent in a single slot0 multicall.
pub const DEFAULT_POOLS_PER_BATCH: usize = 250;

pub const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// Canonical Multicall3 deployment, same address on most chains.
pub const MULTICALL3: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");
