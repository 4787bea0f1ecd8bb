use crate::logic::errors::CalculationError;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Concentrated liquidity pool metadata as supplied by the pool registry.
///
/// `liquidity` must describe the same block as any price state the pool is later simulated against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniswapV3Pool {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    /// Fee tier in parts per million, 3000 = 0.3%
    pub fee: u32,
    pub decimals0: u8,
    pub decimals1: u8,
    pub liquidity: u128,
}

impl UniswapV3Pool {
    pub fn new(
        address: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        decimals0: u8,
        decimals1: u8,
        liquidity: u128,
    ) -> Result<Self, CalculationError> {
        let pool = Self { address, token0, token1, fee, decimals0, decimals1, liquidity };
        pool.validate()?;
        Ok(pool)
    }

    pub fn validate(&self) -> Result<(), CalculationError> {
        if self.token0 == self.token1 {
            return Err(CalculationError::InvalidPool(format!("pool {} has identical tokens {}", self.address, self.token0)));
        }
        Ok(())
    }

    pub fn has_token(&self, token: &Address) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// The token received when `token_in` is sold into this pool.
    pub fn other_token(&self, token_in: &Address) -> Option<Address> {
        if self.token0 == *token_in {
            Some(self.token1)
        } else if self.token1 == *token_in {
            Some(self.token0)
        } else {
            None
        }
    }

    pub fn is_token0(&self, token: &Address) -> bool {
        self.token0 == *token
    }

    pub fn decimals_of(&self, token: &Address) -> Option<u8> {
        if self.token0 == *token {
            Some(self.decimals0)
        } else if self.token1 == *token {
            Some(self.decimals1)
        } else {
            None
        }
    }
}

impl Display for UniswapV3Pool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "UniswapV3(fee={})@{}", self.fee, self.address)
    }
}

impl Hash for UniswapV3Pool {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

impl PartialEq for UniswapV3Pool {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for UniswapV3Pool {}
