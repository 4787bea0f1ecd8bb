use crate::logic::pools::UniswapV3Pool;
use eyre::{Result, WrapErr, eyre};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Source of pool metadata (tokens, fee tier, decimals, liquidity).
pub trait PoolRegistry {
    fn load_pools(&self) -> Result<Vec<UniswapV3Pool>>;
}

/// Pools stored as a JSON array, in the order the path finder should scan them.
pub struct JsonPoolRegistry {
    path: PathBuf,
}

impl JsonPoolRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse and validate a JSON array of pools.
    pub fn parse(json: &str) -> Result<Vec<UniswapV3Pool>> {
        let pools: Vec<UniswapV3Pool> = serde_json::from_str(json).wrap_err("invalid pool registry json")?;

        let mut addresses = HashSet::with_capacity(pools.len());
        for pool in &pools {
            pool.validate()?;
            if !addresses.insert(pool.address) {
                return Err(eyre!("duplicate pool {} in registry", pool.address));
            }
        }
        Ok(pools)
    }

    /// Write pools in the format [`JsonPoolRegistry::parse`] reads.
    pub fn save_pools(&self, pools: &[UniswapV3Pool]) -> Result<()> {
        let json = serde_json::to_string_pretty(pools)?;
        fs::write(&self.path, json).wrap_err_with(|| format!("failed to write {}", self.path.display()))
    }
}

impl PoolRegistry for JsonPoolRegistry {
    fn load_pools(&self) -> Result<Vec<UniswapV3Pool>> {
        let json = fs::read_to_string(&self.path).wrap_err_with(|| format!("failed to read {}", self.path.display()))?;
        let pools = Self::parse(&json)?;
        info!(pools = pools.len(), path = %self.path.display(), "Loaded pool registry");
        Ok(pools)
    }
}
