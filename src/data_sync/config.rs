use crate::utils::constants::{DEFAULT_POOLS_PER_BATCH, MULTICALL3};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Configuration for the data synchronization layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSyncConfig {
    /// Multicall3 contract the slot0 calls are aggregated through
    pub multicall_address: Address,
    /// Maximum number of pools to query in a single Multicall batch
    pub max_pools_per_batch: usize,
    /// Pool registry file (JSON array of pools)
    pub pools_file: Option<String>,
}

impl Default for DataSyncConfig {
    fn default() -> Self {
        Self { multicall_address: MULTICALL3, max_pools_per_batch: DEFAULT_POOLS_PER_BATCH, pools_file: None }
    }
}

impl DataSyncConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Ok(multicall_address) = std::env::var("MULTICALL_ADDRESS") {
            config.multicall_address =
                multicall_address.parse().map_err(|e| eyre::eyre!("Invalid MULTICALL_ADDRESS: {}", e))?;
        }

        if let Ok(max_pools_str) = std::env::var("MAX_POOLS_PER_BATCH") {
            config.max_pools_per_batch =
                max_pools_str.parse().map_err(|e| eyre::eyre!("Invalid MAX_POOLS_PER_BATCH: {}", e))?;
        }

        if let Ok(pools_file) = std::env::var("POOLS_FILE") {
            config.pools_file = Some(pools_file);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        if self.max_pools_per_batch == 0 {
            return Err(eyre::eyre!("max_pools_per_batch must be positive"));
        }
        Ok(())
    }
}
