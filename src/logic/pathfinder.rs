use super::graph::{ArbPath, Hop};
use super::pools::UniswapV3Pool;
use super::types::ArbitrageConfig;
use alloy_primitives::Address;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PROGRESS_EVERY_POOLS: usize = 100;

fn share_pools(pools: &[UniswapV3Pool]) -> Vec<Arc<UniswapV3Pool>> {
    pools.iter().cloned().map(Arc::new).collect()
}

/// Find every `base -> a -> b -> base` route through three distinct pools.
///
/// Brute force over all pool triples in the given order, so the output order is deterministic for a fixed input
/// ordering. Each hop sells whatever the previous hop bought.
pub fn generate_triangular_paths(pools: &[UniswapV3Pool], base_token: Address) -> Vec<ArbPath> {
    let shared = share_pools(pools);
    let mut paths = Vec::new();

    for (i, pool_1) in shared.iter().enumerate() {
        if i % PROGRESS_EVERY_POOLS == 0 {
            debug!(scanned = i, total = shared.len(), found = paths.len(), "generating triangular paths");
        }
        let Ok(hop_1) = Hop::new(pool_1.clone(), base_token) else {
            continue;
        };

        for pool_2 in shared.iter() {
            let Ok(hop_2) = Hop::new(pool_2.clone(), hop_1.token_out()) else {
                continue;
            };

            for pool_3 in shared.iter() {
                let Ok(hop_3) = Hop::new(pool_3.clone(), hop_2.token_out()) else {
                    continue;
                };
                if hop_3.token_out() != base_token {
                    continue;
                }

                // shared pools are rejected here
                if let Ok(path) = ArbPath::new(vec![hop_1.clone(), hop_2.clone(), hop_3]) {
                    paths.push(path);
                }
            }
        }
    }

    info!(paths = paths.len(), pools = pools.len(), %base_token, "Generated 3-hop arbitrage paths");
    paths
}

/// Find every `base -> token -> base` route that buys in one pool and sells in another.
pub fn generate_two_hop_paths(pools: &[UniswapV3Pool], base_token: Address) -> Vec<ArbPath> {
    let shared = share_pools(pools);
    let mut paths = Vec::new();

    for pool_1 in shared.iter() {
        let Ok(hop_1) = Hop::new(pool_1.clone(), base_token) else {
            continue;
        };
        for pool_2 in shared.iter() {
            if pool_2.address == pool_1.address {
                continue;
            }
            let Ok(hop_2) = Hop::new(pool_2.clone(), hop_1.token_out()) else {
                continue;
            };
            if let Ok(path) = ArbPath::new(vec![hop_1.clone(), hop_2]) {
                paths.push(path);
            }
        }
    }

    info!(paths = paths.len(), pools = pools.len(), %base_token, "Generated 2-hop arbitrage paths");
    paths
}

/// Distinct pool addresses referenced by `paths`, in first-seen order.
pub fn required_pools(paths: &[ArbPath]) -> Vec<Address> {
    let mut seen = HashSet::new();
    paths.iter().flat_map(ArbPath::pool_addresses).filter(|pool| seen.insert(*pool)).collect()
}

/// Pathfinder pre-computes the routes the engine evaluates on every price update.
///
/// Runs once per pool set; routes only depend on pool metadata, never on prices.
pub struct Pathfinder {
    include_two_hop: bool,
    blacklist_tokens: Vec<Address>,
    /// Maximum number of paths to keep (to prevent memory issues)
    max_paths_limit: usize,
}

impl Pathfinder {
    pub fn new(include_two_hop: bool, blacklist_tokens: Vec<Address>, max_paths_limit: usize) -> Self {
        Self { include_two_hop, blacklist_tokens, max_paths_limit }
    }

    pub fn from_config(config: &ArbitrageConfig) -> Self {
        Self::new(config.include_two_hop, config.blacklist_tokens.clone(), config.max_paths_limit)
    }

    /// All routes from `base_token` back to itself, blacklisted tokens removed, capped at the path limit.
    pub fn find_paths(&self, pools: &[UniswapV3Pool], base_token: Address) -> Vec<ArbPath> {
        let mut paths = if self.include_two_hop { generate_two_hop_paths(pools, base_token) } else { Vec::new() };
        paths.extend(generate_triangular_paths(pools, base_token));

        let found = paths.len();
        paths.retain(|path| !path.touches_any_token(&self.blacklist_tokens));
        if paths.len() < found {
            debug!(removed = found - paths.len(), "blacklisted paths removed");
        }

        if paths.len() > self.max_paths_limit {
            warn!(limit = self.max_paths_limit, found = paths.len(), "path limit reached, dropping the remaining paths");
            paths.truncate(self.max_paths_limit);
        }

        let two_hop = paths.iter().filter(|path| path.len() == 2).count();
        info!(total = paths.len(), two_hop, three_hop = paths.len() - two_hop, "Path discovery done");
        paths
    }
}
