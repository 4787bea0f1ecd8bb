use crate::logic::types::PriceState;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("price state incomplete, {} pools missing", .missing.len())]
    Partial { missing: Vec<Address> },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("price state mixes block {expected} with block {found}")]
    InconsistentBlocks { expected: u64, found: u64 },
}

/// Source of square root price snapshots.
///
/// A fetch either returns a price for every requested pool or fails with [`FetchError::Partial`] naming the
/// pools it could not read. A partial snapshot is never returned.
#[async_trait]
pub trait PriceStateProvider: Send + Sync {
    async fn fetch_price_state(&self, pools: &[Address]) -> Result<PriceState, FetchError>;
}

/// Serves prices from a snapshot held in memory, e.g. a recorded block.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPriceStateProvider {
    snapshot: PriceState,
}

impl SnapshotPriceStateProvider {
    pub fn new(snapshot: PriceState) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl PriceStateProvider for SnapshotPriceStateProvider {
    async fn fetch_price_state(&self, pools: &[Address]) -> Result<PriceState, FetchError> {
        let missing = self.snapshot.missing(pools);
        if !missing.is_empty() {
            return Err(FetchError::Partial { missing });
        }

        let state = PriceState::from_sqrt_prices(pools.iter().filter_map(|pool| self.snapshot.get(pool).map(|price| (*pool, price))));
        Ok(match self.snapshot.block_number() {
            Some(block_number) => state.with_block_number(block_number),
            None => state,
        })
    }
}

/// Split `pools` into `ceil(n / max_per_batch)` batches of nearly equal size.
pub fn split_into_batches(pools: &[Address], max_per_batch: usize) -> Vec<Vec<Address>> {
    if pools.is_empty() {
        return Vec::new();
    }
    let max_per_batch = max_per_batch.max(1);
    let batch_count = pools.len().div_ceil(max_per_batch);
    let per_batch = pools.len().div_ceil(batch_count);
    pools.chunks(per_batch).map(<[Address]>::to_vec).collect()
}

/// Fetches large pool sets in concurrent batches through an inner provider and merges the results.
pub struct BatchedPriceStateProvider<P> {
    inner: Arc<P>,
    max_pools_per_batch: usize,
}

impl<P: PriceStateProvider + 'static> BatchedPriceStateProvider<P> {
    pub fn new(inner: P, max_pools_per_batch: usize) -> Self {
        Self { inner: Arc::new(inner), max_pools_per_batch: max_pools_per_batch.max(1) }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PriceStateProvider + 'static> PriceStateProvider for BatchedPriceStateProvider<P> {
    async fn fetch_price_state(&self, pools: &[Address]) -> Result<PriceState, FetchError> {
        let mut seen = HashSet::new();
        let unique: Vec<Address> = pools.iter().copied().filter(|pool| seen.insert(*pool)).collect();
        let batches = split_into_batches(&unique, self.max_pools_per_batch);
        debug!(pools = unique.len(), batches = batches.len(), "fetching price state in batches");

        let mut tasks = JoinSet::new();
        for batch in batches {
            let inner = self.inner.clone();
            tasks.spawn(async move { inner.fetch_price_state(&batch).await });
        }

        let mut merged = PriceState::default();
        let mut reported_missing: HashSet<Address> = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(state)) => merged = merged.merge(state)?,
                Ok(Err(FetchError::Partial { missing })) => {
                    warn!(missing = missing.len(), "batch returned a partial price state");
                    reported_missing.extend(missing);
                }
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(FetchError::Transport(format!("batch task failed: {e}"))),
            }
        }

        let missing: Vec<Address> = if reported_missing.is_empty() {
            merged.missing(&unique)
        } else {
            unique.iter().filter(|pool| reported_missing.contains(*pool)).copied().collect()
        };
        if !missing.is_empty() {
            return Err(FetchError::Partial { missing });
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use std::sync::Mutex;

    fn pools(count: usize) -> Vec<Address> {
        (0..count).map(|i| Address::left_padding_from(&(i as u64 + 1).to_be_bytes())).collect()
    }

    /// Prices every pool at its position in `pools`, except the `unknown` ones, and records the batch sizes.
    struct RecordingProvider {
        unknown: Vec<Address>,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl RecordingProvider {
        fn new(unknown: Vec<Address>) -> Self {
            Self { unknown, batch_sizes: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl PriceStateProvider for RecordingProvider {
        async fn fetch_price_state(&self, pools: &[Address]) -> Result<PriceState, FetchError> {
            self.batch_sizes.lock().unwrap().push(pools.len());
            let missing: Vec<Address> = pools.iter().filter(|pool| self.unknown.contains(pool)).copied().collect();
            if !missing.is_empty() {
                return Err(FetchError::Partial { missing });
            }
            Ok(PriceState::from_sqrt_prices(pools.iter().map(|pool| (*pool, U256::from_be_slice(pool.as_slice())))).with_block_number(5))
        }
    }

    #[test]
    fn test_split_into_batches() {
        assert!(split_into_batches(&[], 250).is_empty());

        let sizes = |n: usize, max: usize| split_into_batches(&pools(n), max).iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(sizes(10, 250), vec![10]);
        assert_eq!(sizes(250, 250), vec![250]);
        assert_eq!(sizes(251, 250), vec![126, 125]);
        assert_eq!(sizes(600, 250), vec![200, 200, 200]);
        assert_eq!(sizes(3, 0), vec![1, 1, 1]);
    }

    #[tokio::test]
    async fn test_snapshot_provider() {
        let all = pools(3);
        let snapshot = PriceState::from_sqrt_prices(all.iter().map(|pool| (*pool, U256::from(7u8)))).with_block_number(11);
        let provider = SnapshotPriceStateProvider::new(snapshot);

        let state = provider.fetch_price_state(&all[..2]).await.unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state.block_number(), Some(11));

        let unknown = Address::repeat_byte(0xee);
        let err = provider.fetch_price_state(&[all[0], unknown]).await.unwrap_err();
        assert_eq!(err, FetchError::Partial { missing: vec![unknown] });
    }

    #[tokio::test]
    async fn test_batched_provider_merges_batches() {
        let all = pools(600);
        let provider = BatchedPriceStateProvider::new(RecordingProvider::new(vec![]), 250);

        let state = provider.fetch_price_state(&all).await.unwrap();
        assert_eq!(state.len(), 600);
        assert_eq!(state.block_number(), Some(5));
        assert_eq!(state.get(&all[599]), Some(U256::from(600u64)));

        let mut sizes = provider.inner().batch_sizes.lock().unwrap().clone();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![200, 200, 200]);
    }

    #[tokio::test]
    async fn test_batched_provider_reports_partial_fetch() {
        let all = pools(300);
        let provider = BatchedPriceStateProvider::new(RecordingProvider::new(vec![all[10], all[290]]), 250);

        let err = provider.fetch_price_state(&all).await.unwrap_err();
        assert_eq!(err, FetchError::Partial { missing: vec![all[10], all[290]] });
    }

    /// Tags every batch with its own block, 100 plus the last byte of the batch's first pool.
    struct DriftingBlockProvider;

    #[async_trait]
    impl PriceStateProvider for DriftingBlockProvider {
        async fn fetch_price_state(&self, pools: &[Address]) -> Result<PriceState, FetchError> {
            let block_number = 100 + u64::from(pools[0].as_slice()[19]);
            Ok(PriceState::from_sqrt_prices(pools.iter().map(|pool| (*pool, U256::from(1u8)))).with_block_number(block_number))
        }
    }

    #[tokio::test]
    async fn test_batched_provider_rejects_mixed_blocks() {
        let all = pools(2);
        let err = BatchedPriceStateProvider::new(DriftingBlockProvider, 1).fetch_price_state(&all).await.unwrap_err();
        assert!(matches!(err, FetchError::InconsistentBlocks { .. }));

        let state = BatchedPriceStateProvider::new(DriftingBlockProvider, 2).fetch_price_state(&all).await.unwrap();
        assert_eq!(state.block_number(), Some(101));
    }

    #[tokio::test]
    async fn test_batched_provider_empty_request() {
        let provider = BatchedPriceStateProvider::new(RecordingProvider::new(vec![]), 250);
        let state = provider.fetch_price_state(&[]).await.unwrap();
        assert!(state.is_empty());
        assert!(provider.inner().batch_sizes.lock().unwrap().is_empty());
    }
}
