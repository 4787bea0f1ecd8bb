/// Data Layer
///
/// Supplies what the logic layer evaluates:
///
/// - pool metadata from a registry
/// - square root price snapshots, fetched through Multicall3 `slot0` calls in concurrent batches
///
/// Every snapshot is complete for the requested pools or the fetch fails.
pub mod config;
pub mod multicall;
pub mod provider;
pub mod registry;

pub use config::DataSyncConfig;
pub use multicall::{ContractCaller, MulticallPriceStateProvider};
pub use provider::{BatchedPriceStateProvider, FetchError, PriceStateProvider, SnapshotPriceStateProvider, split_into_batches};
pub use registry::{JsonPoolRegistry, PoolRegistry};
