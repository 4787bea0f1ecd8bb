use super::provider::{FetchError, PriceStateProvider};
use crate::logic::types::PriceState;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use tracing::{debug, warn};

sol! {
    /// Multicall3 contract interface
    contract Multicall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) public payable returns (Result[] memory returnData);
        function getBlockNumber() public view returns (uint256 blockNumber);
    }

    interface IUniswapV3Pool {
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
    }
}

/// Read-only `eth_call` access to a chain.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    async fn call(&self, to: Address, data: Bytes, block_number: Option<u64>) -> Result<Bytes, FetchError>;
}

/// Reads `slot0().sqrtPriceX96` of many pools with a single Multicall3 `aggregate3` call.
///
/// The first sub-call asks Multicall3 for the block number, so the snapshot is tagged with the block it was read at.
pub struct MulticallPriceStateProvider<C> {
    caller: C,
    multicall_address: Address,
    block_number: Option<u64>,
}

impl<C: ContractCaller> MulticallPriceStateProvider<C> {
    pub fn new(caller: C, multicall_address: Address) -> Self {
        Self { caller, multicall_address, block_number: None }
    }

    /// Pin reads to `block_number` instead of latest.
    pub fn at_block(self, block_number: u64) -> Self {
        Self { block_number: Some(block_number), ..self }
    }

    pub fn prepare_slot0_call(pool: Address) -> Multicall3::Call3 {
        Multicall3::Call3 { target: pool, allowFailure: true, callData: IUniswapV3Pool::slot0Call {}.abi_encode().into() }
    }

    pub fn encode_aggregate3(&self, pools: &[Address]) -> Bytes {
        let mut calls = Vec::with_capacity(pools.len() + 1);
        calls.push(Multicall3::Call3 {
            target: self.multicall_address,
            allowFailure: true,
            callData: Multicall3::getBlockNumberCall {}.abi_encode().into(),
        });
        calls.extend(pools.iter().map(|pool| Self::prepare_slot0_call(*pool)));
        Multicall3::aggregate3Call { calls }.abi_encode().into()
    }
}

/// First 32-byte word of a successful sub-call.
fn first_word(result: &Multicall3::Result) -> Option<U256> {
    if !result.success || result.returnData.len() < 32 {
        return None;
    }
    Some(U256::from_be_slice(&result.returnData[..32]))
}

fn decode_sqrt_price(result: &Multicall3::Result) -> Option<U256> {
    // uint160, and an uninitialized pool reports 0
    first_word(result).filter(|sqrt_price| !sqrt_price.is_zero() && sqrt_price.bit_len() <= 160)
}

#[async_trait]
impl<C: ContractCaller> PriceStateProvider for MulticallPriceStateProvider<C> {
    async fn fetch_price_state(&self, pools: &[Address]) -> Result<PriceState, FetchError> {
        if pools.is_empty() {
            return Ok(PriceState::default());
        }

        let response = self.caller.call(self.multicall_address, self.encode_aggregate3(pools), self.block_number).await?;
        let results = Multicall3::aggregate3Call::abi_decode_returns(&response)
            .map_err(|e| FetchError::Decode(format!("aggregate3 returns: {e}")))?;
        if results.len() != pools.len() + 1 {
            return Err(FetchError::Decode(format!("expected {} results, got {}", pools.len() + 1, results.len())));
        }

        let block_number = first_word(&results[0]).and_then(|block| u64::try_from(block).ok()).or(self.block_number);

        let mut sqrt_prices = Vec::with_capacity(pools.len());
        let mut missing = Vec::new();
        for (pool, result) in pools.iter().zip(results.iter().skip(1)) {
            match decode_sqrt_price(result) {
                Some(sqrt_price) => sqrt_prices.push((*pool, sqrt_price)),
                None => missing.push(*pool),
            }
        }

        if !missing.is_empty() {
            warn!(missing = missing.len(), requested = pools.len(), "slot0 calls failed");
            return Err(FetchError::Partial { missing });
        }

        debug!(pools = pools.len(), ?block_number, "slot0 multicall done");
        let state = PriceState::from_sqrt_prices(sqrt_prices);
        Ok(match block_number {
            Some(block_number) => state.with_block_number(block_number),
            None => state,
        })
    }
}
