//! End-to-end tests for the logic layer
//!
//! Three pools over tokens A (18 decimals), B (6 decimals) and C (18 decimals), priced from ticks. Expected
//! amounts are pinned; they include the effect of simulating each hop against its own human scale price.
use super::*;
use crate::data_sync::{BatchedPriceStateProvider, FetchError, JsonPoolRegistry, SnapshotPriceStateProvider};
use crate::logic::math::tick_to_sqrt_price_x96;
use alloy_primitives::{Address, I256, U256};
use eyre::Result;
use lazy_static::lazy_static;
use std::str::FromStr;

lazy_static! {
    static ref TOKEN_A: Address = Address::repeat_byte(0x01);
    static ref TOKEN_B: Address = Address::repeat_byte(0x02);
    static ref TOKEN_C: Address = Address::repeat_byte(0x03);
    static ref POOL_AB: Address = Address::repeat_byte(0x11);
    static ref POOL_BC: Address = Address::repeat_byte(0x12);
    static ref POOL_CA: Address = Address::repeat_byte(0x13);
    static ref POOLS: Vec<UniswapV3Pool> = vec![
        UniswapV3Pool::new(*POOL_AB, *TOKEN_A, *TOKEN_B, 500, 18, 6, 10u128.pow(24)).unwrap(),
        UniswapV3Pool::new(*POOL_BC, *TOKEN_B, *TOKEN_C, 3000, 6, 18, 5 * 10u128.pow(22)).unwrap(),
        UniswapV3Pool::new(*POOL_CA, *TOKEN_C, *TOKEN_A, 10000, 18, 18, 10u128.pow(21)).unwrap(),
    ];
    static ref PRICE_STATE: PriceState = PriceState::from_sqrt_prices([
        (*POOL_AB, tick_to_sqrt_price_x96(-300_000).unwrap()),
        (*POOL_BC, tick_to_sqrt_price_x96(250_000).unwrap()),
        (*POOL_CA, tick_to_sqrt_price_x96(-30_000).unwrap()),
    ])
    .with_block_number(19_500_000);
    static ref PATHS: Vec<ArbPath> = generate_triangular_paths(&POOLS, *TOKEN_A);
}

fn int(value: &str) -> I256 {
    I256::from_str(value).unwrap()
}

fn forward_path() -> &'static ArbPath {
    &PATHS[0]
}

fn reverse_path() -> &'static ArbPath {
    &PATHS[1]
}

const REVERSE_OUTPUT: &str = "7922663895517556835880143300538980195963574062940160";

#[test]
fn test_tick_prices() {
    assert_eq!(PRICE_STATE.get(&POOL_AB), Some(U256::from_str("24254261426760301279129").unwrap()));
    assert_eq!(PRICE_STATE.get(&POOL_BC), Some(U256::from_str("21246587762933397357449835037778614").unwrap()));
    assert_eq!(PRICE_STATE.get(&POOL_CA), Some(U256::from_str("17679518415848078729890725252").unwrap()));
}

#[test]
fn test_fixture_routes() {
    assert_eq!(PATHS.len(), 2);
    assert_eq!(forward_path().tokens(), vec![*TOKEN_A, *TOKEN_B, *TOKEN_C, *TOKEN_A]);
    assert_eq!(reverse_path().tokens(), vec![*TOKEN_A, *TOKEN_C, *TOKEN_B, *TOKEN_A]);
    assert_eq!(required_pools(&PATHS), vec![*POOL_AB, *POOL_BC, *POOL_CA]);
    assert_eq!(forward_path().base_decimals(), 18);
}

#[test]
fn test_forward_route_outputs() {
    assert_eq!(simulate_path(forward_path(), I256::ZERO, &PRICE_STATE).unwrap(), I256::ZERO);
    assert_eq!(simulate_path(forward_path(), int("1000000000000000000"), &PRICE_STATE).unwrap(), int("-15000000000"));
    assert_eq!(simulate_path_human(forward_path(), 5.0, &PRICE_STATE).unwrap(), int("-75000000000"));
}

#[test]
fn test_reverse_route_outputs() {
    // the output does not depend on the input, the fees vanish in the rounding of the gross amounts
    assert_eq!(simulate_path(reverse_path(), I256::ZERO, &PRICE_STATE).unwrap(), int(REVERSE_OUTPUT));
    assert_eq!(simulate_path_human(reverse_path(), 5.0, &PRICE_STATE).unwrap(), int(REVERSE_OUTPUT));
}

#[test]
fn test_optimizer_on_fixture() {
    let forward = optimize_amount_in(forward_path(), 1000, 100, &PRICE_STATE).unwrap();
    assert_eq!(forward, OptimizedAmount::zero());

    let reverse = optimize_amount_in(reverse_path(), 1000, 100, &PRICE_STATE).unwrap();
    assert_eq!(reverse.amount_in, 0);
    assert_eq!(reverse.profit_raw, int(REVERSE_OUTPUT));
    assert_eq!(reverse.profit, 7.922663895517557e33);
}

#[test]
fn test_degenerate_hop_ends_the_scan() {
    // at tick 1200 the token0 input price of C/A rounds to zero
    let state = PriceState::from_sqrt_prices([
        (*POOL_AB, PRICE_STATE.get(&POOL_AB).unwrap()),
        (*POOL_BC, PRICE_STATE.get(&POOL_BC).unwrap()),
        (*POOL_CA, tick_to_sqrt_price_x96(1200).unwrap()),
    ]);

    assert!(simulate_path(forward_path(), I256::ZERO, &state).unwrap_err().is_degenerate());
    assert_eq!(optimize_amount_in(forward_path(), 1000, 100, &state).unwrap(), OptimizedAmount::zero());
}

#[test]
fn test_missing_pool_fails_each_route() {
    let state = PriceState::from_sqrt_prices([
        (*POOL_AB, PRICE_STATE.get(&POOL_AB).unwrap()),
        (*POOL_CA, PRICE_STATE.get(&POOL_CA).unwrap()),
    ]);

    let results = ProfitCalculator::new(ArbitrageConfig::default()).calculate_profits_parallel(&PATHS, &state);
    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(!result.calculation_successful);
        assert_eq!(result.error, Some(CalculationError::MissingPriceState(*POOL_BC)));
        assert!(result.to_opportunity(0.0).is_none());
    }
}

#[tokio::test]
async fn test_engine_end_to_end() -> Result<()> {
    let registry_json = serde_json::to_string(&*POOLS)?;
    let pools = JsonPoolRegistry::parse(&registry_json)?;

    let mut engine = ArbitrageEngineBuilder::new().with_base_token(*TOKEN_A).with_scan(1000, 100).build();
    engine.initialize(&pools)?;
    assert_eq!(engine.required_pools(), &[*POOL_AB, *POOL_BC, *POOL_CA]);

    let provider = BatchedPriceStateProvider::new(SnapshotPriceStateProvider::new(PRICE_STATE.clone()), 2);
    let opportunities = engine.run_once(&provider).await?;

    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0].path, *reverse_path());
    assert_eq!(opportunities[0].profit_raw, int(REVERSE_OUTPUT));
    assert_eq!(opportunities[0].block_number, Some(19_500_000));
    Ok(())
}

#[tokio::test]
async fn test_engine_partial_fetch() -> Result<()> {
    let mut engine = ArbitrageEngineBuilder::new().with_base_token(*TOKEN_A).build();
    engine.initialize(&POOLS)?;

    let snapshot = PriceState::from_sqrt_prices([(*POOL_AB, PRICE_STATE.get(&POOL_AB).unwrap())]);
    let provider = BatchedPriceStateProvider::new(SnapshotPriceStateProvider::new(snapshot), 1);
    let err = engine.run_once(&provider).await.unwrap_err();

    assert_eq!(
        err.downcast_ref::<CalculationError>(),
        Some(&CalculationError::Fetch(FetchError::Partial { missing: vec![*POOL_BC, *POOL_CA] }))
    );
    Ok(())
}
