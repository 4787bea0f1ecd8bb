use alloy_primitives::{Address, I256};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use v3_tri_arb::{
    ArbitrageConfig, PriceState, ProfitCalculator, UniswapV3Pool, generate_triangular_paths, optimize_amount_in,
    required_pools, simulate_path, tick_to_sqrt_price_x96,
};

fn triangle() -> (Vec<UniswapV3Pool>, PriceState) {
    let token = Address::repeat_byte;
    let pools = vec![
        UniswapV3Pool::new(token(0x11), token(1), token(2), 500, 18, 6, 10u128.pow(24)).unwrap(),
        UniswapV3Pool::new(token(0x12), token(2), token(3), 3000, 6, 18, 5 * 10u128.pow(22)).unwrap(),
        UniswapV3Pool::new(token(0x13), token(3), token(1), 10000, 18, 18, 10u128.pow(21)).unwrap(),
    ];
    let state = PriceState::from_sqrt_prices([
        (token(0x11), tick_to_sqrt_price_x96(-300_000).unwrap()),
        (token(0x12), tick_to_sqrt_price_x96(250_000).unwrap()),
        (token(0x13), tick_to_sqrt_price_x96(-30_000).unwrap()),
    ]);
    (pools, state)
}

fn benchmark_optimizer(c: &mut Criterion) {
    let (pools, state) = triangle();
    let paths = generate_triangular_paths(&pools, Address::repeat_byte(1));
    assert_eq!(required_pools(&paths).len(), 3);
    let amount_in = I256::try_from(10i64.pow(18)).unwrap();

    c.bench_function("tick_to_sqrt_price_x96", |b| b.iter(|| tick_to_sqrt_price_x96(black_box(-300_000))));

    c.bench_function("simulate_path", |b| {
        b.iter(|| simulate_path(black_box(&paths[0]), black_box(amount_in), black_box(&state)))
    });

    c.bench_function("optimize_amount_in", |b| {
        b.iter(|| optimize_amount_in(black_box(&paths[0]), black_box(10_000), black_box(100), black_box(&state)))
    });

    // many copies of the same routes to load the rayon pool
    let many_paths: Vec<_> = paths.iter().cycle().take(2_000).cloned().collect();
    let calculator = ProfitCalculator::new(ArbitrageConfig::default());
    c.bench_function("calculate_profits_parallel", |b| {
        b.iter(|| calculator.calculate_profits_parallel(black_box(&many_paths), black_box(&state)))
    });
}

criterion_group!(benches, benchmark_optimizer);
criterion_main!(benches);
