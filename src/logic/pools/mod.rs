pub mod pool;

pub use pool::UniswapV3Pool;
