use crate::data_sync::FetchError;
use alloy_primitives::Address;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("tick {tick} outside of [MIN_TICK, MAX_TICK]")]
    OutOfRange { tick: i32 },
    #[error("no price state for pool {0}")]
    MissingPriceState(Address),
    #[error("degenerate swap: {0}")]
    DegenerateSwap(&'static str),
    #[error("arithmetic overflow")]
    Overflow,
    #[error("invalid route: {0}")]
    InvalidRoute(String),
    #[error("invalid pool: {0}")]
    InvalidPool(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl CalculationError {
    /// Outcomes the optimizers read as "unprofitable" instead of a failure.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, CalculationError::DegenerateSwap(_))
    }
}
