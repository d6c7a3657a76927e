use thiserror::Error;

/// All errors generated in `fxbridge-strategy`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum StrategyError {
    #[error("invalid trading hours: {0}")]
    TradingHours(String),
}
