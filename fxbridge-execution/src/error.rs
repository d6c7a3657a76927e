use fxbridge_instrument::InstrumentName;
use thiserror::Error;

/// Errors generated when mutating the [`PositionTracker`](crate::position::PositionTracker).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum PositionError {
    #[error("position already open for instrument: {0}")]
    AlreadyOpen(InstrumentName),
}
