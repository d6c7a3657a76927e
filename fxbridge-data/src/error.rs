use fxbridge_instrument::SymbolId;
use fxbridge_integration::{DecodeError, protocol::fix::MsgType};
use thiserror::Error;

/// All errors generated in `fxbridge-data`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DataError {
    #[error("invalid bar configuration: {0}")]
    BarConfig(String),

    #[error("expected market data message, received MsgType: {0}")]
    UnexpectedMsgType(MsgType),

    #[error("market data for unknown symbol: {0}")]
    UnknownSymbol(SymbolId),

    #[error("market data for symbol {0} contains neither bid nor ask")]
    MissingPrice(SymbolId),

    #[error("invalid market data price: {0}")]
    InvalidPrice(String),

    #[error("FIX decode: {0}")]
    Decode(#[from] DecodeError),
}
