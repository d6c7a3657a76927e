use chrono::{DateTime, Utc};
use derive_more::Constructor;
use fxbridge_instrument::InstrumentName;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top of book quote received on the quote session.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Tick {
    pub instrument: InstrumentName,
    pub time: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
}
