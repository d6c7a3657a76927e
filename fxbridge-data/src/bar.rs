use crate::tick::Tick;
use chrono::{DateTime, Utc};
use fxbridge_instrument::InstrumentName;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLC aggregate of tick bid prices over `[window_start, window_start + width)`.
///
/// `last_bid` & `last_ask` are the quote of the final tick in the window, and are used as the
/// reference price of any signal generated from this bar.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Bar {
    pub instrument: InstrumentName,
    pub window_start: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub last_bid: Decimal,
    pub last_ask: Decimal,
}

impl Bar {
    /// Build a [`Bar`] from ticks already ordered by time.
    ///
    /// Returns `None` if there are no ticks.
    pub fn from_ticks<'a, Iter>(
        instrument: InstrumentName,
        window_start: DateTime<Utc>,
        ticks: Iter,
    ) -> Option<Self>
    where
        Iter: IntoIterator<Item = &'a Tick>,
    {
        let mut ticks = ticks.into_iter();
        let first = ticks.next()?;

        let bar = Self {
            instrument,
            window_start,
            open: first.bid,
            high: first.bid,
            low: first.bid,
            close: first.bid,
            last_bid: first.bid,
            last_ask: first.ask,
        };

        Some(ticks.fold(bar, |mut bar, tick| {
            bar.high = bar.high.max(tick.bid);
            bar.low = bar.low.min(tick.bid);
            bar.close = tick.bid;
            bar.last_bid = tick.bid;
            bar.last_ask = tick.ask;
            bar
        }))
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}
