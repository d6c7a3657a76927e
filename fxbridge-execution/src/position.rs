use crate::{
    error::PositionError,
    order::{id::ClientOrderId, request::OrderRequestOpen},
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use fnv::FnvHashMap;
use fxbridge_data::Tick;
use fxbridge_instrument::{InstrumentName, InstrumentParams, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Open position with its stop loss & take profit levels.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub instrument: InstrumentName,
    pub side: Side,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub opened_at: DateTime<Utc>,
    pub cid: ClientOrderId,
    pub precision: u32,
}

impl Position {
    pub fn from_request(request: &OrderRequestOpen, opened_at: DateTime<Utc>) -> Self {
        Self {
            instrument: request.instrument.clone(),
            side: request.side,
            entry_price: request.price_fill,
            stop_loss: request.stop_loss,
            take_profit: request.take_profit,
            opened_at,
            cid: request.cid.clone(),
            precision: request.precision,
        }
    }

    /// Determine if the provided [`Tick`] triggers an exit.
    ///
    /// Buys exit on the bid reaching the stop loss, else the ask reaching the take profit. Sells
    /// exit on the ask reaching the stop loss, else the bid reaching the take profit. When both
    /// levels are crossed by the same tick the stop loss wins.
    pub fn exit_reason(&self, tick: &Tick) -> Option<ExitReason> {
        let (stop_hit, take_hit) = match self.side {
            Side::Buy => (tick.bid <= self.stop_loss, tick.ask >= self.take_profit),
            Side::Sell => (tick.ask >= self.stop_loss, tick.bid <= self.take_profit),
        };

        if stop_hit {
            Some(ExitReason::StopLoss)
        } else if take_hit {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Display)]
pub enum ExitReason {
    #[display("SL")]
    StopLoss,
    #[display("TP")]
    TakeProfit,
}

/// [`Position`] closed by a stop loss or take profit.
///
/// The exit price is the triggered level and the pips are the configured stop loss / take
/// profit distance, negative for a stop loss.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct PositionExited {
    pub position: Position,
    pub reason: ExitReason,
    pub price_exit: Decimal,
    pub pips: Decimal,
    pub time_exit: DateTime<Utc>,
}

impl PositionExited {
    fn new(
        position: Position,
        reason: ExitReason,
        params: &InstrumentParams,
        time: DateTime<Utc>,
    ) -> Self {
        let (price_exit, pips) = match reason {
            ExitReason::StopLoss => (position.stop_loss, -params.stop_loss_pips),
            ExitReason::TakeProfit => (position.take_profit, params.take_profit_pips),
        };

        Self {
            position,
            reason,
            price_exit,
            pips,
            time_exit: time,
        }
    }
}

/// At most one open [`Position`] per instrument.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    positions: FnvHashMap<InstrumentName, Position>,
}

impl PositionTracker {
    pub fn open(&mut self, position: Position) -> Result<(), PositionError> {
        if self.positions.contains_key(&position.instrument) {
            return Err(PositionError::AlreadyOpen(position.instrument));
        }

        info!(
            instrument = %position.instrument,
            side = %position.side,
            entry_price = %position.entry_price,
            stop_loss = %position.stop_loss,
            take_profit = %position.take_profit,
            "position opened"
        );

        self.positions.insert(position.instrument.clone(), position);
        Ok(())
    }

    pub fn remove(&mut self, instrument: &InstrumentName) -> Option<Position> {
        self.positions.remove(instrument)
    }

    pub fn contains(&self, instrument: &InstrumentName) -> bool {
        self.positions.contains_key(instrument)
    }

    pub fn get(&self, instrument: &InstrumentName) -> Option<&Position> {
        self.positions.get(instrument)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check the open [`Position`] for the [`Tick`] instrument against the tick prices, removing
    /// and returning it as a [`PositionExited`] if a level was reached.
    pub fn check_exit(&mut self, tick: &Tick, params: &InstrumentParams) -> Option<PositionExited> {
        let reason = self.positions.get(&tick.instrument)?.exit_reason(tick)?;
        let position = self.positions.remove(&tick.instrument)?;
        let exited = PositionExited::new(position, reason, params, tick.time);

        info!(
            instrument = %exited.position.instrument,
            side = %exited.position.side,
            %reason,
            price_exit = %exited.price_exit,
            pips = %exited.pips,
            "position closed"
        );

        Some(exited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn gbp_jpy() -> InstrumentName {
        InstrumentName::from("GBP_JPY")
    }

    fn params() -> InstrumentParams {
        InstrumentParams {
            tolerance_pips: dec!(29.8),
            stop_loss_pips: dec!(49.01),
            take_profit_pips: dec!(149.35),
            pip_value: dec!(0.01),
            slippage: dec!(0.02),
            spread: dec!(0.02),
            commission: dec!(0.5),
        }
    }

    fn time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    fn position(side: Side) -> Position {
        let (stop_loss, take_profit) = match side {
            Side::Buy => (dec!(149.555), dec!(151.539)),
            Side::Sell => (dec!(150.495), dec!(148.512)),
        };

        Position {
            instrument: gbp_jpy(),
            side,
            entry_price: dec!(150.045),
            stop_loss,
            take_profit,
            opened_at: time(),
            cid: ClientOrderId::new("cid"),
            precision: 3,
        }
    }

    fn tick(bid: Decimal, ask: Decimal) -> Tick {
        Tick::new(gbp_jpy(), time(), bid, ask)
    }

    #[test]
    fn test_position_exit_reason() {
        struct TestCase {
            side: Side,
            tick: Tick,
            expected: Option<ExitReason>,
        }

        let tests = vec![
            TestCase {
                // TC0: buy between levels
                side: Side::Buy,
                tick: tick(dec!(150.000), dec!(150.020)),
                expected: None,
            },
            TestCase {
                // TC1: buy bid at stop loss
                side: Side::Buy,
                tick: tick(dec!(149.555), dec!(149.575)),
                expected: Some(ExitReason::StopLoss),
            },
            TestCase {
                // TC2: buy ask at take profit
                side: Side::Buy,
                tick: tick(dec!(151.520), dec!(151.539)),
                expected: Some(ExitReason::TakeProfit),
            },
            TestCase {
                // TC3: buy ask above take profit with bid below stop loss, stop loss wins
                side: Side::Buy,
                tick: tick(dec!(149.000), dec!(152.000)),
                expected: Some(ExitReason::StopLoss),
            },
            TestCase {
                // TC4: sell ask above stop loss
                side: Side::Sell,
                tick: tick(dec!(150.480), dec!(150.500)),
                expected: Some(ExitReason::StopLoss),
            },
            TestCase {
                // TC5: sell bid at take profit
                side: Side::Sell,
                tick: tick(dec!(148.512), dec!(148.532)),
                expected: Some(ExitReason::TakeProfit),
            },
            TestCase {
                // TC6: sell both crossed, stop loss wins
                side: Side::Sell,
                tick: tick(dec!(148.000), dec!(151.000)),
                expected: Some(ExitReason::StopLoss),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = position(test.side).exit_reason(&test.tick);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_position_tracker_open_rejects_duplicate_instrument() {
        let mut tracker = PositionTracker::default();

        assert_eq!(tracker.open(position(Side::Buy)), Ok(()));
        assert_eq!(
            tracker.open(position(Side::Sell)),
            Err(PositionError::AlreadyOpen(gbp_jpy()))
        );
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get(&gbp_jpy()).map(|p| p.side), Some(Side::Buy));
    }

    #[test]
    fn test_position_tracker_check_exit() {
        struct TestCase {
            side: Side,
            tick: Tick,
            expected: Option<(ExitReason, Decimal, Decimal)>,
        }

        let tests = vec![
            TestCase {
                // TC0: no exit keeps the position open
                side: Side::Buy,
                tick: tick(dec!(150.000), dec!(150.020)),
                expected: None,
            },
            TestCase {
                // TC1: buy stop loss exits at the stop loss level
                side: Side::Buy,
                tick: tick(dec!(149.500), dec!(149.520)),
                expected: Some((ExitReason::StopLoss, dec!(149.555), dec!(-49.01))),
            },
            TestCase {
                // TC2: sell take profit exits at the take profit level
                side: Side::Sell,
                tick: tick(dec!(148.400), dec!(148.420)),
                expected: Some((ExitReason::TakeProfit, dec!(148.512), dec!(149.35))),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut tracker = PositionTracker::default();
            tracker.open(position(test.side)).unwrap();

            let actual = tracker
                .check_exit(&test.tick, &params())
                .map(|exited| (exited.reason, exited.price_exit, exited.pips));
            assert_eq!(actual, test.expected, "TC{} failed", index);
            assert_eq!(
                tracker.contains(&gbp_jpy()),
                test.expected.is_none(),
                "TC{} failed",
                index
            );
        }
    }

    #[test]
    fn test_position_from_request() {
        let request = OrderRequestOpen {
            cid: ClientOrderId::new("cid"),
            instrument: gbp_jpy(),
            symbol: fxbridge_instrument::SymbolId(2),
            currency: None,
            side: Side::Buy,
            quantity: dec!(0.01),
            price_fill: dec!(150.045),
            stop_loss: dec!(149.555),
            take_profit: dec!(151.539),
            precision: 3,
        };

        assert_eq!(Position::from_request(&request, time()), position(Side::Buy));
    }
}
