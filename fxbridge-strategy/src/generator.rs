use crate::Signal;
use fxbridge_data::Bar;
use fxbridge_instrument::{InstrumentParams, Side};

/// Interface for evaluating the two most recent [`Bar`]s of an instrument into at most one
/// [`Signal`].
pub trait SignalGenerator {
    fn generate_signal(
        &self,
        previous: &Bar,
        latest: &Bar,
        params: &InstrumentParams,
    ) -> Option<Signal>;
}

/// Equal highs / equal lows reversal pattern.
///
/// Two consecutive bars whose lows are within tolerance, with a bullish latest bar, generate a
/// [`Side::Buy`] at the latest ask. Two bars whose highs are within tolerance, with a bearish
/// latest bar, generate a [`Side::Sell`] at the latest bid.
#[derive(Debug, Copy, Clone, Default)]
pub struct EqualHighsLows;

impl SignalGenerator for EqualHighsLows {
    fn generate_signal(
        &self,
        previous: &Bar,
        latest: &Bar,
        params: &InstrumentParams,
    ) -> Option<Signal> {
        let tolerance = params.tolerance_price();
        let equal_high = (latest.high - previous.high).abs() < tolerance;
        let equal_low = (latest.low - previous.low).abs() < tolerance;

        let (side, reference_price) = if equal_low && latest.is_bullish() {
            (Side::Buy, latest.last_ask)
        } else if equal_high && latest.is_bearish() {
            (Side::Sell, latest.last_bid)
        } else {
            return None;
        };

        Some(Signal::new(
            latest.instrument.clone(),
            side,
            reference_price,
            latest.window_start,
        ))
    }
}
