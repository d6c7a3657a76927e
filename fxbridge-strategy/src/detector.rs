use crate::{
    Signal,
    generator::{EqualHighsLows, SignalGenerator},
    hours::TradingHours,
};
use chrono::{DateTime, Utc};
use fxbridge_data::MarketAggregator;
use fxbridge_instrument::{InstrumentName, InstrumentParams};
use tracing::{debug, info};

/// Applies the detection preconditions before consulting the [`SignalGenerator`]:
/// - at least two bars have been built for the instrument.
/// - `now` is outside the restricted [`TradingHours`].
/// - the instrument has no open position.
///
/// Unmet preconditions mean "not ready", not an error.
#[derive(Debug, Clone)]
pub struct SignalDetector<Generator = EqualHighsLows> {
    pub generator: Generator,
    pub hours: TradingHours,
}

impl SignalDetector {
    pub fn new(hours: TradingHours) -> Self {
        Self {
            generator: EqualHighsLows,
            hours,
        }
    }
}

impl<Generator> SignalDetector<Generator>
where
    Generator: SignalGenerator,
{
    pub fn with_generator(generator: Generator, hours: TradingHours) -> Self {
        Self { generator, hours }
    }

    pub fn detect(
        &self,
        instrument: &InstrumentName,
        aggregator: &MarketAggregator,
        params: &InstrumentParams,
        has_open_position: bool,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        let Some((previous, latest)) = aggregator.latest_pair(instrument) else {
            debug!(
                %instrument,
                bars = aggregator.bar_count(instrument),
                "signal detection requires at least 2 bars"
            );
            return None;
        };

        if self.hours.is_restricted(now) {
            debug!(
                %instrument,
                start_hour = self.hours.start_hour,
                end_hour = self.hours.end_hour,
                "signal detection skipped during restricted trading hours"
            );
            return None;
        }

        if has_open_position {
            debug!(%instrument, "signal detection skipped with open position");
            return None;
        }

        let signal = self.generator.generate_signal(previous, latest, params)?;

        info!(
            %instrument,
            side = %signal.side,
            reference_price = %signal.reference_price,
            "signal detected"
        );

        Some(signal)
    }
}
