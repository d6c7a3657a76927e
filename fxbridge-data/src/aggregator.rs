use crate::{bar::Bar, error::DataError, tick::Tick};
use chrono::{DateTime, TimeDelta, Utc};
use fnv::FnvHashMap;
use fxbridge_instrument::InstrumentName;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Default bar window width.
pub const DEFAULT_BAR_WIDTH: TimeDelta = TimeDelta::hours(4);

/// Default number of most recent bars retained per instrument.
pub const DEFAULT_BAR_HISTORY: usize = 3;

/// Width of each bar window & number of bars retained per instrument.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BarConfig {
    pub width: TimeDelta,
    pub history: usize,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BAR_WIDTH,
            history: DEFAULT_BAR_HISTORY,
        }
    }
}

impl BarConfig {
    pub fn validate(self) -> Result<Self, DataError> {
        if self.width.num_milliseconds() <= 0 {
            return Err(DataError::BarConfig(format!(
                "bar width must be at least 1ms, found: {}",
                self.width
            )));
        }
        if self.history < 2 {
            return Err(DataError::BarConfig(format!(
                "bar history must retain at least 2 bars, found: {}",
                self.history
            )));
        }
        Ok(self)
    }

    /// Floor the provided time to the start of the window it falls in.
    pub fn window_start(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        let width_ms = self.width.num_milliseconds().max(1);
        let into_window = TimeDelta::milliseconds(time.timestamp_millis().rem_euclid(width_ms))
            + TimeDelta::nanoseconds(i64::from(time.timestamp_subsec_nanos() % 1_000_000));
        time - into_window
    }
}

/// Per-instrument aggregation state.
#[derive(Debug, Clone, Default)]
struct InstrumentMarket {
    ticks: Vec<Tick>,
    bars: VecDeque<Bar>,
    window_start: Option<DateTime<Utc>>,
    last_tick: Option<Tick>,
}

/// Buffers [`Tick`]s per instrument and rolls them into [`Bar`]s as each window closes.
///
/// The aggregator holds no lock itself, it is owned by the shared market state which guards it.
#[derive(Debug, Clone)]
pub struct MarketAggregator {
    config: BarConfig,
    markets: FnvHashMap<InstrumentName, InstrumentMarket>,
}

impl MarketAggregator {
    pub fn new(config: BarConfig) -> Result<Self, DataError> {
        Ok(Self {
            config: config.validate()?,
            markets: FnvHashMap::default(),
        })
    }

    pub fn config(&self) -> &BarConfig {
        &self.config
    }

    /// Append a [`Tick`] to its instrument's buffer and record it as the latest tick.
    pub fn ingest_tick(&mut self, tick: Tick) {
        let market = self.markets.entry(tick.instrument.clone()).or_default();
        market.last_tick = Some(tick.clone());
        market.ticks.push(tick);
    }

    /// Close the previous window of the instrument if `now` has moved into a new window.
    ///
    /// The first call for an instrument only records the current window start. Afterwards, once
    /// the window start advances, buffered ticks in `[previous_start, current_start)` are built
    /// into a [`Bar`], ticks before `current_start` are discarded and the window pointer
    /// advances, even if the window held no ticks.
    ///
    /// Returns `true` iff a new [`Bar`] was produced.
    pub fn roll_window(&mut self, instrument: &InstrumentName, now: DateTime<Utc>) -> bool {
        let current_start = self.config.window_start(now);
        let history = self.config.history;
        let market = self.markets.entry(instrument.clone()).or_default();

        let Some(previous_start) = market.window_start else {
            debug!(%instrument, window_start = %current_start, "bootstrapped bar window");
            market.window_start = Some(current_start);
            return false;
        };

        if current_start <= previous_start {
            return false;
        }

        let mut window = market
            .ticks
            .iter()
            .filter(|tick| tick.time >= previous_start && tick.time < current_start)
            .collect::<Vec<_>>();
        window.sort_by_key(|tick| tick.time);

        let bar = Bar::from_ticks(instrument.clone(), previous_start, window);

        market.ticks.retain(|tick| tick.time >= current_start);
        market.window_start = Some(current_start);

        let Some(bar) = bar else {
            debug!(%instrument, window_start = %previous_start, "no ticks in closed bar window");
            return false;
        };

        info!(
            %instrument,
            window_start = %bar.window_start,
            open = %bar.open,
            high = %bar.high,
            low = %bar.low,
            close = %bar.close,
            "built bar"
        );

        market.bars.push_back(bar);
        market
            .bars
            .make_contiguous()
            .sort_by_key(|bar| bar.window_start);
        while market.bars.len() > history {
            market.bars.pop_front();
        }

        true
    }

    /// Retained [`Bar`]s of the instrument in ascending `window_start` order.
    pub fn bars(&self, instrument: &InstrumentName) -> impl Iterator<Item = &Bar> {
        self.markets
            .get(instrument)
            .into_iter()
            .flat_map(|market| market.bars.iter())
    }

    /// Previous & latest [`Bar`] of the instrument, if at least two have been built.
    pub fn latest_pair(&self, instrument: &InstrumentName) -> Option<(&Bar, &Bar)> {
        let bars = &self.markets.get(instrument)?.bars;
        let latest = bars.len().checked_sub(1)?;
        let previous = latest.checked_sub(1)?;
        Some((bars.get(previous)?, bars.get(latest)?))
    }

    pub fn bar_count(&self, instrument: &InstrumentName) -> usize {
        self.markets
            .get(instrument)
            .map_or(0, |market| market.bars.len())
    }

    /// Most recently ingested [`Tick`] of the instrument.
    pub fn last_tick(&self, instrument: &InstrumentName) -> Option<&Tick> {
        self.markets.get(instrument)?.last_tick.as_ref()
    }

    /// Number of ticks buffered for the instrument's open window.
    pub fn buffered_ticks(&self, instrument: &InstrumentName) -> usize {
        self.markets
            .get(instrument)
            .map_or(0, |market| market.ticks.len())
    }

    pub fn window_start(&self, instrument: &InstrumentName) -> Option<DateTime<Utc>> {
        self.markets.get(instrument)?.window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn gbp_jpy() -> InstrumentName {
        InstrumentName::from("GBP_JPY")
    }

    fn time(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    fn tick(time: DateTime<Utc>, bid: Decimal) -> Tick {
        Tick::new(gbp_jpy(), time, bid, bid + dec!(0.02))
    }

    #[test]
    fn test_bar_config_window_start() {
        let config = BarConfig::default();

        struct TestCase {
            input: DateTime<Utc>,
            expected: DateTime<Utc>,
        }

        let tests = vec![
            TestCase {
                // TC0: exactly on a boundary
                input: time(8, 0),
                expected: time(8, 0),
            },
            TestCase {
                // TC1: inside a window
                input: time(11, 59),
                expected: time(8, 0),
            },
            TestCase {
                // TC2: sub-millisecond precision is floored
                input: time(3, 59) + TimeDelta::nanoseconds(59_999_999_999),
                expected: time(0, 0),
            },
            TestCase {
                // TC3: late evening window
                input: time(23, 1),
                expected: time(20, 0),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = config.window_start(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_bar_config_validate() {
        assert!(BarConfig::default().validate().is_ok());
        assert!(
            BarConfig {
                width: TimeDelta::zero(),
                history: 3
            }
            .validate()
            .is_err()
        );
        assert!(
            BarConfig {
                width: TimeDelta::hours(4),
                history: 1
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_roll_window_bootstraps_on_first_call() {
        let mut aggregator = MarketAggregator::new(BarConfig::default()).unwrap();

        assert!(!aggregator.roll_window(&gbp_jpy(), time(9, 30)));
        assert_eq!(aggregator.window_start(&gbp_jpy()), Some(time(8, 0)));

        // Same window does nothing
        aggregator.ingest_tick(tick(time(9, 31), dec!(150.000)));
        assert!(!aggregator.roll_window(&gbp_jpy(), time(11, 59)));
        assert_eq!(aggregator.buffered_ticks(&gbp_jpy()), 1);
    }

    #[test]
    fn test_roll_window_builds_bar_from_window_ticks_only() {
        let mut aggregator = MarketAggregator::new(BarConfig::default()).unwrap();
        aggregator.roll_window(&gbp_jpy(), time(8, 0));

        // Ticks delivered out of order, plus one belonging to the next window
        aggregator.ingest_tick(tick(time(9, 0), dec!(150.030)));
        aggregator.ingest_tick(tick(time(8, 0), dec!(150.000)));
        aggregator.ingest_tick(tick(time(10, 0), dec!(150.050)));
        aggregator.ingest_tick(tick(time(12, 0), dec!(151.000)));
        aggregator.ingest_tick(tick(time(11, 59), dec!(150.020)));

        assert!(aggregator.roll_window(&gbp_jpy(), time(12, 1)));

        let bars = aggregator.bars(&gbp_jpy()).collect::<Vec<_>>();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].window_start, time(8, 0));
        assert_eq!(bars[0].open, dec!(150.000));
        assert_eq!(bars[0].high, dec!(150.050));
        assert_eq!(bars[0].low, dec!(150.000));
        assert_eq!(bars[0].close, dec!(150.020));
        assert_eq!(bars[0].last_bid, dec!(150.020));
        assert_eq!(bars[0].last_ask, dec!(150.040));

        // Next window tick is retained, latest tick is by arrival
        assert_eq!(aggregator.buffered_ticks(&gbp_jpy()), 1);
        assert_eq!(
            aggregator.last_tick(&gbp_jpy()).map(|tick| tick.bid),
            Some(dec!(150.020))
        );
    }

    #[test]
    fn test_roll_window_empty_window_advances_pointer_without_bar() {
        let mut aggregator = MarketAggregator::new(BarConfig::default()).unwrap();
        aggregator.roll_window(&gbp_jpy(), time(0, 0));

        assert!(!aggregator.roll_window(&gbp_jpy(), time(4, 0)));
        assert_eq!(aggregator.window_start(&gbp_jpy()), Some(time(4, 0)));
        assert_eq!(aggregator.bar_count(&gbp_jpy()), 0);

        // Tick from the skipped window arrives late and is discarded on the next roll
        aggregator.ingest_tick(tick(time(3, 0), dec!(150.000)));
        aggregator.ingest_tick(tick(time(5, 0), dec!(150.100)));
        assert!(aggregator.roll_window(&gbp_jpy(), time(8, 0)));

        let bars = aggregator.bars(&gbp_jpy()).collect::<Vec<_>>();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].window_start, time(4, 0));
        assert_eq!(bars[0].open, dec!(150.100));
        assert_eq!(aggregator.buffered_ticks(&gbp_jpy()), 0);
    }

    #[test]
    fn test_roll_window_retains_most_recent_bars_in_order() {
        let mut aggregator = MarketAggregator::new(BarConfig::default()).unwrap();
        aggregator.roll_window(&gbp_jpy(), time(0, 0));

        for (window, bid) in [dec!(150.0), dec!(150.1), dec!(150.2), dec!(150.3), dec!(150.4)]
            .into_iter()
            .enumerate()
        {
            let start = time(0, 0) + TimeDelta::hours(4 * window as i64);
            aggregator.ingest_tick(tick(start + TimeDelta::minutes(1), bid));
            assert!(aggregator.roll_window(&gbp_jpy(), start + TimeDelta::hours(4)));
        }

        let actual = aggregator
            .bars(&gbp_jpy())
            .map(|bar| (bar.window_start, bar.open))
            .collect::<Vec<_>>();

        let base = time(0, 0);
        assert_eq!(
            actual,
            vec![
                (base + TimeDelta::hours(8), dec!(150.2)),
                (base + TimeDelta::hours(12), dec!(150.3)),
                (base + TimeDelta::hours(16), dec!(150.4)),
            ]
        );

        let (previous, latest) = aggregator.latest_pair(&gbp_jpy()).unwrap();
        assert_eq!(previous.open, dec!(150.3));
        assert_eq!(latest.open, dec!(150.4));
    }
}
