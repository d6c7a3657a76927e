use crate::dispatch::Dispatch;
use chrono::{DateTime, Utc};
use fxbridge_data::{BarConfig, DataError, MarketAggregator, Tick};
use fxbridge_execution::{
    Position, PositionError, PositionExited, PositionTracker, order::id::ClientOrderId,
};
use fxbridge_instrument::{InstrumentName, InstrumentRegistry};
use fxbridge_strategy::{SignalDetector, SignalGenerator};
use parking_lot::Mutex;
use tracing::debug;

/// Market & position state shared between the quote context, trade context and exit poller.
///
/// The read-only [`InstrumentRegistry`] sits outside the lock. Ticks, bars, window markers and
/// open positions sit behind a single process-wide [`Mutex`] that is only held for synchronous
/// read-modify-write sections, never across an `.await`.
#[derive(Debug)]
pub struct MarketState {
    registry: InstrumentRegistry,
    shared: Mutex<SharedState>,
}

#[derive(Debug)]
pub struct SharedState {
    pub aggregator: MarketAggregator,
    pub positions: PositionTracker,
}

impl MarketState {
    pub fn new(registry: InstrumentRegistry, bars: BarConfig) -> Result<Self, DataError> {
        Ok(Self {
            registry,
            shared: Mutex::new(SharedState {
                aggregator: MarketAggregator::new(bars)?,
                positions: PositionTracker::default(),
            }),
        })
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    pub fn ingest_tick(&self, tick: Tick) {
        self.shared.lock().aggregator.ingest_tick(tick);
    }

    /// Roll the bar window of every instrument. Instruments that produced a new bar are checked
    /// for a [`Signal`](fxbridge_strategy::Signal), then every open position is checked for an
    /// exit against the latest tick.
    pub fn process<Generator>(
        &self,
        now: DateTime<Utc>,
        detector: &SignalDetector<Generator>,
    ) -> Vec<Dispatch>
    where
        Generator: SignalGenerator,
    {
        let mut shared = self.shared.lock();
        let SharedState {
            aggregator,
            positions,
        } = &mut *shared;

        let mut dispatches = Vec::new();
        for spec in self.registry.specs() {
            if aggregator.roll_window(&spec.name, now)
                && let Some(signal) = detector.detect(
                    &spec.name,
                    aggregator,
                    &spec.params,
                    positions.contains(&spec.name),
                    now,
                )
            {
                dispatches.push(Dispatch::Signal(signal));
            }

            if let Some(exited) = aggregator
                .last_tick(&spec.name)
                .and_then(|tick| positions.check_exit(tick, &spec.params))
            {
                dispatches.push(Dispatch::Exit(exited));
            }
        }

        dispatches
    }

    /// Check every open position for an exit against the latest tick of its instrument.
    pub fn check_exits(&self) -> Vec<PositionExited> {
        let mut shared = self.shared.lock();
        let SharedState {
            aggregator,
            positions,
        } = &mut *shared;

        self.registry
            .specs()
            .filter_map(|spec| {
                let tick = aggregator.last_tick(&spec.name)?;
                positions.check_exit(tick, &spec.params)
            })
            .collect()
    }

    /// Record a [`Position`] before its order is sent, failing if the instrument already has
    /// one open.
    pub fn reserve_position(&self, position: Position) -> Result<(), PositionError> {
        self.shared.lock().positions.open(position)
    }

    /// Remove a reserved [`Position`] whose order could not be sent.
    ///
    /// Only the position opened by the provided [`ClientOrderId`] is removed.
    pub fn release_position(
        &self,
        instrument: &InstrumentName,
        cid: &ClientOrderId,
    ) -> Option<Position> {
        let mut shared = self.shared.lock();
        if shared.positions.get(instrument)?.cid != *cid {
            return None;
        }

        debug!(%instrument, %cid, "releasing reserved position");
        shared.positions.remove(instrument)
    }

    pub fn has_position(&self, instrument: &InstrumentName) -> bool {
        self.shared.lock().positions.contains(instrument)
    }

    pub fn position(&self, instrument: &InstrumentName) -> Option<Position> {
        self.shared.lock().positions.get(instrument).cloned()
    }

    pub fn bar_count(&self, instrument: &InstrumentName) -> usize {
        self.shared.lock().aggregator.bar_count(instrument)
    }
}
