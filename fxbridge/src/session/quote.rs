use crate::{
    clock::SharedClock,
    dispatch::DispatchTx,
    error::SessionError,
    session::{Session, SessionHandler},
    state::MarketState,
};
use fxbridge_data::{snapshot::parse_market_data, subscription::MarketDataRequest};
use fxbridge_integration::{
    channel::Tx,
    protocol::fix::{FixMessage, MsgType, Tag},
};
use fxbridge_strategy::SignalDetector;
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::Instant,
};
use tracing::{debug, info, trace, warn};

/// Market data session behaviour.
///
/// Subscribes every instrument on logon, ingests snapshot & incremental refresh ticks, and on
/// the coarser process cadence rolls bar windows, detects signals and checks exits, pushing the
/// results onto the dispatch queue.
#[derive(Debug)]
pub struct QuoteHandler {
    state: Arc<MarketState>,
    dispatch_tx: DispatchTx,
    detector: SignalDetector,
    clock: SharedClock,
    tick_interval: Duration,
    process_interval: Duration,
    last_process: Instant,
}

impl QuoteHandler {
    pub fn new(
        state: Arc<MarketState>,
        dispatch_tx: DispatchTx,
        detector: SignalDetector,
        clock: SharedClock,
        tick_interval: Duration,
        process_interval: Duration,
    ) -> Self {
        Self {
            state,
            dispatch_tx,
            detector,
            clock,
            tick_interval,
            process_interval,
            last_process: Instant::now(),
        }
    }

    fn process(&mut self) -> Result<(), SessionError> {
        self.last_process = Instant::now();

        for dispatch in self.state.process(self.clock.time(), &self.detector) {
            self.dispatch_tx.send(dispatch)?;
        }

        Ok(())
    }
}

impl SessionHandler for QuoteHandler {
    fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    async fn on_logon<S>(&mut self, session: &mut Session<S>) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let now = self.clock.time();
        let requests = self
            .state
            .registry()
            .specs()
            .map(|spec| FixMessage::from(MarketDataRequest::new(&spec.name, spec.symbol, now)))
            .collect::<Vec<_>>();

        for request in &requests {
            session.send(request).await?;
        }

        self.last_process = Instant::now();
        info!(instruments = requests.len(), "subscribed to market data");

        Ok(())
    }

    async fn on_tick<S>(&mut self, _: &mut Session<S>) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        if self.last_process.elapsed() >= self.process_interval {
            self.process()?;
        }
        Ok(())
    }

    fn on_message(&mut self, message: FixMessage) {
        match message.msg_type {
            MsgType::MarketDataSnapshot | MsgType::MarketDataIncremental => {
                match parse_market_data(&message, self.state.registry(), self.clock.time()) {
                    Ok(tick) => {
                        trace!(instrument = %tick.instrument, bid = %tick.bid, ask = %tick.ask, "tick");
                        self.state.ingest_tick(tick);
                    }
                    Err(error) => warn!(%error, %message, "dropping market data"),
                }
            }
            MsgType::MarketDataRequestReject => {
                warn!(
                    md_req_id = ?message.get(Tag::MD_REQ_ID),
                    text = ?message.get(Tag::TEXT),
                    "market data request rejected"
                );
            }
            _ => debug!(%message, "ignoring quote session message"),
        }
    }
}
