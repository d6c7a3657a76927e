use crate::{
    clock::SharedClock,
    dispatch::{Dispatch, DispatchRx},
    error::SessionError,
    notify::{Notifier, exit_message, signal_message},
    session::{Session, SessionHandler},
    state::MarketState,
};
use fxbridge_execution::{
    ExecutionSimulator, Position, RandomSlippage, SlippageSource,
    order::request::OrderRequestOpen,
};
use fxbridge_integration::protocol::fix::{FixMessage, MsgType, Tag};
use fxbridge_strategy::Signal;
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Order entry session behaviour.
///
/// Drains the dispatch queue without blocking on every tick: signals become New Order Singles
/// with a position reserved before the send, exits become notifications.
#[derive(Debug)]
pub struct TradeHandler<Source = RandomSlippage> {
    state: Arc<MarketState>,
    dispatch_rx: DispatchRx,
    simulator: ExecutionSimulator<Source>,
    notifier: Arc<dyn Notifier>,
    clock: SharedClock,
    order_quantity: Decimal,
    tick_interval: Duration,
}

impl<Source> TradeHandler<Source>
where
    Source: SlippageSource + Send,
{
    pub fn new(
        state: Arc<MarketState>,
        dispatch_rx: DispatchRx,
        simulator: ExecutionSimulator<Source>,
        notifier: Arc<dyn Notifier>,
        clock: SharedClock,
        order_quantity: Decimal,
        tick_interval: Duration,
    ) -> Self {
        Self {
            state,
            dispatch_rx,
            simulator,
            notifier,
            clock,
            order_quantity,
            tick_interval,
        }
    }

    /// Submit a market order for the [`Signal`].
    ///
    /// A signal for an instrument that already has an open position is a no-op. If the order
    /// cannot be written the reserved position is released and the session fails.
    async fn open_position<S>(
        &mut self,
        session: &mut Session<S>,
        signal: Signal,
    ) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let Some(spec) = self.state.registry().get(&signal.instrument) else {
            warn!(instrument = %signal.instrument, "dropping signal for unknown instrument");
            return Ok(());
        };

        let request = self.simulator.open_request(
            spec,
            signal.side,
            signal.reference_price,
            self.order_quantity,
        );

        let position = Position::from_request(&request, self.clock.time());
        if let Err(error) = self.state.reserve_position(position) {
            info!(%error, side = %signal.side, "ignoring signal");
            return Ok(());
        }

        if let Err(error) = session.send(&FixMessage::from(&request)).await {
            self.state.release_position(&request.instrument, &request.cid);
            return Err(error);
        }

        log_order(&request);
        self.notifier.notify(signal_message(&request));

        Ok(())
    }
}

fn log_order(request: &OrderRequestOpen) {
    info!(
        instrument = %request.instrument,
        cid = %request.cid,
        side = %request.side,
        quantity = %request.quantity,
        price_fill = %request.price_fill,
        stop_loss = %request.stop_loss,
        take_profit = %request.take_profit,
        "order sent"
    );
}

impl<Source> SessionHandler for TradeHandler<Source>
where
    Source: SlippageSource + Send,
{
    fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    async fn on_logon<S>(&mut self, _: &mut Session<S>) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        info!("trade session ready for orders");
        Ok(())
    }

    async fn on_tick<S>(&mut self, session: &mut Session<S>) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        loop {
            let dispatch = match self.dispatch_rx.try_next() {
                Ok(Some(dispatch)) => dispatch,
                Ok(None) => return Ok(()),
                Err(_) => {
                    debug!("dispatch queue closed");
                    return Ok(());
                }
            };

            match dispatch {
                Dispatch::Signal(signal) => self.open_position(session, signal).await?,
                Dispatch::Exit(exited) => self.notifier.notify(exit_message(&exited)),
            }
        }
    }

    fn on_message(&mut self, message: FixMessage) {
        match message.msg_type {
            MsgType::ExecutionReport => info!(
                cid = ?message.get(Tag::CL_ORD_ID),
                order_id = ?message.get(Tag::ORDER_ID),
                exec_type = ?message.get(Tag::EXEC_TYPE),
                ord_status = ?message.get(Tag::ORD_STATUS),
                text = ?message.get(Tag::TEXT),
                "execution report"
            ),
            _ => debug!(%message, "ignoring trade session message"),
        }
    }
}
