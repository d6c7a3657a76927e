use crate::{
    clock::SharedClock,
    config::SystemConfig,
    dispatch::dispatch_queue,
    error::FxBridgeError,
    notify::Notifier,
    poller::ExitPoller,
    session::{
        SessionRole,
        manager::{SessionManager, SessionSettings},
        quote::QuoteHandler,
        trade::TradeHandler,
    },
    shutdown::{AsyncShutdown, ShutdownTrigger, shutdown_channel},
    state::MarketState,
};
use fxbridge_execution::{ExecutionSimulator, SlippageSource};
use fxbridge_integration::transport::Connector;
use fxbridge_strategy::SignalDetector;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

/// Initialised and running FxBridge system.
///
/// Owns the task handles of the quote session, trade session and exit poller, which share the
/// [`MarketState`] and communicate through the dispatch queue.
#[derive(Debug)]
pub struct System {
    /// Market & position state shared by every context.
    pub state: Arc<MarketState>,

    /// Quote session [`SessionManager`] task.
    pub quote: JoinHandle<()>,

    /// Trade session [`SessionManager`] task.
    pub trade: JoinHandle<()>,

    /// [`ExitPoller`] task.
    pub poller: JoinHandle<()>,

    shutdown: ShutdownTrigger,
}

impl System {
    /// Build the shared state & dispatch queue from the [`SystemConfig`], then spawn the quote
    /// session, trade session and exit poller onto the current tokio runtime.
    pub fn spawn<QuoteConnector, TradeConnector, Source>(
        config: &SystemConfig,
        quote_connector: QuoteConnector,
        trade_connector: TradeConnector,
        slippage: Source,
        notifier: Arc<dyn Notifier>,
        clock: SharedClock,
    ) -> Result<Self, FxBridgeError>
    where
        QuoteConnector: Connector + 'static,
        TradeConnector: Connector + 'static,
        Source: SlippageSource + Send + 'static,
    {
        let registry = config.registry()?;
        let state = Arc::new(MarketState::new(registry, config.timing.bar_config())?);

        let (dispatch_tx, dispatch_rx) = dispatch_queue();
        let (shutdown, listener) = shutdown_channel();

        let quote = SessionManager::new(
            SessionRole::Quote,
            SessionSettings::new(config, &config.quote),
            quote_connector,
            QuoteHandler::new(
                Arc::clone(&state),
                dispatch_tx.clone(),
                SignalDetector::new(config.trading_hours),
                Arc::clone(&clock),
                config.timing.quote_tick(),
                config.timing.quote_process(),
            ),
            Arc::clone(&clock),
            listener.clone(),
        );

        let trade = SessionManager::new(
            SessionRole::Trade,
            SessionSettings::new(config, &config.trade),
            trade_connector,
            TradeHandler::new(
                Arc::clone(&state),
                dispatch_rx,
                ExecutionSimulator::new(slippage),
                notifier,
                Arc::clone(&clock),
                config.order_quantity,
                config.timing.trade_tick(),
            ),
            Arc::clone(&clock),
            listener.clone(),
        );

        let poller = ExitPoller::new(
            Arc::clone(&state),
            dispatch_tx,
            config.timing.exit_poll(),
            listener,
        );

        info!(
            instruments = state.registry().len(),
            "spawning quote session, trade session & exit poller"
        );

        Ok(Self {
            state,
            quote: tokio::spawn(quote.run()),
            trade: tokio::spawn(trade.run()),
            poller: tokio::spawn(poller.run()),
            shutdown,
        })
    }

    /// Request a cooperative shutdown of every context without waiting for them to stop.
    pub fn trigger_shutdown(&self) {
        self.shutdown.shutdown();
    }
}

impl AsyncShutdown for System {
    type Result = Result<(), JoinError>;

    /// Request shutdown, then wait for both sessions to log out and the exit poller to stop.
    async fn shutdown(self) -> Self::Result {
        self.trigger_shutdown();

        self.quote.await?;
        self.trade.await?;
        self.poller.await?;

        info!("system shutdown complete");
        Ok(())
    }
}
