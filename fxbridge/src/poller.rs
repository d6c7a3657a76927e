use crate::{
    dispatch::{Dispatch, DispatchTx},
    error::RxDropped,
    shutdown::ShutdownListener,
    state::MarketState,
};
use fxbridge_integration::channel::Tx;
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, info, info_span, warn};

/// Independent exit check running on its own cadence, so open positions are still closed while
/// the quote context is waiting on a slower processing interval.
#[derive(Debug)]
pub struct ExitPoller {
    state: Arc<MarketState>,
    dispatch_tx: DispatchTx,
    interval: Duration,
    shutdown: ShutdownListener,
}

impl ExitPoller {
    pub fn new(
        state: Arc<MarketState>,
        dispatch_tx: DispatchTx,
        interval: Duration,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            state,
            dispatch_tx,
            interval,
            shutdown,
        }
    }

    /// Check every open position for an exit each interval until shutdown.
    pub async fn run(mut self) {
        let span = info_span!("exit_poller");

        async move {
            info!(interval = ?self.interval, "exit poller running");

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = self.shutdown.wait() => {
                        info!("exit poller stopped");
                        break;
                    }

                    _ = ticker.tick() => {
                        if let Err(error) = self.poll() {
                            warn!(%error, "exit poller stopped");
                            break;
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    fn poll(&self) -> Result<(), RxDropped> {
        for exited in self.state.check_exits() {
            debug!(instrument = %exited.position.instrument, reason = %exited.reason, "exit detected");
            self.dispatch_tx.send(Dispatch::Exit(exited))?;
        }
        Ok(())
    }
}
