use crate::error::RxDropped;
use derive_more::From;
use fxbridge_execution::PositionExited;
use fxbridge_integration::channel::{UnboundedRx, UnboundedTx, mpsc_unbounded};
use fxbridge_strategy::Signal;

/// Work handed from the quote context & exit poller to the trade context.
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Dispatch {
    /// Submit a market order for the [`Signal`].
    Signal(Signal),
    /// Notify the closed position.
    Exit(PositionExited),
}

pub type DispatchTx = UnboundedTx<Dispatch, RxDropped>;
pub type DispatchRx = UnboundedRx<Dispatch>;

/// Construct the unbounded FIFO dispatch queue. Producers never block.
pub fn dispatch_queue() -> (DispatchTx, DispatchRx) {
    mpsc_unbounded()
}
