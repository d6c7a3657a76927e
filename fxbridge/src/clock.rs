use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::{fmt::Debug, sync::Arc};

/// Defines how the system determines the current wall clock time.
///
/// Window flooring, trading hours, SendingTime (52) and position open times all use the
/// `Clock`, whereas timers & timeouts run on the tokio runtime clock.
pub trait Clock
where
    Self: Debug + Send + Sync,
{
    fn time(&self) -> DateTime<Utc>;
}

/// Shared [`Clock`] handle passed to every execution context.
pub type SharedClock = Arc<dyn Clock>;

/// Live `Clock` using `Utc::now()`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LiveClock;

impl Clock for LiveClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven `Clock`, useful for deterministic simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    time: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.time.lock() = time;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut time = self.time.lock();
        *time += delta;
    }
}

impl Clock for ManualClock {
    fn time(&self) -> DateTime<Utc> {
        *self.time.lock()
    }
}
