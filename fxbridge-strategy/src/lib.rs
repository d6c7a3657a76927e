#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # FxBridge-Strategy
//! Evaluates the most recent bars of an instrument into at most one trade [`Signal`].
//!
//! ## Core abstractions:
//! - [`SignalGenerator`](generator::SignalGenerator) interface evaluating the previous & latest
//!   bar, implemented by the [`EqualHighsLows`](generator::EqualHighsLows) pattern.
//! - [`TradingHours`](hours::TradingHours) restricted UTC hour window.
//! - [`SignalDetector`](detector::SignalDetector) applying the detection preconditions before
//!   consulting the generator.

use chrono::{DateTime, Utc};
use derive_more::Constructor;
use fxbridge_instrument::{InstrumentName, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use detector::SignalDetector;
pub use error::StrategyError;
pub use generator::{EqualHighsLows, SignalGenerator};
pub use hours::TradingHours;

/// [`SignalDetector`](detector::SignalDetector) applying the detection preconditions.
pub mod detector;

/// All [`Error`](std::error::Error)s generated in FxBridge-Strategy.
pub mod error;

/// [`SignalGenerator`](generator::SignalGenerator) bar pattern interface & implementations.
pub mod generator;

/// [`TradingHours`](hours::TradingHours) restricted trading window.
pub mod hours;

/// Trade signal for an instrument, consumed exactly once by order submission.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Signal {
    pub instrument: InstrumentName,
    pub side: Side,
    /// Latest bar ask for a buy, latest bar bid for a sell.
    pub reference_price: Decimal,
    /// Window start of the bar that produced the signal.
    pub time: DateTime<Utc>,
}
