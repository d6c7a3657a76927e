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

//! # FxBridge-Data
//! Normalised market data for FxBridge.
//!
//! Quote session messages are parsed into [`Tick`](tick::Tick)s, which the
//! [`MarketAggregator`](aggregator::MarketAggregator) buckets into fixed-width
//! [`Bar`](bar::Bar)s per instrument.
//!
//! ## Core abstractions:
//! - [`MarketDataRequest`](subscription::MarketDataRequest) subscribing to bid & ask updates for
//!   an instrument.
//! - [`parse_market_data`](snapshot::parse_market_data) converting a snapshot (W) or incremental
//!   refresh (X) into a [`Tick`](tick::Tick).
//! - [`MarketAggregator`](aggregator::MarketAggregator) rolling buffered ticks into bars as each
//!   window closes.

pub use aggregator::{BarConfig, MarketAggregator};
pub use bar::Bar;
pub use error::DataError;
pub use tick::Tick;

/// All [`Error`](std::error::Error)s generated in FxBridge-Data.
pub mod error;

/// [`Tick`](tick::Tick) top of book quote.
pub mod tick;

/// [`Bar`](bar::Bar) OHLC aggregate of the bid price over a time window.
pub mod bar;

/// Tick buffering & window rolling [`MarketAggregator`](aggregator::MarketAggregator).
pub mod aggregator;

/// Market data snapshot & incremental refresh parsing.
pub mod snapshot;

/// Market data subscription request.
pub mod subscription;
