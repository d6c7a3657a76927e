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

//! # FxBridge
//! FxBridge is a FIX 4.4 forex trading client that keeps two long-lived TLS sessions open with a
//! broker gateway: a quote session streaming bid & ask updates, and a trade session submitting
//! market orders with attached stop loss & take profit levels.
//!
//! ## Overview
//! Three concurrent contexts cooperate through a shared [`MarketState`](state::MarketState) and a
//! FIFO dispatch queue:
//! * **Quote context**: subscribes to market data, buffers ticks and, every processing interval,
//!   rolls 4h bar windows, detects equal highs / equal lows signals and checks open positions
//!   for exits.
//! * **Trade context**: drains the dispatch queue, turning signals into New Order Singles with a
//!   simulated fill price and exits into notifications.
//! * **Exit poller**: checks open positions against the latest tick on its own short cadence.
//!
//! Both sessions log on, heartbeat and reconnect after a fixed backoff whenever the connection
//! or logon fails.
//!
//! ## Core abstractions:
//! - [`System`](system::System) spawning & shutting down every context.
//! - [`SessionManager`](session::manager::SessionManager) driving the connect, logon, active &
//!   reconnect cycle of a single session.
//! - [`SessionHandler`](session::SessionHandler) plugging role specific behaviour into a session.
//! - [`Notifier`](notify::Notifier) best-effort delivery of signal & exit messages.

/// [`SystemConfig`](config::SystemConfig) loaded from JSON.
pub mod config;

/// Injectable wall [`Clock`](clock::Clock).
pub mod clock;

/// Work queue between the quote context, exit poller & trade context.
pub mod dispatch;

/// All [`Error`](std::error::Error)s generated in FxBridge.
pub mod error;

/// Provides default FxBridge Tracing logging initialisers.
pub mod logging;

/// Signal & exit notifications.
pub mod notify;

/// Independent [`ExitPoller`](poller::ExitPoller) context.
pub mod poller;

/// FIX session state machine and the quote & trade session handlers.
pub mod session;

/// Cooperative shutdown signalling.
pub mod shutdown;

/// [`MarketState`](state::MarketState) shared between every context.
pub mod state;

/// Spawns and owns the running contexts.
pub mod system;

