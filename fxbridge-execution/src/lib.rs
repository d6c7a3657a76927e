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

//! # FxBridge-Execution
//! Simulated order execution & position tracking.
//!
//! ## Core abstractions:
//! - [`ExecutionSimulator`](simulator::ExecutionSimulator) approximating a real fill by applying
//!   slippage from an injectable [`SlippageSource`](simulator::SlippageSource), spread and a
//!   commission offset to a reference price.
//! - [`OrderRequestOpen`](order::request::OrderRequestOpen) market order with embedded stop loss
//!   & take profit, convertible into a FIX New Order Single.
//! - [`PositionTracker`](position::PositionTracker) holding at most one open
//!   [`Position`](position::Position) per instrument and detecting stop loss / take profit exits.

pub use error::PositionError;
pub use position::{ExitReason, Position, PositionExited, PositionTracker};
pub use simulator::{
    ExecutionSimulator, RandomSlippage, ScriptedSlippage, SlippageSign, SlippageSource, round_price,
};

/// All [`Error`](std::error::Error)s generated in FxBridge-Execution.
pub mod error;

/// [`ClientOrderId`](order::id::ClientOrderId) and
/// [`OrderRequestOpen`](order::request::OrderRequestOpen).
pub mod order;

/// Open [`Position`](position::Position)s and stop loss / take profit exit detection.
pub mod position;

/// Fill price [`ExecutionSimulator`](simulator::ExecutionSimulator).
pub mod simulator;
