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

//! # FxBridge-Instrument
//! Core instrument data structures shared by every FxBridge crate.
//!
//! Instruments are identified internally by an [`InstrumentName`] (eg/ "GBP_JPY") and on the
//! wire by the broker assigned numeric [`SymbolId`]. The [`InstrumentRegistry`] maps between
//! the two and owns the read-only [`InstrumentParams`] of every tracked instrument.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// [`InstrumentName`](name::InstrumentName) and [`SymbolId`](name::SymbolId) identifiers.
pub mod name;

/// Per-instrument strategy & execution [`InstrumentParams`](params::InstrumentParams).
pub mod params;

/// [`InstrumentRegistry`](registry::InstrumentRegistry) of every tracked instrument.
pub mod registry;

pub use name::{InstrumentName, SymbolId};
pub use params::InstrumentParams;
pub use registry::{InstrumentRegistry, InstrumentSpec, RegistryError};

/// [`Side`] of a signal, order or position - Buy or Sell.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub enum Side {
    #[serde(alias = "buy", alias = "BUY", alias = "b")]
    Buy,
    #[serde(alias = "sell", alias = "SELL", alias = "s")]
    Sell,
}

impl Side {
    /// Opposite [`Side`].
    pub fn flip(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Buy => "BUY",
                Side::Sell => "SELL",
            }
        )
    }
}
