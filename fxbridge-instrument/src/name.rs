use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;

/// FxBridge `SmolStr` name of an instrument, eg/ "GBP_JPY".
///
/// Used as the key for all per-instrument state (ticks, bars, positions, params).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display)]
pub struct InstrumentName(pub SmolStr);

impl InstrumentName {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<SmolStr>,
    {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for InstrumentName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SmolStr> for InstrumentName {
    fn from(value: SmolStr) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for InstrumentName {
    fn borrow(&self) -> &str {
        self.0.borrow()
    }
}

impl AsRef<str> for InstrumentName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Broker assigned numeric symbol identifier, sent as FIX tag 55.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Deserialize,
    Serialize,
    Display,
    From,
)]
pub struct SymbolId(pub u32);

impl std::str::FromStr for SymbolId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
