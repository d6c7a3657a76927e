use crate::{
    name::{InstrumentName, SymbolId},
    params::InstrumentParams,
};
use fnv::FnvHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

/// Default number of decimal places fill prices and order price fields are rounded to.
pub const DEFAULT_PRICE_PRECISION: u32 = 3;

/// All errors generated when building an [`InstrumentRegistry`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RegistryError {
    #[error("registry requires at least one instrument")]
    Empty,

    #[error("duplicate instrument name: {0}")]
    DuplicateName(InstrumentName),

    #[error("duplicate symbol id: {0}")]
    DuplicateSymbol(SymbolId),
}

/// Static description of a tracked instrument.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct InstrumentSpec {
    pub name: InstrumentName,
    pub symbol: SymbolId,

    /// Optional FIX Currency (tag 15) sent with orders for this instrument.
    #[serde(default)]
    pub currency: Option<SmolStr>,

    /// Decimal places used when rounding fills & formatting order prices.
    #[serde(default = "default_price_precision")]
    pub price_precision: u32,

    pub params: InstrumentParams,
}

fn default_price_precision() -> u32 {
    DEFAULT_PRICE_PRECISION
}

/// Registry of every tracked instrument, providing name ⇄ [`SymbolId`] lookups.
///
/// Iteration order is the configured order, which determines the order market data
/// subscriptions are sent in.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InstrumentRegistry {
    specs: IndexMap<InstrumentName, InstrumentSpec>,
    symbols: FnvHashMap<SymbolId, InstrumentName>,
}

impl InstrumentRegistry {
    /// Construct a validated [`InstrumentRegistry`] from the provided [`InstrumentSpec`]s.
    pub fn new<Iter>(specs: Iter) -> Result<Self, RegistryError>
    where
        Iter: IntoIterator<Item = InstrumentSpec>,
    {
        let mut registry = Self {
            specs: IndexMap::new(),
            symbols: FnvHashMap::default(),
        };

        for spec in specs {
            if registry.specs.contains_key(&spec.name) {
                return Err(RegistryError::DuplicateName(spec.name));
            }
            if registry.symbols.contains_key(&spec.symbol) {
                return Err(RegistryError::DuplicateSymbol(spec.symbol));
            }
            registry.symbols.insert(spec.symbol, spec.name.clone());
            registry.specs.insert(spec.name.clone(), spec);
        }

        if registry.specs.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(registry)
    }

    pub fn get(&self, name: &InstrumentName) -> Option<&InstrumentSpec> {
        self.specs.get(name)
    }

    pub fn params(&self, name: &InstrumentName) -> Option<&InstrumentParams> {
        self.specs.get(name).map(|spec| &spec.params)
    }

    /// Find the [`InstrumentName`] associated with a broker [`SymbolId`].
    pub fn find_by_symbol(&self, symbol: SymbolId) -> Option<&InstrumentName> {
        self.symbols.get(&symbol)
    }

    pub fn names(&self) -> impl Iterator<Item = &InstrumentName> {
        self.specs.keys()
    }

    pub fn specs(&self) -> impl Iterator<Item = &InstrumentSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
