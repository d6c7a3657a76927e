use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only strategy & execution parameters of a single instrument.
///
/// Distances (tolerance, stop loss, take profit) are expressed in pips and converted into price
/// distances using the `pip_value`. The `slippage`, `spread` and `commission` are used by the
/// execution simulator to approximate a real fill.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct InstrumentParams {
    /// Pips tolerance within which two bar highs (or lows) are considered equal.
    #[serde(alias = "tolerance")]
    pub tolerance_pips: Decimal,

    /// Stop loss distance from the fill price, in pips.
    #[serde(alias = "sl_pips")]
    pub stop_loss_pips: Decimal,

    /// Take profit distance from the fill price, in pips.
    #[serde(alias = "tp_pips")]
    pub take_profit_pips: Decimal,

    /// Price value of a single pip (eg/ 0.01 for JPY quoted pairs).
    pub pip_value: Decimal,

    /// Absolute price offset randomly added or subtracted from a simulated fill.
    pub slippage: Decimal,

    /// Typical spread added to buys and subtracted from sells.
    pub spread: Decimal,

    /// Commission per 0.01 lot, converted into a fixed price offset.
    pub commission: Decimal,
}

impl InstrumentParams {
    /// Price distance two bar extremes may differ by and still be considered equal.
    pub fn tolerance_price(&self) -> Decimal {
        self.tolerance_pips * self.pip_value
    }

    /// Price distance between the fill price and the stop loss.
    pub fn stop_loss_distance(&self) -> Decimal {
        self.stop_loss_pips * self.pip_value
    }

    /// Price distance between the fill price and the take profit.
    pub fn take_profit_distance(&self) -> Decimal {
        self.take_profit_pips * self.pip_value
    }
}
