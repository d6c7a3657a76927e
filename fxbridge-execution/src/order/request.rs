use crate::{order::id::ClientOrderId, simulator::round_price};
use fxbridge_instrument::{InstrumentName, Side, SymbolId};
use fxbridge_integration::protocol::fix::{FixMessage, MsgType, Tag};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Default OrderQty (38) in lots.
pub const DEFAULT_ORDER_QUANTITY: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// OrdType (40) market.
const ORD_TYPE_MARKET: u8 = 1;

/// TimeInForce (59) good till cancel.
const TIME_IN_FORCE_GTC: u8 = 1;

/// SecurityType (167) foreign exchange.
const SECURITY_TYPE_FX: &str = "FX";

/// Market order request with embedded stop loss & take profit.
///
/// `price_fill` is the simulated fill price the stop loss & take profit are derived from. The
/// levels are kept exact and only rounded to `precision` when formatted.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct OrderRequestOpen {
    pub cid: ClientOrderId,
    pub instrument: InstrumentName,
    pub symbol: SymbolId,
    pub currency: Option<SmolStr>,
    pub side: Side,
    pub quantity: Decimal,
    pub price_fill: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    /// Decimal places prices are formatted with on the wire.
    pub precision: u32,
}

impl OrderRequestOpen {
    fn format_price(&self, price: Decimal) -> String {
        format!(
            "{:.*}",
            self.precision as usize,
            round_price(price, self.precision)
        )
    }
}

/// FIX Side (54) value.
fn fix_side(side: Side) -> u8 {
    match side {
        Side::Buy => 1,
        Side::Sell => 2,
    }
}

impl From<&OrderRequestOpen> for FixMessage {
    /// New Order Single (D) with StopPx (99) carrying the stop loss and Price (44) carrying the
    /// take profit.
    fn from(request: &OrderRequestOpen) -> Self {
        let mut message = FixMessage::new(MsgType::NewOrderSingle)
            .with(Tag::CL_ORD_ID, &request.cid)
            .with(Tag::SYMBOL, request.symbol)
            .with(Tag::SIDE, fix_side(request.side))
            .with(Tag::ORDER_QTY, request.quantity)
            .with(Tag::ORD_TYPE, ORD_TYPE_MARKET)
            .with(Tag::STOP_PX, request.format_price(request.stop_loss))
            .with(Tag::PRICE, request.format_price(request.take_profit))
            .with(Tag::TIME_IN_FORCE, TIME_IN_FORCE_GTC);

        if let Some(currency) = &request.currency {
            message.push(Tag::CURRENCY, currency);
        }

        message.with(Tag::SECURITY_TYPE, SECURITY_TYPE_FX)
    }
}
