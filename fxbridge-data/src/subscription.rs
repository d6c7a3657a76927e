use chrono::{DateTime, Utc};
use fxbridge_instrument::{InstrumentName, SymbolId};
use fxbridge_integration::protocol::fix::{FixMessage, MsgType, Tag};
use smol_str::{SmolStr, format_smolstr};

/// SubscriptionRequestType (263) snapshot + updates.
const SNAPSHOT_PLUS_UPDATES: u8 = 1;

/// MarketDepth (264) top of book.
const TOP_OF_BOOK: u8 = 1;

/// MDUpdateType (265) incremental refresh.
const INCREMENTAL_REFRESH: u8 = 1;

/// Market Data Request (V) subscribing to bid & offer updates for a single instrument.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MarketDataRequest {
    pub request_id: SmolStr,
    pub symbol: SymbolId,
}

impl MarketDataRequest {
    /// Construct a request with MDReqID `MD_{instrument}_{unix_seconds}`.
    pub fn new(instrument: &InstrumentName, symbol: SymbolId, time: DateTime<Utc>) -> Self {
        Self {
            request_id: format_smolstr!("MD_{}_{}", instrument, time.timestamp()),
            symbol,
        }
    }
}

impl From<MarketDataRequest> for FixMessage {
    fn from(request: MarketDataRequest) -> Self {
        FixMessage::new(MsgType::MarketDataRequest)
            .with(Tag::MD_REQ_ID, request.request_id)
            .with(Tag::SUBSCRIPTION_REQUEST_TYPE, SNAPSHOT_PLUS_UPDATES)
            .with(Tag::MARKET_DEPTH, TOP_OF_BOOK)
            .with(Tag::MD_UPDATE_TYPE, INCREMENTAL_REFRESH)
            .with(Tag::NO_MD_ENTRY_TYPES, 2)
            .with(Tag::MD_ENTRY_TYPE, crate::snapshot::MD_ENTRY_BID)
            .with(Tag::MD_ENTRY_TYPE, crate::snapshot::MD_ENTRY_OFFER)
            .with(Tag::NO_RELATED_SYM, 1)
            .with(Tag::SYMBOL, request.symbol)
    }
}
