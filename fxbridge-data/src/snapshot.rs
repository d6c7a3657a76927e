use crate::{error::DataError, tick::Tick};
use chrono::{DateTime, NaiveDateTime, Utc};
use fxbridge_instrument::{InstrumentRegistry, SymbolId};
use fxbridge_integration::protocol::fix::{FixMessage, Tag};
use rust_decimal::Decimal;
use std::str::FromStr;

/// MDEntryType (269) bid.
pub const MD_ENTRY_BID: &str = "0";

/// MDEntryType (269) offer.
pub const MD_ENTRY_OFFER: &str = "1";

/// SendingTime (52) format, fractional seconds optional.
const SENDING_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S%.f";

/// Parse a market data snapshot (W) or incremental refresh (X) into a [`Tick`].
///
/// The instrument is resolved from Symbol (55). Each MDEntryPx (270) is attributed to the
/// preceding MDEntryType (269), the last bid & offer win. Entries without a price are ignored.
/// A missing bid falls back to the offer & vice versa. The tick time is the SendingTime (52),
/// or `received` if absent or unparsable.
pub fn parse_market_data(
    message: &FixMessage,
    registry: &InstrumentRegistry,
    received: DateTime<Utc>,
) -> Result<Tick, DataError> {
    if !message.msg_type.is_market_data() {
        return Err(DataError::UnexpectedMsgType(message.msg_type.clone()));
    }

    let symbol = message.parse::<SymbolId>(Tag::SYMBOL)?;
    let instrument = registry
        .find_by_symbol(symbol)
        .ok_or(DataError::UnknownSymbol(symbol))?;

    let mut bid = None;
    let mut ask = None;
    let mut entry_type = None;

    for field in &message.fields {
        match field.tag {
            Tag::MD_ENTRY_TYPE => entry_type = Some(field.value.as_str()),
            Tag::MD_ENTRY_PX => match entry_type.take() {
                Some(MD_ENTRY_BID) => bid = Some(parse_price(&field.value)?),
                Some(MD_ENTRY_OFFER) => ask = Some(parse_price(&field.value)?),
                _ => {}
            },
            _ => {}
        }
    }

    let (bid, ask) = match (bid, ask) {
        (Some(bid), Some(ask)) => (bid, ask),
        (Some(bid), None) => (bid, bid),
        (None, Some(ask)) => (ask, ask),
        (None, None) => return Err(DataError::MissingPrice(symbol)),
    };

    let time = message
        .get(Tag::SENDING_TIME)
        .and_then(parse_sending_time)
        .unwrap_or(received);

    Ok(Tick::new(instrument.clone(), time, bid, ask))
}

fn parse_price(value: &str) -> Result<Decimal, DataError> {
    Decimal::from_str(value).map_err(|_| DataError::InvalidPrice(value.to_string()))
}

fn parse_sending_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, SENDING_TIME_FORMAT)
        .ok()
        .map(|time| time.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fxbridge_instrument::{InstrumentName, InstrumentParams, InstrumentSpec};
    use fxbridge_integration::protocol::fix::MsgType;
    use rust_decimal_macros::dec;

    fn registry() -> InstrumentRegistry {
        InstrumentRegistry::new([InstrumentSpec {
            name: InstrumentName::from("GBP_JPY"),
            symbol: SymbolId(2),
            currency: None,
            price_precision: 3,
            params: InstrumentParams {
                tolerance_pips: dec!(29.8),
                stop_loss_pips: dec!(49.01),
                take_profit_pips: dec!(149.35),
                pip_value: dec!(0.01),
                slippage: dec!(0.02),
                spread: dec!(0.02),
                commission: dec!(0.5),
            },
        }])
        .unwrap()
    }

    fn received() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn market_data(msg_type: MsgType, entries: &[(&str, Option<&str>)]) -> FixMessage {
        let mut message = FixMessage::new(msg_type.clone())
            .with(Tag::MSG_TYPE, msg_type)
            .with(Tag::SENDING_TIME, "20240304-08:15:30.250")
            .with(Tag::SYMBOL, 2)
            .with(Tag::NO_MD_ENTRIES, entries.len());

        for (entry_type, price) in entries {
            message.push(Tag::MD_ENTRY_TYPE, entry_type);
            if let Some(price) = price {
                message.push(Tag::MD_ENTRY_PX, price);
            }
        }
        message
    }

    #[test]
    fn test_parse_market_data() {
        let sending_time = Utc.with_ymd_and_hms(2024, 3, 4, 8, 15, 30).unwrap()
            + chrono::TimeDelta::milliseconds(250);

        struct TestCase {
            input: FixMessage,
            expected: Result<(Decimal, Decimal), DataError>,
        }

        let tests = vec![
            TestCase {
                // TC0: snapshot with bid & offer
                input: market_data(
                    MsgType::MarketDataSnapshot,
                    &[("0", Some("150.010")), ("1", Some("150.030"))],
                ),
                expected: Ok((dec!(150.010), dec!(150.030))),
            },
            TestCase {
                // TC1: incremental with offer only falls back to offer for bid
                input: market_data(MsgType::MarketDataIncremental, &[("1", Some("150.030"))]),
                expected: Ok((dec!(150.030), dec!(150.030))),
            },
            TestCase {
                // TC2: bid only falls back to bid for ask
                input: market_data(MsgType::MarketDataSnapshot, &[("0", Some("150.010"))]),
                expected: Ok((dec!(150.010), dec!(150.010))),
            },
            TestCase {
                // TC3: entries without price (deletes) are ignored
                input: market_data(
                    MsgType::MarketDataIncremental,
                    &[("0", None), ("1", Some("150.040"))],
                ),
                expected: Ok((dec!(150.040), dec!(150.040))),
            },
            TestCase {
                // TC4: no prices at all
                input: market_data(MsgType::MarketDataSnapshot, &[("0", None), ("1", None)]),
                expected: Err(DataError::MissingPrice(SymbolId(2))),
            },
            TestCase {
                // TC5: invalid price
                input: market_data(MsgType::MarketDataSnapshot, &[("0", Some("abc"))]),
                expected: Err(DataError::InvalidPrice("abc".to_string())),
            },
            TestCase {
                // TC6: not market data
                input: FixMessage::new(MsgType::Heartbeat),
                expected: Err(DataError::UnexpectedMsgType(MsgType::Heartbeat)),
            },
            TestCase {
                // TC7: unknown symbol
                input: FixMessage::new(MsgType::MarketDataSnapshot).with(Tag::SYMBOL, 99),
                expected: Err(DataError::UnknownSymbol(SymbolId(99))),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = parse_market_data(&test.input, &registry(), received());

            if let Ok(tick) = &actual {
                assert_eq!(tick.instrument.as_str(), "GBP_JPY", "TC{} failed", index);
                assert_eq!(tick.time, sending_time, "TC{} failed", index);
            }

            let actual = actual.map(|tick| (tick.bid, tick.ask));
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_parse_market_data_without_sending_time_uses_received() {
        let message = FixMessage::new(MsgType::MarketDataSnapshot)
            .with(Tag::SYMBOL, 2)
            .with(Tag::MD_ENTRY_TYPE, "0")
            .with(Tag::MD_ENTRY_PX, "150.010");

        let tick = parse_market_data(&message, &registry(), received()).unwrap();

        assert_eq!(tick.time, received());
    }
}
