use crate::{
    error::DecodeError,
    protocol::fix::{SOH_PRINTABLE, Tag},
};
use derive_more::Constructor;
use smol_str::SmolStr;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// FIX MsgType (tag 35) values used by FxBridge.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum MsgType {
    Heartbeat,
    TestRequest,
    Reject,
    Logout,
    ExecutionReport,
    Logon,
    NewOrderSingle,
    MarketDataRequest,
    MarketDataSnapshot,
    MarketDataIncremental,
    MarketDataRequestReject,
    BusinessMessageReject,
    Other(SmolStr),
}

impl MsgType {
    pub fn as_str(&self) -> &str {
        match self {
            MsgType::Heartbeat => "0",
            MsgType::TestRequest => "1",
            MsgType::Reject => "3",
            MsgType::Logout => "5",
            MsgType::ExecutionReport => "8",
            MsgType::Logon => "A",
            MsgType::NewOrderSingle => "D",
            MsgType::MarketDataRequest => "V",
            MsgType::MarketDataSnapshot => "W",
            MsgType::MarketDataIncremental => "X",
            MsgType::MarketDataRequestReject => "Y",
            MsgType::BusinessMessageReject => "j",
            MsgType::Other(other) => other.as_str(),
        }
    }

    /// Market data snapshot (W) or incremental refresh (X).
    pub fn is_market_data(&self) -> bool {
        matches!(
            self,
            MsgType::MarketDataSnapshot | MsgType::MarketDataIncremental
        )
    }
}

impl From<&str> for MsgType {
    fn from(value: &str) -> Self {
        match value {
            "0" => MsgType::Heartbeat,
            "1" => MsgType::TestRequest,
            "3" => MsgType::Reject,
            "5" => MsgType::Logout,
            "8" => MsgType::ExecutionReport,
            "A" => MsgType::Logon,
            "D" => MsgType::NewOrderSingle,
            "V" => MsgType::MarketDataRequest,
            "W" => MsgType::MarketDataSnapshot,
            "X" => MsgType::MarketDataIncremental,
            "Y" => MsgType::MarketDataRequestReject,
            "j" => MsgType::BusinessMessageReject,
            other => MsgType::Other(SmolStr::new(other)),
        }
    }
}

impl Display for MsgType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single FIX `tag=value` field.
#[derive(Debug, Clone, Eq, PartialEq, Constructor)]
pub struct Field {
    pub tag: Tag,
    pub value: SmolStr,
}

/// Typed FIX field table.
///
/// Fields are kept in wire order and duplicates are preserved, since repeating groups (eg/
/// MDEntryType 269 in a market data snapshot) repeat the same tag once per entry.
///
/// Outbound messages hold only their application fields: the standard header, body length and
/// checksum are added by [`encode`](super::encode). Decoded messages hold every field received.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FixMessage {
    pub msg_type: MsgType,
    pub fields: Vec<Field>,
}

impl FixMessage {
    pub fn new(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            fields: Vec::new(),
        }
    }

    /// Append a field, returning `Self` for chaining.
    pub fn with<V>(mut self, tag: Tag, value: V) -> Self
    where
        V: Display,
    {
        self.push(tag, value);
        self
    }

    pub fn push<V>(&mut self, tag: Tag, value: V)
    where
        V: Display,
    {
        self.fields
            .push(Field::new(tag, SmolStr::new(value.to_string())));
    }

    /// First value of the provided [`Tag`].
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.tag == tag)
            .map(|field| field.value.as_str())
    }

    /// Every value of the provided [`Tag`], in wire order.
    pub fn get_all(&self, tag: Tag) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(move |field| field.tag == tag)
            .map(|field| field.value.as_str())
    }

    pub fn require(&self, tag: Tag) -> Result<&str, DecodeError> {
        self.get(tag).ok_or(DecodeError::MissingField(tag))
    }

    /// Parse the first value of the provided [`Tag`] into `T`.
    pub fn parse<T>(&self, tag: Tag) -> Result<T, DecodeError>
    where
        T: FromStr,
    {
        let value = self.require(tag)?;
        value.parse().map_err(|_| DecodeError::InvalidValue {
            tag,
            value: value.to_string(),
        })
    }

    pub fn seq_num(&self) -> Option<u64> {
        self.parse(Tag::MSG_SEQ_NUM).ok()
    }
}

impl Display for FixMessage {
    /// Log friendly rendering with `|` delimiters and sensitive values masked.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.get(Tag::MSG_TYPE).is_none() {
            write!(f, "{}={}{}", Tag::MSG_TYPE, self.msg_type, SOH_PRINTABLE)?;
        }
        for field in &self.fields {
            if field.tag.is_sensitive() {
                write!(f, "{}=****{}", field.tag, SOH_PRINTABLE)?;
            } else {
                write!(f, "{}={}{}", field.tag, field.value, SOH_PRINTABLE)?;
            }
        }
        Ok(())
    }
}
