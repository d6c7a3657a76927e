use derive_more::{Display, From};
use std::str::FromStr;

/// FIX field tag number, eg/ `Tag(35)` is MsgType.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, From)]
pub struct Tag(pub u32);

impl Tag {
    pub const BEGIN_STRING: Self = Self(8);
    pub const BODY_LENGTH: Self = Self(9);
    pub const CHECKSUM: Self = Self(10);
    pub const CL_ORD_ID: Self = Self(11);
    pub const CURRENCY: Self = Self(15);
    pub const MSG_SEQ_NUM: Self = Self(34);
    pub const MSG_TYPE: Self = Self(35);
    pub const ORDER_ID: Self = Self(37);
    pub const ORDER_QTY: Self = Self(38);
    pub const ORD_STATUS: Self = Self(39);
    pub const ORD_TYPE: Self = Self(40);
    pub const PRICE: Self = Self(44);
    pub const SENDER_COMP_ID: Self = Self(49);
    pub const SENDER_SUB_ID: Self = Self(50);
    pub const SENDING_TIME: Self = Self(52);
    pub const SIDE: Self = Self(54);
    pub const SYMBOL: Self = Self(55);
    pub const TARGET_COMP_ID: Self = Self(56);
    pub const TARGET_SUB_ID: Self = Self(57);
    pub const TEXT: Self = Self(58);
    pub const TIME_IN_FORCE: Self = Self(59);
    pub const ENCRYPT_METHOD: Self = Self(98);
    pub const STOP_PX: Self = Self(99);
    pub const HEART_BT_INT: Self = Self(108);
    pub const TEST_REQ_ID: Self = Self(112);
    pub const NO_RELATED_SYM: Self = Self(146);
    pub const EXEC_TYPE: Self = Self(150);
    pub const SECURITY_TYPE: Self = Self(167);
    pub const MD_REQ_ID: Self = Self(262);
    pub const SUBSCRIPTION_REQUEST_TYPE: Self = Self(263);
    pub const MARKET_DEPTH: Self = Self(264);
    pub const MD_UPDATE_TYPE: Self = Self(265);
    pub const NO_MD_ENTRY_TYPES: Self = Self(267);
    pub const NO_MD_ENTRIES: Self = Self(268);
    pub const MD_ENTRY_TYPE: Self = Self(269);
    pub const MD_ENTRY_PX: Self = Self(270);
    pub const USERNAME: Self = Self(553);
    pub const PASSWORD: Self = Self(554);

    /// Tags whose values must never be logged.
    pub fn is_sensitive(self) -> bool {
        self == Self::PASSWORD
    }
}

impl FromStr for Tag {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}
