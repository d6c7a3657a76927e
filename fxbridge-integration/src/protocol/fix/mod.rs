pub use codec::{SessionHeader, checksum, decode, encode};
pub use frame::FrameDecoder;
pub use message::{Field, FixMessage, MsgType};
pub use tag::Tag;

/// [`SessionHeader`] and the FIX `encode` / `decode` functions.
pub mod codec;

/// [`FrameDecoder`] splitting a byte stream into individual FIX messages.
pub mod frame;

/// [`FixMessage`] typed field table.
pub mod message;

/// FIX field [`Tag`] numbers.
pub mod tag;

/// Start of header field delimiter.
pub const SOH: u8 = 0x01;

/// Printable stand-in for [`SOH`] used when logging FIX payloads.
pub const SOH_PRINTABLE: char = '|';

/// Default BeginString (tag 8) value.
pub const FIX_4_4: &str = "FIX.4.4";

/// SendingTime (tag 52) format, UTC with millisecond precision.
pub const SENDING_TIME_FORMAT: &str = "%Y%m%d-%H:%M:%S%.3f";

/// Render raw FIX bytes with [`SOH`] replaced by [`SOH_PRINTABLE`].
pub fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| match *byte {
            SOH => SOH_PRINTABLE,
            other => other as char,
        })
        .collect()
}
