use crate::{
    error::DecodeError,
    protocol::fix::{Field, FixMessage, MsgType, SENDING_TIME_FORMAT, SOH, Tag},
};
use chrono::{DateTime, Utc};
use smol_str::SmolStr;
use std::fmt::Write;

/// Per-session standard header identifiers.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionHeader {
    pub begin_string: SmolStr,
    pub sender_comp_id: SmolStr,
    pub target_comp_id: SmolStr,
    /// Sent as both TargetSubID (57) and SenderSubID (50), as the gateway expects.
    pub sender_sub_id: SmolStr,
}

/// FIX checksum: sum of every byte modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |checksum, byte| checksum.wrapping_add(*byte))
}

/// Encode an outbound [`FixMessage`] into wire bytes.
///
/// The body is the standard header (35, 49, 56, 34, 52, 57, 50) followed by the message fields,
/// each terminated by [`SOH`]. It is prefixed by BeginString (8) & BodyLength (9) and suffixed
/// by the 3 digit CheckSum (10).
pub fn encode(
    header: &SessionHeader,
    seq_num: u64,
    sending_time: DateTime<Utc>,
    message: &FixMessage,
) -> Vec<u8> {
    let mut body = String::with_capacity(128);
    let sending_time = sending_time.format(SENDING_TIME_FORMAT).to_string();

    let standard_header = [
        (Tag::MSG_TYPE, message.msg_type.as_str()),
        (Tag::SENDER_COMP_ID, header.sender_comp_id.as_str()),
        (Tag::TARGET_COMP_ID, header.target_comp_id.as_str()),
    ];
    for (tag, value) in standard_header {
        push_field(&mut body, tag, value);
    }
    push_field(&mut body, Tag::MSG_SEQ_NUM, seq_num);
    push_field(&mut body, Tag::SENDING_TIME, &sending_time);
    push_field(&mut body, Tag::TARGET_SUB_ID, &header.sender_sub_id);
    push_field(&mut body, Tag::SENDER_SUB_ID, &header.sender_sub_id);

    for Field { tag, value } in &message.fields {
        push_field(&mut body, *tag, value);
    }

    let mut wire = String::with_capacity(body.len() + 32);
    push_field(&mut wire, Tag::BEGIN_STRING, &header.begin_string);
    push_field(&mut wire, Tag::BODY_LENGTH, body.len());
    wire.push_str(&body);

    let checksum = checksum(wire.as_bytes());
    let _ = write!(wire, "{}={:03}", Tag::CHECKSUM, checksum);
    wire.push(SOH as char);

    wire.into_bytes()
}

fn push_field<V>(buffer: &mut String, tag: Tag, value: V)
where
    V: std::fmt::Display,
{
    let _ = write!(buffer, "{tag}={value}");
    buffer.push(SOH as char);
}

/// Decode a single complete FIX message into a [`FixMessage`] field table.
///
/// Unknown and duplicate tags are kept. BeginString must come first, and the BodyLength and
/// CheckSum must match the received bytes.
pub fn decode(bytes: &[u8]) -> Result<FixMessage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut fields = Vec::with_capacity(16);
    let mut body_start = None;
    let mut checksum_start = None;
    let mut offset = 0;

    while offset < bytes.len() {
        let Some(len) = bytes[offset..].iter().position(|byte| *byte == SOH) else {
            return Err(DecodeError::MalformedField(
                String::from_utf8_lossy(&bytes[offset..]).into_owned(),
            ));
        };

        let field = parse_field(&bytes[offset..offset + len])?;

        if fields.is_empty() && field.tag != Tag::BEGIN_STRING {
            return Err(DecodeError::BeginString);
        }

        match field.tag {
            Tag::BODY_LENGTH if body_start.is_none() => body_start = Some(offset + len + 1),
            Tag::CHECKSUM if checksum_start.is_none() => checksum_start = Some(offset),
            _ => {}
        }

        fields.push(field);
        offset += len + 1;
    }

    let message = FixMessage {
        msg_type: MsgType::Other(SmolStr::default()),
        fields,
    };

    let body_start = body_start.ok_or(DecodeError::MissingField(Tag::BODY_LENGTH))?;
    let checksum_start = checksum_start.ok_or(DecodeError::MissingField(Tag::CHECKSUM))?;

    let declared = message.parse::<usize>(Tag::BODY_LENGTH)?;
    let actual = checksum_start.saturating_sub(body_start);
    if declared != actual {
        return Err(DecodeError::BodyLength { declared, actual });
    }

    let computed = checksum(&bytes[..checksum_start]);
    let declared = message.require(Tag::CHECKSUM)?;
    if declared.parse::<u16>().ok() != Some(u16::from(computed)) {
        return Err(DecodeError::Checksum {
            declared: declared.to_string(),
            computed,
        });
    }

    let msg_type = MsgType::from(message.require(Tag::MSG_TYPE)?);

    Ok(FixMessage { msg_type, ..message })
}

fn parse_field(raw: &[u8]) -> Result<Field, DecodeError> {
    let Some(equals) = raw.iter().position(|byte| *byte == b'=') else {
        return Err(DecodeError::MalformedField(
            String::from_utf8_lossy(raw).into_owned(),
        ));
    };

    let tag = std::str::from_utf8(&raw[..equals])
        .ok()
        .and_then(|tag| tag.parse::<Tag>().ok())
        .ok_or_else(|| {
            DecodeError::InvalidTag(String::from_utf8_lossy(&raw[..equals]).into_owned())
        })?;

    let value = SmolStr::new(String::from_utf8_lossy(&raw[equals + 1..]));

    Ok(Field::new(tag, value))
}
