use crate::{
    error::DecodeError,
    protocol::fix::{FixMessage, SOH, Tag, decode},
};
use bytes::{Buf, BytesMut};
use tracing::debug;

/// Length of the `10=XXX<SOH>` trailer.
const TRAILER_LEN: usize = 7;

/// Longest accepted `8=...` BeginString field, eg/ `8=FIXT.1.1`.
const MAX_BEGIN_STRING_LEN: usize = 16;

/// Longest accepted `9=...` BodyLength field.
const MAX_BODY_LENGTH_FIELD_LEN: usize = 12;

/// Default upper bound on a declared BodyLength, protects against garbage lengths stalling
/// the stream.
pub const DEFAULT_MAX_BODY_LENGTH: usize = 64 * 1024;

/// Splits an inbound byte buffer into FIX messages using BeginString / BodyLength framing.
///
/// Bytes before a BeginString are skipped. A frame whose declared BodyLength does not land on a
/// CheckSum trailer is reported as an error and the decoder resynchronises on the next
/// BeginString, so one bad frame never poisons the rest of the stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameDecoder {
    pub max_body_length: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self {
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
        }
    }
}

impl FrameDecoder {
    /// Attempt to split the next frame from the front of the `buffer`.
    ///
    /// Returns `None` if more bytes are required to complete the next frame.
    pub fn decode_next(&self, buffer: &mut BytesMut) -> Option<Result<FixMessage, DecodeError>> {
        let start = match find_begin_string(buffer) {
            Some(start) => start,
            None => {
                // Keep a final '8' in case it is the start of a split "8="
                let keep = usize::from(buffer.last() == Some(&b'8'));
                let skip = buffer.len() - keep;
                if skip > 0 {
                    debug!(skipped = skip, "FrameDecoder discarded bytes without BeginString");
                    buffer.advance(skip);
                }
                return None;
            }
        };

        if start > 0 {
            debug!(skipped = start, "FrameDecoder discarded bytes before BeginString");
            buffer.advance(start);
        }

        let Some(begin_string_end) = find_soh(buffer, 0) else {
            if buffer.len() > MAX_BEGIN_STRING_LEN {
                let error = DecodeError::InvalidValue {
                    tag: Tag::BEGIN_STRING,
                    value: String::from_utf8_lossy(&buffer[..MAX_BEGIN_STRING_LEN]).into_owned(),
                };
                return Some(resync(buffer, error));
            }
            return None;
        };
        let length_start = begin_string_end + 1;

        let prefix = b"9=";
        let available = buffer.len().saturating_sub(length_start).min(prefix.len());
        if buffer[length_start..length_start + available] != prefix[..available] {
            return Some(resync(buffer, DecodeError::MissingField(Tag::BODY_LENGTH)));
        }

        let Some(length_end) = find_soh(buffer, length_start) else {
            if buffer.len() - length_start > MAX_BODY_LENGTH_FIELD_LEN {
                return Some(resync(buffer, DecodeError::MissingField(Tag::BODY_LENGTH)));
            }
            return None;
        };

        let raw_length = &buffer[length_start + prefix.len()..length_end];
        let Some(body_length) = std::str::from_utf8(raw_length)
            .ok()
            .and_then(|length| length.parse::<usize>().ok())
            .filter(|length| *length <= self.max_body_length)
        else {
            let error = DecodeError::InvalidValue {
                tag: Tag::BODY_LENGTH,
                value: String::from_utf8_lossy(raw_length).into_owned(),
            };
            return Some(resync(buffer, error));
        };

        let body_start = length_end + 1;
        let trailer_start = body_start + body_length;
        let frame_len = trailer_start + TRAILER_LEN;

        if buffer.len() < frame_len {
            return None;
        }

        let trailer = &buffer[trailer_start..frame_len];
        if !trailer.starts_with(b"10=") || trailer[TRAILER_LEN - 1] != SOH {
            let actual = buffer[body_start..]
                .windows(4)
                .position(|window| window == b"\x0110=")
                .map(|position| position + 1)
                .unwrap_or(buffer.len() - body_start);

            let error = DecodeError::BodyLength {
                declared: body_length,
                actual,
            };
            return Some(resync(buffer, error));
        }

        let frame = buffer.split_to(frame_len);
        Some(decode(&frame))
    }
}

/// Skip past the current BeginString so the next call searches for a fresh frame.
fn resync(buffer: &mut BytesMut, error: DecodeError) -> Result<FixMessage, DecodeError> {
    buffer.advance(1.min(buffer.len()));
    Err(error)
}

/// Position of the next `8=` that starts a field.
fn find_begin_string(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(2)
        .enumerate()
        .find(|(position, window)| {
            *window == b"8=" && (*position == 0 || buffer[position - 1] == SOH)
        })
        .map(|(position, _)| position)
}

fn find_soh(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .iter()
        .position(|byte| *byte == SOH)
        .map(|position| from + position)
}
