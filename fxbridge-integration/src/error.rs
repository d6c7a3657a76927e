use crate::protocol::fix::Tag;
use thiserror::Error;

/// All socket IO related errors generated in `fxbridge-integration`.
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Sink error")]
    Sink,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connecting to {address} timed out")]
    ConnectTimeout { address: String },

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("TLS handshake with {address} failed: {error}")]
    Tls {
        address: String,
        error: std::io::Error,
    },

    #[error("FIX decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("FixStream terminated: {0}")]
    Terminated(String),
}

/// All errors generated when decoding raw bytes into a FIX message.
///
/// Decoding never panics on partial or garbled input, the caller decides whether to drop the
/// message and carry on.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty input")]
    Empty,

    #[error("malformed field: {0}")]
    MalformedField(String),

    #[error("invalid tag: {0}")]
    InvalidTag(String),

    #[error("missing required field: {0}")]
    MissingField(Tag),

    #[error("invalid value for {tag}: {value}")]
    InvalidValue { tag: Tag, value: String },

    #[error("BeginString must be the first field")]
    BeginString,

    #[error("declared body length {declared} does not match actual {actual}")]
    BodyLength { declared: usize, actual: usize },

    #[error("declared checksum {declared} does not match computed {computed:03}")]
    Checksum { declared: String, computed: u8 },
}
