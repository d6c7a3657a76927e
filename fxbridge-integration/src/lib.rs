#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # FxBridge-Integration
//! Low-level framework for speaking FIX 4.4 to a broker gateway over TLS-wrapped TCP.
//!
//! Utilised by the other FxBridge crates to exchange session & application messages with the
//! quote (market data) and trade (order entry) gateways.
//!
//! ## Core abstractions:
//! - **FixMessage** typed tag → value field table, tolerant of duplicate & unknown tags.
//! - **Codec** encoding a [`FixMessage`](protocol::fix::FixMessage) with the standard header,
//!   body length & checksum, and decoding wire bytes back into a field table.
//! - **FixStream** reading framed FIX messages from any asynchronous byte stream produced by a
//!   [`Connector`](transport::Connector), eg/ the [`TlsTcpConnector`](transport::TlsTcpConnector).

pub use error::{DecodeError, SocketError};

/// All [`Error`](std::error::Error)s generated in FxBridge-Integration.
pub mod error;

/// FIX protocol field table, codec & frame decoder.
pub mod protocol;

/// [`Connector`](transport::Connector) abstraction over the byte stream a session runs on, and
/// the [`FixStream`](transport::FixStream) that frames it into FIX messages.
pub mod transport;

/// Defines a trait [`Tx`](channel::Tx) abstraction over different channel kinds, as well as
/// other channel utilities.
///
/// eg/ `UnboundedTx`, `UnboundedRx`, etc.
pub mod channel;
