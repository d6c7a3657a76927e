use crate::config::ConfigError;
use fxbridge_data::DataError;
use fxbridge_instrument::RegistryError;
use fxbridge_integration::{SocketError, protocol::fix::MsgType};
use thiserror::Error;

/// Top level error returned by the `fxbridge` binary & [`System`](crate::system::System).
#[derive(Debug, Error)]
pub enum FxBridgeError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("instrument registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("market data: {0}")]
    MarketData(#[from] DataError),

    #[error("socket: {0}")]
    Socket(#[from] SocketError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JoinError: {0}")]
    JoinError(String),
}

impl From<tokio::task::JoinError> for FxBridgeError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::JoinError(format!("{value:?}"))
    }
}

/// Errors ending a single connect, logon & active cycle of a
/// [`SessionManager`](crate::session::manager::SessionManager).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("socket: {0}")]
    Socket(#[from] SocketError),

    #[error("no logon response within {secs}s")]
    LogonTimeout { secs: u64 },

    #[error("logon rejected with response: {0}")]
    LogonRejected(MsgType),

    #[error("logout received: {}", .0.as_deref().unwrap_or("no reason"))]
    Logout(Option<String>),

    #[error("peer closed connection")]
    Disconnected,

    #[error("dispatch queue: {0}")]
    Dispatch(#[from] RxDropped),

    #[error("shutdown requested")]
    Shutdown,
}

impl SessionError {
    /// Determines if the [`SessionError`] ends the session permanently rather than triggering
    /// a reconnect after the backoff.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionError::Shutdown | SessionError::Dispatch(_))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
#[error("RxDropped")]
pub struct RxDropped;

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for RxDropped {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self
    }
}
