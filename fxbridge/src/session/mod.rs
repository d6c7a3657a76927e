use crate::{clock::SharedClock, error::SessionError};
use derive_more::Display;
use fxbridge_integration::{
    protocol::fix::{FixMessage, MsgType, SessionHeader, Tag, encode},
    transport::FixStream,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::Instant,
};
use tracing::{debug, trace};

/// [`SessionManager`](manager::SessionManager) connect, logon, heartbeat & reconnect state
/// machine.
pub mod manager;

/// Market data [`QuoteHandler`](quote::QuoteHandler).
pub mod quote;

/// Order entry [`TradeHandler`](trade::TradeHandler).
pub mod trade;

/// Role of a FIX session, used as its log label.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Display)]
pub enum SessionRole {
    #[display("quote")]
    Quote,
    #[display("trade")]
    Trade,
}

/// [`SessionManager`](manager::SessionManager) lifecycle state.
///
/// `Disconnected -> Connecting -> LogonSent -> Active`, any failure returns to `Disconnected`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize, Display)]
pub enum SessionState {
    #[display("DISCONNECTED")]
    Disconnected,
    #[display("CONNECTING")]
    Connecting,
    #[display("LOGON_SENT")]
    LogonSent,
    #[display("ACTIVE")]
    Active,
}

/// Role specific behaviour plugged into a [`SessionManager`](manager::SessionManager).
pub trait SessionHandler
where
    Self: Send,
{
    /// Cadence at which the heartbeat is checked and [`Self::on_tick`] is called while active.
    fn tick_interval(&self) -> Duration;

    /// Called once the logon is confirmed.
    fn on_logon<S>(
        &mut self,
        session: &mut Session<S>,
    ) -> impl Future<Output = Result<(), SessionError>> + Send
    where
        S: AsyncRead + AsyncWrite + Unpin + Send;

    /// Periodic work performed while active.
    fn on_tick<S>(
        &mut self,
        session: &mut Session<S>,
    ) -> impl Future<Output = Result<(), SessionError>> + Send
    where
        S: AsyncRead + AsyncWrite + Unpin + Send;

    /// Application level message received while active.
    fn on_message(&mut self, message: FixMessage);
}

/// Single connected FIX session.
///
/// A `Session` lives for exactly one connection, so its outbound sequence number starts at 1
/// on every (re)logon.
#[derive(Debug)]
pub struct Session<S> {
    role: SessionRole,
    header: SessionHeader,
    stream: FixStream<S>,
    clock: SharedClock,
    seq_num: u64,
    heartbeat_interval: Duration,
    last_heartbeat: Instant,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        role: SessionRole,
        header: SessionHeader,
        stream: S,
        clock: SharedClock,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            role,
            header,
            stream: FixStream::new(stream),
            clock,
            seq_num: 1,
            heartbeat_interval,
            last_heartbeat: Instant::now(),
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    /// MsgSeqNum (34) of the next outbound message.
    pub fn next_seq_num(&self) -> u64 {
        self.seq_num
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Encode & write the message with the next sequence number.
    pub async fn send(&mut self, message: &FixMessage) -> Result<(), SessionError> {
        let seq_num = self.seq_num;
        let wire = encode(&self.header, seq_num, self.clock.time(), message);

        debug!(session = %self.role, seq_num, %message, "sending FIX message");
        self.stream.send(&wire).await?;
        self.seq_num += 1;

        Ok(())
    }

    /// Receive the next decoded message. Cancel safe.
    ///
    /// A peer closing the connection is a [`SessionError::Disconnected`].
    pub async fn recv(&mut self) -> Result<FixMessage, SessionError> {
        match self.stream.recv().await? {
            Some(message) => {
                debug!(session = %self.role, %message, "received FIX message");
                Ok(message)
            }
            None => Err(SessionError::Disconnected),
        }
    }

    /// Send a Heartbeat (0) if the heartbeat interval has elapsed since the last one.
    pub async fn maintain_heartbeat(&mut self) -> Result<bool, SessionError> {
        if self.last_heartbeat.elapsed() <= self.heartbeat_interval {
            return Ok(false);
        }

        self.send_heartbeat(None).await?;
        Ok(true)
    }

    /// Send a Heartbeat (0), echoing the TestReqID (112) when responding to a TestRequest (1).
    pub async fn send_heartbeat(&mut self, test_req_id: Option<&str>) -> Result<(), SessionError> {
        let mut heartbeat = FixMessage::new(MsgType::Heartbeat);
        if let Some(test_req_id) = test_req_id {
            heartbeat.push(Tag::TEST_REQ_ID, test_req_id);
        }

        self.send(&heartbeat).await?;
        self.last_heartbeat = Instant::now();
        trace!(session = %self.role, "heartbeat sent");

        Ok(())
    }

    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.send(&FixMessage::new(MsgType::Logout)).await
    }

    /// Shut down the write half of the connection.
    pub async fn close(mut self) {
        if let Err(error) = self.stream.close().await {
            debug!(session = %self.role, %error, "failed to close session stream");
        }
    }
}
