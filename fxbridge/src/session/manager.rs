use crate::{
    clock::SharedClock,
    config::{SessionConfig, SystemConfig},
    error::SessionError,
    session::{Session, SessionHandler, SessionRole, SessionState},
    shutdown::ShutdownListener,
};
use fxbridge_integration::{
    protocol::fix::{FixMessage, MsgType, SessionHeader, Tag},
    transport::Connector,
};
use smol_str::SmolStr;
use std::{convert::Infallible, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, info, info_span, warn};

/// EncryptMethod (98) none.
const ENCRYPT_METHOD_NONE: u8 = 0;

/// Per-session logon identity, credentials & timings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub header: SessionHeader,
    pub account: SmolStr,
    pub password: SmolStr,
    pub heartbeat_interval: Duration,
    /// Bound on waiting for the logon response.
    pub read_timeout: Duration,
    pub reconnect_backoff: Duration,
}

impl SessionSettings {
    pub fn new(config: &SystemConfig, session: &SessionConfig) -> Self {
        Self {
            header: session.header(&config.begin_string),
            account: session.account.clone(),
            password: session.password.clone(),
            heartbeat_interval: config.heartbeat_interval(),
            read_timeout: config.timing.read_timeout(),
            reconnect_backoff: config.timing.reconnect_backoff(),
        }
    }

    /// Logon (A) carrying the EncryptMethod (98), HeartBtInt (108), Username (553) & Password
    /// (554).
    pub fn logon(&self) -> FixMessage {
        FixMessage::new(MsgType::Logon)
            .with(Tag::ENCRYPT_METHOD, ENCRYPT_METHOD_NONE)
            .with(Tag::HEART_BT_INT, self.heartbeat_interval.as_secs())
            .with(Tag::USERNAME, &self.account)
            .with(Tag::PASSWORD, &self.password)
    }
}

/// Drives a single FIX session through its connect, logon, active & reconnect cycle.
///
/// Connection, logon and I/O failures return the session to [`SessionState::Disconnected`]
/// and the whole cycle is retried after the fixed reconnect backoff. Only shutdown (or losing
/// the dispatch queue) stops the loop.
#[derive(Debug)]
pub struct SessionManager<C, H> {
    role: SessionRole,
    settings: SessionSettings,
    connector: C,
    handler: H,
    clock: SharedClock,
    shutdown: ShutdownListener,
    state: SessionState,
}

impl<C, H> SessionManager<C, H>
where
    C: Connector,
    H: SessionHandler,
{
    pub fn new(
        role: SessionRole,
        settings: SessionSettings,
        connector: C,
        handler: H,
        clock: SharedClock,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            role,
            settings,
            connector,
            handler,
            clock,
            shutdown,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Run connect -> logon -> active cycles until shutdown, waiting the reconnect backoff
    /// after every failed cycle.
    pub async fn run(mut self) {
        let span = info_span!("session", session = %self.role);

        async move {
            info!("session manager running");

            loop {
                let error = self.run_cycle().await;

                if error.is_terminal() {
                    info!(%error, "session manager stopped");
                    break;
                }

                warn!(
                    %error,
                    backoff_secs = self.settings.reconnect_backoff.as_secs(),
                    "session failed, reconnecting after backoff"
                );

                let backoff = tokio::time::sleep(self.settings.reconnect_backoff);
                if until_shutdown(&mut self.shutdown, backoff).await.is_err() {
                    info!("session manager stopped during reconnect backoff");
                    break;
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run a single connect, logon & active cycle, returning the [`SessionError`] that ended
    /// it. The session is always [`SessionState::Disconnected`] afterwards.
    pub async fn run_cycle(&mut self) -> SessionError {
        let error = match self.cycle().await {
            Ok(never) => match never {},
            Err(error) => error,
        };

        self.transition(SessionState::Disconnected);
        error
    }

    async fn cycle(&mut self) -> Result<Infallible, SessionError> {
        self.transition(SessionState::Connecting);
        let stream = until_shutdown(&mut self.shutdown, self.connector.connect()).await??;

        let mut session = Session::new(
            self.role,
            self.settings.header.clone(),
            stream,
            self.clock.clone(),
            self.settings.heartbeat_interval,
        );

        session.send(&self.settings.logon()).await?;
        self.transition(SessionState::LogonSent);

        let response = tokio::time::timeout(self.settings.read_timeout, session.recv());
        match until_shutdown(&mut self.shutdown, response).await? {
            Err(_elapsed) => {
                return Err(SessionError::LogonTimeout {
                    secs: self.settings.read_timeout.as_secs(),
                });
            }
            Ok(response) => {
                let response = response?;
                if response.msg_type != MsgType::Logon {
                    warn!(
                        msg_type = %response.msg_type,
                        text = ?response.get(Tag::TEXT),
                        "logon rejected"
                    );
                    return Err(SessionError::LogonRejected(response.msg_type));
                }
            }
        }

        self.transition(SessionState::Active);

        let result = self.serve(&mut session).await;
        session.close().await;
        result
    }

    async fn serve<S>(&mut self, session: &mut Session<S>) -> Result<Infallible, SessionError>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
    {
        self.handler.on_logon(session).await?;

        let mut ticker = tokio::time::interval(self.handler.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.wait() => {
                    info!("logging out");
                    if let Err(error) = session.logout().await {
                        warn!(%error, "failed to send logout");
                    }
                    return Err(SessionError::Shutdown);
                }

                _ = ticker.tick() => {
                    session.maintain_heartbeat().await?;
                    self.handler.on_tick(session).await?;
                }

                message = session.recv() => {
                    self.on_message(session, message?).await?;
                }
            }
        }
    }

    /// Handle session level messages, forwarding the rest to the [`SessionHandler`].
    async fn on_message<S>(
        &mut self,
        session: &mut Session<S>,
        message: FixMessage,
    ) -> Result<(), SessionError>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
    {
        match message.msg_type.clone() {
            MsgType::Logout => Err(SessionError::Logout(
                message.get(Tag::TEXT).map(String::from),
            )),
            MsgType::TestRequest => session.send_heartbeat(message.get(Tag::TEST_REQ_ID)).await,
            MsgType::Heartbeat => Ok(()),
            MsgType::Reject | MsgType::BusinessMessageReject => {
                warn!(%message, "message rejected by gateway");
                Ok(())
            }
            _ => {
                self.handler.on_message(message);
                Ok(())
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "session state transition");
            self.state = next;
        }
    }
}

/// Race the future against shutdown, returning [`SessionError::Shutdown`] if shutdown wins.
async fn until_shutdown<F>(
    shutdown: &mut ShutdownListener,
    future: F,
) -> Result<F::Output, SessionError>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = shutdown.wait() => Err(SessionError::Shutdown),
        output = future => Ok(output),
    }
}
