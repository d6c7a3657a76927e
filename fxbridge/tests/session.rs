use fxbridge::{
    error::SessionError,
    session::{
        Session, SessionHandler, SessionRole, SessionState,
        manager::{SessionManager, SessionSettings},
    },
    shutdown::shutdown_channel,
};
use fxbridge_integration::protocol::fix::{FixMessage, MsgType, Tag};
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::Instant,
};
use util::{MockConnector, config, manual_clock};

mod util;

/// Handler with no application behaviour.
#[derive(Debug, Default)]
struct IdleHandler;

impl SessionHandler for IdleHandler {
    fn tick_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn on_logon<S>(&mut self, _: &mut Session<S>) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        Ok(())
    }

    async fn on_tick<S>(&mut self, _: &mut Session<S>) -> Result<(), SessionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        Ok(())
    }

    fn on_message(&mut self, _: FixMessage) {}
}

fn settings() -> SessionSettings {
    let config = config();
    SessionSettings::new(&config, &config.quote)
}

#[tokio::test(start_paused = true)]
async fn test_session_manager_reconnects_after_backoff_with_fresh_sequence_numbers() {
    let connector = MockConnector::default();
    let mut first = connector.accept("QUOTE");
    let mut second = connector.accept("QUOTE");
    let (_, clock) = manual_clock();
    let (trigger, listener) = shutdown_channel();

    let manager = SessionManager::new(
        SessionRole::Quote,
        settings(),
        connector.clone(),
        IdleHandler,
        clock,
        listener,
    );
    let handle = tokio::spawn(manager.run());

    let logon = first.accept_logon().await;
    assert_eq!(logon.seq_num(), Some(1));
    assert_eq!(logon.get(Tag::USERNAME), Some("1234"));
    assert_eq!(logon.get(Tag::HEART_BT_INT), Some("10"));

    // Silent gateway is not a failure
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(connector.connects().len(), 1);

    // Gateway drops the connection
    drop(first);
    let dropped = Instant::now();

    let logon = second.recv().await;
    assert_eq!(logon.msg_type, MsgType::Logon);
    assert_eq!(logon.seq_num(), Some(1));

    let connects = connector.connects();
    assert_eq!(connects.len(), 2);
    let backoff = connects[1] - dropped;
    assert!(backoff >= Duration::from_secs(5), "backoff: {backoff:?}");
    assert!(backoff < Duration::from_secs(6), "backoff: {backoff:?}");

    trigger.shutdown();
    handle.await.unwrap();
    assert_eq!(connector.connects().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_session_manager_run_cycle_logon_failures() {
    struct TestCase {
        response: Option<FixMessage>,
        expected: fn(&SessionError) -> bool,
    }

    let tests = vec![
        TestCase {
            // TC0: Logout in response to the logon is a rejection
            response: Some(FixMessage::new(MsgType::Logout).with(Tag::TEXT, "invalid password")),
            expected: |error| matches!(error, SessionError::LogonRejected(MsgType::Logout)),
        },
        TestCase {
            // TC1: no response within the read timeout
            response: None,
            expected: |error| matches!(error, SessionError::LogonTimeout { secs: 15 }),
        },
    ];

    for (index, TestCase { response, expected }) in tests.into_iter().enumerate() {
        let connector = MockConnector::default();
        let mut gateway = connector.accept("QUOTE");
        let (_, clock) = manual_clock();
        let (_trigger, listener) = shutdown_channel();

        let mut manager = SessionManager::new(
            SessionRole::Quote,
            settings(),
            connector,
            IdleHandler,
            clock,
            listener,
        );

        let started = Instant::now();
        let (error, _) = tokio::join!(manager.run_cycle(), async {
            let logon = gateway.recv().await;
            assert_eq!(logon.msg_type, MsgType::Logon, "TC{} failed", index);
            if let Some(response) = response {
                gateway.send(response).await;
            }
            gateway
        });

        assert!(expected(&error), "TC{} failed: {error:?}", index);
        assert_eq!(manager.state(), SessionState::Disconnected, "TC{} failed", index);

        if matches!(error, SessionError::LogonTimeout { .. }) {
            assert!(started.elapsed() >= Duration::from_secs(15), "TC{} failed", index);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_manager_answers_test_request_and_heartbeats() {
    let connector = MockConnector::default();
    let mut gateway = connector.accept("TRADE");
    let (_, clock) = manual_clock();
    let (trigger, listener) = shutdown_channel();

    let manager = SessionManager::new(
        SessionRole::Trade,
        settings(),
        connector,
        IdleHandler,
        clock,
        listener,
    );
    let handle = tokio::spawn(manager.run());

    gateway.accept_logon().await;
    gateway
        .send(FixMessage::new(MsgType::TestRequest).with(Tag::TEST_REQ_ID, "PING"))
        .await;

    let reply = gateway.recv().await;
    assert_eq!(reply.msg_type, MsgType::Heartbeat);
    assert_eq!(reply.get(Tag::TEST_REQ_ID), Some("PING"));
    assert_eq!(reply.seq_num(), Some(2));

    let started = Instant::now();
    let heartbeat = gateway.recv().await;
    assert_eq!(heartbeat.msg_type, MsgType::Heartbeat);
    assert_eq!(heartbeat.get(Tag::TEST_REQ_ID), None);
    assert_eq!(heartbeat.seq_num(), Some(3));
    assert!(started.elapsed() > Duration::from_secs(10));

    trigger.shutdown();

    let logout = gateway.recv().await;
    assert_eq!(logout.msg_type, MsgType::Logout);
    assert_eq!(logout.seq_num(), Some(4));

    handle.await.unwrap();
}
