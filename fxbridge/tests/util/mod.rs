#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use fxbridge::{
    clock::{ManualClock, SharedClock},
    config::SystemConfig,
    notify::Notifier,
};
use fxbridge_integration::{
    SocketError,
    protocol::fix::{FixMessage, MsgType, SessionHeader, Tag, encode},
    transport::{Connector, FixStream},
};
use parking_lot::Mutex;
use smol_str::SmolStr;
use std::{collections::VecDeque, sync::Arc};
use tokio::{io::DuplexStream, time::Instant};

pub const CONFIG: &str = r#"{
    "quote": {
        "host": "localhost",
        "port": 5211,
        "sender_comp_id": "demo.broker.1234",
        "target_comp_id": "cServer",
        "sender_sub_id": "QUOTE",
        "account": "1234",
        "password": "secret"
    },
    "trade": {
        "host": "localhost",
        "port": 5212,
        "sender_comp_id": "demo.broker.1234",
        "target_comp_id": "cServer",
        "sender_sub_id": "TRADE",
        "account": "1234",
        "password": "secret"
    },
    "instruments": [
        {
            "name": "GBP_JPY",
            "symbol": 7,
            "price_precision": 3,
            "params": {
                "tolerance": 29.8,
                "sl_pips": 49.01,
                "tp_pips": 149.35,
                "pip_value": 0.01,
                "slippage": 0.02,
                "spread": 0.02,
                "commission": 0.5
            }
        }
    ]
}"#;

pub fn config() -> SystemConfig {
    SystemConfig::from_json(CONFIG).unwrap()
}

pub fn time(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
}

pub fn manual_clock() -> (ManualClock, SharedClock) {
    let clock = ManualClock::new(time(0, 0));
    (clock.clone(), Arc::new(clock))
}

/// [`Connector`] handing out queued in-memory streams, recording the time of every connect.
///
/// Once the queue is exhausted further connects never complete.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    streams: Arc<Mutex<VecDeque<DuplexStream>>>,
    connects: Arc<Mutex<Vec<Instant>>>,
}

impl MockConnector {
    /// Queue a connection, returning the [`Gateway`] end of it.
    pub fn accept(&self, sender_sub_id: &str) -> Gateway {
        let (client, server) = tokio::io::duplex(64 * 1024);
        self.streams.lock().push_back(client);
        Gateway::new(server, sender_sub_id)
    }

    pub fn connects(&self) -> Vec<Instant> {
        self.connects.lock().clone()
    }
}

impl Connector for MockConnector {
    type Stream = DuplexStream;

    async fn connect(&self) -> Result<Self::Stream, SocketError> {
        self.connects.lock().push(Instant::now());
        let next = self.streams.lock().pop_front();

        match next {
            Some(stream) => Ok(stream),
            None => std::future::pending().await,
        }
    }
}

/// Broker side of a mocked FIX session.
#[derive(Debug)]
pub struct Gateway {
    stream: FixStream<DuplexStream>,
    header: SessionHeader,
    seq_num: u64,
}

impl Gateway {
    fn new(stream: DuplexStream, sender_sub_id: &str) -> Self {
        Self {
            stream: FixStream::new(stream),
            header: SessionHeader {
                begin_string: SmolStr::new("FIX.4.4"),
                sender_comp_id: SmolStr::new("cServer"),
                target_comp_id: SmolStr::new("demo.broker.1234"),
                sender_sub_id: SmolStr::new(sender_sub_id),
            },
            seq_num: 1,
        }
    }

    /// Next message sent by the client, panicking if the connection closes.
    pub async fn recv(&mut self) -> FixMessage {
        self.stream
            .recv()
            .await
            .unwrap()
            .expect("client closed the connection")
    }

    /// Next message sent by the client that is not a Heartbeat (0).
    pub async fn recv_skip_heartbeats(&mut self) -> FixMessage {
        loop {
            let message = self.recv().await;
            if message.msg_type != MsgType::Heartbeat {
                return message;
            }
        }
    }

    pub async fn send(&mut self, message: FixMessage) {
        self.send_at(message, time(0, 0)).await
    }

    /// Send the message with the provided SendingTime (52).
    pub async fn send_at(&mut self, message: FixMessage, sending_time: DateTime<Utc>) {
        let wire = encode(&self.header, self.seq_num, sending_time, &message);
        self.seq_num += 1;
        self.stream.send(&wire).await.unwrap();
    }

    /// Receive the client Logon (A) and confirm it.
    pub async fn accept_logon(&mut self) -> FixMessage {
        let logon = self.recv().await;
        assert_eq!(logon.msg_type, MsgType::Logon);
        self.send(FixMessage::new(MsgType::Logon).with(Tag::HEART_BT_INT, 10))
            .await;
        logon
    }

    /// Send a bid & offer snapshot for the symbol.
    pub async fn send_quote(
        &mut self,
        symbol: u32,
        bid: &str,
        ask: &str,
        sending_time: DateTime<Utc>,
    ) {
        let snapshot = FixMessage::new(MsgType::MarketDataSnapshot)
            .with(Tag::SYMBOL, symbol)
            .with(Tag::NO_MD_ENTRIES, 2)
            .with(Tag::MD_ENTRY_TYPE, 0)
            .with(Tag::MD_ENTRY_PX, bid)
            .with(Tag::MD_ENTRY_TYPE, 1)
            .with(Tag::MD_ENTRY_PX, ask);

        self.send_at(snapshot, sending_time).await
    }
}

/// [`Notifier`] recording every message it is asked to deliver.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: String) {
        self.messages.lock().push(message);
    }
}
