use crate::{
    error::SocketError,
    protocol::fix::{FixMessage, FrameDecoder},
};
use bytes::BytesMut;
use std::{fmt::Debug, future::Future, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore, pki_types::ServerName},
};
use tracing::{debug, warn};

/// Default bound applied when establishing a TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Establishes the byte stream a FIX session runs on.
///
/// Production sessions use the [`TlsTcpConnector`], tests substitute in-memory streams.
pub trait Connector
where
    Self: Send + Sync,
{
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(&self) -> impl Future<Output = Result<Self::Stream, SocketError>> + Send;
}

/// [`Connector`] producing a TLS-wrapped TCP stream to `host:port`.
#[derive(Clone)]
pub struct TlsTcpConnector {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    tls: TlsConnector,
}

impl Debug for TlsTcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsTcpConnector")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl TlsTcpConnector {
    /// Construct a [`TlsTcpConnector`] verifying the server against the Mozilla root
    /// certificates bundled with `webpki-roots`.
    pub fn new<S>(host: S, port: u16, connect_timeout: Duration) -> Result<Self, SocketError>
    where
        S: Into<String>,
    {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let provider = Arc::new(tokio_rustls::rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|error| SocketError::Tls {
                address: String::from("<config>"),
                error: std::io::Error::other(error),
            })?
            .with_root_certificates(roots)
            .with_no_client_auth();

        Ok(Self {
            host: host.into(),
            port,
            connect_timeout,
            tls: TlsConnector::from(Arc::new(config)),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Connector for TlsTcpConnector {
    type Stream = TlsStream<TcpStream>;

    async fn connect(&self) -> Result<Self::Stream, SocketError> {
        let address = self.address();

        let server_name = ServerName::try_from(self.host.clone())
            .map_err(|_| SocketError::InvalidServerName(self.host.clone()))?;

        let tcp = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| SocketError::ConnectTimeout {
            address: address.clone(),
        })??;

        tcp.set_nodelay(true)?;

        let stream = tokio::time::timeout(self.connect_timeout, self.tls.connect(server_name, tcp))
            .await
            .map_err(|_| SocketError::ConnectTimeout {
                address: address.clone(),
            })?
            .map_err(|error| SocketError::Tls { address, error })?;

        Ok(stream)
    }
}

/// Framed FIX message stream over any asynchronous byte stream.
#[derive(Debug)]
pub struct FixStream<S> {
    stream: S,
    buffer: BytesMut,
    decoder: FrameDecoder,
}

impl<S> FixStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            decoder: FrameDecoder::default(),
        }
    }

    /// Write the encoded message bytes and flush.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), SocketError> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Receive the next successfully decoded [`FixMessage`].
    ///
    /// Frames that fail to decode are logged and dropped. Returns `Ok(None)` once the peer has
    /// closed the connection.
    ///
    /// Cancel safe: partially received frames are retained in the internal buffer, so this may
    /// be raced against a timer or wrapped in a timeout.
    pub async fn recv(&mut self) -> Result<Option<FixMessage>, SocketError> {
        loop {
            while let Some(result) = self.decoder.decode_next(&mut self.buffer) {
                match result {
                    Ok(message) => return Ok(Some(message)),
                    Err(error) => warn!(%error, "dropping undecodable FIX frame"),
                }
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                debug!(buffered = self.buffer.len(), "FixStream peer closed connection");
                return Ok(None);
            }
        }
    }

    /// Gracefully shut down the write half of the underlying stream.
    pub async fn close(&mut self) -> Result<(), SocketError> {
        self.stream.shutdown().await.map_err(SocketError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::fix::{MsgType, SessionHeader, encode, printable};
    use chrono::{TimeZone, Utc};
    use smol_str::SmolStr;

    fn wire(msg_type: MsgType, seq_num: u64) -> Vec<u8> {
        let header = SessionHeader {
            begin_string: SmolStr::new("FIX.4.4"),
            sender_comp_id: SmolStr::new("cServer"),
            target_comp_id: SmolStr::new("demo.broker.1234"),
            sender_sub_id: SmolStr::new("TRADE"),
        };
        let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        encode(&header, seq_num, time, &FixMessage::new(msg_type))
    }

    #[tokio::test]
    async fn test_fix_stream_recv_skips_garbage_and_reports_close() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut stream = FixStream::new(client);

        let mut payload = b"8=FIX.4.4\x019=3\x0135=0\x0110=999\x01".to_vec();
        payload.extend(wire(MsgType::Logon, 1));
        server.write_all(&payload).await.unwrap();

        let message = stream.recv().await.unwrap().unwrap();
        assert_eq!(message.msg_type, MsgType::Logon);

        drop(server);
        assert!(stream.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fix_stream_send_writes_raw_bytes() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut stream = FixStream::new(client);

        let bytes = wire(MsgType::Heartbeat, 4);
        stream.send(&bytes).await.unwrap();

        let mut received = vec![0; bytes.len()];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(printable(&received), printable(&bytes));
    }
}
