//! Byte transports a session runs over.
//!
//! A [`Connector`] opens a duplex byte stream for a [`ServerTarget`]. The
//! session frames it with [`LineCodec`] and never looks at the stream type,
//! so tests can swap [`TcpConnector`] for the in-process [`MemoryConnector`].

mod codec;
#[cfg(feature = "tls")]
mod tls;

use std::io;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::session::CertValidation;

pub use self::codec::LineCodec;

/// Longest inbound line accepted before the connection is treated as broken.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Any stream usable as a session transport.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

/// Type-erased transport stream.
pub type BoxedStream = Box<dyn AsyncStream>;

/// Where and how to connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerTarget {
    /// Host name, also used for TLS server name.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Wrap the stream in TLS.
    pub secure: bool,
    /// Certificate policy when `secure` is set.
    pub cert_validation: CertValidation,
}

/// Opens transport streams.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, target: &ServerTarget) -> BoxFuture<'static, Result<BoxedStream>>;
}

/// TCP, optionally wrapped in TLS.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, target: &ServerTarget) -> BoxFuture<'static, Result<BoxedStream>> {
        let target = target.clone();
        async move {
            let tcp = TcpStream::connect((target.host.as_str(), target.port)).await?;
            if let Err(e) = enable_keepalive(&tcp) {
                warn!("failed to enable TCP keepalive: {}", e);
            }
            debug!(host = %target.host, port = target.port, secure = target.secure, "tcp connected");
            if target.secure {
                secure(tcp, &target).await
            } else {
                Ok(Box::new(tcp) as BoxedStream)
            }
        }
        .boxed()
    }
}

#[cfg(feature = "tls")]
async fn secure(tcp: TcpStream, target: &ServerTarget) -> Result<BoxedStream> {
    tls::connect(tcp, &target.host, target.cert_validation).await
}

#[cfg(not(feature = "tls"))]
async fn secure(_tcp: TcpStream, _target: &ServerTarget) -> Result<BoxedStream> {
    Err(Error::Tls("built without the `tls` feature".to_owned()))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

/// In-process connector backed by [`tokio::io::duplex`].
///
/// Every `connect` hands the server half of a fresh pipe to the receiver
/// returned by [`MemoryConnector::new`]. Connecting fails with
/// `ConnectionRefused` once that receiver is dropped.
#[derive(Clone, Debug)]
pub struct MemoryConnector {
    peers: mpsc::UnboundedSender<DuplexStream>,
    buffer: usize,
}

impl MemoryConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DuplexStream>) {
        let (peers, rx) = mpsc::unbounded_channel();
        (
            Self {
                peers,
                buffer: 64 * 1024,
            },
            rx,
        )
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _target: &ServerTarget) -> BoxFuture<'static, Result<BoxedStream>> {
        let (client, server) = tokio::io::duplex(self.buffer);
        let result = self
            .peers
            .send(server)
            .map(|()| Box::new(client) as BoxedStream)
            .map_err(|_| {
                Error::Transport(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "memory peer is gone",
                ))
            });
        futures_util::future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn target() -> ServerTarget {
        ServerTarget {
            host: "memory".into(),
            port: 6667,
            secure: false,
            cert_validation: CertValidation::Strict,
        }
    }

    #[tokio::test]
    async fn test_memory_connector_pipes_bytes() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut client = connector.connect(&target()).await.unwrap();
        let mut server = peers.recv().await.unwrap();

        client.write_all(b"NICK a\r\n").await.unwrap();
        let mut buf = [0u8; 8];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"NICK a\r\n");
    }

    #[tokio::test]
    async fn test_memory_connector_refused_without_peer() {
        let (connector, peers) = MemoryConnector::new();
        drop(peers);
        let err = connector.connect(&target()).await.err().unwrap();
        assert!(err.is_transport());
    }
}
