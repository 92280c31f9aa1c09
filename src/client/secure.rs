//! Transport setup: plain TCP or a secure channel layered over it.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig as TlsConfig;
use tokio_rustls::TlsConnector;
use tracing::warn;

use super::error::ConnectError;

/// A duplex byte stream the pipeline can run over.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

/// A type-erased [`AsyncStream`].
pub type BoxedStream = Box<dyn AsyncStream>;

pub(crate) fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

/// A TCP connection about to be secured.
#[derive(Debug)]
pub struct SecureChannel {
    inner: TcpStream,
}

impl SecureChannel {
    /// Wraps a connected socket.
    pub fn new(inner: TcpStream) -> Self {
        SecureChannel { inner }
    }

    /// The socket.
    pub fn get_ref(&self) -> &TcpStream {
        &self.inner
    }

    /// Unwraps the socket.
    pub fn into_inner(self) -> TcpStream {
        self.inner
    }
}

/// Builds secure channels over TCP connections.
///
/// `connect` calls [`create`](Self::create) on the fresh socket and then
/// [`authenticate_as_client`](Self::authenticate_as_client) with the host
/// name that was dialed.
#[async_trait]
pub trait SecureChannelFactory: Send + Sync {
    /// Prepares the socket. Enables TCP keepalive by default.
    async fn create(&self, inner: TcpStream) -> Result<SecureChannel, ConnectError> {
        if let Err(e) = enable_keepalive(&inner) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Ok(SecureChannel::new(inner))
    }

    /// Runs the client side of the handshake against `target_host`.
    async fn authenticate_as_client(
        &self,
        channel: SecureChannel,
        target_host: &str,
    ) -> Result<BoxedStream, ConnectError>;
}

/// TLS via rustls.
///
/// Certificate policy is whatever the supplied rustls configuration says.
#[derive(Clone)]
pub struct RustlsChannelFactory {
    connector: TlsConnector,
}

impl RustlsChannelFactory {
    /// Uses `config` for every handshake.
    pub fn new(config: Arc<TlsConfig>) -> Self {
        RustlsChannelFactory {
            connector: TlsConnector::from(config),
        }
    }
}

impl fmt::Debug for RustlsChannelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustlsChannelFactory").finish_non_exhaustive()
    }
}

#[async_trait]
impl SecureChannelFactory for RustlsChannelFactory {
    async fn authenticate_as_client(
        &self,
        channel: SecureChannel,
        target_host: &str,
    ) -> Result<BoxedStream, ConnectError> {
        let name = ServerName::try_from(target_host.to_owned())
            .map_err(|_| ConnectError::InvalidServerName(target_host.to_owned()))?;
        let stream = self
            .connector
            .connect(name, channel.into_inner())
            .await
            .map_err(ConnectError::Tls)?;
        Ok(Box::new(stream))
    }
}

/// How `connect` should treat the TCP connection.
#[derive(Clone, Default)]
pub enum SecurityMode {
    /// Plain TCP.
    #[default]
    Plain,
    /// Secured by the given factory.
    Secure(Arc<dyn SecureChannelFactory>),
}

impl SecurityMode {
    /// TLS via rustls with `config`.
    pub fn rustls(config: Arc<TlsConfig>) -> Self {
        SecurityMode::Secure(Arc::new(RustlsChannelFactory::new(config)))
    }
}

impl fmt::Debug for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityMode::Plain => f.write_str("Plain"),
            SecurityMode::Secure(_) => f.write_str("Secure(..)"),
        }
    }
}

/// Dials `host:port` and applies `security`.
pub(crate) async fn dial(
    host: &str,
    port: u16,
    security: &SecurityMode,
) -> Result<BoxedStream, ConnectError> {
    let tcp = TcpStream::connect((host, port)).await?;
    match security {
        SecurityMode::Plain => {
            if let Err(e) = enable_keepalive(&tcp) {
                warn!("failed to enable TCP keepalive: {}", e);
            }
            Ok(Box::new(tcp))
        }
        SecurityMode::Secure(factory) => {
            let channel = factory.create(tcp).await?;
            factory.authenticate_as_client(channel, host).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    struct Passthrough;

    #[async_trait]
    impl SecureChannelFactory for Passthrough {
        async fn authenticate_as_client(
            &self,
            channel: SecureChannel,
            _target_host: &str,
        ) -> Result<BoxedStream, ConnectError> {
            Ok(Box::new(channel.into_inner()))
        }
    }

    #[tokio::test]
    async fn test_dial_with_factory() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });

        let security = SecurityMode::Secure(Arc::new(Passthrough));
        dial("127.0.0.1", port, &security).await.unwrap();
        accept.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_dial_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = dial("127.0.0.1", port, &SecurityMode::Plain).await;
        assert!(matches!(err, Err(ConnectError::Io(_))));
    }
}
