//! The async connection pipeline.
//!
//! A [`Client`] owns at most one live connection. Each connection runs two
//! tokio tasks: a read task that tokenizes lines and dispatches them through
//! the registry and the [`SinkTable`], and a send task that drains the
//! outbound queue and flushes once per batch.
//!
//! ```no_run
//! use slirc_client::client::{Client, SecurityMode};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .sink("PRIVMSG", |_ctx, msg| {
//!         println!("{}", msg.raw());
//!         Ok(())
//!     })
//!     .build();
//!
//! client.connect("irc.example.net", 6667, SecurityMode::Plain).await?;
//! client.register("guest", "guest", "A Guest")?;
//! client.join("#rust", None)?;
//! # Ok(())
//! # }
//! ```

mod commands;
mod config;
mod error;
mod events;
mod pipeline;
mod secure;
mod sink;
mod state;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

use crate::command::{MessageRegistry, MessageVariant, Nick, User};
use crate::error::ReplyError;
use crate::line::LineCodec;
use crate::message::RawMessage;
use crate::response::Response;

pub use self::config::ClientConfig;
pub use self::error::{ConnectError, DispatchError, InboundViolation, RegisterError, SendError};
pub use self::events::{ChannelEvents, ClientEvents, Event, NoEvents};
pub use self::secure::{
    AsyncStream, BoxedStream, RustlsChannelFactory, SecureChannel, SecureChannelFactory,
    SecurityMode,
};
pub use self::sink::{InboundMessage, Outbound, SinkContext, SinkHandler, SinkTable};
pub use self::state::{ConnectionState, Phase, SelfUser, ServerInfo};

struct Session {
    id: u64,
    outbound: Outbound,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

pub(crate) struct Inner {
    pub(crate) state: RwLock<ConnectionState>,
    pub(crate) sinks: SinkTable,
    pub(crate) registry: Arc<MessageRegistry>,
    pub(crate) events: Arc<dyn ClientEvents>,
    config: ClientConfig,
    secure: Option<Arc<dyn SecureChannelFactory>>,
    session: Mutex<Option<Session>>,
    /// Send tasks of ended sessions that may still be draining.
    retired: Mutex<Vec<JoinHandle<()>>>,
    /// Where to deliver the server's answer to a pending registration.
    registration: Mutex<Option<oneshot::Sender<Result<(), ReplyError>>>>,
    next_session: AtomicU64,
}

impl Inner {
    /// Ends session `id` if it is still current. Returns whether it was.
    pub(crate) fn end_session(&self, id: u64, abort: bool) -> bool {
        let session = {
            let mut slot = self.session.lock();
            match slot.as_ref() {
                Some(session) if session.id == id => slot.take(),
                _ => None,
            }
        };
        let Some(session) = session else {
            return false;
        };

        if abort {
            session.reader.abort();
            session.writer.abort();
        }
        self.retired.lock().push(session.writer);
        drop(session.outbound);
        // A registration still waiting sees the connection close.
        self.registration.lock().take();

        self.state.write().phase = Phase::Disconnected;
        debug!(session = id, "disconnected");
        self.events.on_disconnected();
        true
    }

    fn current_session(&self) -> Option<u64> {
        self.session.lock().as_ref().map(|s| s.id)
    }

    /// Delivers the server's answer to a waiting registration, if any.
    pub(crate) fn settle_registration(&self, outcome: Result<(), ReplyError>) {
        if let Some(waiter) = self.registration.lock().take() {
            let _ = waiter.send(outcome);
        }
    }
}

/// Puts the client back to `Disconnected` if dropped while a connect attempt
/// still holds it in `Connecting`, e.g. when the connect future is cancelled.
struct ConnectClaim<'a> {
    inner: &'a Inner,
}

impl Drop for ConnectClaim<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.write();
        if state.phase == Phase::Connecting {
            debug!("connect abandoned");
            state.phase = Phase::Disconnected;
        }
    }
}

/// An IRC client connection.
///
/// Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Starts configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// A client with the built-in sinks and registry and no event observer.
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    /// A snapshot of the connection state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.read().clone()
    }

    /// Whether a stream is live.
    pub fn is_connected(&self) -> bool {
        self.inner.state.read().is_connected()
    }

    /// Whether the server confirmed registration.
    pub fn is_registered(&self) -> bool {
        self.inner.state.read().is_registered()
    }

    /// The registry used for inbound messages.
    pub fn registry(&self) -> &MessageRegistry {
        &self.inner.registry
    }

    /// The configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Connects to `host:port`.
    ///
    /// Fails with [`ConnectError::AlreadyConnected`] while a connection is
    /// live. On failure no tasks are started and the client stays
    /// disconnected.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        security: SecurityMode,
    ) -> Result<(), ConnectError> {
        let config = self.inner.config.clone();
        self.connect_inner(host, port, &security, &config).await
    }

    /// Connects using `config`, then queues PASS (when a password is set),
    /// NICK and USER.
    ///
    /// `use_tls` requires a factory set with [`ClientBuilder::secure_channel`].
    pub async fn connect_with(&self, config: &ClientConfig) -> Result<(), ConnectError> {
        let security = if config.use_tls {
            match &self.inner.secure {
                Some(factory) => SecurityMode::Secure(Arc::clone(factory)),
                None => return Err(ConnectError::NoSecureChannel),
            }
        } else {
            SecurityMode::Plain
        };

        self.connect_inner(&config.host, config.port, &security, config)
            .await?;

        if let Some(password) = &config.password {
            self.pass(password)?;
        }
        self.register(&config.nickname, &config.username, &config.realname)?;
        Ok(())
    }

    /// Runs the pipeline over an established stream.
    pub async fn connect_stream<S>(&self, stream: S) -> Result<(), ConnectError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let claim = self.begin_connect().await?;
        let config = self.inner.config.clone();
        self.attach(claim, Box::new(stream), &config)
    }

    async fn connect_inner(
        &self,
        host: &str,
        port: u16,
        security: &SecurityMode,
        config: &ClientConfig,
    ) -> Result<(), ConnectError> {
        let claim = self.begin_connect().await?;
        debug!(host, port, ?security, "connecting");

        let result = match secure::dial(host, port, security).await {
            Ok(stream) => self.attach(claim, stream, config),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            debug!(error = %e, "connect failed");
        }
        result
    }

    /// Claims the client for a new connection and reaps old send tasks.
    async fn begin_connect(&self) -> Result<ConnectClaim<'_>, ConnectError> {
        {
            let mut state = self.inner.state.write();
            if state.phase != Phase::Disconnected || self.inner.current_session().is_some() {
                return Err(ConnectError::AlreadyConnected);
            }
            state.phase = Phase::Connecting;
        }
        let claim = ConnectClaim { inner: &self.inner };

        let retired = std::mem::take(&mut *self.inner.retired.lock());
        for handle in retired {
            handle.abort();
            let _ = handle.await;
        }
        Ok(claim)
    }

    fn attach(
        &self,
        claim: ConnectClaim<'_>,
        stream: BoxedStream,
        config: &ClientConfig,
    ) -> Result<(), ConnectError> {
        let read_codec = LineCodec::with_max_len(&config.encoding, config.max_line_len)?;
        let write_codec = LineCodec::with_max_len(&config.encoding, config.max_line_len)?;
        let encoding = write_codec.encoding();

        let (read_half, write_half) = tokio::io::split(stream);
        let lines = FramedRead::new(read_half, read_codec);
        let sink = FramedWrite::new(write_half, write_codec);

        let (tx, rx) = mpsc::unbounded_channel();
        let outbound = Outbound::new(tx, Arc::clone(&self.inner.events), encoding);
        let id = self.inner.next_session.fetch_add(1, Ordering::Relaxed);

        {
            let mut state = self.inner.state.write();
            state.phase = Phase::Connected;
            state.server_info = ServerInfo::default();
        }
        drop(claim);

        let (start, started) = oneshot::channel::<()>();
        let writer = tokio::spawn(pipeline::send_loop(sink, rx));
        let reader = {
            let inner = Arc::clone(&self.inner);
            let outbound = outbound.clone();
            tokio::spawn(async move {
                // Hold off until on_connected has run.
                let _ = started.await;
                pipeline::read_loop(inner, id, lines, outbound).await;
            })
        };
        *self.inner.session.lock() = Some(Session {
            id,
            outbound,
            reader,
            writer,
        });

        debug!(session = id, "connected");
        self.inner.events.on_connected();
        let _ = start.send(());
        Ok(())
    }

    /// Ends the connection.
    ///
    /// With a reason, queues `QUIT :reason` and leaves closing the link to
    /// the server. Without one, tears the connection down at once.
    pub async fn disconnect(&self, reason: Option<&str>) -> Result<(), SendError> {
        match reason {
            Some(reason) => self.quit(Some(reason)),
            None => {
                let Some(id) = self.inner.current_session() else {
                    return Ok(());
                };
                if self.inner.end_session(id, true) {
                    let retired = std::mem::take(&mut *self.inner.retired.lock());
                    for handle in retired {
                        let _ = handle.await;
                    }
                }
                Ok(())
            }
        }
    }

    /// Validates `message` and queues it.
    ///
    /// An invalid message is reported to
    /// [`ClientEvents::on_outbound_violation`] and never reaches the wire.
    pub fn send(&self, message: RawMessage) -> Result<(), SendError> {
        let line = sink::serialize_outbound(self.inner.events.as_ref(), &message)?;
        let outbound = self
            .inner
            .session
            .lock()
            .as_ref()
            .map(|session| session.outbound.clone());
        match outbound {
            Some(outbound) => outbound.enqueue(line, &message),
            None => Err(SendError::NotConnected),
        }
    }

    /// Queues a typed message.
    pub fn send_typed<M: MessageVariant>(&self, message: M) -> Result<(), SendError> {
        self.send(message.into_raw())
    }

    /// Queues NICK and USER and records our identity.
    pub fn register(&self, nickname: &str, username: &str, realname: &str) -> Result<(), SendError> {
        self.send_typed(Nick::new(nickname))?;
        self.send_typed(User::new(username, realname))?;

        let mut state = self.inner.state.write();
        state.self_user = SelfUser {
            nickname: Some(nickname.to_owned()),
            username: Some(username.to_owned()),
            realname: Some(realname.to_owned()),
        };
        Ok(())
    }

    /// Registers and waits for the server's answer.
    ///
    /// Resolves when the welcome reply (001) arrives. A fatal reply first,
    /// such as 433 for a nickname in use, fails with
    /// [`RegisterError::Rejected`]; the caller may then try another nickname.
    pub async fn register_and_wait(
        &self,
        nickname: &str,
        username: &str,
        realname: &str,
    ) -> Result<(), RegisterError> {
        if self.is_registered() {
            return Err(RegisterError::AlreadyRegistered);
        }
        let answer = {
            let mut pending = self.inner.registration.lock();
            if pending.as_ref().map_or(false, |waiter| !waiter.is_closed()) {
                return Err(RegisterError::InProgress);
            }
            let (waiter, answer) = oneshot::channel();
            *pending = Some(waiter);
            answer
        };

        if let Err(e) = self.register(nickname, username, realname) {
            self.inner.registration.lock().take();
            return Err(e.into());
        }

        match answer.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reply)) => Err(RegisterError::Rejected(reply)),
            Err(_) => Err(RegisterError::Disconnected),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("state", &*self.inner.state.read())
            .field("sinks", &self.inner.sinks)
            .finish_non_exhaustive()
    }
}

/// Configures a [`Client`].
///
/// The sink table starts with the built-ins; entries added here run after
/// them.
pub struct ClientBuilder {
    sinks: SinkTable,
    registry: Option<MessageRegistry>,
    events: Arc<dyn ClientEvents>,
    config: ClientConfig,
    secure: Option<Arc<dyn SecureChannelFactory>>,
}

impl ClientBuilder {
    fn new() -> Self {
        ClientBuilder {
            sinks: SinkTable::with_builtins(),
            registry: None,
            events: Arc::new(NoEvents),
            config: ClientConfig::default(),
            secure: None,
        }
    }

    /// Adds a handler for a command word or reply code.
    #[must_use]
    pub fn sink<F>(mut self, command: &str, handler: F) -> Self
    where
        F: Fn(&mut SinkContext<'_>, &InboundMessage) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.sinks.add(command, handler);
        self
    }

    /// Marks a reply code fatal.
    #[must_use]
    pub fn fatal_sink(mut self, code: Response) -> Self {
        self.sinks.add_fatal(code);
        self
    }

    /// Removes every entry for `command`, built-ins included.
    #[must_use]
    pub fn without_sink(mut self, command: &str) -> Self {
        self.sinks.remove(command);
        self
    }

    /// Uses `registry` instead of the built-in one.
    #[must_use]
    pub fn registry(mut self, registry: MessageRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the event observer.
    #[must_use]
    pub fn events<E: ClientEvents + 'static>(mut self, events: E) -> Self {
        self.events = Arc::new(events);
        self
    }

    /// Sets a shared event observer.
    #[must_use]
    pub fn shared_events(mut self, events: Arc<dyn ClientEvents>) -> Self {
        self.events = events;
        self
    }

    /// Sets the configuration used by [`Client::connect`] and
    /// [`Client::connect_stream`].
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the factory used when a [`ClientConfig`] asks for TLS.
    #[must_use]
    pub fn secure_channel(mut self, factory: Arc<dyn SecureChannelFactory>) -> Self {
        self.secure = Some(factory);
        self
    }

    /// Builds the client.
    pub fn build(self) -> Client {
        let registry = self
            .registry
            .unwrap_or_else(|| MessageRegistry::global().clone());
        Client {
            inner: Arc::new(Inner {
                state: RwLock::new(ConnectionState::default()),
                sinks: self.sinks,
                registry: Arc::new(registry),
                events: self.events,
                config: self.config,
                secure: self.secure,
                session: Mutex::new(None),
                retired: Mutex::new(Vec::new()),
                registration: Mutex::new(None),
                next_session: AtomicU64::new(1),
            }),
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("sinks", &self.sinks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
