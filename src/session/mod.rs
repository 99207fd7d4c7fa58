//! IRC client session.
//!
//! A [`Session`] owns one logical connection to a server and a subscriber
//! table. Inbound lines are published as [`Event::Data`], answered when they
//! are `PING`, mapped to typed events and published in arrival order.
//! Commands issued by handlers are written before the next inbound line is
//! processed.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --connect()--> Connecting --transport up--> Connected
//!  |                      |                           |
//!  +--disconnect()--------+-----disconnect() / EOF----+--> Closed --connect()--> Connecting
//! ```
//!
//! `close` is published exactly once per connection. Its `from_error` flag is
//! false only when the session itself called `disconnect()`.

mod driver;
mod options;

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chan::ChannelExt;
use crate::command::Command;
use crate::dispatch::{handler, Dispatcher, Handler, SubscriptionId};
use crate::error::{Error, Result};
use crate::event::{ErrorCause, Event, EventKind};
use crate::extension::{Activation, Extension};
use crate::mapper::{map_line, ping_reply};
use crate::message::{serialize, strip_eol, ParsedLine, EOL};
use crate::transport::{Connector, ServerTarget, TcpConnector};

pub use self::options::{CertValidation, LoginDetails, SessionOptions};

/// Plain-text IRC port.
pub const DEFAULT_PORT: u16 = 6667;

/// Handler type stored by a session.
pub type EventHandler = Handler<Event, dyn SessionControl>;

/// Wrap a closure as an [`EventHandler`].
///
/// ```
/// use slirc_session::{event_handler, Event, SessionControl};
///
/// let greet = event_handler(|session, event| {
///     if let Event::Join { room, user } = event {
///         session.send(&format!("PRIVMSG {room} :hello {user}"))?;
///     }
///     Ok(())
/// });
/// # drop(greet);
/// ```
pub fn event_handler<F>(f: F) -> EventHandler
where
    F: Fn(&(dyn SessionControl + 'static), &Event) -> anyhow::Result<()> + Send + Sync + 'static,
{
    handler(f)
}

/// Connection lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Created, never connected.
    Idle,
    /// Transport is being opened.
    Connecting,
    /// Transport is up.
    Connected,
    /// Transport closed; `connect()` may be called again.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Command surface of a session.
///
/// Handlers and extensions receive a `&dyn SessionControl` rather than a
/// [`Session`], which keeps them testable against a stand-in.
pub trait SessionControl: Send + Sync {
    /// Open the transport. Fails with [`Error::AlreadyConnected`] while a
    /// connection is pending or live.
    fn connect(&self) -> Result<()>;

    /// Close the transport and move to [`SessionState::Closed`]. Idempotent.
    fn disconnect(&self);

    /// Write one raw line. A trailing CR/LF in `line` is stripped and CRLF
    /// is appended; the content is not otherwise validated.
    fn send(&self, line: &str) -> Result<()>;

    /// Publish [`Event::Quitting`] and send `QUIT :<message>`.
    fn quit(&self, message: &str) -> Result<()>;

    /// Override nick, username or realname and register if the session is
    /// connected but has not registered yet.
    fn login(&self, details: LoginDetails) -> Result<()>;

    /// Call `handler` for every event of `kind`.
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId;

    /// Call `handler` for the next event of `kind` only.
    fn subscribe_once(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId;

    /// Remove a subscription. Returns false if it already fired or was removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Current connection state.
    fn state(&self) -> SessionState;

    /// Snapshot of the current options.
    fn options(&self) -> SessionOptions;

    /// `JOIN #channel`; a missing `#` is added.
    fn join(&self, channel: &str) -> Result<()> {
        self.send(&serialize("JOIN", &[&channel.normalize_channel()]))
    }

    /// `PART #channel`; a missing `#` is added.
    fn part(&self, channel: &str) -> Result<()> {
        self.send(&serialize("PART", &[&channel.normalize_channel()]))
    }

    /// Identify with services: `PRIVMSG NickServ :IDENTIFY <password>`.
    fn authenticate(&self, password: &str) -> Result<()> {
        let text = format!(":IDENTIFY {password}");
        self.send(&serialize("PRIVMSG", &["NickServ", &text]))
    }
}

/// Handle to an IRC session. Clones share the same connection.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    host: String,
    port: u16,
    options: RwLock<SessionOptions>,
    link: Mutex<Link>,
    dispatcher: Dispatcher<Event, dyn SessionControl>,
    connector: Arc<dyn Connector>,
}

/// Per-connection bookkeeping.
struct Link {
    state: SessionState,
    // Bumped on every connect; drivers of older connections are ignored.
    epoch: u64,
    registered: bool,
    outbound: Option<mpsc::UnboundedSender<String>>,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.inner.host)
            .field("port", &self.inner.port)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session that connects over TCP (and TLS when `options.secure`).
    pub fn new(host: impl Into<String>, port: u16, options: SessionOptions) -> Self {
        Self::with_connector(host, port, options, TcpConnector)
    }

    /// Session that opens its transport through `connector`.
    ///
    /// An empty host means `localhost` and port 0 means [`DEFAULT_PORT`].
    pub fn with_connector(
        host: impl Into<String>,
        port: u16,
        options: SessionOptions,
        connector: impl Connector,
    ) -> Self {
        let mut host = host.into();
        if host.is_empty() {
            host = "localhost".to_owned();
        }
        Self {
            inner: Arc::new(Inner {
                host,
                port: if port == 0 { DEFAULT_PORT } else { port },
                options: RwLock::new(options),
                link: Mutex::new(Link {
                    state: SessionState::Idle,
                    epoch: 0,
                    registered: false,
                    outbound: None,
                    cancel: None,
                }),
                dispatcher: Dispatcher::new(),
                connector: Arc::new(connector),
            }),
        }
    }

    /// Server host name.
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Server port.
    pub fn port(&self) -> u16 {
        self.inner.port
    }

    /// Subscribe a closure to `kind`.
    pub fn on<F>(&self, kind: EventKind, f: F) -> SubscriptionId
    where
        F: Fn(&(dyn SessionControl + 'static), &Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(kind, event_handler(f))
    }

    /// Subscribe a closure to the next `kind` event only.
    pub fn once<F>(&self, kind: EventKind, f: F) -> SubscriptionId
    where
        F: Fn(&(dyn SessionControl + 'static), &Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe_once(kind, event_handler(f))
    }

    /// Attach an extension to this session.
    pub fn activate<X: Extension + 'static>(&self, extension: X) -> Activation {
        let activation = Box::new(extension).activate(self);
        debug!(
            extension = activation.name(),
            subscriptions = activation.subscriptions().len(),
            "extension activated"
        );
        activation
    }

    fn target(&self) -> ServerTarget {
        let options = self.inner.options.read();
        ServerTarget {
            host: self.inner.host.clone(),
            port: self.inner.port,
            secure: options.secure,
            cert_validation: options.cert_validation,
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        let link = self.inner.link.lock();
        link.epoch == epoch && link.state == SessionState::Connected
    }

    /// Deliver `event`, then report handler failures as error events.
    ///
    /// Failures of error handlers are only logged so a broken error handler
    /// cannot loop.
    fn publish(&self, event: Event) {
        let failures = self.inner.dispatcher.publish(self, &event);
        for failure in failures {
            warn!(
                event = %failure.topic,
                subscription = ?failure.id,
                "handler failed: {}",
                failure.message
            );
            if failure.topic != EventKind::Error {
                self.publish(Event::Error {
                    cause: ErrorCause::Handler {
                        event: failure.topic,
                        message: failure.message,
                    },
                });
            }
        }
    }

    /// Send NICK, USER and one JOIN per configured channel, once per
    /// connection.
    fn register(&self) -> Result<()> {
        {
            let mut link = self.inner.link.lock();
            if link.state != SessionState::Connected {
                return Err(Error::NotConnected);
            }
            if link.registered {
                return Ok(());
            }
            link.registered = true;
        }
        let options = self.options();
        info!(nick = %options.nick, channels = options.channels.len(), "registering");
        self.send(&serialize("NICK", &[&options.nick]))?;
        let realname = format!(":{}", options.realname);
        self.send(&serialize("USER", &[&options.username, "8", "*", &realname]))?;
        for channel in &options.channels {
            self.join(channel)?;
        }
        Ok(())
    }

    /// The driver opened the transport for `epoch`.
    fn transport_ready(&self, epoch: u64) -> bool {
        {
            let mut link = self.inner.link.lock();
            if link.epoch != epoch || link.state != SessionState::Connecting {
                return false;
            }
            link.state = SessionState::Connected;
        }
        info!(host = %self.inner.host, port = self.inner.port, "connected");
        self.publish(Event::Connected);

        let auto_login = self.inner.options.read().auto_login;
        if auto_login {
            if let Err(err) = self.register() {
                debug!("registration skipped: {}", err);
            }
        }
        true
    }

    /// Process one inbound line of connection `epoch`.
    fn ingest(&self, epoch: u64, raw: &str) {
        if !self.is_current(epoch) {
            return;
        }
        debug!(line = raw, "<-");
        self.publish(Event::Data {
            line: raw.to_owned(),
        });

        let line = match ParsedLine::parse(raw) {
            Ok(line) => line,
            Err(cause) => {
                warn!("skipping line: {}", Error::malformed(raw, cause));
                return;
            }
        };

        if let Some(pong) = ping_reply(&line) {
            if let Err(err) = self.send(&pong) {
                debug!("PONG not sent: {}", err);
            }
        }
        if Command::new(&line.command) == Command::PING {
            return;
        }

        // Mapping is pure; the options lock is released before publishing.
        let mapped = map_line(&line, &self.inner.options.read());
        match mapped {
            Ok(events) => {
                for event in events {
                    if !self.is_current(epoch) {
                        break;
                    }
                    self.publish(event);
                }
            }
            Err(cause) => warn!("skipping line: {}", Error::malformed(raw, cause)),
        }
    }

    /// The transport of `epoch` ended without `disconnect()`.
    fn transport_closed(&self, epoch: u64, err: Option<Error>) {
        if let Some(err) = err {
            {
                let link = self.inner.link.lock();
                if link.epoch != epoch || link.state == SessionState::Closed {
                    return;
                }
            }
            warn!("transport failed: {}", err);
            self.publish(Event::transport_error(err));
        }
        {
            let mut link = self.inner.link.lock();
            if link.epoch != epoch || link.state == SessionState::Closed {
                return;
            }
            link.state = SessionState::Closed;
            link.outbound = None;
            link.cancel = None;
        }
        info!("connection closed");
        self.publish(Event::Close { from_error: true });
    }
}

impl SessionControl for Session {
    fn connect(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let (epoch, cancel, outbound) = {
            let mut link = self.inner.link.lock();
            if matches!(link.state, SessionState::Connecting | SessionState::Connected) {
                return Err(Error::AlreadyConnected);
            }
            let (tx, rx) = mpsc::unbounded_channel();
            let cancel = CancellationToken::new();
            link.epoch += 1;
            link.state = SessionState::Connecting;
            link.registered = false;
            link.outbound = Some(tx);
            link.cancel = Some(cancel.clone());
            (link.epoch, cancel, rx)
        };
        let target = self.target();
        info!(host = %target.host, port = target.port, secure = target.secure, epoch, "connecting");
        runtime.spawn(driver::run(self.clone(), target, epoch, cancel, outbound));
        Ok(())
    }

    fn disconnect(&self) {
        let was_open = {
            let mut link = self.inner.link.lock();
            let was_open = match link.state {
                SessionState::Closed => return,
                SessionState::Idle => false,
                SessionState::Connecting | SessionState::Connected => true,
            };
            link.state = SessionState::Closed;
            // Dropping the sender lets the driver flush what is queued.
            link.outbound = None;
            if let Some(cancel) = link.cancel.take() {
                cancel.cancel();
            }
            was_open
        };
        if was_open {
            info!("disconnected");
            self.publish(Event::Close { from_error: false });
        }
    }

    fn send(&self, line: &str) -> Result<()> {
        let line = strip_eol(line);
        let outbound = {
            let link = self.inner.link.lock();
            if link.state != SessionState::Connected {
                return Err(Error::NotConnected);
            }
            link.outbound.clone().ok_or(Error::NotConnected)?
        };
        self.publish(Event::Send {
            line: line.to_owned(),
        });
        debug!(line, "->");
        outbound
            .send(format!("{line}{EOL}"))
            .map_err(|_| Error::NotConnected)
    }

    fn quit(&self, message: &str) -> Result<()> {
        if self.state() != SessionState::Connected {
            return Err(Error::NotConnected);
        }
        self.publish(Event::Quitting {
            message: message.to_owned(),
        });
        let text = format!(":{message}");
        self.send(&serialize("QUIT", &[&text]))
    }

    fn login(&self, details: LoginDetails) -> Result<()> {
        let (state, registered) = {
            let link = self.inner.link.lock();
            (link.state, link.registered)
        };
        if registered {
            debug!("already registered; login details ignored");
            return Ok(());
        }
        self.inner.options.write().apply(details);
        if state == SessionState::Connected {
            self.register()
        } else {
            Ok(())
        }
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        self.inner.dispatcher.subscribe(kind, handler)
    }

    fn subscribe_once(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        self.inner.dispatcher.subscribe_once(kind, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.dispatcher.unsubscribe(id)
    }

    fn state(&self) -> SessionState {
        self.inner.link.lock().state
    }

    fn options(&self) -> SessionOptions {
        self.inner.options.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let (connector, _peers) = crate::transport::MemoryConnector::new();
        Session::with_connector("irc.test", 6667, SessionOptions::new("tester"), connector)
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.host(), "irc.test");
        assert_eq!(s.port(), 6667);
    }

    #[test]
    fn test_empty_host_and_zero_port_use_defaults() {
        let (connector, _peers) = crate::transport::MemoryConnector::new();
        let s = Session::with_connector("", 0, SessionOptions::new("tester"), connector);
        assert_eq!(s.host(), "localhost");
        assert_eq!(s.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_commands_require_connection() {
        let s = session();
        assert!(matches!(s.send("PING x"), Err(Error::NotConnected)));
        assert!(matches!(s.join("x"), Err(Error::NotConnected)));
        assert!(matches!(s.quit("bye"), Err(Error::NotConnected)));
    }

    #[test]
    fn test_connect_outside_runtime() {
        assert!(matches!(session().connect(), Err(Error::NoRuntime)));
    }

    #[test]
    fn test_disconnect_idle_is_silent() {
        let s = session();
        let closes = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&closes);
        s.on(EventKind::Close, move |_, _| {
            *seen.lock() += 1;
            Ok(())
        });
        s.disconnect();
        s.disconnect();
        assert_eq!(s.state(), SessionState::Closed);
        assert_eq!(*closes.lock(), 0);
    }

    #[test]
    fn test_login_before_connect_updates_options() {
        let s = session();
        s.login(LoginDetails::nick("other")).unwrap();
        assert_eq!(s.options().nick, "other");
        assert_eq!(s.options().username, "tester");
    }
}
