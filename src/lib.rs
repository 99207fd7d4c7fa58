//! # slirc-session
//!
//! Event-driven IRC client sessions for bots and scripts.
//!
//! ## Features
//!
//! - Line parsing into prefix, command, middle parameters and trailing text
//! - Typed events for joins, parts, messages, commands, notices and quits
//! - Automatic `PONG` replies and NICK/USER/JOIN registration
//! - Publish/subscribe with persistent and one-shot handlers
//! - Extensions for services login and reconnect-on-error
//! - TCP with optional TLS, or an in-memory transport for tests
//!
//! ## Quick Start
//!
//! ```no_run
//! use slirc_session::{Event, EventKind, Session, SessionControl, SessionOptions};
//!
//! # async fn run() -> slirc_session::Result<()> {
//! let options = SessionOptions::new("ferris").with_channels(["rust"]);
//! let session = Session::new("irc.libera.chat", 6667, options);
//!
//! session.on(EventKind::Command, |session, event| {
//!     if let Event::Command { room, user, msg } = event {
//!         session.send(&format!("PRIVMSG {room} :{user} said {msg}"))?;
//!     }
//!     Ok(())
//! });
//!
//! session.connect()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Parsing lines
//!
//! ```rust
//! use slirc_session::message::ParsedLine;
//!
//! let line: ParsedLine = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
//! assert_eq!(line.command, "PRIVMSG");
//! assert_eq!(line.params, vec!["#channel"]);
//! assert_eq!(line.trailing.as_deref(), Some("Hello!"));
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod casemap;
pub mod chan;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod extension;
pub mod mapper;
pub mod message;
pub mod prefix;
pub mod response;
pub mod session;
pub mod transport;

pub use self::casemap::irc_eq;
pub use self::chan::ChannelExt;
pub use self::command::Command;
pub use self::dispatch::{Dispatcher, SubscriptionId};
pub use self::error::{Error, ParseError, Result};
pub use self::event::{ErrorCause, Event, EventKind};
pub use self::extension::{Activation, Extension, LoginAndJoin, Reconnect};
pub use self::mapper::{map_line, NoticePatterns};
pub use self::message::ParsedLine;
pub use self::prefix::{plain_username, PrefixRef};
pub use self::response::Response;
pub use self::session::{
    event_handler, CertValidation, EventHandler, LoginDetails, Session, SessionControl,
    SessionOptions, SessionState, DEFAULT_PORT,
};
pub use self::transport::{Connector, MemoryConnector, ServerTarget, TcpConnector};
