//! Events published by a session.
//!
//! Every event is a variant of [`Event`] with a typed payload. Subscriptions
//! are keyed by the payload-free [`EventKind`].

use std::sync::Arc;

use crate::error::Error;

/// Events a session publishes to its subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The transport is up. Registration, if enabled, follows immediately.
    Connected,

    /// The transport closed. `from_error` is false only after `disconnect()`.
    Close { from_error: bool },

    /// A transport failure or an isolated handler failure.
    Error { cause: ErrorCause },

    /// Raw inbound line, published before mapping. Diagnostic only.
    Data { line: String },

    /// Outbound line, published before it is written.
    Send { line: String },

    /// End of MOTD; the server accepted our registration.
    Motd,

    /// Topic reply received on join.
    JoinTopic { room: String, topic: String },

    /// One names reply received on join.
    JoinUsers { room: String, users: Vec<String> },

    /// Someone (possibly us) joined `room`.
    Join { room: String, user: String },

    /// Someone (possibly us) left `room`.
    Part { room: String, user: String },

    /// Channel message.
    Message { room: String, user: String, msg: String },

    /// Direct message addressed to our nick.
    Private { room: String, user: String, msg: String },

    /// Message starting with `!<our nick>`; `msg` has that token removed.
    Command { room: String, user: String, msg: String },

    /// A notice that matched no identification pattern.
    Notice { user: String, msg: String },

    /// Services confirmed we are identified.
    NickIdentified { user: String, msg: String },

    /// Services asked us to identify.
    NickUnidentified { user: String, msg: String },

    /// Someone quit the server.
    Quit { user: String, reason: String },

    /// We are quitting; published by `quit()` before `QUIT` is sent.
    Quitting { message: String },
}

/// Event names, used as subscription keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// [`Event::Connected`]
    Connected,
    /// [`Event::Close`]
    Close,
    /// [`Event::Error`]
    Error,
    /// [`Event::Data`]
    Data,
    /// [`Event::Send`]
    Send,
    /// [`Event::Motd`]
    Motd,
    /// [`Event::JoinTopic`]
    JoinTopic,
    /// [`Event::JoinUsers`]
    JoinUsers,
    /// [`Event::Join`]
    Join,
    /// [`Event::Part`]
    Part,
    /// [`Event::Message`]
    Message,
    /// [`Event::Private`]
    Private,
    /// [`Event::Command`]
    Command,
    /// [`Event::Notice`]
    Notice,
    /// [`Event::NickIdentified`]
    NickIdentified,
    /// [`Event::NickUnidentified`]
    NickUnidentified,
    /// [`Event::Quit`]
    Quit,
    /// [`Event::Quitting`]
    Quitting,
}

/// What an [`Event::Error`] is reporting.
#[derive(Clone, Debug)]
pub enum ErrorCause {
    /// The stream failed (reset, DNS, TLS handshake...).
    Transport(Arc<Error>),
    /// A subscriber returned an error or panicked.
    Handler { event: EventKind, message: String },
}

impl PartialEq for ErrorCause {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ErrorCause::Transport(a), ErrorCause::Transport(b)) => a.to_string() == b.to_string(),
            (
                ErrorCause::Handler { event: ea, message: ma },
                ErrorCause::Handler { event: eb, message: mb },
            ) => ea == eb && ma == mb,
            _ => false,
        }
    }
}

impl std::fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCause::Transport(err) => write!(f, "{err}"),
            ErrorCause::Handler { event, message } => {
                write!(f, "{} handler failed: {message}", event.name())
            }
        }
    }
}

impl Event {
    /// The subscription key of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected => EventKind::Connected,
            Event::Close { .. } => EventKind::Close,
            Event::Error { .. } => EventKind::Error,
            Event::Data { .. } => EventKind::Data,
            Event::Send { .. } => EventKind::Send,
            Event::Motd => EventKind::Motd,
            Event::JoinTopic { .. } => EventKind::JoinTopic,
            Event::JoinUsers { .. } => EventKind::JoinUsers,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Message { .. } => EventKind::Message,
            Event::Private { .. } => EventKind::Private,
            Event::Command { .. } => EventKind::Command,
            Event::Notice { .. } => EventKind::Notice,
            Event::NickIdentified { .. } => EventKind::NickIdentified,
            Event::NickUnidentified { .. } => EventKind::NickUnidentified,
            Event::Quit { .. } => EventKind::Quit,
            Event::Quitting { .. } => EventKind::Quitting,
        }
    }

    pub(crate) fn transport_error(err: Error) -> Self {
        Event::Error {
            cause: ErrorCause::Transport(Arc::new(err)),
        }
    }
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 18] = [
        EventKind::Connected,
        EventKind::Close,
        EventKind::Error,
        EventKind::Data,
        EventKind::Send,
        EventKind::Motd,
        EventKind::JoinTopic,
        EventKind::JoinUsers,
        EventKind::Join,
        EventKind::Part,
        EventKind::Message,
        EventKind::Private,
        EventKind::Command,
        EventKind::Notice,
        EventKind::NickIdentified,
        EventKind::NickUnidentified,
        EventKind::Quit,
        EventKind::Quitting,
    ];

    /// The conventional snake_case event name.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Connected => "connected",
            EventKind::Close => "close",
            EventKind::Error => "error",
            EventKind::Data => "data",
            EventKind::Send => "send",
            EventKind::Motd => "motd",
            EventKind::JoinTopic => "join_topic",
            EventKind::JoinUsers => "join_users",
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::Message => "message",
            EventKind::Private => "private",
            EventKind::Command => "command",
            EventKind::Notice => "notice",
            EventKind::NickIdentified => "nick_identified",
            EventKind::NickUnidentified => "nick_unidentified",
            EventKind::Quit => "quit",
            EventKind::Quitting => "quitting",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown event name: {s}"))
    }
}
