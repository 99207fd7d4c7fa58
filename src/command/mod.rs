//! Inbound command classification.
//!
//! [`Command`] is the closed set of commands the event mapper knows about.
//! Anything else is kept as [`Command::Raw`] so dispatch stays total.

use crate::response::Response;

/// Classified command of an inbound line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// `PING [args]`; answered at ingestion, never mapped to an event.
    PING,
    /// `NOTICE target :text`
    NOTICE,
    /// `JOIN channel`
    JOIN,
    /// `PART channel [:reason]`
    PART,
    /// `PRIVMSG target :text`
    PRIVMSG,
    /// `QUIT :reason`
    QUIT,
    /// A known numeric reply.
    Response(Response),
    /// Any other command word or numeric, as sent.
    Raw(String),
}

impl Command {
    /// Classify a command token. Words match case-insensitively.
    pub fn new(cmd: &str) -> Command {
        if let Ok(resp) = cmd.parse::<Response>() {
            return Command::Response(resp);
        }
        match cmd.to_ascii_uppercase().as_str() {
            "PING" => Command::PING,
            "NOTICE" => Command::NOTICE,
            "JOIN" => Command::JOIN,
            "PART" => Command::PART,
            "PRIVMSG" => Command::PRIVMSG,
            "QUIT" => Command::QUIT,
            _ => Command::Raw(cmd.to_owned()),
        }
    }

    /// Wire name of the command.
    pub fn name(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Command::PING => "PING".into(),
            Command::NOTICE => "NOTICE".into(),
            Command::JOIN => "JOIN".into(),
            Command::PART => "PART".into(),
            Command::PRIVMSG => "PRIVMSG".into(),
            Command::QUIT => "QUIT".into(),
            Command::Response(resp) => resp.to_string().into(),
            Command::Raw(raw) => raw.as_str().into(),
        }
    }
}

impl From<&str> for Command {
    fn from(cmd: &str) -> Self {
        Command::new(cmd)
    }
}
