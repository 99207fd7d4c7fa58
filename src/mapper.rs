//! Protocol event mapper.
//!
//! Turns a [`ParsedLine`] into the session events it stands for. The mapper
//! is pure: it reads the session options but never sends or publishes.
//!
//! Positions follow the raw token layout `:<prefix> <command> <target> ...`,
//! so "token 2" is the target of a message and the addressed nick of a
//! numeric reply.

use crate::casemap::irc_eq;
use crate::command::Command;
use crate::error::ParseError;
use crate::event::Event;
use crate::message::{parse_names, serialize, ParsedLine};
use crate::prefix::username_of;
use crate::response::Response;
use crate::session::SessionOptions;

/// Phrases used to classify services notices, matched case-insensitively as
/// substrings of the notice text. `unidentified` is checked first.
///
/// Services wording differs between networks, so both lists are
/// configurable through [`SessionOptions::notice_patterns`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoticePatterns {
    /// Phrases of a "please identify" notice.
    pub unidentified: Vec<String>,
    /// Phrases of a "you are now identified" notice.
    pub identified: Vec<String>,
}

impl Default for NoticePatterns {
    fn default() -> Self {
        Self {
            unidentified: vec!["identify".to_owned()],
            identified: vec!["now identified".to_owned()],
        }
    }
}

impl NoticePatterns {
    fn matches(phrases: &[String], lowered: &str) -> bool {
        phrases
            .iter()
            .any(|p| !p.is_empty() && lowered.contains(&p.to_lowercase()))
    }
}

/// Build the `PONG` reply for a `PING` line, echoing its arguments verbatim.
///
/// Returns `None` for any other command.
pub fn ping_reply(line: &ParsedLine) -> Option<String> {
    if Command::new(&line.command) != Command::PING {
        return None;
    }
    Some(match line.arguments() {
        Some(args) => serialize("PONG", &[&args]),
        None => serialize("PONG", &[]),
    })
}

/// Map one parsed line to its events.
///
/// Unrecognized commands and `PING` map to no events. A names reply
/// without a name list is reported as [`ParseError::MissingNames`].
pub fn map_line(line: &ParsedLine, options: &SessionOptions) -> Result<Vec<Event>, ParseError> {
    let event = match Command::new(&line.command) {
        Command::PING | Command::Raw(_) => None,
        Command::NOTICE => Some(map_notice(line, options)),
        Command::Response(Response::RPL_ENDOFMOTD) => Some(Event::Motd),
        Command::Response(Response::RPL_TOPIC) => room(line).map(|room| Event::JoinTopic {
            room,
            topic: drop_marker(line.rest_from(4)),
        }),
        Command::Response(Response::RPL_NAMREPLY) => {
            let users = parse_names(&line.raw)?;
            room(line).map(|room| Event::JoinUsers { room, users })
        }
        Command::JOIN => room(line).map(|room| Event::Join {
            room,
            user: sender(line),
        }),
        Command::PART => room(line).map(|room| Event::Part {
            room,
            user: sender(line),
        }),
        Command::PRIVMSG => room(line).map(|room| map_privmsg(line, room, options)),
        Command::QUIT => Some(Event::Quit {
            user: sender(line),
            reason: drop_marker(line.rest_from(2)),
        }),
    };
    Ok(event.into_iter().collect())
}

fn map_notice(line: &ParsedLine, options: &SessionOptions) -> Event {
    let msg = line
        .trailing
        .clone()
        .or_else(|| line.rest_from(3))
        .unwrap_or_default();
    let lowered = msg.to_lowercase();
    let patterns = &options.notice_patterns;

    if NoticePatterns::matches(&patterns.unidentified, &lowered) {
        Event::NickUnidentified {
            user: options.nick.clone(),
            msg,
        }
    } else if NoticePatterns::matches(&patterns.identified, &lowered) {
        Event::NickIdentified {
            user: options.nick.clone(),
            msg,
        }
    } else {
        Event::Notice {
            user: sender(line),
            msg,
        }
    }
}

fn map_privmsg(line: &ParsedLine, room: String, options: &SessionOptions) -> Event {
    let user = sender(line);
    let msg = drop_marker(line.rest_from(3));
    let address = format!("!{}", options.nick);

    if let Some(rest) = msg.strip_prefix(&address) {
        Event::Command {
            room,
            user,
            msg: rest.trim().to_owned(),
        }
    } else if irc_eq(&room, &options.nick) {
        Event::Private { room, user, msg }
    } else {
        Event::Message { room, user, msg }
    }
}

/// Token 2, with a `:` tolerated on servers that send `JOIN :#chan`.
fn room(line: &ParsedLine) -> Option<String> {
    let token = line.token(2)?;
    let room = token.strip_prefix(':').unwrap_or(token);
    (!room.is_empty()).then(|| room.to_owned())
}

fn sender(line: &ParsedLine) -> String {
    line.prefix.as_deref().map(username_of).unwrap_or_default().to_owned()
}

/// Remove exactly one leading character (the `:` trailing marker).
fn drop_marker(text: Option<String>) -> String {
    let text = text.unwrap_or_default();
    let mut chars = text.chars();
    chars.next();
    chars.as_str().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SessionOptions {
        SessionOptions::new("mybot")
    }

    fn map(raw: &str) -> Vec<Event> {
        map_line(&ParsedLine::parse(raw).unwrap(), &opts()).unwrap()
    }

    #[test]
    fn test_join_and_part() {
        assert_eq!(
            map(":alice!u@h JOIN #general"),
            vec![Event::Join {
                room: "#general".into(),
                user: "alice".into()
            }]
        );
        assert_eq!(
            map(":@alice!u@h PART #general :bye"),
            vec![Event::Part {
                room: "#general".into(),
                user: "alice".into()
            }]
        );
    }

    #[test]
    fn test_join_with_colon_room() {
        assert_eq!(
            map(":alice!u@h JOIN :#general"),
            vec![Event::Join {
                room: "#general".into(),
                user: "alice".into()
            }]
        );
    }

    #[test]
    fn test_privmsg_command() {
        assert_eq!(
            map(":bob!u@h PRIVMSG #general :!mybot hello there"),
            vec![Event::Command {
                room: "#general".into(),
                user: "bob".into(),
                msg: "hello there".into()
            }]
        );
    }

    #[test]
    fn test_privmsg_private_vs_message() {
        assert_eq!(
            map(":bob!u@h PRIVMSG mybot :hi"),
            vec![Event::Private {
                room: "mybot".into(),
                user: "bob".into(),
                msg: "hi".into()
            }]
        );
        assert_eq!(
            map(":bob!u@h PRIVMSG MyBot :hi"),
            vec![Event::Private {
                room: "MyBot".into(),
                user: "bob".into(),
                msg: "hi".into()
            }]
        );
        assert_eq!(
            map(":bob!u@h PRIVMSG #general :hi all"),
            vec![Event::Message {
                room: "#general".into(),
                user: "bob".into(),
                msg: "hi all".into()
            }]
        );
    }

    #[test]
    fn test_privmsg_address_not_at_start() {
        let events = map(":bob!u@h PRIVMSG #general :hey !mybot");
        assert_eq!(events[0].kind(), crate::EventKind::Message);
    }

    #[test]
    fn test_notice_classification() {
        let ev = map(":NickServ!s@services NOTICE mybot :Please IDENTIFY via /msg NickServ identify <pw>");
        assert!(matches!(&ev[0], Event::NickUnidentified { user, .. } if user == "mybot"));

        let ev = map(":NickServ!s@services NOTICE mybot :You are now identified for mybot.");
        assert!(matches!(&ev[0], Event::NickIdentified { user, .. } if user == "mybot"));

        let ev = map(":irc.example.net NOTICE * :*** Looking up your hostname");
        assert_eq!(
            ev,
            vec![Event::Notice {
                user: "irc.example.net".into(),
                msg: "*** Looking up your hostname".into()
            }]
        );
    }

    #[test]
    fn test_notice_patterns_are_configurable() {
        let mut options = opts();
        options.notice_patterns = NoticePatterns {
            unidentified: vec!["is registered".into()],
            identified: vec!["password accepted".into()],
        };
        let line = ParsedLine::parse(":NickServ!s@h NOTICE mybot :Password accepted").unwrap();
        let ev = map_line(&line, &options).unwrap();
        assert_eq!(ev[0].kind(), crate::EventKind::NickIdentified);

        let line = ParsedLine::parse(":NickServ!s@h NOTICE mybot :please identify").unwrap();
        let ev = map_line(&line, &options).unwrap();
        assert_eq!(ev[0].kind(), crate::EventKind::Notice);
    }

    #[test]
    fn test_numeric_replies() {
        assert_eq!(map(":srv 376 mybot :End of /MOTD command."), vec![Event::Motd]);
        assert_eq!(
            map(":srv 332 mybot #rust :Welcome to #rust"),
            vec![Event::JoinTopic {
                room: "mybot".into(),
                topic: "Welcome to #rust".into()
            }]
        );
        assert_eq!(
            map(":srv 353 mybot = #rust :mybot @ferris +crab"),
            vec![Event::JoinUsers {
                room: "mybot".into(),
                users: vec!["mybot".into(), "ferris".into(), "crab".into()]
            }]
        );
    }

    #[test]
    fn test_names_without_list_is_error() {
        let line = ParsedLine::parse(":srv 353 mybot = #rust").unwrap();
        assert_eq!(map_line(&line, &opts()), Err(ParseError::MissingNames));
    }

    #[test]
    fn test_quit() {
        assert_eq!(
            map(":carol!c@h QUIT :Ping timeout: 240 seconds"),
            vec![Event::Quit {
                user: "carol".into(),
                reason: "Ping timeout: 240 seconds".into()
            }]
        );
    }

    #[test]
    fn test_unmapped_lines() {
        assert!(map("PING :server.example").is_empty());
        assert!(map(":srv 001 mybot :Welcome").is_empty());
        assert!(map(":srv MODE mybot +i").is_empty());
        assert!(map(":alice!u@h JOIN").is_empty());
    }

    #[test]
    fn test_ping_reply() {
        let ping = ParsedLine::parse("PING :server.example").unwrap();
        assert_eq!(ping_reply(&ping).as_deref(), Some("PONG :server.example\r\n"));

        let multi = ParsedLine::parse("PING a b :c d").unwrap();
        assert_eq!(ping_reply(&multi).as_deref(), Some("PONG a b :c d\r\n"));

        let bare = ParsedLine::parse("PING").unwrap();
        assert_eq!(ping_reply(&bare).as_deref(), Some("PONG\r\n"));

        let other = ParsedLine::parse("PONG :x").unwrap();
        assert_eq!(ping_reply(&other), None);
    }
}
