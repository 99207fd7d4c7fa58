//! Integration tests for turning protocol lines into session events.
//!
//! Each test parses a raw line as it would arrive from a server and checks
//! the events the mapper produces for a session whose nick is `mybot`.

use slirc_session::mapper::ping_reply;
use slirc_session::{map_line, Event, EventKind, ParseError, ParsedLine, SessionOptions};

fn events(raw: &str) -> Vec<Event> {
    let line: ParsedLine = raw.parse().expect("Failed to parse line");
    map_line(&line, &SessionOptions::new("mybot")).expect("Failed to map line")
}

#[test]
fn test_join_event() {
    assert_eq!(
        events(":alice!u@h JOIN #general"),
        vec![Event::Join {
            room: "#general".into(),
            user: "alice".into(),
        }]
    );
}

#[test]
fn test_addressed_command() {
    assert_eq!(
        events(":bob!u@h PRIVMSG #general :!mybot hello there"),
        vec![Event::Command {
            room: "#general".into(),
            user: "bob".into(),
            msg: "hello there".into(),
        }]
    );
}

#[test]
fn test_private_message_is_not_channel_message() {
    assert_eq!(
        events(":bob!u@h PRIVMSG mybot :hi"),
        vec![Event::Private {
            room: "mybot".into(),
            user: "bob".into(),
            msg: "hi".into(),
        }]
    );
}

#[test]
fn test_ping_produces_pong_and_no_event() {
    let line: ParsedLine = "PING :server.example".parse().unwrap();
    assert_eq!(ping_reply(&line).as_deref(), Some("PONG :server.example\r\n"));
    assert!(events("PING :server.example").is_empty());
}

#[test]
fn test_operator_prefix_is_stripped_everywhere() {
    let ev = events(":@op!o@h PRIVMSG #general :hello");
    assert!(matches!(&ev[0], Event::Message { user, .. } if user == "op"));

    let ev = events(":~&founder!f@h QUIT :bye");
    assert!(matches!(&ev[0], Event::Quit { user, reason } if user == "founder" && reason == "bye"));
}

#[test]
fn test_names_reply_users() {
    let ev = events(":irc.example.net 353 mybot = #rust :mybot @ferris %half +voice ~owner");
    match &ev[0] {
        Event::JoinUsers { users, .. } => {
            assert_eq!(users, &["mybot", "ferris", "half", "voice", "owner"]);
        }
        other => panic!("Expected JoinUsers, got {other:?}"),
    }
}

#[test]
fn test_names_reply_without_list() {
    let line: ParsedLine = ":irc.example.net 353 mybot = #rust".parse().unwrap();
    assert_eq!(
        map_line(&line, &SessionOptions::new("mybot")),
        Err(ParseError::MissingNames)
    );
}

#[test]
fn test_end_of_motd() {
    assert_eq!(events(":irc.example.net 376 mybot :End of /MOTD command."), vec![Event::Motd]);
}

#[test]
fn test_services_notices() {
    let kinds: Vec<EventKind> = [
        ":NickServ!NickServ@services. NOTICE mybot :This nickname is registered. Please choose a different nickname, or identify via /msg NickServ identify <password>.",
        ":NickServ!NickServ@services. NOTICE mybot :You are now identified for mybot.",
        ":ChanServ!ChanServ@services. NOTICE mybot :[#rust] Welcome!",
    ]
    .iter()
    .map(|raw| events(raw)[0].kind())
    .collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::NickUnidentified,
            EventKind::NickIdentified,
            EventKind::Notice
        ]
    );
}

#[test]
fn test_unknown_commands_are_ignored() {
    assert!(events(":irc.example.net 005 mybot CHANTYPES=# :are supported").is_empty());
    assert!(events(":alice!u@h NICK alice_").is_empty());
    assert!(events("ERROR :Closing link").is_empty());
}

#[test]
fn test_malformed_lines() {
    assert_eq!("".parse::<ParsedLine>(), Err(ParseError::EmptyLine));
    assert_eq!("  \r\n".parse::<ParsedLine>(), Err(ParseError::EmptyLine));
    assert_eq!(":prefix-only".parse::<ParsedLine>(), Err(ParseError::MissingCommand));
}
