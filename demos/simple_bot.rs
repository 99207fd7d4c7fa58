//! Simple IRC bot example
//!
//! Connects to a server, identifies with services when `IRC_PASSWORD` is set,
//! joins a channel, answers `!<nick> ping` and reconnects if the connection
//! drops. Stop it with Ctrl-C.
//!
//! ```text
//! RUST_LOG=slirc_session=debug cargo run --example simple_bot -- irc.libera.chat 6697 "#slirc-test"
//! ```

use std::env;

use slirc_session::{
    CertValidation, Event, EventKind, LoginAndJoin, Reconnect, Session, SessionControl,
    SessionOptions,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "irc.libera.chat".to_owned());
    let port: u16 = args.next().as_deref().unwrap_or("6697").parse()?;
    let channel = args.next().unwrap_or_else(|| "#slirc-test".to_owned());

    let mut options = SessionOptions::default().with_realname("slirc-session example bot");
    if port == 6697 {
        options = options.with_tls(CertValidation::Strict);
    }
    if let Ok(password) = env::var("IRC_PASSWORD") {
        options = options.with_password(password);
    }

    let session = Session::new(host, port, options);
    let nick = session.options().nick;
    println!("connecting as {nick}");

    let _login = session.activate(LoginAndJoin::new([channel]));
    let _reconnect = session.activate(Reconnect);

    session.on(EventKind::Command, |session, event| {
        if let Event::Command { room, user, msg } = event {
            if msg == "ping" {
                session.send(&format!("PRIVMSG {room} :{user}: pong"))?;
            }
        }
        Ok(())
    });

    session.on(EventKind::Message, |_, event| {
        if let Event::Message { room, user, msg } = event {
            println!("[{room}] <{user}> {msg}");
        }
        Ok(())
    });

    session.on(EventKind::Error, |_, event| {
        if let Event::Error { cause } = event {
            eprintln!("error: {cause}");
        }
        Ok(())
    });

    session.connect()?;

    tokio::signal::ctrl_c().await?;
    if session.quit("bye").is_ok() {
        println!("quitting");
    }
    session.disconnect();
    Ok(())
}
