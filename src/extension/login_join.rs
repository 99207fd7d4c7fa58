use tracing::info;

use crate::event::EventKind;
use crate::session::{event_handler, SessionControl};

use super::{Activation, Extension};

/// Identify with services, then join channels.
///
/// Without a password the channels are joined at the end of the MOTD. With
/// one, the extension waits for services to ask for identification, sends
/// the password, and joins once services confirm. Each step fires at most
/// once per activation.
///
/// The password is the one given to [`with_password`](Self::with_password),
/// falling back to the session's `pass` option.
#[derive(Clone, Debug, Default)]
pub struct LoginAndJoin {
    channels: Vec<String>,
    password: Option<String>,
}

impl LoginAndJoin {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
            password: None,
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl Extension for LoginAndJoin {
    fn name(&self) -> &'static str {
        "login-join"
    }

    fn activate(self: Box<Self>, session: &dyn SessionControl) -> Activation {
        let mut activation = Activation::new(self.name());
        let password = self
            .password
            .or_else(|| session.options().pass)
            .filter(|p| !p.is_empty());
        let channels = self.channels;

        match password {
            None => {
                activation.track(session.subscribe_once(
                    EventKind::Motd,
                    event_handler(move |s, _| join_all(s, &channels)),
                ));
            }
            Some(password) => {
                activation.track(session.subscribe_once(
                    EventKind::NickUnidentified,
                    event_handler(move |s, _| {
                        info!("identifying with services");
                        s.authenticate(&password)?;
                        Ok(())
                    }),
                ));
                activation.track(session.subscribe_once(
                    EventKind::NickIdentified,
                    event_handler(move |s, _| join_all(s, &channels)),
                ));
            }
        }
        activation
    }
}

fn join_all(session: &dyn SessionControl, channels: &[String]) -> anyhow::Result<()> {
    info!(channels = channels.len(), "joining channels");
    for channel in channels {
        session.join(channel)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::extension::mock::MockSession;
    use crate::session::SessionOptions;

    fn notice(kind: EventKind) -> Event {
        let user = "bot".to_owned();
        let msg = "services".to_owned();
        match kind {
            EventKind::NickUnidentified => Event::NickUnidentified { user, msg },
            _ => Event::NickIdentified { user, msg },
        }
    }

    #[test]
    fn test_joins_after_motd_without_password() {
        let session = MockSession::new(SessionOptions::new("bot"));
        let _activation = Box::new(LoginAndJoin::new(["a", "#b"])).activate(&session);

        session.fire(Event::Motd);
        session.fire(Event::Motd);
        assert_eq!(session.sent(), vec!["JOIN #a", "JOIN #b"]);
    }

    #[test]
    fn test_identifies_then_joins_with_password() {
        let session = MockSession::new(SessionOptions::new("bot"));
        let _activation =
            Box::new(LoginAndJoin::new(["#a"]).with_password("hunter2")).activate(&session);

        session.fire(Event::Motd);
        assert!(session.sent().is_empty());

        session.fire(notice(EventKind::NickUnidentified));
        session.fire(notice(EventKind::NickUnidentified));
        assert_eq!(session.sent(), vec!["PRIVMSG NickServ :IDENTIFY hunter2"]);

        session.fire(notice(EventKind::NickIdentified));
        assert_eq!(
            session.sent(),
            vec!["PRIVMSG NickServ :IDENTIFY hunter2", "JOIN #a"]
        );
    }

    #[test]
    fn test_password_falls_back_to_options() {
        let session = MockSession::new(SessionOptions::new("bot").with_password("fromopts"));
        let activation = Box::new(LoginAndJoin::new(["#a"])).activate(&session);
        assert_eq!(activation.subscriptions().len(), 2);

        session.fire(notice(EventKind::NickUnidentified));
        assert_eq!(session.sent(), vec!["PRIVMSG NickServ :IDENTIFY fromopts"]);
    }
}
