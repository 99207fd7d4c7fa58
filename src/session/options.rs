//! Session configuration.

use crate::chan::ChannelExt;
use crate::mapper::NoticePatterns;

/// Server certificate policy for encrypted connections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CertValidation {
    /// Verify the chain against the bundled web PKI roots.
    Strict,
    /// Accept any certificate (self-signed test networks).
    #[default]
    Lazy,
}

/// Options a session is created with.
///
/// Only [`login`](crate::SessionControl::login) may change `nick`,
/// `username` and `realname` afterwards, and only before registration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionOptions {
    /// Desired nickname.
    pub nick: String,
    /// Services password used by the login extension.
    pub pass: Option<String>,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Channels joined after registration, in order.
    pub channels: Vec<String>,
    /// Wrap the connection in TLS.
    pub secure: bool,
    /// Certificate policy when `secure` is set.
    pub cert_validation: CertValidation,
    /// Send NICK/USER/JOIN as soon as the transport is up.
    pub auto_login: bool,
    /// Phrases used to classify services notices.
    pub notice_patterns: NoticePatterns,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(random_nick())
    }
}

impl SessionOptions {
    /// Options for `nick`, using it as the username too.
    pub fn new(nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            username: nick.clone(),
            nick,
            pass: None,
            realname: "a slirc-session bot".to_owned(),
            channels: Vec::new(),
            secure: false,
            cert_validation: CertValidation::default(),
            auto_login: true,
            notice_patterns: NoticePatterns::default(),
        }
    }

    /// Set the nick.
    #[must_use]
    pub fn with_nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = nick.into();
        self
    }

    /// Set the username sent in `USER`.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the realname sent in `USER`.
    #[must_use]
    pub fn with_realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    /// Set the services password.
    #[must_use]
    pub fn with_password(mut self, pass: impl Into<String>) -> Self {
        self.pass = Some(pass.into());
        self
    }

    /// Set the auto-join list. Names are normalized to `#name` and
    /// duplicates after normalization are dropped, keeping first position.
    #[must_use]
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.channels.clear();
        for chan in channels {
            let chan = chan.as_ref().normalize_channel();
            if !self.channels.contains(&chan) {
                self.channels.push(chan);
            }
        }
        self
    }

    /// Connect over TLS with the given certificate policy.
    #[must_use]
    pub fn with_tls(mut self, cert_validation: CertValidation) -> Self {
        self.secure = true;
        self.cert_validation = cert_validation;
        self
    }

    /// Send registration as soon as the transport is up.
    #[must_use]
    pub fn with_auto_login(mut self, auto_login: bool) -> Self {
        self.auto_login = auto_login;
        self
    }

    /// Replace the NOTICE identification phrases.
    #[must_use]
    pub fn with_notice_patterns(mut self, patterns: NoticePatterns) -> Self {
        self.notice_patterns = patterns;
        self
    }

    /// Merge login overrides; empty or missing fields keep current values.
    pub fn apply(&mut self, details: LoginDetails) {
        let keep = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);
        if let Some(nick) = keep(&details.nick) {
            self.nick = nick;
        }
        if let Some(username) = keep(&details.username) {
            self.username = username;
        }
        if let Some(realname) = keep(&details.realname) {
            self.realname = realname;
        }
    }
}

/// Overrides accepted by [`login`](crate::SessionControl::login).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoginDetails {
    /// Nick to register with.
    pub nick: Option<String>,
    /// Username for `USER`.
    pub username: Option<String>,
    /// Realname for `USER`.
    pub realname: Option<String>,
}

impl LoginDetails {
    /// Override only the nick.
    pub fn nick(nick: impl Into<String>) -> Self {
        Self {
            nick: Some(nick.into()),
            ..Self::default()
        }
    }
}

fn random_nick() -> String {
    let mut buf = [0u8; 3];
    // A zeroed suffix is still a valid nick if the OS source is unavailable.
    let _ = getrandom::getrandom(&mut buf);
    let suffix: String = buf.iter().map(|b| format!("{b:02x}")).collect();
    format!("slirc-{suffix}")
}
