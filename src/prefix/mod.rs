//! Message prefix (source) helpers.
//!
//! Prefixes are either a server name (`irc.example.net`) or a user mask
//! (`nick!user@host`). The session layer only ever needs the nick part with
//! channel role markers removed, which this module calls the plain username.

/// Channel role markers that servers may put in front of a nick.
pub const ROLE_MARKERS: [char; 5] = ['~', '&', '@', '%', '+'];

/// Borrowed view of a prefix split into its parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixRef<'a> {
    /// Nick, or the whole prefix for server sources.
    pub nick: &'a str,
    /// Ident after `!`, if any.
    pub user: Option<&'a str>,
    /// Host after `@`, if any.
    pub host: Option<&'a str>,
}

impl<'a> PrefixRef<'a> {
    /// Split a prefix (without its leading `:`).
    pub fn parse(prefix: &'a str) -> Self {
        let prefix = prefix.strip_prefix(':').unwrap_or(prefix);
        // '@' is also a role marker, so only look for the host separator
        // past the leading marker run.
        let start = prefix.len() - plain_username(prefix).len();
        let (rest, host) = match prefix[start..].find('@') {
            Some(at) => (&prefix[..start + at], Some(&prefix[start + at + 1..])),
            None => (prefix, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (rest, None),
        };
        PrefixRef { nick, user, host }
    }

    /// The nick with role markers stripped.
    pub fn plain_nick(&self) -> &'a str {
        plain_username(self.nick)
    }
}

/// Strip the leading run of role markers from a nick.
///
/// Only the contiguous run at the start is removed, so repeated markers
/// collapse and markers inside the name are kept.
///
/// ```
/// use slirc_session::prefix::plain_username;
///
/// assert_eq!(plain_username("@@nick"), "nick");
/// assert_eq!(plain_username("~&op"), "op");
/// assert_eq!(plain_username("a+b"), "a+b");
/// ```
#[inline]
pub fn plain_username(nick: &str) -> &str {
    nick.trim_start_matches(ROLE_MARKERS)
}

/// Plain username of a `nick!user@host` prefix.
pub fn username_of(prefix: &str) -> &str {
    PrefixRef::parse(prefix).plain_nick()
}
