//! IRC case-mapping functions.
//!
//! Nicks compare case-insensitively under the `rfc1459` mapping, where
//! `[]\~` are the uppercase forms of `{}|^`.

#[inline]
fn fold(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c.to_ascii_lowercase(),
    }
}

/// Compare two strings using IRC case-insensitive comparison.
///
/// ```
/// use slirc_session::irc_eq;
///
/// assert!(irc_eq("MyBot", "mybot"));
/// assert!(irc_eq("nick[away]", "NICK{AWAY}"));
/// assert!(!irc_eq("bot", "bot_"));
/// ```
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.chars().map(fold).eq(b.chars().map(fold))
}
