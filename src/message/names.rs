use crate::error::ParseError;
use crate::prefix::plain_username;

/// Extract the user list from a raw `353` names reply.
///
/// The names are the space-separated tokens of the third colon-delimited
/// segment of the line, each with its role markers removed.
///
/// ```
/// use slirc_session::message::parse_names;
///
/// let users = parse_names(":irc.net 353 me = #rust :alice @bob +carol").unwrap();
/// assert_eq!(users, vec!["alice", "bob", "carol"]);
/// ```
pub fn parse_names(raw: &str) -> Result<Vec<String>, ParseError> {
    let segment = raw.split(':').nth(2).ok_or(ParseError::MissingNames)?;
    Ok(segment
        .split_whitespace()
        .map(|name| plain_username(name).to_owned())
        .collect())
}
