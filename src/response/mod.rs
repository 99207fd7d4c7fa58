//! IRC numeric replies the session reacts to.
//!
//! Only the numerics that produce session events are enumerated; all
//! others stay as [`crate::Command::Raw`].
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

#![allow(non_camel_case_types)]

use std::str::FromStr;

/// IRC server response code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Response {
    /// 332 - Channel topic, sent on join
    RPL_TOPIC = 332,
    /// 353 - Names list for a channel
    RPL_NAMREPLY = 353,
    /// 376 - End of MOTD; registration has completed
    RPL_ENDOFMOTD = 376,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Creates a Response from a numeric code
    pub fn from_code(code: u16) -> Option<Response> {
        match code {
            332 => Some(Response::RPL_TOPIC),
            353 => Some(Response::RPL_NAMREPLY),
            376 => Some(Response::RPL_ENDOFMOTD),
            _ => None,
        }
    }
}

/// Error returned when a string is not a known three-digit numeric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResponseError(String);

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseResponseError(s.to_owned()));
        }
        s.parse::<u16>()
            .ok()
            .and_then(Response::from_code)
            .ok_or_else(|| ParseResponseError(s.to_owned()))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

impl std::fmt::Display for ParseResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized numeric: {}", self.0)
    }
}

impl std::error::Error for ParseResponseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code() {
        assert_eq!(Response::RPL_ENDOFMOTD.code(), 376);
        assert_eq!(Response::from_code(332), Some(Response::RPL_TOPIC));
        assert_eq!(Response::from_code(1), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("353".parse::<Response>(), Ok(Response::RPL_NAMREPLY));
        assert!("001".parse::<Response>().is_err());
        assert!("0376".parse::<Response>().is_err());
        assert!("+376".parse::<Response>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Response::RPL_TOPIC.to_string(), "332");
    }
}
