//! Protocol line parsing.
//!
//! A line has the shape `[:<prefix> ]<command>[ <param>]*[ :<trailing>]`.
//! [`ParsedLine`] keeps the structured view next to the raw text because
//! several replies are addressed by raw token position rather than by
//! parameter index (see [`ParsedLine::token`] and [`ParsedLine::rest_from`]).

mod names;
mod nom_parser;
mod serialize;

pub use self::names::parse_names;
pub use self::serialize::{serialize, strip_eol, EOL};

use crate::error::ParseError;

/// A single inbound protocol line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedLine {
    /// Source of the line without the leading `:`, e.g. `nick!user@host`.
    pub prefix: Option<String>,
    /// Command word or three-digit numeric, as sent.
    pub command: String,
    /// Middle parameters, in order.
    pub params: Vec<String>,
    /// Trailing parameter without its leading `:`. `None` when the line has
    /// no `:` marker, which is distinct from an empty trailing parameter.
    pub trailing: Option<String>,
    /// The line with surrounding whitespace and CRLF removed.
    pub raw: String,
}

impl ParsedLine {
    /// Parse a raw line. Fails only when nothing is left after trimming or
    /// when a prefix is not followed by a command.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let line = strip_eol(raw).trim();
        if line.is_empty() {
            return Err(ParseError::EmptyLine);
        }

        let (rest, (prefix, command)) =
            nom_parser::parse_head(line).map_err(|_| ParseError::MissingCommand)?;

        let mut params = Vec::new();
        let mut trailing = None;
        let mut tokens = rest.split(' ').skip(1);
        while let Some(token) = tokens.next() {
            if let Some(first) = token.strip_prefix(':') {
                let mut text = first.to_owned();
                for more in tokens.by_ref() {
                    text.push(' ');
                    text.push_str(more);
                }
                trailing = Some(text);
                break;
            }
            if !token.is_empty() {
                params.push(token.to_owned());
            }
        }

        Ok(ParsedLine {
            prefix: prefix.map(str::to_owned),
            command: command.to_owned(),
            params,
            trailing,
            raw: line.to_owned(),
        })
    }

    /// The `i`-th space-delimited token of the raw line, counting the prefix.
    ///
    /// Empty tokens (from doubled spaces) read as absent.
    pub fn token(&self, i: usize) -> Option<&str> {
        self.raw
            .split(' ')
            .nth(i)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Tokens from position `i` to the end of the raw line, rejoined with
    /// single spaces. `None` when token `i` is absent.
    pub fn rest_from(&self, i: usize) -> Option<String> {
        self.token(i)?;
        Some(self.raw.split(' ').skip(i).collect::<Vec<_>>().join(" "))
    }

    /// Everything after the command token, verbatim.
    pub fn arguments(&self) -> Option<String> {
        let skip = if self.prefix.is_some() { 2 } else { 1 };
        self.rest_from(skip)
    }

    /// The parameter list with the trailing parameter appended.
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .map(String::as_str)
            .chain(self.trailing.as_deref())
    }

    /// The `i`-th argument, counting the trailing parameter last.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args().nth(i)
    }
}

impl std::str::FromStr for ParsedLine {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedLine::parse(s)
    }
}

impl std::fmt::Display for ParsedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
