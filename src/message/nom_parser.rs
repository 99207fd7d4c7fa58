//! Nom-based parser for the line head (prefix and command).
//!
//! Parameters are split by hand in [`super::ParsedLine::parse`] since the
//! trailing rule is positional rather than grammatical.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space1},
    combinator::{opt, verify},
    error::{context, VerboseError},
    sequence::{preceded, terminated},
    IResult,
};

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// Parse message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_while1(|c: char| c != ' ')),
    )(input)
}

/// Parse the command word or numeric. A leading `:` here would mean the
/// line is all prefix.
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        verify(take_while1(|c: char| c != ' '), |s: &str| !s.starts_with(':')),
    )(input)
}

/// Parse `[:prefix ]command`, returning the unconsumed remainder.
pub(super) fn parse_head(input: &str) -> ParseResult<&str, (Option<&str>, &str)> {
    let (input, prefix) = context(
        "parsing optional prefix",
        opt(terminated(parse_prefix, space1)),
    )(input)?;
    let (input, command) = context("parsing required command", parse_command)(input)?;
    Ok((input, (prefix, command)))
}
