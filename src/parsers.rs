//! Text-level micro-grammar shared by the tokenizer and the section parsers:
//! the leading visibility keyword, the argument-entry pattern, the `{Type}`
//! bracket extractor and the `Returns` clause detector.

use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, char, multispace0, one_of};
use nom::combinator::opt;
use nom::error::{context, VerboseError};
use nom::sequence::{delimited, tuple};
use nom::{IResult, Parser};

/// A leading `Word:` visibility marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VisibilityPrefix<'a> {
    /// The full matched prefix, surrounding whitespace included, exactly as it
    /// must be stripped from summary and description text.
    pub raw: &'a str,
    pub keyword: &'a str,
}

/// A leading `` `name` `` argument-entry marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ArgumentEntry<'a> {
    pub name: &'a str,
    pub is_optional: bool,
}

/// A detected `Returns` clause.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReturnsClause<'a> {
    /// The visibility prefix to strip, present only when `Returns`
    /// immediately follows it.
    pub visibility_prefix: Option<&'a str>,
}

/// Eats a leading `Word:` visibility marker, e.g. `Public: `.
pub fn visibility_prefix(i: &str) -> IResult<&str, VisibilityPrefix<'_>, VerboseError<&str>> {
    let (rest, (_, keyword, _, _)) = context(
        "visibility_prefix",
        tuple((multispace0, alpha1, char(':'), multispace0)),
    )
    .parse(i)?;
    let raw = &i[..i.len() - rest.len()];
    Ok((rest, VisibilityPrefix { raw, keyword }))
}

fn argument_name(i: &str) -> IResult<&str, &str, VerboseError<&str>> {
    nom::bytes::complete::take_while1(|c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '\\' | '.' | '-')
    })(i)
}

/// Eats a leading argument-entry marker: a backtick-quoted name, an optional
/// `:`/`-` separator and an optional `(optional)` marker, e.g.
/// `` `options` (optional) ``.
pub fn argument_entry(i: &str) -> IResult<&str, ArgumentEntry<'_>, VerboseError<&str>> {
    context(
        "argument_entry",
        tuple((
            multispace0,
            delimited(char('`'), argument_name, char('`')),
            opt(tuple((multispace0, one_of(":-")))),
            opt(tuple((multispace0, tag("(optional)")))),
            multispace0,
        )),
    )
    .map(|(_, name, _, optional, _)| ArgumentEntry {
        name,
        is_optional: optional.is_some(),
    })
    .parse(i)
}

/// Whether `text` starts with an argument-entry marker.
#[must_use]
pub fn is_argument_entry(text: &str) -> bool {
    argument_entry(text).is_ok()
}

fn type_bracket(i: &str) -> IResult<&str, &str, VerboseError<&str>> {
    context(
        "type_bracket",
        delimited(
            char('{'),
            nom::bytes::complete::take_while1(|c: char| {
                c.is_alphanumeric() || matches!(c, '_' | '.')
            }),
            char('}'),
        ),
    )
    .parse(i)
}

/// Returns the first `{Identifier}` bracket match anywhere in `text`, or
/// `None`.
#[must_use]
pub fn first_type_bracket(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(pos) = rest.find('{') {
        if let Ok((_, ty)) = type_bracket(&rest[pos..]) {
            return Some(ty);
        }
        rest = &rest[pos + 1..];
    }
    None
}

/// Detects a `Returns` clause in `text`.
///
/// Matches any literal occurrence of `Returns`, even mid-prose; a stricter
/// grammar would change parse results on existing documents. A leading
/// visibility prefix is captured only when `Returns` directly follows it.
#[must_use]
pub fn detect_returns(text: &str) -> Option<ReturnsClause<'_>> {
    if let Ok((rest, prefix)) = visibility_prefix(text) {
        if rest.trim_start().starts_with("Returns") {
            return Some(ReturnsClause {
                visibility_prefix: Some(prefix.raw),
            });
        }
    }
    if text.contains("Returns") {
        Some(ReturnsClause {
            visibility_prefix: None,
        })
    } else {
        None
    }
}

/// Whether `text` contains a `Returns` clause.
#[must_use]
pub fn is_return_value(text: &str) -> bool {
    detect_returns(text).is_some()
}
