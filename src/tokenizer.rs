//! Line-based block tokenizer producing the token stream the grammar engine
//! consumes.
//!
//! This is deliberately not a CommonMark implementation: it covers exactly
//! the block constructs docstrings use. Lines are classified with small nom
//! parsers; grouping into blocks is an explicit loop, with list nesting
//! driven by two-space indentation steps.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{char, digit1, one_of, space0, space1};
use nom::combinator::{opt, rest, value};
use nom::error::{context, VerboseError};
use nom::sequence::{pair, preceded, terminated, tuple};
use nom::{IResult, Parser};

use crate::token::{Token, TokenStream};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LineKind<'a> {
    Blank,
    Heading { depth: usize, text: &'a str },
    Fence { lang: Option<&'a str> },
    Blockquote { inner: &'a str },
    ListItem { indent: usize, ordered: bool, content: &'a str },
    Plain(&'a str),
}

fn heading_prefix(i: &str) -> IResult<&str, usize, VerboseError<&str>> {
    context(
        "heading_prefix",
        terminated(take_while_m_n(1, 6, |c| c == '#'), space1),
    )
    .map(str::len)
    .parse(i)
}

fn fence_prefix(i: &str) -> IResult<&str, &str, VerboseError<&str>> {
    context("fence_prefix", preceded(tag("```"), rest)).parse(i)
}

fn blockquote_prefix(i: &str) -> IResult<&str, &str, VerboseError<&str>> {
    context(
        "blockquote_prefix",
        preceded(pair(char('>'), opt(char(' '))), rest),
    )
    .parse(i)
}

fn list_marker(i: &str) -> IResult<&str, (usize, bool), VerboseError<&str>> {
    context(
        "list_marker",
        tuple((
            space0,
            alt((
                value(false, terminated(one_of("*+-"), space1)),
                value(true, terminated(pair(digit1, char('.')), space1)),
            )),
        )),
    )
    .map(|(leading, ordered): (&str, bool)| (leading.len(), ordered))
    .parse(i)
}

/// Strips trailing closing hashes from an ATX heading.
fn heading_text(raw: &str) -> &str {
    let trimmed = raw.trim();
    let stripped = trimmed.trim_end_matches('#');
    if stripped.len() != trimmed.len() && stripped.ends_with(' ') {
        stripped.trim_end()
    } else {
        trimmed
    }
}

fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Ok((text, depth)) = heading_prefix(line) {
        return LineKind::Heading {
            depth,
            text: heading_text(text),
        };
    }
    if let Ok((_, info)) = fence_prefix(line) {
        let info = info.trim();
        return LineKind::Fence {
            lang: if info.is_empty() { None } else { Some(info) },
        };
    }
    if let Ok((_, inner)) = blockquote_prefix(line) {
        return LineKind::Blockquote { inner };
    }
    if let Ok((content, (indent, ordered))) = list_marker(line) {
        return LineKind::ListItem {
            indent,
            ordered,
            content,
        };
    }
    LineKind::Plain(line)
}

fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

fn skip_blanks(lines: &[&str], mut i: usize) -> usize {
    while i < lines.len() && matches!(classify(lines[i]), LineKind::Blank) {
        i += 1;
    }
    i
}

/// Removes up to `max` leading spaces.
fn strip_indent(line: &str, max: usize) -> &str {
    let mut count = 0;
    for (idx, c) in line.char_indices() {
        if c == ' ' && count < max {
            count += 1;
        } else {
            return &line[idx..];
        }
    }
    ""
}

/// Tokenizes a docstring into an ordered block-token stream.
///
/// Blank lines following a heading, paragraph, code block or blockquote are
/// swallowed by that block; a `Space` token is emitted only where blank lines
/// stand on their own (after a list, or at the very start of the input).
#[must_use]
pub fn tokenize(source: &str) -> TokenStream {
    let lines: Vec<&str> = source.lines().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let kind = classify(line);

        if !matches!(kind, LineKind::Blank) && leading_spaces(line) >= 4 {
            i = skip_blanks(&lines, consume_indented_code(&lines, i, &mut tokens));
            continue;
        }

        match kind {
            LineKind::Blank => {
                i = skip_blanks(&lines, i);
                tokens.push(Token::Space);
            }
            LineKind::Heading { depth, text } => {
                tokens.push(Token::Heading {
                    depth,
                    text: text.to_owned(),
                });
                i = skip_blanks(&lines, i + 1);
            }
            LineKind::Fence { lang } => {
                i = consume_fence(&lines, i, 0, lang.map(ToOwned::to_owned), &mut tokens);
                i = skip_blanks(&lines, i);
            }
            LineKind::Blockquote { .. } => {
                i = skip_blanks(&lines, consume_blockquote(&lines, i, &mut tokens));
            }
            LineKind::ListItem { indent, .. } => {
                i = tokenize_list(&lines, i, indent, &mut tokens);
            }
            LineKind::Plain(_) => {
                let mut paragraph: Vec<&str> = Vec::new();
                while i < lines.len() {
                    match classify(lines[i]) {
                        LineKind::Plain(text) => {
                            paragraph.push(text);
                            i += 1;
                        }
                        _ => break,
                    }
                }
                tokens.push(Token::Paragraph {
                    text: paragraph.join("\n"),
                });
                i = skip_blanks(&lines, i);
            }
        }
    }

    TokenStream::new(tokens)
}

/// Consumes a fenced block opened at `lines[start]`, stripping `strip`
/// leading spaces from body lines.
fn consume_fence(
    lines: &[&str],
    start: usize,
    strip: usize,
    lang: Option<String>,
    tokens: &mut Vec<Token>,
) -> usize {
    let mut i = start + 1;
    let mut body: Vec<String> = Vec::new();
    while i < lines.len() {
        let stripped = strip_indent(lines[i], strip);
        if stripped.trim_end() == "```" {
            i += 1;
            break;
        }
        body.push(stripped.to_owned());
        i += 1;
    }
    tokens.push(Token::Code {
        lang,
        text: body.join("\n"),
    });
    i
}

fn consume_indented_code(lines: &[&str], start: usize, tokens: &mut Vec<Token>) -> usize {
    let mut i = start;
    let mut body: Vec<String> = Vec::new();
    while i < lines.len()
        && !matches!(classify(lines[i]), LineKind::Blank)
        && leading_spaces(lines[i]) >= 4
    {
        body.push(strip_indent(lines[i], 4).to_owned());
        i += 1;
    }
    tokens.push(Token::Code {
        lang: None,
        text: body.join("\n"),
    });
    i
}

fn consume_blockquote(lines: &[&str], start: usize, tokens: &mut Vec<Token>) -> usize {
    tokens.push(Token::BlockquoteStart);
    let mut i = start;
    let mut paragraph: Vec<&str> = Vec::new();
    while i < lines.len() {
        match classify(lines[i]) {
            LineKind::Blockquote { inner } => {
                if inner.trim().is_empty() {
                    flush_paragraph(&mut paragraph, tokens);
                } else {
                    paragraph.push(inner);
                }
                i += 1;
            }
            _ => break,
        }
    }
    flush_paragraph(&mut paragraph, tokens);
    tokens.push(Token::BlockquoteEnd);
    i
}

fn flush_paragraph(paragraph: &mut Vec<&str>, tokens: &mut Vec<Token>) {
    if !paragraph.is_empty() {
        tokens.push(Token::Paragraph {
            text: paragraph.join("\n"),
        });
        paragraph.clear();
    }
}

fn flush_text(text_buf: &mut Vec<String>, tokens: &mut Vec<Token>) {
    if !text_buf.is_empty() {
        tokens.push(Token::Text {
            text: text_buf.join("\n"),
        });
        text_buf.clear();
    }
}

/// Tokenizes the list opening at `lines[start]`, whose items sit at `indent`.
///
/// Items two or more spaces deeper open a nested list inside the current
/// item; continuation lines are dedented by the item's hanging indent; blank
/// lines inside the list make the surrounding items loose.
fn tokenize_list(lines: &[&str], start: usize, indent: usize, tokens: &mut Vec<Token>) -> usize {
    let ordered = match classify(lines[start]) {
        LineKind::ListItem { ordered, .. } => ordered,
        _ => false,
    };
    tokens.push(Token::ListStart { ordered });

    let mut i = start;
    let mut next_item_loose = false;

    while i < lines.len() {
        let content = match classify(lines[i]) {
            LineKind::ListItem {
                indent: item_indent,
                content,
                ..
            } if item_indent >= indent && item_indent < indent + 2 => content,
            _ => break,
        };
        i += 1;

        let mut item_tokens: Vec<Token> = Vec::new();
        let mut text_buf: Vec<String> = Vec::new();
        if !content.is_empty() {
            text_buf.push(content.to_owned());
        }
        let mut loose = next_item_loose;
        next_item_loose = false;

        'item: while i < lines.len() {
            let line = lines[i];
            match classify(line) {
                LineKind::Blank => {
                    let mut j = i;
                    while j < lines.len() && matches!(classify(lines[j]), LineKind::Blank) {
                        j += 1;
                    }
                    if j >= lines.len() {
                        break 'item;
                    }
                    match classify(lines[j]) {
                        LineKind::ListItem {
                            indent: item_indent,
                            ..
                        } if item_indent >= indent + 2 => {
                            flush_text(&mut text_buf, &mut item_tokens);
                            loose = true;
                            i = j;
                        }
                        LineKind::ListItem {
                            indent: item_indent,
                            ..
                        } if item_indent >= indent => {
                            next_item_loose = true;
                            i = j;
                            break 'item;
                        }
                        _ if leading_spaces(lines[j]) >= indent + 2 => {
                            flush_text(&mut text_buf, &mut item_tokens);
                            loose = true;
                            i = j;
                        }
                        _ => break 'item,
                    }
                }
                LineKind::ListItem {
                    indent: item_indent,
                    ..
                } if item_indent >= indent + 2 => {
                    flush_text(&mut text_buf, &mut item_tokens);
                    i = tokenize_list(lines, i, item_indent, &mut item_tokens);
                }
                LineKind::ListItem { .. } => break 'item,
                _ => {
                    let stripped = strip_indent(line, indent + 2);
                    if let LineKind::Fence { lang } = classify(stripped) {
                        flush_text(&mut text_buf, &mut item_tokens);
                        i = consume_fence(
                            lines,
                            i,
                            indent + 2,
                            lang.map(ToOwned::to_owned),
                            &mut item_tokens,
                        );
                    } else {
                        text_buf.push(stripped.to_owned());
                        i += 1;
                    }
                }
            }
        }

        flush_text(&mut text_buf, &mut item_tokens);
        if loose {
            tokens.push(Token::LooseItemStart);
            tokens.extend(item_tokens);
            tokens.push(Token::LooseItemEnd);
        } else {
            tokens.push(Token::ListItemStart);
            tokens.extend(item_tokens);
            tokens.push(Token::ListItemEnd);
        }
    }

    tokens.push(Token::ListEnd);
    i
}
