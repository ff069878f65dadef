//! Markdown re-emission: consumes tokens and produces the markdown they came
//! from, so section parsers can reconstitute free-form prose.
//!
//! The emitters and the original text agree structurally (nesting depth,
//! bullet markers, fence markers), not byte for byte.

use crate::token::{Token, TokenStream};

/// Consumes a run of tokens into one normalized markdown string.
///
/// Stops, without consuming, at the first token for which `boundary` returns
/// true, or at a token kind no emitter recognizes. Blank-line tokens are
/// consumed and dropped. Fragments are joined by a blank line.
pub fn collect_description(
    stream: &mut TokenStream,
    boundary: impl Fn(&Token, &TokenStream) -> bool,
) -> String {
    enum Next {
        Paragraph,
        Blockquote,
        Code,
        Heading,
        List,
        Space,
        Stop,
    }

    let mut fragments = Vec::new();
    loop {
        let next = match stream.peek() {
            None => Next::Stop,
            Some(token) if boundary(token, stream) => Next::Stop,
            Some(token) if token.is_paragraph_like() => Next::Paragraph,
            Some(Token::BlockquoteStart) => Next::Blockquote,
            Some(Token::Code { .. }) => Next::Code,
            Some(Token::Heading { .. }) => Next::Heading,
            Some(Token::ListStart { .. }) => Next::List,
            Some(Token::Space) => Next::Space,
            Some(_) => Next::Stop,
        };
        match next {
            Next::Stop => break,
            Next::Paragraph => fragments.push(emit_paragraph(stream)),
            Next::Blockquote => fragments.push(emit_blockquote(stream)),
            Next::Code => fragments.push(emit_code(stream)),
            Next::Heading => fragments.push(emit_heading(stream)),
            Next::List => fragments.push(emit_list(stream)),
            Next::Space => {
                stream.pop();
            }
        }
    }

    fragments.join("\n\n")
}

/// Boundary callback that never stops: absorbs the rest of the stream.
pub fn absorb_everything(_: &Token, _: &TokenStream) -> bool {
    false
}

pub fn emit_paragraph(stream: &mut TokenStream) -> String {
    match stream.pop() {
        Some(Token::Paragraph { text }) | Some(Token::Text { text }) => text,
        _ => String::new(),
    }
}

pub fn emit_heading(stream: &mut TokenStream) -> String {
    match stream.pop() {
        Some(Token::Heading { depth, text }) => format!("{} {}", "#".repeat(depth), text),
        _ => String::new(),
    }
}

/// Consumes a `BlockquoteStart ... BlockquoteEnd` run, prefixing every inner
/// line with `> `.
pub fn emit_blockquote(stream: &mut TokenStream) -> String {
    let mut lines = Vec::new();

    while let Some(token) = stream.pop() {
        let text = match token {
            Token::BlockquoteEnd => break,
            Token::Paragraph { text } | Token::Text { text } => text,
            Token::Code { text, .. } => text,
            Token::Heading { text, .. } => text,
            _ => continue,
        };
        for line in text.split('\n') {
            lines.push(format!("> {}", line));
        }
    }

    lines.join("\n")
}

/// Consumes one `Code` token and re-emits it fenced.
pub fn emit_code(stream: &mut TokenStream) -> String {
    match stream.pop() {
        Some(Token::Code { lang, text }) => {
            let fence = match lang {
                Some(lang) => format!("```{}", lang),
                None => "```".to_owned(),
            };
            format!("{}\n{}\n```", fence, text)
        }
        _ => String::new(),
    }
}

/// Consumes an entire (possibly nested) list structure and re-emits it as an
/// indented bullet tree: two spaces per nesting level, `* ` or `1. ` bullets
/// depending on each list's ordered flag, carried through sub-lists via a
/// depth stack.
pub fn emit_list(stream: &mut TokenStream) -> String {
    enum Step {
        Open(bool),
        Item,
        Text,
        Code,
        Quote,
        Close,
        Other,
        Done,
    }

    let mut depth: i32 = -1;
    let mut lines: Vec<String> = Vec::new();
    let mut line_prefix: Option<String> = None;
    let mut ordered = false;
    let mut ordered_stack: Vec<bool> = Vec::new();

    loop {
        let step = match stream.peek() {
            None => Step::Done,
            Some(Token::ListStart { ordered }) => Step::Open(*ordered),
            Some(token) if token.opens_list_item() => Step::Item,
            Some(Token::Text { .. }) => Step::Text,
            Some(Token::Code { .. }) => Step::Code,
            Some(Token::BlockquoteStart) => Step::Quote,
            Some(Token::ListEnd) => Step::Close,
            Some(_) => Step::Other,
        };
        match step {
            Step::Done => break,
            Step::Open(list_ordered) => {
                depth += 1;
                ordered_stack.push(ordered);
                ordered = list_ordered;
                stream.pop();
            }
            Step::Item => {
                let bullet = if ordered { "1. " } else { "* " };
                line_prefix = Some(format!("{}{}", indent(depth), bullet));
                stream.pop();
            }
            Step::Text => {
                let text = emit_paragraph(stream);
                push_item_lines(&text, depth, &mut line_prefix, &mut lines);
            }
            Step::Code => {
                let code = emit_code(stream);
                push_item_lines(&code, depth, &mut line_prefix, &mut lines);
            }
            Step::Quote => {
                let quote = emit_blockquote(stream);
                push_item_lines(&quote, depth, &mut line_prefix, &mut lines);
            }
            Step::Close => {
                depth -= 1;
                ordered = ordered_stack.pop().unwrap_or(false);
                stream.pop();
                if depth < 0 {
                    break;
                }
            }
            Step::Other => {
                stream.pop();
            }
        }
    }

    lines.join("\n")
}

fn indent(depth: i32) -> String {
    "  ".repeat(depth.max(0) as usize)
}

fn push_item_lines(
    text: &str,
    depth: i32,
    line_prefix: &mut Option<String>,
    lines: &mut Vec<String>,
) {
    for line in text.split('\n') {
        // The first line takes the bullet; continuation lines align under it.
        let prefix = line_prefix
            .take()
            .unwrap_or_else(|| format!("{}  ", indent(depth)));
        lines.push(format!("{}{}", prefix, line));
    }
}
