//! The section grammar: a dispatcher that tries each recognizer in priority
//! order over the token stream, the nested argument-list stack machine, and
//! the return-clause splitter.

use crate::ast::{Argument, Doc, Event, Example, ReturnValue, TitledArguments, Visibility};
use crate::emit;
use crate::parsers;
use crate::token::{Token, TokenStream};

/// Heading depth that introduces a reserved section.
const SPECIAL_HEADING_DEPTH: usize = 2;

fn is_special_heading(text: &str) -> bool {
    text.starts_with("Arguments") || text.starts_with("Events") || text.starts_with("Examples")
}

/// Parses the whole token stream into `doc`.
///
/// The caller has already checked that the stream opens with a paragraph.
pub(crate) fn parse_into(doc: &mut Doc, tokens: &mut TokenStream) {
    let lead = parse_summary_and_description(tokens, stop_on_section_boundaries);
    doc.summary = lead.summary;
    doc.description = lead.description;
    doc.visibility = lead.visibility;
    if let Some(values) = lead.return_values {
        doc.append_return_values(values);
    }

    while !tokens.is_empty() {
        if let Some(titled) = parse_titled_arguments_section(tokens) {
            doc.titled_arguments
                .get_or_insert_with(Vec::new)
                .push(titled);
        } else if let Some(args) = parse_arguments_section(tokens) {
            doc.arguments = Some(args);
        } else if let Some(events) = parse_events_section(tokens) {
            doc.events = Some(events);
        } else if let Some(examples) = parse_examples_section(tokens) {
            doc.examples = Some(examples);
        } else if let Some(values) = parse_return_values(tokens, true) {
            doc.append_return_values(values);
        } else {
            // No man's land: fold stray tokens into the description so they
            // don't get lost.
            let before = tokens.len();
            let extra = emit::collect_description(tokens, stop_on_section_boundaries);
            doc.description.push_str("\n\n");
            doc.description.push_str(&extra);
            if tokens.len() == before {
                // Nothing was consumable; drop the offender rather than spin.
                tokens.pop();
            }
        }
    }
}

pub(crate) struct LeadingContent {
    pub summary: String,
    pub description: String,
    pub visibility: Visibility,
    pub return_values: Option<Vec<ReturnValue>>,
}

/// Extracts visibility, summary and description from the leading tokens.
///
/// The first-paragraph text is scanned for a `Word:` visibility marker, which
/// is stripped from the summary and from the collected description. When the
/// remaining first paragraph is itself a `Returns` clause, the whole unit is
/// re-routed to the return-value parser and the summary stays empty.
pub(crate) fn parse_summary_and_description(
    tokens: &mut TokenStream,
    boundary: impl Fn(&Token, &TokenStream) -> bool,
) -> LeadingContent {
    let mut raw_summary = tokens
        .peek()
        .and_then(Token::text)
        .unwrap_or_default()
        .to_owned();
    let mut visibility = Visibility::Private;
    let mut raw_visibility = None;

    let stripped = match parsers::visibility_prefix(&raw_summary) {
        Ok((rest, prefix)) => Some((
            rest.to_owned(),
            Visibility::classify(prefix.keyword),
            prefix.raw.to_owned(),
        )),
        Err(_) => None,
    };
    if let Some((rest, classified, raw)) = stripped {
        visibility = classified;
        raw_visibility = Some(raw);
        raw_summary = rest;
    }

    if parsers::is_return_value(&raw_summary) {
        return LeadingContent {
            summary: String::new(),
            description: String::new(),
            visibility,
            return_values: parse_return_values(tokens, false),
        };
    }

    let mut description = emit::collect_description(tokens, boundary);
    if let Some(raw) = raw_visibility {
        description = description.replacen(&raw, "", 1);
    }

    LeadingContent {
        summary: raw_summary,
        description,
        visibility,
        return_values: None,
    }
}

/// Boundary predicate for description collection: stops at return-clause
/// paragraphs, reserved depth-2 headings and lists that look like argument
/// lists.
pub(crate) fn stop_on_section_boundaries(token: &Token, tokens: &TokenStream) -> bool {
    match token {
        Token::Paragraph { text } | Token::Text { text } => parsers::is_return_value(text),
        Token::Heading { depth, text } => {
            *depth == SPECIAL_HEADING_DEPTH && is_special_heading(text)
        }
        Token::ListStart { .. } => {
            // If the list's first text looks like `someVar`, it is an
            // (implicit) arguments list.
            for ahead in tokens.iter() {
                if let Token::Text { text } = ahead {
                    return parsers::is_argument_entry(text);
                }
            }
            false
        }
        _ => false,
    }
}

/// Lookahead check used before committing to the argument-list parser: scans
/// for the first text token that follows a list-item start. Unlike the
/// boundary probe above, a text token before any item start is skipped.
fn is_at_argument_list(tokens: &TokenStream) -> bool {
    let mut found_item_start = false;
    for token in tokens.iter() {
        if token.opens_list_item() {
            found_item_start = true;
        } else if let Token::Text { text } = token {
            if found_item_start {
                return parsers::is_argument_entry(text);
            }
        }
    }
    false
}

fn parse_titled_arguments_section(tokens: &mut TokenStream) -> Option<TitledArguments> {
    let title = match tokens.peek() {
        Some(Token::Heading { depth, text })
            if *depth == SPECIAL_HEADING_DEPTH && text.starts_with("Arguments:") =>
        {
            text["Arguments:".len()..].trim().to_owned()
        }
        _ => return None,
    };
    tokens.pop();

    Some(TitledArguments {
        title,
        description: emit::collect_description(tokens, stop_on_section_boundaries),
        arguments: parse_argument_list(tokens),
    })
}

fn parse_arguments_section(tokens: &mut TokenStream) -> Option<Vec<Argument>> {
    enum SectionMatch {
        Heading,
        List,
    }

    let matched = match tokens.peek() {
        Some(Token::Heading { depth, text })
            if *depth == SPECIAL_HEADING_DEPTH && text.as_str() == "Arguments" =>
        {
            SectionMatch::Heading
        }
        Some(Token::ListStart { .. }) if is_at_argument_list(tokens) => SectionMatch::List,
        _ => return None,
    };

    if let SectionMatch::Heading = matched {
        tokens.pop();
        // Discard any prose between the heading and the list itself.
        emit::collect_description(tokens, stop_on_section_boundaries);
    }

    Some(parse_argument_list(tokens))
}

fn parse_events_section(tokens: &mut TokenStream) -> Option<Vec<Event>> {
    match tokens.peek() {
        Some(Token::Heading { depth, text })
            if *depth == SPECIAL_HEADING_DEPTH && text.as_str() == "Events" => {}
        _ => return None,
    }

    // Each event starts at a heading one level deeper than the section's.
    let event_heading_depth = SPECIAL_HEADING_DEPTH + 1;
    let boundary = move |token: &Token, tokens: &TokenStream| {
        if let Token::Heading { depth, .. } = token {
            if *depth == event_heading_depth {
                return true;
            }
        }
        stop_on_section_boundaries(token, tokens)
    };

    let mut events = Vec::new();
    tokens.pop();

    while !tokens.is_empty() {
        emit::collect_description(tokens, &boundary);

        let name = match tokens.peek() {
            Some(Token::Heading { depth, text }) if *depth == event_heading_depth => text.clone(),
            _ => break,
        };
        tokens.pop();

        let lead = parse_summary_and_description(tokens, &boundary);
        let arguments = parse_argument_list(tokens);
        events.push(Event {
            name,
            summary: lead.summary,
            description: lead.description,
            visibility: lead.visibility,
            arguments: if arguments.is_empty() {
                None
            } else {
                Some(arguments)
            },
        });
    }

    if events.is_empty() {
        None
    } else {
        Some(events)
    }
}

fn parse_examples_section(tokens: &mut TokenStream) -> Option<Vec<Example>> {
    match tokens.peek() {
        Some(Token::Heading { depth, text })
            if *depth == SPECIAL_HEADING_DEPTH && text.as_str() == "Examples" => {}
        _ => return None,
    }

    let mut examples = Vec::new();
    tokens.pop();

    while !tokens.is_empty() {
        let description = emit::collect_description(tokens, |token: &Token, rest: &TokenStream| {
            matches!(token, Token::Code { .. }) || stop_on_section_boundaries(token, rest)
        });

        let (lang, code) = match tokens.peek() {
            Some(Token::Code { lang, text }) => (lang.clone(), text.clone()),
            _ => break,
        };
        let raw = emit::emit_code(tokens);
        examples.push(Example {
            description,
            lang,
            code,
            raw,
        });
    }

    if examples.is_empty() {
        None
    } else {
        Some(examples)
    }
}

/// Extracts one or more `Returns` clauses.
///
/// With `consume_tokens_after_return` the remainder of the whole stream is
/// absorbed first (a trailing clause consumes the rest of the docstring);
/// otherwise only the front paragraph is taken and its whitespace runs are
/// collapsed.
pub(crate) fn parse_return_values(
    tokens: &mut TokenStream,
    consume_tokens_after_return: bool,
) -> Option<Vec<ReturnValue>> {
    let visibility_prefix = match tokens.peek() {
        Some(token) if token.is_paragraph_like() => {
            let clause = parsers::detect_returns(token.text().unwrap_or_default())?;
            clause.visibility_prefix.map(str::to_owned)
        }
        _ => return None,
    };

    let mut normalized = if consume_tokens_after_return {
        emit::collect_description(tokens, emit::absorb_everything)
    } else {
        match tokens.pop() {
            Some(Token::Paragraph { text }) | Some(Token::Text { text }) => text,
            _ => return None,
        }
    };
    if let Some(prefix) = visibility_prefix {
        normalized = normalized.replacen(&prefix, "", 1);
    }
    if !consume_tokens_after_return {
        normalized = collapse_whitespace_runs(&normalized);
    }

    let mut values = Vec::new();
    let mut remaining = normalized;
    while !remaining.is_empty() {
        // Split on the next literal `Returns`, never the one at the front.
        let past_first = remaining.char_indices().nth(1).map(|(i, _)| i);
        let next_index =
            past_first.and_then(|start| remaining[start..].find("Returns").map(|i| i + start));
        let segment = match next_index {
            Some(index) => {
                let segment = remaining[..index].to_owned();
                remaining = remaining[index..].to_owned();
                segment
            }
            None => std::mem::take(&mut remaining),
        };
        values.push(ReturnValue {
            ty: parsers::first_type_bracket(&segment).map(str::to_owned),
            description: segment.trim().to_owned(),
        });
    }

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Collapses every run of two or more whitespace characters to a single
/// space; single whitespace characters are kept as they are.
fn collapse_whitespace_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            let mut run = 1;
            while chars.peek().map_or(false, |next| next.is_whitespace()) {
                chars.next();
                run += 1;
            }
            out.push(if run >= 2 { ' ' } else { c });
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Default)]
struct PendingArgument {
    fragments: Vec<String>,
    children: Vec<Argument>,
}

/// Consumes an entire (possibly nested) list structure and returns the
/// top-level arguments, with nested sub-lists attached as `children`.
///
/// Nesting is tracked with an explicit depth counter and two parallel stacks
/// (in-progress sibling lists, in-progress arguments), so the input's nesting
/// depth never grows the call stack.
pub(crate) fn parse_argument_list(tokens: &mut TokenStream) -> Vec<Argument> {
    enum Step {
        Open,
        Item,
        Text,
        Code,
        ItemEnd,
        Close,
        Other,
    }

    let mut depth = 0usize;
    let mut args: Vec<Argument> = Vec::new();
    let mut current_list: Option<Vec<Argument>> = None;
    let mut list_stack: Vec<Vec<Argument>> = Vec::new();
    let mut open_argument: Option<PendingArgument> = None;
    let mut argument_stack: Vec<PendingArgument> = Vec::new();

    loop {
        let step = match tokens.peek() {
            None => break,
            Some(Token::ListStart { .. }) => Step::Open,
            Some(token) if token.opens_list_item() => Step::Item,
            Some(Token::Text { .. }) => Step::Text,
            Some(Token::Code { .. }) => Step::Code,
            Some(token) if token.closes_list_item() => Step::ItemEnd,
            Some(Token::ListEnd) => Step::Close,
            Some(_) => Step::Other,
        };
        if depth == 0 && !matches!(step, Step::Open) {
            break;
        }

        match step {
            Step::Open => {
                // This list might not be an argument list. Check before
                // committing.
                if is_at_argument_list(tokens) {
                    depth += 1;
                    if let Some(list) = current_list.take() {
                        list_stack.push(list);
                    }
                    current_list = Some(Vec::new());
                    tokens.pop();
                } else {
                    let prose = format!("\n{}", emit::emit_list(tokens));
                    if let Some(pending) = open_argument.as_mut() {
                        // The sub-list is literal prose belonging to the open
                        // argument's description.
                        pending.fragments.push(prose);
                    }
                }
            }
            Step::Item => {
                if let Some(pending) = open_argument.take() {
                    argument_stack.push(pending);
                }
                open_argument = Some(PendingArgument::default());
                tokens.pop();
            }
            Step::Text => {
                if let Some(Token::Text { text }) = tokens.pop() {
                    if let Some(pending) = open_argument.as_mut() {
                        pending.fragments.push(text);
                    }
                }
            }
            Step::Code => {
                let code = format!("\n{}", emit::emit_code(tokens));
                if let Some(pending) = open_argument.as_mut() {
                    pending.fragments.push(code);
                }
            }
            Step::ItemEnd => {
                if let Some(pending) = open_argument.take() {
                    let text = pending.fragments.join(" ").replace(" \n", "\n");
                    let mut argument = parse_list_item(&text);
                    argument.children = pending.children;
                    current_list.get_or_insert_with(Vec::new).push(argument);
                }
                open_argument = argument_stack.pop();
                tokens.pop();
            }
            Step::Close => {
                depth = depth.saturating_sub(1);
                if let Some(finished) = current_list.take() {
                    if let Some(pending) = open_argument.as_mut() {
                        pending.children = finished;
                        current_list = list_stack.pop();
                    } else {
                        args = finished;
                    }
                }
                tokens.pop();
            }
            Step::Other => {
                tokens.pop();
            }
        }
    }

    args
}

/// Splits an argument's joined description text into name, type, optional
/// marker and the remaining description.
fn parse_list_item(text: &str) -> Argument {
    match parsers::argument_entry(text) {
        Ok((rest, entry)) => Argument {
            name: Some(entry.name.to_owned()),
            ty: parsers::first_type_bracket(rest).map(str::to_owned),
            description: rest.to_owned(),
            is_optional: entry.is_optional,
            children: Vec::new(),
        },
        Err(_) => Argument {
            name: None,
            ty: None,
            description: text.to_owned(),
            is_optional: false,
            children: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text { text: s.to_owned() }
    }

    fn heading(depth: usize, s: &str) -> Token {
        Token::Heading {
            depth,
            text: s.to_owned(),
        }
    }

    fn paragraph(s: &str) -> Token {
        Token::Paragraph { text: s.to_owned() }
    }

    #[test]
    fn test_parse_list_item_extraction() {
        let argument = parse_list_item("`options` A {Object} with keys");
        assert_eq!(argument.name.as_deref(), Some("options"));
        assert_eq!(argument.ty.as_deref(), Some("Object"));
        assert_eq!(argument.description, "A {Object} with keys");
        assert!(!argument.is_optional);

        let argument = parse_list_item("`verbose` (optional) A {Boolean}.");
        assert_eq!(argument.name.as_deref(), Some("verbose"));
        assert_eq!(argument.ty.as_deref(), Some("Boolean"));
        assert!(argument.is_optional);

        let argument = parse_list_item("no marker at all");
        assert_eq!(argument.name, None);
        assert_eq!(argument.ty, None);
        assert_eq!(argument.description, "no marker at all");
        assert!(!argument.is_optional);
    }

    fn argument_list_tokens() -> Vec<Token> {
        vec![
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`options` A {Object} with the following keys:"),
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`verbose` (optional) A {Boolean}."),
            Token::ListItemEnd,
            Token::ListEnd,
            Token::ListItemEnd,
            Token::ListItemStart,
            text("`callback` A {Function}"),
            Token::ListItemEnd,
            Token::ListEnd,
        ]
    }

    #[test]
    fn test_argument_list_nesting() {
        let mut tokens = TokenStream::new(argument_list_tokens());
        let args = parse_argument_list(&mut tokens);
        assert!(tokens.is_empty());
        assert_eq!(args.len(), 2);

        assert_eq!(args[0].name.as_deref(), Some("options"));
        assert_eq!(args[0].ty.as_deref(), Some("Object"));
        assert_eq!(args[0].children.len(), 1);
        let child = &args[0].children[0];
        assert_eq!(child.name.as_deref(), Some("verbose"));
        assert_eq!(child.ty.as_deref(), Some("Boolean"));
        assert!(child.is_optional);
        assert!(child.children.is_empty());

        assert_eq!(args[1].name.as_deref(), Some("callback"));
        assert_eq!(args[1].children.len(), 0);
    }

    #[test]
    fn test_argument_list_deep_nesting_uses_explicit_stacks() {
        // a > b > c, three levels deep.
        let mut tokens = TokenStream::new(vec![
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`a` level one"),
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`b` level two"),
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`c` level three"),
            Token::ListItemEnd,
            Token::ListEnd,
            Token::ListItemEnd,
            Token::ListEnd,
            Token::ListItemEnd,
            Token::ListEnd,
        ]);
        let args = parse_argument_list(&mut tokens);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name.as_deref(), Some("a"));
        assert_eq!(args[0].children[0].name.as_deref(), Some("b"));
        assert_eq!(args[0].children[0].children[0].name.as_deref(), Some("c"));
    }

    #[test]
    fn test_non_argument_sublist_becomes_prose() {
        let mut tokens = TokenStream::new(vec![
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`mode` one of:"),
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("fast"),
            Token::ListItemEnd,
            Token::ListItemStart,
            text("slow"),
            Token::ListItemEnd,
            Token::ListEnd,
            Token::ListItemEnd,
            Token::ListEnd,
        ]);
        let args = parse_argument_list(&mut tokens);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name.as_deref(), Some("mode"));
        assert!(args[0].children.is_empty());
        assert_eq!(args[0].description, "one of:\n* fast\n* slow");
    }

    #[test]
    fn test_argument_with_embedded_code_fragment() {
        let mut tokens = TokenStream::new(vec![
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`snippet` For example:"),
            Token::Code {
                lang: Some("js".to_owned()),
                text: "x()".to_owned(),
            },
            Token::ListItemEnd,
            Token::ListEnd,
        ]);
        let args = parse_argument_list(&mut tokens);
        assert_eq!(args[0].name.as_deref(), Some("snippet"));
        assert_eq!(args[0].description, "For example:\n```js\nx()\n```");
    }

    #[test]
    fn test_boundary_probe_and_commit_probe_differ() {
        // Text token before any item start: the boundary probe takes it, the
        // commit probe skips it.
        let tokens = TokenStream::new(vec![
            Token::ListStart { ordered: false },
            text("plain prose first"),
            Token::ListItemStart,
            text("`arg` real entry"),
            Token::ListItemEnd,
            Token::ListEnd,
        ]);
        let front = Token::ListStart { ordered: false };
        assert!(!stop_on_section_boundaries(&front, &tokens));
        assert!(is_at_argument_list(&tokens));
    }

    #[test]
    fn test_events_section() {
        let mut tokens = TokenStream::new(vec![
            heading(2, "Events"),
            Token::Space,
            heading(3, "did-change"),
            paragraph("Public: Fired when the buffer changes."),
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`event` An {Object} payload"),
            Token::ListItemEnd,
            Token::ListEnd,
        ]);
        let events = parse_events_section(&mut tokens).expect("events section should match");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "did-change");
        assert_eq!(events[0].summary, "Fired when the buffer changes.");
        assert!(events[0].visibility.is_public());
        let arguments = events[0].arguments.as_ref().expect("event arguments");
        assert_eq!(arguments[0].name.as_deref(), Some("event"));
    }

    #[test]
    fn test_events_section_with_zero_events_is_no_match() {
        let mut tokens = TokenStream::new(vec![heading(2, "Events"), paragraph("just prose")]);
        assert_eq!(parse_events_section(&mut tokens), None);
    }

    #[test]
    fn test_titled_arguments_section() {
        let mut tokens = TokenStream::new(vec![
            heading(2, "Arguments: Extended options"),
            paragraph("Only honored on save."),
            Token::ListStart { ordered: false },
            Token::ListItemStart,
            text("`force` A {Boolean}"),
            Token::ListItemEnd,
            Token::ListEnd,
        ]);
        let titled = parse_titled_arguments_section(&mut tokens).expect("titled section");
        assert_eq!(titled.title, "Extended options");
        assert_eq!(titled.description, "Only honored on save.");
        assert_eq!(titled.arguments[0].name.as_deref(), Some("force"));
    }

    #[test]
    fn test_return_values_standalone_collapses_whitespace() {
        let mut tokens = TokenStream::new(vec![paragraph(
            "Public: Returns a {Boolean}   that is\n   true on success.",
        )]);
        let values = parse_return_values(&mut tokens, false).expect("return values");
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].ty.as_deref(), Some("Boolean"));
        assert_eq!(values[0].description, "Returns a {Boolean} that is true on success.");
    }

    #[test]
    fn test_return_values_split_on_repeated_keyword() {
        let mut tokens = TokenStream::new(vec![paragraph(
            "Returns a {Bool} on success. Returns `null` otherwise.",
        )]);
        let values = parse_return_values(&mut tokens, false).expect("return values");
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].ty.as_deref(), Some("Bool"));
        assert_eq!(values[0].description, "Returns a {Bool} on success.");
        assert_eq!(values[1].ty, None);
        assert_eq!(values[1].description, "Returns `null` otherwise.");
    }

    #[test]
    fn test_return_values_trailing_mode_absorbs_rest() {
        let mut tokens = TokenStream::new(vec![
            paragraph("Returns a {Bool}."),
            Token::Space,
            paragraph("More detail below the clause."),
        ]);
        let values = parse_return_values(&mut tokens, true).expect("return values");
        assert!(tokens.is_empty());
        assert_eq!(values.len(), 1);
        assert_eq!(
            values[0].description,
            "Returns a {Bool}.\n\nMore detail below the clause."
        );
    }

    #[test]
    fn test_collapse_whitespace_runs() {
        assert_eq!(collapse_whitespace_runs("a  b"), "a b");
        assert_eq!(collapse_whitespace_runs("a b"), "a b");
        assert_eq!(collapse_whitespace_runs("a\nb"), "a\nb");
        assert_eq!(collapse_whitespace_runs("a \n b"), "a b");
    }
}
