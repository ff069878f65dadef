//! Block-level tokens and the front-consuming cursor the grammar engine runs
//! over.
//!
//! The parser only ever inspects the front of the stream and removes from the
//! front; lookahead decisions (like "is this list an argument list?") use the
//! read-only [`TokenStream::iter`] scan and commit by popping afterwards.

use std::collections::VecDeque;

/// One block-level markdown token.
///
/// Loose and tight list-item markers are distinct kinds because tokenizers
/// distinguish them, but every consumer in this crate treats them identically.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Paragraph { text: String },
    /// Paragraph-like text inside a list item.
    Text { text: String },
    Heading { depth: usize, text: String },
    ListStart { ordered: bool },
    ListItemStart,
    LooseItemStart,
    ListItemEnd,
    LooseItemEnd,
    ListEnd,
    Code { lang: Option<String>, text: String },
    BlockquoteStart,
    BlockquoteEnd,
    /// A run of blank lines.
    Space,
}

impl Token {
    /// The textual payload of paragraph-like tokens.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Paragraph { text } | Self::Text { text } => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_paragraph_like(&self) -> bool {
        matches!(self, Self::Paragraph { .. } | Self::Text { .. })
    }

    #[must_use]
    pub fn opens_list_item(&self) -> bool {
        matches!(self, Self::ListItemStart | Self::LooseItemStart)
    }

    #[must_use]
    pub fn closes_list_item(&self) -> bool {
        matches!(self, Self::ListItemEnd | Self::LooseItemEnd)
    }
}

/// A destructible cursor over an ordered token sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }

    /// The next token, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Consumes and returns the next token.
    pub fn pop(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Read-only scan over the remaining tokens, front first.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}
