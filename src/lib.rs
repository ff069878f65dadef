//! # mddoc
//!
//! Parser for markdown-flavored docstrings following the informal
//! summary-line convention: a leading `Visibility:` summary paragraph, an
//! optional free-form description, and optional `Arguments`,
//! `Arguments: <title>`, `Events` and `Examples` sections plus `Returns`
//! clauses. The result is a structured [`ast::Doc`] ready for downstream
//! rendering (HTML/JSON docs).
//!
//! ## Example
//!
//! ```rust
//! use mddoc::parse;
//!
//! let doc = parse("Public: Do the thing.\n\nReturns a {Boolean} indicating success.").unwrap();
//!
//! assert!(doc.is_public());
//! assert_eq!(doc.summary, "Do the thing.");
//! assert_eq!(doc.arguments, None);
//!
//! let returns = doc.return_values.as_ref().unwrap();
//! assert_eq!(returns[0].ty.as_deref(), Some("Boolean"));
//! ```
//!
//! ## Design goals
//!
//! - Sections are recognized by the same heuristics established authoring
//!   conventions rely on (heading text and depth, "does this list's first
//!   item look like an argument?"), so existing docstrings parse unchanged.
//! - Irregular input degrades gracefully: stray content folds into the
//!   description instead of failing the parse.

#![doc(html_root_url = "https://docs.rs/mddoc/0.1.0")]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

pub mod ast;
pub mod error;
pub mod token;
pub mod tokenizer;

mod emit;
mod parsers;
mod sections;

use ast::Doc;
use error::Error;
use token::Token;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

/// Parses one docstring into a [`Doc`].
///
/// # Examples
///
/// ```
/// use mddoc::parse;
///
/// let source = "Do a thing.\n\n## Arguments\n\n* `options` A {Object} with the following keys:\n  * `verbose` (optional) A {Boolean}.\n";
/// let doc = parse(source).unwrap();
///
/// let arguments = doc.arguments.as_ref().unwrap();
/// assert_eq!(arguments[0].name.as_deref(), Some("options"));
/// assert_eq!(arguments[0].ty.as_deref(), Some("Object"));
/// assert_eq!(arguments[0].children[0].name.as_deref(), Some("verbose"));
/// assert!(arguments[0].children[0].is_optional);
/// ```
///
/// # Errors
///
/// Fails with [`Error::MalformedDoc`] when the docstring does not begin with
/// a summary paragraph. Every other irregularity degrades gracefully: tokens
/// no section recognizer claims are folded into the description.
pub fn parse(doc_string: &str) -> Result<Doc, Error> {
    let mut tokens = tokenizer::tokenize(doc_string);
    match tokens.peek() {
        Some(Token::Paragraph { .. }) => {}
        _ => {
            return Err(Error::MalformedDoc(
                "doc must start with a summary paragraph".to_owned(),
            ))
        }
    }

    let mut doc = Doc::new(doc_string);
    sections::parse_into(&mut doc, &mut tokens);
    Ok(doc)
}
