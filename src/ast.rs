//! The structured document model produced by [`parse`](crate::parse).
//!
//! All fields own their text: the parser normalizes and re-emits markdown
//! while building the model, so nothing can borrow from the input docstring.

/// Documented API exposure level, classified from the leading `Word:` keyword
/// of a docstring's summary paragraph.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

impl Visibility {
    /// Classifies a visibility keyword.
    ///
    /// `public`, `essential` and `extended` (case-insensitive, as substrings)
    /// mean [`Visibility::Public`]; `internal` means [`Visibility::Internal`];
    /// anything else is [`Visibility::Private`]. The public set wins over the
    /// internal one, so exactly one level is ever assigned.
    #[must_use]
    pub fn classify(keyword: &str) -> Self {
        let lower = keyword.to_ascii_lowercase();
        if lower.contains("public") || lower.contains("essential") || lower.contains("extended") {
            Self::Public
        } else if lower.contains("internal") {
            Self::Internal
        } else {
            Self::Private
        }
    }

    #[must_use]
    pub fn is_public(self) -> bool {
        self == Self::Public
    }

    #[must_use]
    pub fn is_internal(self) -> bool {
        self == Self::Internal
    }

    #[must_use]
    pub fn is_private(self) -> bool {
        !self.is_public() && !self.is_internal()
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Private
    }
}

/// One parsed docstring.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Doc {
    /// The verbatim input text.
    pub original_text: String,
    pub visibility: Visibility,
    /// First-paragraph sentence, visibility prefix stripped.
    pub summary: String,
    /// Reconstituted markdown. Starts with the summary paragraph and grows as
    /// stray tokens are absorbed.
    pub description: String,
    pub arguments: Option<Vec<Argument>>,
    pub titled_arguments: Option<Vec<TitledArguments>>,
    pub events: Option<Vec<Event>>,
    pub examples: Option<Vec<Example>>,
    /// Append-only: a docstring may state `Returns` more than once and every
    /// clause accumulates in encounter order.
    pub return_values: Option<Vec<ReturnValue>>,
}

impl Doc {
    #[must_use]
    pub fn new(original_text: &str) -> Self {
        Self {
            original_text: original_text.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.visibility.is_internal()
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility.is_private()
    }

    /// Appends return-value clauses to the accumulated list.
    pub fn append_return_values(&mut self, return_values: Vec<ReturnValue>) {
        match &mut self.return_values {
            Some(existing) => existing.extend(return_values),
            None => self.return_values = Some(return_values),
        }
    }
}

/// One documented parameter, possibly with nested sub-parameters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Argument {
    /// Parsed from a leading backtick-quoted token, when present.
    pub name: Option<String>,
    /// First `{Type}` bracket match within the description text.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: Option<String>,
    pub description: String,
    /// True iff an explicit `(optional)` marker followed the name.
    pub is_optional: bool,
    pub children: Vec<Argument>,
}

/// An `Arguments: <title>` section.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TitledArguments {
    pub title: String,
    pub description: String,
    pub arguments: Vec<Argument>,
}

/// One entry of an `Events` section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    pub name: String,
    pub summary: String,
    pub description: String,
    pub visibility: Visibility,
    pub arguments: Option<Vec<Argument>>,
}

/// One entry of an `Examples` section.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Example {
    pub description: String,
    /// Code-fence language tag, when one was given.
    pub lang: Option<String>,
    /// The fenced body, without the fence markers.
    pub code: String,
    /// The fenced block re-emitted exactly, fence markers included.
    pub raw: String,
}

/// One `Returns ...` clause.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReturnValue {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub ty: Option<String>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use core::fmt::Debug;
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    use super::*;

    fn assert_default<T: Default>() {}
    fn assert_clone<T: Clone>() {}
    fn assert_debug<T: Debug>() {}
    fn assert_sync_send<T: Sync + Send>() {}

    #[cfg(feature = "serde")]
    fn assert_serde<'de, T: Serialize + Deserialize<'de>>() {}

    #[test]
    fn test_doc_implements_common_traits() {
        assert_default::<Doc>();
        assert_clone::<Doc>();
        assert_debug::<Doc>();
        assert_sync_send::<Doc>();

        #[cfg(feature = "serde")]
        assert_serde::<Doc>()
    }

    #[test]
    fn test_classify_keyword_sets() {
        assert_eq!(Visibility::classify("Public"), Visibility::Public);
        assert_eq!(Visibility::classify("Essential"), Visibility::Public);
        assert_eq!(Visibility::classify("Extended"), Visibility::Public);
        assert_eq!(Visibility::classify("Internal"), Visibility::Internal);
        assert_eq!(Visibility::classify("Deprecated"), Visibility::Private);
        assert_eq!(Visibility::classify("Section"), Visibility::Private);
    }

    #[test]
    fn test_visibility_levels_are_mutually_exclusive() {
        for keyword in &["Public", "Internal", "Whatever", "essential", "publicinternal"] {
            let visibility = Visibility::classify(keyword);
            let levels = [
                visibility.is_public(),
                visibility.is_internal(),
                visibility.is_private(),
            ];
            assert_eq!(
                levels.iter().filter(|set| **set).count(),
                1,
                "keyword {:?} classified ambiguously",
                keyword
            );
        }
    }

    #[test]
    fn test_return_values_accumulate() {
        let mut doc = Doc::new("text");
        assert_eq!(doc.return_values, None);
        doc.append_return_values(vec![ReturnValue {
            ty: Some("Bool".to_owned()),
            description: "Returns a {Bool}".to_owned(),
        }]);
        doc.append_return_values(vec![ReturnValue {
            ty: None,
            description: "Returns undefined".to_owned(),
        }]);
        let accumulated = doc.return_values.unwrap();
        assert_eq!(accumulated.len(), 2);
        assert_eq!(accumulated[0].ty.as_deref(), Some("Bool"));
        assert_eq!(accumulated[1].ty, None);
    }
}
