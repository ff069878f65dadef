use std::fmt::{Display, Formatter, Result};

#[non_exhaustive]
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The docstring does not begin with a summary paragraph.
    MalformedDoc(String),
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::MalformedDoc(msg) => write!(f, "malformed docstring: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_error<T: std::error::Error>() {}

    #[test]
    fn test_implement_error() {
        assert_error::<Error>()
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Error::MalformedDoc("doc must start with a summary paragraph".to_owned()).to_string(),
            "malformed docstring: doc must start with a summary paragraph"
        );
    }
}
