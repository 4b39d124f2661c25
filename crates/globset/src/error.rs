use std::fmt;

/// Represents an error that can occur when parsing a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// The original glob provided by the caller.
    glob: Option<String>,
    /// The kind of error that occurred.
    kind: ErrorKind,
}

/// The kind of error that can occur when parsing a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// A character class (e.g. `[abc]`) was not closed, and the builder
    /// used to compile the glob was not configured to tolerate this.
    UnclosedClass,
    /// An empty character class, e.g. `[]`, was used.
    EmptyClass,
    /// The glob compiled to an invalid regular expression.
    Regex(String),
}

impl Error {
    pub(crate) fn new(glob: &str, kind: ErrorKind) -> Error {
        Error { glob: Some(glob.to_string()), kind }
    }

    /// Return the glob that caused this error, if one is known.
    pub fn glob(&self) -> Option<&str> {
        self.glob.as_deref()
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::UnclosedClass => write!(
                f,
                "unclosed character class in glob '{}'",
                self.glob.as_deref().unwrap_or(""),
            ),
            ErrorKind::EmptyClass => write!(
                f,
                "empty character class in glob '{}'",
                self.glob.as_deref().unwrap_or(""),
            ),
            ErrorKind::Regex(ref msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorKind::UnclosedClass => write!(f, "unclosed character class"),
            ErrorKind::EmptyClass => write!(f, "empty character class"),
            ErrorKind::Regex(ref msg) => write!(f, "{}", msg),
        }
    }
}
