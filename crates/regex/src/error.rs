use std::fmt;

/// An error that can occur when compiling a regular expression for
/// use against a byte haystack.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that can occur.
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// The pattern failed to compile.
    Regex(String),
}

impl Error {
    pub(crate) fn regex<E: fmt::Display>(err: E) -> Error {
        Error { kind: ErrorKind::Regex(err.to_string()) }
    }

    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Regex(ref msg) => write!(f, "{}", msg),
        }
    }
}
