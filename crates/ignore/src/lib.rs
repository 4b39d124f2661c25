/*!
The `ignore` crate implements this system's Ignore Engine and Walker.

It provides:

* [`gitignore::Gitignore`], an Ignore Set: the compiled patterns from a
  single ignore file plus its base directory.
* [`dir::Ignore`], an Ignore Stack: the layered collection of Ignore Sets
  (built-in defaults, the global user ignore file, `.git/info/exclude`
  and every `.gitignore`/`.ignore` from the repository root down to the
  search directory) consulted while walking.
* [`WalkBuilder`]/[`Walk`], the recursive directory Walker that consults
  the Ignore Stack, applies the hidden-file and symlink policy, and
  filters by file type ([`types`]) and glob ([`overrides`]).
*/

#![deny(missing_docs)]

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub mod dir;
pub mod gitignore;
pub mod overrides;
mod pathutil;
pub mod types;
pub mod walk;

pub use crate::walk::{DirEntry, Walk, WalkBuilder, WalkState};

/// Represents a match against a set of globs or patterns.
///
/// The type parameter `T` typically refers to a type that provides more
/// information about the match, such as which specific pattern matched.
#[derive(Clone, Debug)]
pub enum Match<T> {
    /// No match was found; the verdict defers to whatever layer is
    /// evaluated next.
    None,
    /// The path is ignored by the pattern carried here.
    Ignore(T),
    /// The path was re-admitted by a negation pattern after a previous
    /// layer (or an earlier pattern in the same layer) ignored it.
    Include(T),
}

impl<T> Match<T> {
    /// Returns true if and only if this is a `None` match.
    pub fn is_none(&self) -> bool {
        matches!(*self, Match::None)
    }

    /// Returns true if and only if this is an `Ignore` match.
    pub fn is_ignore(&self) -> bool {
        matches!(*self, Match::Ignore(_))
    }

    /// Returns true if and only if this is an `Include` match.
    pub fn is_include(&self) -> bool {
        matches!(*self, Match::Include(_))
    }

    /// Applies the given function to the inner match value, if any.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Match<U> {
        match self {
            Match::None => Match::None,
            Match::Ignore(t) => Match::Ignore(f(t)),
            Match::Include(t) => Match::Include(f(t)),
        }
    }

    /// Returns a `Match` that borrows the inner value of this one.
    pub fn as_ref(&self) -> Match<&T> {
        match *self {
            Match::None => Match::None,
            Match::Ignore(ref t) => Match::Ignore(t),
            Match::Include(ref t) => Match::Include(t),
        }
    }

    /// Folds a newer (later-evaluated) verdict into this one.
    ///
    /// If `newer` is `None`, `self` (the accumulator so far) is kept.
    /// Otherwise `newer` replaces it. This is exactly the fold the
    /// Ignore Stack uses to accumulate a verdict across layers, from
    /// earliest to highest priority: later layers override earlier
    /// ones, but only when they actually match something.
    pub fn then(self, newer: Match<T>) -> Match<T> {
        match newer {
            Match::None => self,
            m => m,
        }
    }
}

/// The final three-valued verdict produced by evaluating a path against
/// an Ignore Set or Ignore Stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchResult {
    /// No pattern matched.
    NoMatch,
    /// The path should be ignored.
    Ignore,
    /// The path was explicitly re-included by a negation pattern.
    Include,
}

impl<T> From<Match<T>> for MatchResult {
    fn from(m: Match<T>) -> MatchResult {
        match m {
            Match::None => MatchResult::NoMatch,
            Match::Ignore(_) => MatchResult::Ignore,
            Match::Include(_) => MatchResult::Include,
        }
    }
}

impl MatchResult {
    /// Returns true if and only if this verdict excludes the path.
    pub fn is_ignore(&self) -> bool {
        matches!(*self, MatchResult::Ignore)
    }
}

/// An error that can occur when parsing ignore files, walking a
/// directory tree, or compiling glob patterns.
#[derive(Debug)]
pub enum Error {
    /// An error associated with a specific path, decorated with the
    /// path and, for ignore-file errors, the line number.
    WithPath { path: PathBuf, err: Box<Error> },
    /// An error associated with a specific line number, decorated
    /// without a path (used when the path is already known from an
    /// enclosing `WithPath`).
    WithLineNumber { line: u64, err: Box<Error> },
    /// An error that occurred while walking, associated with the depth
    /// at which it occurred.
    WithDepth { depth: usize, err: Box<Error> },
    /// An error that occurred because a file loop was detected when
    /// following symbolic links.
    Loop { ancestor: PathBuf, child: PathBuf },
    /// An I/O error.
    Io(io::Error),
    /// An error that occurred while compiling a glob.
    Glob { glob: Option<String>, err: String },
    /// The current working directory could not be determined.
    UnrecognizedFileType(String),
    /// A collection of non-fatal "partial" errors accumulated while
    /// reading a single ignore file; parsing continued despite them.
    Partial(Vec<Error>),
}

impl Error {
    /// Attach the given path to this error.
    pub fn with_path<P: AsRef<Path>>(self, path: P) -> Error {
        Error::WithPath {
            path: path.as_ref().to_path_buf(),
            err: Box::new(self),
        }
    }

    /// Attach the given line number to this error.
    pub fn tagged<P: AsRef<Path>>(self, path: P, line: u64) -> Error {
        let err = Error::WithLineNumber { line, err: Box::new(self) };
        err.with_path(path)
    }

    /// Attach the given depth to this error.
    pub fn with_depth(self, depth: usize) -> Error {
        Error::WithDepth { depth, err: Box::new(self) }
    }

    /// Returns true if this error is known to be "partial", i.e. it
    /// represents only some of the errors that occurred (and parsing or
    /// walking continued regardless).
    pub fn is_partial(&self) -> bool {
        match *self {
            Error::Partial(_) => true,
            Error::WithLineNumber { ref err, .. } => err.is_partial(),
            Error::WithPath { ref err, .. } => err.is_partial(),
            Error::WithDepth { ref err, .. } => err.is_partial(),
            _ => false,
        }
    }

    /// Returns the path associated with this error, if one exists.
    pub fn path(&self) -> Option<&Path> {
        match *self {
            Error::WithPath { ref path, .. } => Some(path),
            Error::WithLineNumber { ref err, .. } => err.path(),
            Error::WithDepth { ref err, .. } => err.path(),
            _ => None,
        }
    }

    /// Returns the depth at which this error occurred, if known.
    pub fn depth(&self) -> Option<usize> {
        match *self {
            Error::WithDepth { depth, .. } => Some(depth),
            Error::WithPath { ref err, .. } => err.depth(),
            _ => None,
        }
    }

    /// Returns the underlying I/O error, if this error was caused by
    /// one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::WithPath { ref err, .. } => err.io_error(),
            Error::WithLineNumber { ref err, .. } => err.io_error(),
            Error::WithDepth { ref err, .. } => err.io_error(),
            _ => None,
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Partial(ref errs) => {
                for (i, err) in errs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            Error::WithLineNumber { line, ref err } => {
                write!(f, "line {}: {}", line, err)
            }
            Error::WithPath { ref path, ref err } => {
                write!(f, "{}: {}", path.display(), err)
            }
            Error::WithDepth { ref err, .. } => err.fmt(f),
            Error::Loop { ref ancestor, ref child } => write!(
                f,
                "file system loop found: {} points to an ancestor {}",
                child.display(),
                ancestor.display()
            ),
            Error::Io(ref err) => err.fmt(f),
            Error::Glob { glob: None, ref err } => write!(f, "{}", err),
            Error::Glob { glob: Some(ref glob), ref err } => {
                write!(f, "error parsing glob '{}': {}", glob, err)
            }
            Error::UnrecognizedFileType(ref ty) => {
                write!(f, "unrecognized file type: {}", ty)
            }
        }
    }
}

/// A helper for accumulating zero or more non-fatal errors that occur
/// while parsing a single ignore file, matching ripgrep's behavior of
/// admitting an ignore file with its remaining valid patterns even when
/// some lines fail to parse.
#[derive(Debug, Default)]
pub struct PartialErrorBuilder {
    errs: Vec<Error>,
}

impl PartialErrorBuilder {
    /// Push an error onto this builder.
    pub fn push(&mut self, err: Error) {
        self.errs.push(err);
    }

    /// Push an I/O error onto this builder, unless it's a "file not
    /// found" error, which is treated as not worth reporting (an
    /// optional ignore file simply being absent is not an error).
    pub fn maybe_push_ignore_io(&mut self, err: Option<Error>) {
        if let Some(err) = err {
            if !is_not_found(&err) {
                self.push(err);
            }
        }
    }

    /// Convert this builder into a single `Error`, or `None` if no
    /// errors were pushed.
    pub fn into_error_option(mut self) -> Option<Error> {
        if self.errs.is_empty() {
            None
        } else if self.errs.len() == 1 {
            Some(self.errs.pop().unwrap())
        } else {
            Some(Error::Partial(self.errs))
        }
    }
}

fn is_not_found(err: &Error) -> bool {
    err.io_error().map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_fold_last_wins() {
        let m: Match<u8> = Match::None;
        let m = m.then(Match::Ignore(1));
        assert!(m.is_ignore());
        let m = m.then(Match::Include(2));
        assert!(m.is_include());
        // A later layer that doesn't match keeps the prior verdict.
        let m = m.then(Match::None);
        assert!(m.is_include());
    }

    #[test]
    fn match_result_conversion() {
        assert_eq!(MatchResult::from(Match::<u8>::None), MatchResult::NoMatch);
        assert_eq!(MatchResult::from(Match::Ignore(1u8)), MatchResult::Ignore);
        assert_eq!(MatchResult::from(Match::Include(1u8)), MatchResult::Include);
    }
}
