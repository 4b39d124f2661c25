/*!
This crate provides an interface for regular expressions, with a focus on
line oriented search. The purpose of this crate is to provide an
abstraction over regular expression engines used by the line-scanning
and formatting components of a search tool, so that callers can plug in
their own regex implementation (for example, a literal substring scanner
for the fixed-string fast path) without the rest of the search pipeline
knowing the difference.

The [`Matcher`] trait is the primary interface of this crate. It permits
searching haystacks, extracting capture groups and determining whether
the matcher is anchored to the start of a haystack.
*/

#![deny(missing_docs)]

use std::fmt;

pub use crate::interpolate::interpolate;

mod interpolate;

/// A type alias for success/failure results where the error type is
/// fixed to [`NoError`]. Most implementations of [`Matcher`] built on top
/// of an infallible engine (like `regex`) use this alias for brevity.
pub type NoResult<T> = Result<T, NoError>;

/// An error type that can never occur.
///
/// This type is used as the associated error type for matcher
/// implementations that can never fail, such as ones based on the
/// `regex` crate. It is analogous to the standard library's `!` (never)
/// type, but usable in stable Rust.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NoError(());

impl fmt::Display for NoError {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unreachable!("BUG: NoError must never occur")
    }
}

impl std::error::Error for NoError {}

/// A representation of a span of contiguous bytes in a haystack.
///
/// A `Match` always has its start position be less than or equal to its
/// end position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Match {
    start: usize,
    end: usize,
}

impl Match {
    /// Create a new match.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Match {
        assert!(start <= end, "invalid match: start ({}) > end ({})", start, end);
        Match { start, end }
    }

    /// Create a new match that is entirely empty and begins at the given
    /// position.
    pub fn zero(start: usize) -> Match {
        Match { start, end: start }
    }

    /// Return the start offset of this match.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Return the end offset of this match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Return a new match with `offset` added to both the start and end
    /// positions of this match.
    pub fn offset(&self, offset: usize) -> Match {
        Match { start: self.start + offset, end: self.end + offset }
    }

    /// Return a new match with the start position replaced.
    ///
    /// # Panics
    ///
    /// Panics if `start > self.end()`.
    pub fn with_start(&self, start: usize) -> Match {
        Match::new(start, self.end)
    }

    /// Return a new match with the end position replaced.
    ///
    /// # Panics
    ///
    /// Panics if `self.start() > end`.
    pub fn with_end(&self, end: usize) -> Match {
        Match::new(self.start, end)
    }

    /// Returns true if and only if this match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the number of bytes in this match.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns this match as a range.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<std::ops::Range<usize>> for Match {
    fn from(range: std::ops::Range<usize>) -> Match {
        Match::new(range.start, range.end)
    }
}

/// The end-of-line terminator a matcher or searcher recognizes.
///
/// The default terminator is `\n`. A matcher may also be configured to
/// recognize `\r\n`, in which case implementations are responsible for
/// stripping the trailing `\r` from a match that extends to the end of
/// the line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineTerminator(LineTerminatorImp);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum LineTerminatorImp {
    Byte(u8),
    CRLF,
}

impl LineTerminator {
    /// Return a new line terminator that is a single byte.
    pub fn byte(byte: u8) -> LineTerminator {
        LineTerminator(LineTerminatorImp::Byte(byte))
    }

    /// Return a new line terminator that is `\r\n`, i.e. `\n` preceded by a
    /// `\r`. Callers generally treat the presence of `\r` as optional when
    /// locating the terminator, but will strip it from matches when found.
    pub fn crlf() -> LineTerminator {
        LineTerminator(LineTerminatorImp::CRLF)
    }

    /// Returns true if this terminator is CRLF.
    pub fn is_crlf(&self) -> bool {
        matches!(self.0, LineTerminatorImp::CRLF)
    }

    /// The byte that is guaranteed to terminate a line, i.e. `\n` in
    /// both the byte and CRLF cases.
    pub fn as_byte(&self) -> u8 {
        match self.0 {
            LineTerminatorImp::Byte(b) => b,
            LineTerminatorImp::CRLF => b'\n',
        }
    }

    /// Returns the full terminator as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self.0 {
            LineTerminatorImp::Byte(ref b) => std::slice::from_ref(b),
            LineTerminatorImp::CRLF => b"\r\n",
        }
    }

    /// Returns true if and only if the given slice ends with this
    /// terminator.
    #[inline]
    pub fn is_suffix(&self, bytes: &[u8]) -> bool {
        bytes.last().map_or(false, |&b| b == self.as_byte())
    }
}

impl Default for LineTerminator {
    fn default() -> LineTerminator {
        LineTerminator::byte(b'\n')
    }
}

/// A trait that describes implementations of regular expression captures.
///
/// Capture positions for a match are indexed into by the capture group
/// index; index `0` always corresponds to the overall match.
pub trait Captures {
    /// Return the total number of capture groups, including the capture
    /// group for the overall match.
    fn len(&self) -> usize;

    /// Return the match for the capture group at the given index, if one
    /// exists.
    fn get(&self, i: usize) -> Option<Match>;

    /// Returns true if and only if there are no capture groups.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A trait for describing regular-expression-like syntax and semantics
/// required by line-oriented search.
///
/// Implementations of this trait permit the rest of the pipeline (the
/// line scanner and the fixed-string/literal fast path) to stay agnostic
/// over the concrete regular expression engine being used.
pub trait Matcher {
    /// The concrete type of captures used by this matcher.
    type Captures: Captures;

    /// The error type that may be returned by this matcher's methods.
    type Error: fmt::Display;

    /// Returns the start and end byte range of the leftmost-first match
    /// in `haystack` at or after `at`, or `None` if no such match
    /// exists.
    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, Self::Error>;

    /// Returns the leftmost-first match in the given haystack, or `None`
    /// if no such match exists.
    fn find(&self, haystack: &[u8]) -> Result<Option<Match>, Self::Error> {
        self.find_at(haystack, 0)
    }

    /// Returns a fresh value able to store capture group offsets.
    fn new_captures(&self) -> Result<Self::Captures, Self::Error>;

    /// Returns the total number of capture groups in this matcher,
    /// including the group corresponding to the overall match.
    fn capture_count(&self) -> usize {
        0
    }

    /// Returns the capture group index corresponding to the named group
    /// given, if one exists.
    fn capture_index(&self, _name: &str) -> Option<usize> {
        None
    }

    /// Populates `caps` with the leftmost-first match starting at or
    /// after `at`, returning whether a match was found.
    fn captures_at(
        &self,
        haystack: &[u8],
        at: usize,
        caps: &mut Self::Captures,
    ) -> Result<bool, Self::Error>;

    /// The implementation-specific line terminator required by this
    /// matcher, if one is required.
    ///
    /// A matcher that returns `Some` is asserting that haystacks passed
    /// to it must not contain this terminator anywhere except possibly
    /// at the very end. Callers that feed line-by-line haystacks can
    /// ignore this, but multi-line-aware callers must split the
    /// haystack on this terminator themselves.
    fn line_terminator(&self) -> Option<LineTerminator> {
        None
    }

    /// If this matcher is always anchored to the start of a haystack,
    /// then this returns true.
    fn is_match(&self, haystack: &[u8]) -> Result<bool, Self::Error> {
        self.find(haystack).map(|m| m.is_some())
    }
}

impl<'a, M: Matcher> Matcher for &'a M {
    type Captures = M::Captures;
    type Error = M::Error;

    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, Self::Error> {
        (*self).find_at(haystack, at)
    }

    fn new_captures(&self) -> Result<Self::Captures, Self::Error> {
        (*self).new_captures()
    }

    fn capture_count(&self) -> usize {
        (*self).capture_count()
    }

    fn capture_index(&self, name: &str) -> Option<usize> {
        (*self).capture_index(name)
    }

    fn captures_at(
        &self,
        haystack: &[u8],
        at: usize,
        caps: &mut Self::Captures,
    ) -> Result<bool, Self::Error> {
        (*self).captures_at(haystack, at, caps)
    }

    fn line_terminator(&self) -> Option<LineTerminator> {
        (*self).line_terminator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_basics() {
        let m = Match::new(2, 5);
        assert_eq!(m.start(), 2);
        assert_eq!(m.end(), 5);
        assert_eq!(m.len(), 3);
        assert!(!m.is_empty());
        assert_eq!(m.offset(10), Match::new(12, 15));
    }

    #[test]
    #[should_panic]
    fn match_invalid() {
        Match::new(5, 2);
    }

    #[test]
    fn line_terminator_crlf() {
        let lt = LineTerminator::crlf();
        assert!(lt.is_crlf());
        assert_eq!(lt.as_byte(), b'\n');
        assert!(lt.is_suffix(b"foo\n"));
        assert!(!lt.is_suffix(b"foo\r"));
    }
}
