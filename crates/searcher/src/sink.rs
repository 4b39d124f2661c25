use std::fmt;
use std::io;

use crate::searcher::Searcher;

/// The consumer of a [`Searcher`]'s output.
///
/// All methods have a default no-op implementation except
/// [`Sink::matched`], since every search produces at least match
/// events. Every method's return value follows the same convention:
/// `Ok(true)` to keep searching, `Ok(false)` to stop early (used for
/// `max_matches_per_file` and cancellation), or `Err` to abort with a
/// sink-level error (such as a writer failure).
pub trait Sink {
    /// The error type produced by this sink, typically wrapping I/O
    /// errors from the output writer.
    type Error: From<io::Error> + fmt::Display;

    /// Called once, before the first line is scanned.
    fn begin(&mut self, _searcher: &Searcher) -> Result<bool, Self::Error> {
        Ok(true)
    }

    /// Called for every line that matches (after inversion, if any).
    fn matched(
        &mut self,
        searcher: &Searcher,
        mat: &SinkMatch<'_>,
    ) -> Result<bool, Self::Error>;

    /// Called for every before/after context line.
    fn context(
        &mut self,
        _searcher: &Searcher,
        _context: &SinkContext<'_>,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }

    /// Called when a gap between context groups is detected, so the
    /// sink can emit a separator.
    fn context_break(&mut self, _searcher: &Searcher) -> Result<bool, Self::Error> {
        Ok(true)
    }

    /// Called once the file has been fully scanned, or the search
    /// stopped early.
    fn finish(
        &mut self,
        _searcher: &Searcher,
        _finish: &SinkFinish,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A matching line passed to [`Sink::matched`].
#[derive(Debug)]
pub struct SinkMatch<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) absolute_byte_offset: u64,
    pub(crate) line_number: Option<u64>,
}

impl<'a> SinkMatch<'a> {
    /// The bytes of the matching line, with the line terminator
    /// stripped.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The byte offset of the start of this line relative to the start
    /// of the file being searched.
    pub fn absolute_byte_offset(&self) -> u64 {
        self.absolute_byte_offset
    }

    /// The 1-based line number of this match, if line numbers are
    /// being tracked.
    pub fn line_number(&self) -> Option<u64> {
        self.line_number
    }
}

/// Whether a context line precedes or follows a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SinkContextKind {
    /// A line that precedes a match.
    Before,
    /// A line that follows a match.
    After,
}

/// A context line passed to [`Sink::context`].
#[derive(Debug)]
pub struct SinkContext<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) kind: SinkContextKind,
    pub(crate) line_number: Option<u64>,
}

impl<'a> SinkContext<'a> {
    /// The bytes of the context line, with the line terminator
    /// stripped.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Whether this line is before or after the match it's attached to.
    pub fn kind(&self) -> SinkContextKind {
        self.kind
    }

    /// The 1-based line number of this context line, if tracked.
    pub fn line_number(&self) -> Option<u64> {
        self.line_number
    }
}

/// Summary information passed to [`Sink::finish`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SinkFinish {
    pub(crate) byte_count: u64,
}

impl SinkFinish {
    /// The total number of bytes scanned.
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }
}
