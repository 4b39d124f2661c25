use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};

use grep_matcher::Matcher;

use crate::sink::{Sink, SinkContext, SinkContextKind, SinkFinish, SinkMatch};

/// The number of leading bytes inspected for a NUL byte before a file
/// is declared binary and skipped.
const BINARY_SNIFF_LEN: usize = 512;

/// The outcome of a single [`Searcher::search_reader`] call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchResult {
    binary: bool,
    match_count: u64,
}

impl SearchResult {
    /// Whether the input was declared binary (and thus not scanned).
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// The number of lines that matched.
    pub fn match_count(&self) -> u64 {
        self.match_count
    }
}

/// A line-oriented searcher: opens a reader, sniffs it for binary
/// content, and streams it line by line against a [`Matcher`],
/// maintaining before/after context and forwarding everything to a
/// [`Sink`].
#[derive(Clone, Debug)]
pub struct Searcher {
    line_terminator: u8,
    invert_match: bool,
    before_context: usize,
    after_context: usize,
    max_matches: Option<u64>,
}

impl Searcher {
    /// The line terminator byte used to split the haystack into
    /// lines.
    pub fn line_terminator(&self) -> u8 {
        self.line_terminator
    }

    /// Search `read`, reporting results to `sink`.
    ///
    /// Returns as soon as the input is found to be binary, `sink`
    /// asks to stop, or `max_matches_per_file` is reached.
    pub fn search_reader<M, R, S>(
        &self,
        matcher: M,
        read: R,
        sink: &mut S,
    ) -> Result<SearchResult, S::Error>
    where
        M: Matcher,
        R: Read,
        S: Sink,
    {
        let mut take = read.take(BINARY_SNIFF_LEN as u64);
        let mut sniff = Vec::with_capacity(BINARY_SNIFF_LEN);
        take.read_to_end(&mut sniff).map_err(to_sink_error::<S>)?;
        if sniff.contains(&0) {
            return Ok(SearchResult { binary: true, match_count: 0 });
        }

        let chained = io::Cursor::new(sniff).chain(take.into_inner());
        let mut rdr = BufReader::new(chained);

        if !sink.begin(self).map_err(identity_err::<S>)? {
            return Ok(SearchResult::default());
        }

        let mut buf = Vec::new();
        let mut line_number: u64 = 0;
        let mut absolute_offset: u64 = 0;
        let mut before_ring: VecDeque<(u64, Vec<u8>)> =
            VecDeque::with_capacity(self.before_context);
        let mut after_remaining: usize = 0;
        let mut last_emitted: Option<u64> = None;
        let mut match_count: u64 = 0;

        loop {
            buf.clear();
            let n = rdr.read_until(self.line_terminator, &mut buf).map_err(to_sink_error::<S>)?;
            if n == 0 {
                break;
            }
            line_number += 1;
            let line_start = absolute_offset;
            absolute_offset += n as u64;

            let mut line: &[u8] = &buf;
            if line.last() == Some(&self.line_terminator) {
                line = &line[..line.len() - 1];
            }

            let found = matcher.is_match(line).map_err(to_sink_error::<S>)?;
            let is_match = found != self.invert_match;

            if is_match {
                match_count += 1;

                while let Some((bline, btext)) = before_ring.pop_front() {
                    if last_emitted.map_or(false, |last| bline <= last) {
                        continue;
                    }
                    if let Some(last) = last_emitted {
                        if bline > last + 1 {
                            if !sink.context_break(self).map_err(identity_err::<S>)? {
                                return Ok(SearchResult { binary: false, match_count });
                            }
                        }
                    }
                    let ctx = SinkContext {
                        bytes: &btext,
                        kind: SinkContextKind::Before,
                        line_number: Some(bline),
                    };
                    if !sink.context(self, &ctx).map_err(identity_err::<S>)? {
                        return Ok(SearchResult { binary: false, match_count });
                    }
                    last_emitted = Some(bline);
                }

                if let Some(last) = last_emitted {
                    if line_number > last + 1 {
                        if !sink.context_break(self).map_err(identity_err::<S>)? {
                            return Ok(SearchResult { binary: false, match_count });
                        }
                    }
                }

                let mat = SinkMatch {
                    bytes: line,
                    absolute_byte_offset: line_start,
                    line_number: Some(line_number),
                };
                let keep_going = sink.matched(self, &mat).map_err(identity_err::<S>)?;
                last_emitted = Some(line_number);
                after_remaining = self.after_context;
                before_ring.clear();

                let at_limit = self.max_matches.map_or(false, |m| match_count >= m);
                if !keep_going || at_limit {
                    let finish = SinkFinish { byte_count: absolute_offset };
                    sink.finish(self, &finish).map_err(identity_err::<S>)?;
                    return Ok(SearchResult { binary: false, match_count });
                }
            } else if after_remaining > 0 {
                after_remaining -= 1;
                let ctx = SinkContext {
                    bytes: line,
                    kind: SinkContextKind::After,
                    line_number: Some(line_number),
                };
                if !sink.context(self, &ctx).map_err(identity_err::<S>)? {
                    let finish = SinkFinish { byte_count: absolute_offset };
                    sink.finish(self, &finish).map_err(identity_err::<S>)?;
                    return Ok(SearchResult { binary: false, match_count });
                }
                last_emitted = Some(line_number);
            } else if self.before_context > 0 {
                before_ring.push_back((line_number, line.to_vec()));
                if before_ring.len() > self.before_context {
                    before_ring.pop_front();
                }
            }
        }

        let finish = SinkFinish { byte_count: absolute_offset };
        sink.finish(self, &finish).map_err(identity_err::<S>)?;
        Ok(SearchResult { binary: false, match_count })
    }
}

fn identity_err<S: Sink>(err: S::Error) -> S::Error {
    err
}

fn to_sink_error<S: Sink>(err: io::Error) -> S::Error {
    S::Error::from(err)
}

/// Builds a [`Searcher`].
#[derive(Clone, Debug)]
pub struct SearcherBuilder {
    line_terminator: u8,
    invert_match: bool,
    before_context: usize,
    after_context: usize,
    max_matches: Option<u64>,
}

impl Default for SearcherBuilder {
    fn default() -> SearcherBuilder {
        SearcherBuilder {
            line_terminator: b'\n',
            invert_match: false,
            before_context: 0,
            after_context: 0,
            max_matches: None,
        }
    }
}

impl SearcherBuilder {
    /// Create a new builder with the default configuration: `\n`
    /// terminated lines, no context, no inversion, unlimited matches.
    pub fn new() -> SearcherBuilder {
        SearcherBuilder::default()
    }

    /// Set the number of lines of leading context to emit before each
    /// match.
    pub fn before_context(&mut self, lines: usize) -> &mut SearcherBuilder {
        self.before_context = lines;
        self
    }

    /// Set the number of lines of trailing context to emit after each
    /// match.
    pub fn after_context(&mut self, lines: usize) -> &mut SearcherBuilder {
        self.after_context = lines;
        self
    }

    /// Invert the sense of matching: lines that do NOT match the
    /// pattern are reported as matches.
    pub fn invert_match(&mut self, yes: bool) -> &mut SearcherBuilder {
        self.invert_match = yes;
        self
    }

    /// Stop searching a file after this many matching lines.
    pub fn max_matches(&mut self, limit: Option<u64>) -> &mut SearcherBuilder {
        self.max_matches = limit;
        self
    }

    /// Build the searcher.
    pub fn build(&self) -> Searcher {
        Searcher {
            line_terminator: self.line_terminator,
            invert_match: self.invert_match,
            before_context: self.before_context,
            after_context: self.after_context,
            max_matches: self.max_matches,
        }
    }
}
