/*!
The Line Scanner: opens a file, sniffs it for binary content, streams
it line by line against a matcher, and reports matches and context
lines to a [`Sink`].
*/

#![deny(missing_docs)]

mod searcher;
mod sink;

pub use crate::searcher::{SearchResult, Searcher, SearcherBuilder};
pub use crate::sink::{Sink, SinkContext, SinkContextKind, SinkFinish, SinkMatch};

#[cfg(test)]
mod tests {
    use super::*;
    use grep_matcher::Matcher;
    use std::cell::RefCell;
    use std::fmt;
    use std::io;

    struct NoCaptures;

    impl grep_matcher::Captures for NoCaptures {
        fn len(&self) -> usize {
            0
        }
        fn get(&self, _i: usize) -> Option<grep_matcher::Match> {
            None
        }
    }

    struct FakeMatcher(&'static str);

    impl Matcher for FakeMatcher {
        type Captures = NoCaptures;
        type Error = grep_matcher::NoError;

        fn find_at(
            &self,
            haystack: &[u8],
            at: usize,
        ) -> Result<Option<grep_matcher::Match>, grep_matcher::NoError> {
            let hay = &haystack[at.min(haystack.len())..];
            let needle = self.0.as_bytes();
            if let Some(pos) = hay.windows(needle.len()).position(|w| w == needle) {
                let start = at + pos;
                Ok(Some(grep_matcher::Match::new(start, start + needle.len())))
            } else {
                Ok(None)
            }
        }

        fn new_captures(&self) -> Result<NoCaptures, grep_matcher::NoError> {
            Ok(NoCaptures)
        }

        fn captures_at(
            &self,
            _haystack: &[u8],
            _at: usize,
            _caps: &mut NoCaptures,
        ) -> Result<bool, grep_matcher::NoError> {
            unimplemented!("not exercised by these tests")
        }
    }

    #[derive(Debug)]
    struct TestSinkError(String);

    impl fmt::Display for TestSinkError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl From<io::Error> for TestSinkError {
        fn from(err: io::Error) -> TestSinkError {
            TestSinkError(err.to_string())
        }
    }

    struct RecordingSink {
        lines: RefCell<Vec<String>>,
    }

    impl Sink for RecordingSink {
        type Error = TestSinkError;

        fn matched(
            &mut self,
            _searcher: &Searcher,
            mat: &SinkMatch<'_>,
        ) -> Result<bool, TestSinkError> {
            self.lines.borrow_mut().push(format!(
                "{}:{}",
                mat.line_number().unwrap(),
                String::from_utf8_lossy(mat.bytes())
            ));
            Ok(true)
        }

        fn context(
            &mut self,
            _searcher: &Searcher,
            ctx: &SinkContext<'_>,
        ) -> Result<bool, TestSinkError> {
            self.lines.borrow_mut().push(format!(
                "{}-{}",
                ctx.line_number().unwrap(),
                String::from_utf8_lossy(ctx.bytes())
            ));
            Ok(true)
        }

        fn context_break(&mut self, _searcher: &Searcher) -> Result<bool, TestSinkError> {
            self.lines.borrow_mut().push("--".to_string());
            Ok(true)
        }
    }

    #[test]
    fn binary_file_is_skipped() {
        let searcher = SearcherBuilder::new().build();
        let mut sink = RecordingSink { lines: RefCell::new(vec![]) };
        let mut data = vec![b'a'; 10];
        data.push(0);
        data.extend_from_slice(b"bcd\n");
        let result = searcher
            .search_reader(FakeMatcher("x"), &data[..], &mut sink)
            .unwrap();
        assert!(result.is_binary());
        assert!(sink.lines.borrow().is_empty());
    }

    #[test]
    fn context_with_separator() {
        let searcher =
            SearcherBuilder::new().before_context(1).after_context(1).build();
        let mut sink = RecordingSink { lines: RefCell::new(vec![]) };
        let text = "L1\nL2\nM\nL4\nL5\nL6\nM\nL9\nL10\n"
            .replace("M", "has-M-here");
        let result =
            searcher.search_reader(FakeMatcher("has-M-here"), text.as_bytes(), &mut sink)
                .unwrap();
        assert_eq!(result.match_count(), 2);
        let lines = sink.lines.borrow();
        assert!(lines.contains(&"--".to_string()));
    }

    #[test]
    fn invert_match_reports_non_matching_lines() {
        let searcher = SearcherBuilder::new().invert_match(true).build();
        let mut sink = RecordingSink { lines: RefCell::new(vec![]) };
        let result = searcher
            .search_reader(FakeMatcher("zzz"), b"a\nb\n".as_ref(), &mut sink)
            .unwrap();
        assert_eq!(result.match_count(), 2);
    }

    #[test]
    fn max_matches_stops_early() {
        let searcher = SearcherBuilder::new().max_matches(Some(1)).build();
        let mut sink = RecordingSink { lines: RefCell::new(vec![]) };
        let result = searcher
            .search_reader(FakeMatcher("hit"), b"hit\nhit\nhit\n".as_ref(), &mut sink)
            .unwrap();
        assert_eq!(result.match_count(), 1);
    }
}
