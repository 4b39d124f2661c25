use std::collections::HashMap;

use grep_matcher::{Captures, Match, Matcher};
use regex::bytes::{CaptureLocations, Regex, RegexBuilder};

use crate::config::Config;
use crate::error::Error;

/// A `Matcher` implementation backed by Rust's `regex` crate, matching
/// against byte haystacks so that lines that aren't valid UTF-8 can
/// still be searched.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
    regex: Regex,
    pattern: String,
    names: HashMap<String, usize>,
}

impl RegexMatcher {
    /// Compile `pattern` with the default configuration.
    pub fn new(pattern: &str) -> Result<RegexMatcher, Error> {
        RegexMatcherBuilder::new().build(pattern)
    }

    /// The original (post-resolution) pattern text this matcher was
    /// built from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Matcher for RegexMatcher {
    type Captures = RegexCaptures;
    type Error = Error;

    fn find_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Result<Option<Match>, Error> {
        Ok(self
            .regex
            .find_at(haystack, at)
            .map(|m| Match::new(m.start(), m.end())))
    }

    fn new_captures(&self) -> Result<RegexCaptures, Error> {
        Ok(RegexCaptures { locs: self.regex.capture_locations() })
    }

    fn capture_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }

    fn capture_index(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    fn captures_at(
        &self,
        haystack: &[u8],
        at: usize,
        caps: &mut RegexCaptures,
    ) -> Result<bool, Error> {
        Ok(self
            .regex
            .captures_read_at(&mut caps.locs, haystack, at)
            .is_some())
    }
}

/// Captured subgroup positions for one match of a [`RegexMatcher`].
#[derive(Clone, Debug)]
pub struct RegexCaptures {
    locs: CaptureLocations,
}

impl Captures for RegexCaptures {
    fn len(&self) -> usize {
        self.locs.len()
    }

    fn get(&self, i: usize) -> Option<Match> {
        self.locs.get(i).map(|(s, e)| Match::new(s, e))
    }
}

/// Builds a [`RegexMatcher`] from a pattern and search options.
#[derive(Clone, Debug, Default)]
pub struct RegexMatcherBuilder {
    config: Config,
}

impl RegexMatcherBuilder {
    /// Create a new builder with every option disabled.
    pub fn new() -> RegexMatcherBuilder {
        RegexMatcherBuilder::default()
    }

    /// Force case-insensitive matching.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.config.case_insensitive = yes;
        self
    }

    /// Case-insensitive only when the pattern is entirely lowercase.
    pub fn case_smart(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.config.case_smart = yes;
        self
    }

    /// Wrap the pattern in word-boundary assertions.
    pub fn whole_word(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.config.whole_word = yes;
        self
    }

    /// Treat the pattern as a literal string rather than a regex.
    pub fn fixed_strings(&mut self, yes: bool) -> &mut RegexMatcherBuilder {
        self.config.fixed_strings = yes;
        self
    }

    /// Compile `pattern` into a [`RegexMatcher`].
    pub fn build(&self, pattern: &str) -> Result<RegexMatcher, Error> {
        let (text, case_insensitive) = self.config.build_pattern(pattern);
        self.config.validate(&text)?;

        let regex = RegexBuilder::new(&text)
            .case_insensitive(case_insensitive)
            .multi_line(false)
            .dot_matches_new_line(false)
            .build()
            .map_err(Error::regex)?;

        let mut names = HashMap::new();
        for (i, name) in regex.capture_names().enumerate() {
            if let Some(name) = name {
                names.insert(name.to_string(), i.saturating_sub(1));
            }
        }

        Ok(RegexMatcher { regex, pattern: text, names })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_matcher::Matcher;

    #[test]
    fn basic_find() {
        let m = RegexMatcher::new(r"\d+").unwrap();
        let got = m.find(b"abc123def").unwrap().unwrap();
        assert_eq!((got.start(), got.end()), (3, 6));
    }

    #[test]
    fn case_insensitive_match() {
        let m = RegexMatcherBuilder::new()
            .case_insensitive(true)
            .build("hello")
            .unwrap();
        assert!(m.is_match(b"HELLO").unwrap());
    }

    #[test]
    fn smart_case_respects_uppercase() {
        let m = RegexMatcherBuilder::new()
            .case_smart(true)
            .build("Hello")
            .unwrap();
        assert!(!m.is_match(b"hello").unwrap());
        assert!(m.is_match(b"Hello").unwrap());
    }

    #[test]
    fn whole_word_rejects_substring() {
        let m = RegexMatcherBuilder::new().whole_word(true).build("cat").unwrap();
        assert!(!m.is_match(b"concatenate").unwrap());
        assert!(m.is_match(b"a cat sat").unwrap());
    }

    #[test]
    fn fixed_strings_matches_metacharacters_literally() {
        let m = RegexMatcherBuilder::new()
            .fixed_strings(true)
            .build("foo()")
            .unwrap();
        let got = m.find(b"x := foo()\n").unwrap().unwrap();
        assert_eq!((got.start(), got.end()), (5, 10));
    }

    #[test]
    fn named_capture_index() {
        let m = RegexMatcher::new(r"(?P<year>\d{4})-(?P<month>\d{2})").unwrap();
        assert_eq!(m.capture_index("year"), Some(1));
        assert_eq!(m.capture_index("month"), Some(2));
    }
}
