use regex_syntax::hir::Hir;
use regex_syntax::ParserBuilder;

use crate::error::Error;

/// Configuration shared by the matcher builder: resolves the
/// `ignore_case`/`smart_case`/`whole_word`/`fixed_strings` options
/// into a single pattern string and case-insensitivity flag.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub(crate) case_insensitive: bool,
    pub(crate) case_smart: bool,
    pub(crate) whole_word: bool,
    pub(crate) fixed_strings: bool,
}

impl Config {
    /// Resolve `pattern` (a single alternation of one or more literal
    /// patterns joined by `|`) into the final source text handed to
    /// the regex compiler, and whether the result should be compiled
    /// case-insensitively.
    pub(crate) fn build_pattern(&self, pattern: &str) -> (String, bool) {
        let text = if self.fixed_strings {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };
        let text = if self.whole_word {
            format!(r"\b(?:{})\b", text)
        } else {
            text
        };
        let case_insensitive = self.case_insensitive
            || (self.case_smart && !has_uppercase_literal(pattern));
        (text, case_insensitive)
    }

    /// Parse `pattern` purely to validate it up front and produce a
    /// friendlier compile error than the final build step would.
    pub(crate) fn validate(&self, pattern: &str) -> Result<Hir, Error> {
        ParserBuilder::new()
            .build()
            .parse(pattern)
            .map_err(Error::regex)
    }
}

/// Smart case looks only at whether the pattern contains an explicit
/// uppercase letter outside of escapes; this mirrors what a user would
/// expect from typing a plain literal or simple regex.
fn has_uppercase_literal(pattern: &str) -> bool {
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }
        if c.is_uppercase() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_case_all_lowercase_is_insensitive() {
        let cfg = Config { case_smart: true, ..Config::default() };
        let (_, ci) = cfg.build_pattern("hello");
        assert!(ci);
    }

    #[test]
    fn smart_case_with_uppercase_is_sensitive() {
        let cfg = Config { case_smart: true, ..Config::default() };
        let (_, ci) = cfg.build_pattern("Hello");
        assert!(!ci);
    }

    #[test]
    fn fixed_strings_escapes_metacharacters() {
        let cfg = Config { fixed_strings: true, ..Config::default() };
        let (text, _) = cfg.build_pattern("foo()");
        assert_eq!(text, regex::escape("foo()"));
    }

    #[test]
    fn whole_word_wraps_boundaries() {
        let cfg = Config { whole_word: true, ..Config::default() };
        let (text, _) = cfg.build_pattern("foo");
        assert_eq!(text, r"\b(?:foo)\b");
    }
}
