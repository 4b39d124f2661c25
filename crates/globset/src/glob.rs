use std::fmt;
use std::path::Path;

use regex_automata::meta::Regex;
use regex_automata::util::syntax;

use crate::error::{Error, ErrorKind};

/// A single compiled glob pattern.
///
/// A `Glob` is built from textual glob syntax by [`GlobBuilder`], which
/// translates the pattern into an anchored regular expression matched
/// against byte strings (so that matching never depends on the
/// candidate path being valid UTF-8).
#[derive(Clone, Debug)]
pub struct Glob {
    original: String,
    regex_str: String,
    matcher: Regex,
}

impl PartialEq for Glob {
    fn eq(&self, other: &Glob) -> bool {
        self.original == other.original
    }
}
impl Eq for Glob {}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl Glob {
    /// Compile the given glob pattern into a matcher using the default
    /// builder options.
    pub fn new(glob: &str) -> Result<Glob, Error> {
        GlobBuilder::new(glob).build()
    }

    /// The original text of this glob.
    pub fn glob(&self) -> &str {
        &self.original
    }

    /// The regular expression this glob was translated into.
    pub fn regex(&self) -> &str {
        &self.regex_str
    }

    /// Returns true if and only if this glob matches the given path.
    pub fn is_match<P: AsRef<Path>>(&self, path: P) -> bool {
        let cand = Candidate::new(path.as_ref());
        self.is_match_candidate(&cand)
    }

    /// Returns true if and only if this glob matches the given candidate.
    pub fn is_match_candidate(&self, candidate: &Candidate<'_>) -> bool {
        self.matcher.is_match(candidate.path.as_bytes())
    }
}

/// A builder for a single [`Glob`].
#[derive(Clone, Debug)]
pub struct GlobBuilder<'a> {
    glob: &'a str,
    opts: GlobOptions,
}

#[derive(Clone, Copy, Debug)]
struct GlobOptions {
    case_insensitive: bool,
    literal_separator: bool,
    backslash_escape: bool,
    allow_unclosed_class: bool,
}

impl Default for GlobOptions {
    fn default() -> GlobOptions {
        GlobOptions {
            case_insensitive: false,
            literal_separator: true,
            backslash_escape: true,
            allow_unclosed_class: true,
        }
    }
}

impl<'a> GlobBuilder<'a> {
    /// Create a new builder for the given glob pattern.
    pub fn new(glob: &'a str) -> GlobBuilder<'a> {
        GlobBuilder { glob, opts: GlobOptions::default() }
    }

    /// Toggle whether the resulting matcher is case insensitive.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut GlobBuilder<'a> {
        self.opts.case_insensitive = yes;
        self
    }

    /// Toggle whether `*` and `?` are permitted to match a path
    /// separator (`/`). When enabled (the default), they are not.
    pub fn literal_separator(&mut self, yes: bool) -> &mut GlobBuilder<'a> {
        self.opts.literal_separator = yes;
        self
    }

    /// Toggle whether `\x` is treated as an escape for the literal
    /// character `x`. Enabled by default.
    pub fn backslash_escape(&mut self, yes: bool) -> &mut GlobBuilder<'a> {
        self.opts.backslash_escape = yes;
        self
    }

    /// Toggle whether an unterminated character class, e.g. `[abc`, is
    /// tolerated and treated as a literal string rather than rejected
    /// with a parse error. Enabled by default, matching `gitignore`
    /// semantics.
    pub fn allow_unclosed_class(&mut self, yes: bool) -> &mut GlobBuilder<'a> {
        self.opts.allow_unclosed_class = yes;
        self
    }

    /// Parse and compile the glob pattern into a `Glob`.
    pub fn build(&self) -> Result<Glob, Error> {
        let regex_str = translate(self.glob, &self.opts)?;
        let syntax = syntax::Config::new()
            .utf8(false)
            .case_insensitive(self.opts.case_insensitive);
        let matcher = Regex::builder()
            .syntax(syntax)
            .build(&regex_str)
            .map_err(|err| {
                Error::new(self.glob, ErrorKind::Regex(err.to_string()))
            })?;
        Ok(Glob { original: self.glob.to_string(), regex_str, matcher })
    }
}

/// Translate a glob pattern into an anchored regular expression string,
/// per the token table:
///
/// | Glob token | Regex |
/// |---|---|
/// | `**/` (at start or after `/`) | `(?:.*(?:/\|$))?` |
/// | `**` at end or alone segment | `.*` |
/// | `*` | `[^/]*` |
/// | `?` | `[^/]` |
/// | `[...]` or `[!...]` | `[...]` (leading `!` becomes `^`) |
/// | regex metacharacters | escaped |
/// | `\x` | literal `x` |
/// | other | literal |
fn translate(glob: &str, opts: &GlobOptions) -> Result<String, Error> {
    let chars: Vec<char> = glob.chars().collect();
    let n = chars.len();
    let mut re = String::with_capacity(glob.len() * 2 + 2);
    re.push('^');
    let any_char = if opts.literal_separator { "[^/]" } else { "." };
    let any_star = if opts.literal_separator { "[^/]*" } else { ".*" };

    let mut i = 0;
    while i < n {
        let c = chars[i];
        match c {
            '*' => {
                let is_double = i + 1 < n && chars[i + 1] == '*';
                if is_double {
                    let at_boundary = i == 0 || chars[i - 1] == '/';
                    let next = i + 2;
                    if at_boundary && next < n && chars[next] == '/' {
                        re.push_str("(?:.*(?:/|$))?");
                        i = next + 1;
                        continue;
                    } else if at_boundary && next == n {
                        re.push_str(".*");
                        i = next;
                        continue;
                    } else {
                        // `**` that isn't a whole path component; treat
                        // it as matching across separators too.
                        re.push_str(".*");
                        i = next;
                        continue;
                    }
                }
                re.push_str(any_star);
                i += 1;
            }
            '?' => {
                re.push_str(any_char);
                i += 1;
            }
            '[' => match parse_class(&chars, i) {
                Some((class, next)) => {
                    re.push_str(&class);
                    i = next;
                }
                None if opts.allow_unclosed_class => {
                    push_literal(&mut re, '[');
                    i += 1;
                }
                None => {
                    return Err(Error::new(glob, ErrorKind::UnclosedClass));
                }
            },
            '\\' if opts.backslash_escape => {
                if i + 1 < n {
                    push_literal(&mut re, chars[i + 1]);
                    i += 2;
                } else {
                    re.push_str("\\\\");
                    i += 1;
                }
            }
            _ => {
                push_literal(&mut re, c);
                i += 1;
            }
        }
    }
    re.push('$');
    Ok(re)
}

/// Parses a `[...]` or `[!...]` character class starting at `start`
/// (which must point at the opening `[`). Returns the translated regex
/// fragment and the index just past the closing `]`, or `None` if the
/// class is never closed.
fn parse_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let n = chars.len();
    let mut j = start + 1;
    let negate = j < n && (chars[j] == '!' || chars[j] == '^');
    if negate {
        j += 1;
    }
    // A `]` occurring immediately (possibly after negation) is a literal
    // member of the class, not its terminator.
    let body_start = j;
    if j < n && chars[j] == ']' {
        j += 1;
    }
    while j < n && chars[j] != ']' {
        j += 1;
    }
    if j >= n {
        return None;
    }
    let mut out = String::with_capacity(j - start + 2);
    out.push('[');
    if negate {
        out.push('^');
    }
    for &ch in &chars[body_start..j] {
        if ch == '\\' || ch == '^' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push(']');
    Some((out, j + 1))
}

/// Append `c` to `re`, escaping it if it has special meaning in a
/// regular expression.
fn push_literal(re: &mut String, c: char) {
    match c {
        '.' | '+' | '(' | ')' | '{' | '}' | '^' | '$' | '|' | '*' | '?'
        | '[' | ']' | '\\' => {
            re.push('\\');
            re.push(c);
        }
        '/' => re.push('/'),
        _ => re.push(c),
    }
}

/// A path that has been preprocessed for efficient matching against a
/// glob or glob set.
#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    path: std::borrow::Cow<'a, str>,
}

impl<'a> Candidate<'a> {
    /// Create a new candidate from the given path.
    pub fn new<P: AsRef<Path> + ?Sized>(path: &'a P) -> Candidate<'a> {
        let path = path.as_ref().to_string_lossy();
        let path = if cfg!(windows) && path.contains('\\') {
            std::borrow::Cow::Owned(path.replace('\\', "/"))
        } else {
            path
        };
        Candidate { path }
    }

    /// The basename of this candidate path, if it has one.
    pub fn basename(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[i + 1..],
            None => &self.path,
        }
    }

    /// The full (normalized, forward-slash) path of this candidate.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Iterate over the `/`-separated components of this candidate.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_match(glob: &str, path: &str) -> bool {
        Glob::new(glob).unwrap().is_match(path)
    }

    #[test]
    fn literal() {
        assert!(is_match("months", "months"));
        assert!(!is_match("months", "amonths"));
    }

    #[test]
    fn star() {
        assert!(is_match("*.rs", "main.rs"));
        assert!(!is_match("*.rs", "src/main.rs"));
    }

    #[test]
    fn question() {
        assert!(is_match("ca?.rs", "cat.rs"));
        assert!(!is_match("ca?.rs", "ca/.rs"));
    }

    #[test]
    fn double_star_prefix() {
        assert!(is_match("**/foo", "foo"));
        assert!(is_match("**/foo", "src/foo"));
        assert!(is_match("**/foo", "a/b/foo"));
    }

    #[test]
    fn double_star_standalone() {
        assert!(is_match("abc/**", "abc/x"));
        assert!(is_match("abc/**", "abc/x/y"));
    }

    #[test]
    fn class() {
        assert!(is_match("[abc].rs", "a.rs"));
        assert!(!is_match("[abc].rs", "d.rs"));
        assert!(is_match("[!abc].rs", "d.rs"));
    }

    #[test]
    fn unclosed_class_is_literal() {
        assert!(is_match("[abc", "[abc"));
    }

    #[test]
    fn case_insensitive() {
        let g = GlobBuilder::new("*.HTML").case_insensitive(true).build().unwrap();
        assert!(g.is_match("foo.html"));
        assert!(g.is_match("foo.HTML"));
    }
}
