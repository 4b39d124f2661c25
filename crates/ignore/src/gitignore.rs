/*!
The gitignore module implements an Ignore Set: the compiled patterns
taken from a single ignore file, evaluated against candidate paths
relative to that file's directory.

This implements the `gitignore(5)` pattern syntax from scratch; it does
not shell out to `git`.
*/

use std::cell::RefCell;
use std::env;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::str;
use std::sync::Arc;

use globset::{Candidate, GlobBuilder, GlobSet, GlobSetBuilder};
use thread_local::ThreadLocal;

use crate::pathutil::{is_file_name, strip_prefix};
use crate::{Error, Match, PartialErrorBuilder};

/// A single compiled pattern taken from an ignore file.
///
/// This corresponds to the "Pattern" of the data model: the original
/// text, the compiled matcher, and the four flags parsed from it
/// (negation, dir-only, anchored, double-glob).
#[derive(Clone, Debug)]
pub struct Glob {
    from: Option<PathBuf>,
    original: String,
    actual: String,
    is_whitelist: bool,
    is_only_dir: bool,
    anchored: bool,
    double_glob: bool,
}

impl Glob {
    /// The ignore file this pattern was read from, if known.
    pub fn from(&self) -> Option<&Path> {
        self.from.as_deref()
    }

    /// The original, unmodified line of text for this pattern.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The glob actually compiled into a regular expression, after
    /// stripping leading `!`, leading/trailing `/` and normalizing
    /// `**` handling.
    pub fn actual(&self) -> &str {
        &self.actual
    }

    /// Whether this pattern is a negation (re-inclusion) pattern.
    pub fn is_whitelist(&self) -> bool {
        self.is_whitelist
    }

    /// Whether this pattern only matches directories.
    pub fn is_only_dir(&self) -> bool {
        self.is_only_dir
    }

    /// Whether this pattern is anchored to the ignore file's directory.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Whether this pattern contains a `**` double-glob component.
    pub fn is_double_glob(&self) -> bool {
        self.double_glob
    }
}

/// Gitignore is an Ignore Set: a matcher built from the patterns found
/// in one or more ignore files that share the same base directory.
#[derive(Clone, Debug)]
pub struct Gitignore {
    set: GlobSet,
    root: PathBuf,
    globs: Vec<Glob>,
    num_ignores: u64,
    num_whitelists: u64,
    matches: Arc<ThreadLocal<RefCell<Vec<usize>>>>,
}

impl Gitignore {
    /// Build a new Ignore Set from a single ignore file path.
    ///
    /// This always returns a usable (possibly partially-valid or even
    /// empty) matcher. I/O errors reading the file are reported via the
    /// second return value rather than aborting.
    pub fn new<P: AsRef<Path>>(gitignore_path: P) -> (Gitignore, Option<Error>) {
        let path = gitignore_path.as_ref();
        let parent = path.parent().unwrap_or_else(|| Path::new("/"));
        let mut builder = GitignoreBuilder::new(parent);
        let mut errs = PartialErrorBuilder::default();
        errs.maybe_push_ignore_io(builder.add(path));
        match builder.build() {
            Ok(gi) => (gi, errs.into_error_option()),
            Err(err) => {
                errs.push(err);
                (Gitignore::empty(), errs.into_error_option())
            }
        }
    }

    /// Build the global user ignore file, if one is configured.
    ///
    /// Resolution order: `$XDG_CONFIG_HOME/git/ignore`,
    /// `~/.config/git/ignore`, then `~/.gitignore_global`.
    pub fn global() -> (Gitignore, Option<Error>) {
        match global_gitignore_path() {
            None => (Gitignore::empty(), None),
            Some(path) => {
                if !path.is_file() {
                    (Gitignore::empty(), None)
                } else {
                    Gitignore::new(path)
                }
            }
        }
    }

    /// An Ignore Set with zero patterns, which never matches anything.
    pub fn empty() -> Gitignore {
        Gitignore {
            set: GlobSet::empty(),
            root: PathBuf::from(""),
            globs: vec![],
            num_ignores: 0,
            num_whitelists: 0,
            matches: Arc::new(ThreadLocal::new()),
        }
    }

    /// The base directory that paths are matched relative to.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// True if and only if this set has zero patterns.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The total number of patterns in this set.
    pub fn len(&self) -> usize {
        self.globs.len()
    }

    /// The number of ignore (non-negated) patterns.
    pub fn num_ignores(&self) -> u64 {
        self.num_ignores
    }

    /// The number of negation patterns.
    pub fn num_whitelists(&self) -> u64 {
        self.num_whitelists
    }

    /// Evaluate `path` against this Ignore Set.
    ///
    /// `is_dir` must be true if and only if `path` refers to a
    /// directory. `path` is stripped of this set's base directory
    /// before matching (see [`Gitignore::path`]); if it doesn't share a
    /// prefix with the base, it's assumed to already be relative.
    pub fn matched<P: AsRef<Path>>(&self, path: P, is_dir: bool) -> Match<&Glob> {
        if self.is_empty() {
            return Match::None;
        }
        self.matched_stripped(self.strip(path.as_ref()), is_dir)
    }

    fn matched_stripped<P: AsRef<Path>>(
        &self,
        path: P,
        is_dir: bool,
    ) -> Match<&Glob> {
        if self.is_empty() {
            return Match::None;
        }
        let path = path.as_ref();
        let candidate = Candidate::new(path);
        let cell = self.matches.get_or(|| RefCell::new(vec![]));
        let mut matches = cell.borrow_mut();
        self.set.matches_candidate_into(&candidate, &mut matches);
        // Evaluation is last-match-wins: iterate the matched pattern
        // indices in reverse (file) order and take the first one whose
        // dir-only constraint is satisfied.
        for &i in matches.iter().rev() {
            let glob = &self.globs[i];
            if !glob.is_only_dir() || is_dir {
                return if glob.is_whitelist() {
                    Match::Include(glob)
                } else {
                    Match::Ignore(glob)
                };
            }
        }
        Match::None
    }

    fn strip<'a, P: 'a + AsRef<Path> + ?Sized>(&'a self, path: &'a P) -> &'a Path {
        let mut path = path.as_ref();
        if let Some(p) = strip_prefix("./", path) {
            path = p;
        }
        if !is_file_name(path) {
            if let Some(p) = strip_prefix(&self.root, path) {
                path = p;
                if let Some(p) = strip_prefix("/", path) {
                    path = p;
                }
            }
        }
        path
    }
}

/// Builds an Ignore Set (a [`Gitignore`]) from one or more ignore files
/// or raw lines, all sharing the same base directory.
#[derive(Clone, Debug)]
pub struct GitignoreBuilder {
    builder: GlobSetBuilder,
    root: PathBuf,
    globs: Vec<Glob>,
    case_insensitive: bool,
}

impl GitignoreBuilder {
    /// Create a builder whose patterns will be matched relative to
    /// `root`, which should be the directory containing the ignore
    /// file(s) to be added.
    pub fn new<P: AsRef<Path>>(root: P) -> GitignoreBuilder {
        let root = root.as_ref();
        GitignoreBuilder {
            builder: GlobSetBuilder::new(),
            root: strip_prefix("./", root).unwrap_or(root).to_path_buf(),
            globs: vec![],
            case_insensitive: false,
        }
    }

    /// Compile the patterns added so far into a [`Gitignore`].
    pub fn build(&self) -> Result<Gitignore, Error> {
        let nignore = self.globs.iter().filter(|g| !g.is_whitelist()).count();
        let nwhite = self.globs.iter().filter(|g| g.is_whitelist()).count();
        let set = self
            .builder
            .build()
            .map_err(|err| Error::Glob { glob: None, err: err.to_string() })?;
        Ok(Gitignore {
            set,
            root: self.root.clone(),
            globs: self.globs.clone(),
            num_ignores: nignore as u64,
            num_whitelists: nwhite as u64,
            matches: Arc::new(ThreadLocal::new()),
        })
    }

    /// Add every line of the ignore file at `path` to this builder.
    ///
    /// Bad individual lines produce a (possibly compound) error but do
    /// not prevent the remaining valid patterns from being added: an
    /// ignore file is admitted with whatever patterns parsed cleanly.
    pub fn add<P: AsRef<Path>>(&mut self, path: P) -> Option<Error> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Err(err) => return Some(Error::Io(err).with_path(path)),
            Ok(file) => file,
        };
        log::debug!("opened ignore file: {}", path.display());
        let rdr = io::BufReader::new(file);
        let mut errs = PartialErrorBuilder::default();
        for (i, line) in rdr.lines().enumerate() {
            let lineno = (i + 1) as u64;
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    errs.push(Error::Io(err).tagged(path, lineno));
                    break;
                }
            };
            const UTF8_BOM: &str = "\u{feff}";
            let line = if i == 0 { line.trim_start_matches(UTF8_BOM) } else { &line };
            if let Err(err) = self.add_line(Some(path.to_path_buf()), line) {
                errs.push(err.tagged(path, lineno));
            }
        }
        errs.into_error_option()
    }

    /// Add every line of `gitignore` (as if it were the contents of an
    /// ignore file) to this builder. Used primarily in tests.
    pub fn add_str(
        &mut self,
        from: Option<PathBuf>,
        gitignore: &str,
    ) -> Result<&mut GitignoreBuilder, Error> {
        for line in gitignore.lines() {
            self.add_line(from.clone(), line)?;
        }
        Ok(self)
    }

    /// Parse and add a single raw line from an ignore file.
    ///
    /// Implements the Glob Compiler's parsing steps: negation, dir-only,
    /// anchoring, and double-glob detection, followed by translating the
    /// residual glob to a regular expression via `globset`.
    pub fn add_line(
        &mut self,
        from: Option<PathBuf>,
        mut line: &str,
    ) -> Result<&mut GitignoreBuilder, Error> {
        // Comments: a line beginning with `#` is dropped entirely. A
        // leading `\#` escapes to a literal `#`, handled below alongside
        // the `\!` escape.
        if line.starts_with('#') {
            return Ok(self);
        }
        if !line.ends_with("\\ ") {
            line = line.trim_end();
        }
        if line.is_empty() {
            return Ok(self);
        }

        let mut glob = Glob {
            from,
            original: line.to_string(),
            actual: String::new(),
            is_whitelist: false,
            is_only_dir: false,
            anchored: false,
            double_glob: false,
        };

        let has_slash = line.contains('/');
        let mut is_absolute = false;

        // Step 1: negation, with `\!`/`\#` as an escape for a literal
        // leading `!`/`#`.
        if line.starts_with("\\!") || line.starts_with("\\#") {
            line = &line[1..];
            is_absolute = line.starts_with('/');
        } else {
            if let Some(rest) = line.strip_prefix('!') {
                glob.is_whitelist = true;
                line = rest;
            }
            // Step 3: a leading `/` anchors the pattern to this file's
            // base directory.
            if let Some(rest) = line.strip_prefix('/') {
                line = rest;
                is_absolute = true;
            }
        }

        // Step 2: a trailing `/` restricts the pattern to directories
        // only, and is not itself part of the glob.
        if let Some(stripped) = line.strip_suffix('/') {
            glob.is_only_dir = true;
            line = stripped;
        }

        glob.actual = line.to_string();

        // Step 3 (continued): an interior slash also anchors the
        // pattern, per `gitignore(5)`.
        glob.anchored = is_absolute || has_slash;

        // Step 4: any `**` anywhere marks this as a double-glob pattern.
        glob.double_glob = glob.actual.contains("**");

        if !is_absolute && !has_slash {
            // A pattern with no slash matches at any depth; simulate
            // that with a `**/` prefix unless one is already present.
            if !(glob.actual.starts_with("**/") || glob.actual == "**") {
                glob.actual = format!("**/{}", glob.actual);
            }
        }
        // `foo/**` should match everything inside `foo`, but not `foo`
        // itself (a bare glob would match the directory too).
        if glob.actual.ends_with("/**") {
            glob.actual = format!("{}/*", glob.actual);
        }

        let parsed = GlobBuilder::new(&glob.actual)
            .literal_separator(true)
            .case_insensitive(self.case_insensitive)
            .backslash_escape(true)
            .allow_unclosed_class(true)
            .build()
            .map_err(|err| Error::Glob {
                glob: Some(glob.original.clone()),
                err: err.kind().to_string(),
            })?;
        self.builder.add(parsed);
        self.globs.push(glob);
        Ok(self)
    }

    /// Toggle case-insensitive matching for patterns added from this
    /// point forward. Disabled by default.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut GitignoreBuilder {
        self.case_insensitive = yes;
        self
    }
}

/// Resolve the global user ignore file location, following
/// `$XDG_CONFIG_HOME/git/ignore`, `~/.config/git/ignore`, then
/// `~/.gitignore_global`, in that order.
fn global_gitignore_path() -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            let p = PathBuf::from(xdg).join("git/ignore");
            if p.exists() {
                return Some(p);
            }
        }
    }
    if let Some(home) = home_dir() {
        let p = home.join(".config/git/ignore");
        if p.exists() {
            return Some(p);
        }
        let p = home.join(".gitignore_global");
        if p.exists() {
            return Some(p);
        }
        // Fall through to reporting the conventional location even if
        // it doesn't exist yet, so callers can distinguish "no home
        // directory" from "no global ignore file configured".
        return Some(home.join(".config/git/ignore"));
    }
    None
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::{Gitignore, GitignoreBuilder};
    use std::path::Path;

    fn gi_from_str<P: AsRef<Path>>(root: P, s: &str) -> Gitignore {
        let mut builder = GitignoreBuilder::new(root);
        builder.add_str(None, s).unwrap();
        builder.build().unwrap()
    }

    macro_rules! ignored {
        ($name:ident, $root:expr, $gi:expr, $path:expr) => {
            ignored!($name, $root, $gi, $path, false);
        };
        ($name:ident, $root:expr, $gi:expr, $path:expr, $is_dir:expr) => {
            #[test]
            fn $name() {
                let gi = gi_from_str($root, $gi);
                assert!(gi.matched($path, $is_dir).is_ignore());
            }
        };
    }

    macro_rules! not_ignored {
        ($name:ident, $root:expr, $gi:expr, $path:expr) => {
            not_ignored!($name, $root, $gi, $path, false);
        };
        ($name:ident, $root:expr, $gi:expr, $path:expr, $is_dir:expr) => {
            #[test]
            fn $name() {
                let gi = gi_from_str($root, $gi);
                assert!(!gi.matched($path, $is_dir).is_ignore());
            }
        };
    }

    const ROOT: &str = "/home/foobar/rust/rg";

    ignored!(ig1, ROOT, "months", "months");
    ignored!(ig2, ROOT, "*.lock", "Cargo.lock");
    ignored!(ig3, ROOT, "*.rs", "src/main.rs");
    ignored!(ig4, ROOT, "src/*.rs", "src/main.rs");
    ignored!(ig5, ROOT, "/*.c", "cat-file.c");
    ignored!(ig6, ROOT, "/src/*.rs", "src/main.rs");
    ignored!(ig7, ROOT, "!src/main.rs\n*.rs", "src/main.rs");
    ignored!(ig8, ROOT, "foo/", "foo", true);
    ignored!(ig9, ROOT, "**/foo", "foo");
    ignored!(ig10, ROOT, "**/foo", "src/foo");
    ignored!(ig11, ROOT, "**/foo/**", "src/foo/bar");
    ignored!(ig12, ROOT, "**/foo/**", "wat/src/foo/bar/baz");
    ignored!(ig13, ROOT, "**/foo/bar", "foo/bar");
    ignored!(ig14, ROOT, "**/foo/bar", "src/foo/bar");
    ignored!(ig15, ROOT, "abc/**", "abc/x");
    ignored!(ig16, ROOT, "abc/**", "abc/x/y");
    ignored!(ig17, ROOT, "abc/**", "abc/x/y/z");
    ignored!(ig18, ROOT, "a/**/b", "a/b");
    ignored!(ig19, ROOT, "a/**/b", "a/x/b");
    ignored!(ig20, ROOT, "a/**/b", "a/x/y/b");
    ignored!(ig21, ROOT, r"\!xy", "!xy");
    ignored!(ig22, ROOT, r"\#foo", "#foo");
    ignored!(ig23, ROOT, "foo", "./foo");
    ignored!(ig24, ROOT, "target", "grep/target");
    ignored!(ig25, ROOT, "Cargo.lock", "./tabwriter-bin/Cargo.lock");
    ignored!(ig26, ROOT, "/foo/bar/baz", "./foo/bar/baz");
    ignored!(ig27, ROOT, "foo/", "xyz/foo", true);
    ignored!(ig28, ROOT, "src/*.rs", "src/grep/src/main.rs");

    not_ignored!(ignot1, ROOT, "amonths", "months");
    not_ignored!(ignot2, ROOT, "monthsa", "months");
    not_ignored!(ignot3, ROOT, "/src/*.rs", "src/grep/src/main.rs");
    not_ignored!(ignot4, ROOT, "/*.c", "mozilla-sha1/sha1.c");
    not_ignored!(ignot6, ROOT, "*.rs\n!src/main.rs", "src/main.rs");
    not_ignored!(ignot7, ROOT, "foo/", "foo", false);
    not_ignored!(ignot8, ROOT, "**/foo/**", "wat/src/afoo/bar/baz");
    not_ignored!(ignot9, ROOT, "**/foo/**", "wat/src/fooa/bar/baz");
    not_ignored!(ignot10, ROOT, "**/foo/bar", "foo/src/bar");
    not_ignored!(ignot11, ROOT, "#foo", "#foo");
    not_ignored!(ignot12, ROOT, "\n\n\n", "foo");
    not_ignored!(ignot13, ROOT, "foo/**", "foo", true);
    not_ignored!(ignot15, ROOT, "!/bar", "foo/bar");

    #[test]
    fn negation_after_ignore_is_include() {
        let gi = gi_from_str(ROOT, "*.log\n!important.log\n");
        assert!(gi.matched("important.log", false).is_include());
        assert!(gi.matched("other.log", false).is_ignore());
    }

    #[test]
    fn anchored_does_not_match_nested() {
        let gi = gi_from_str(ROOT, "/root.txt");
        assert!(gi.matched("root.txt", false).is_ignore());
        assert!(!gi.matched("sub/root.txt", false).is_ignore());
    }

    #[test]
    fn dir_only_respects_is_dir() {
        let gi = gi_from_str(ROOT, "cache/");
        assert!(gi.matched("cache", true).is_ignore());
        assert!(!gi.matched("cache", false).is_ignore());
    }

    // See: https://github.com/BurntSushi/ripgrep/issues/106
    #[test]
    fn regression_106() {
        gi_from_str("/", " ");
    }

    #[test]
    fn case_insensitive() {
        let gi = GitignoreBuilder::new(ROOT)
            .case_insensitive(true)
            .add_str(None, "*.html")
            .unwrap()
            .build()
            .unwrap();
        assert!(gi.matched("foo.html", false).is_ignore());
        assert!(gi.matched("foo.HTML", false).is_ignore());
        assert!(!gi.matched("foo.htm", false).is_ignore());
    }

    ignored!(cs1, ROOT, "*.html", "foo.html");
    not_ignored!(cs2, ROOT, "*.html", "foo.HTML");
}
