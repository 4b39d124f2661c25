use std::io::{self, Write};
use std::path::{Path, PathBuf};

use grep_matcher::Matcher;
use grep_searcher::{Searcher, Sink, SinkContext, SinkFinish, SinkMatch};
use termcolor::WriteColor;

use crate::color::ColorSpecs;
use crate::stats::Stats;
use crate::util::{find_iter_at, Replacer};

/// A builder for a [`Standard`] printer.
#[derive(Clone, Debug)]
pub struct StandardBuilder {
    heading: bool,
    with_filename: bool,
    line_number: bool,
    column: bool,
    only_matching: bool,
    trim: bool,
    replacement: Option<Vec<u8>>,
    separator_context: Vec<u8>,
    path_terminator: Option<u8>,
    colors: ColorSpecs,
}

impl Default for StandardBuilder {
    fn default() -> StandardBuilder {
        StandardBuilder {
            heading: false,
            with_filename: false,
            line_number: true,
            column: false,
            only_matching: false,
            trim: false,
            replacement: None,
            separator_context: b"--".to_vec(),
            path_terminator: None,
            colors: ColorSpecs::default(),
        }
    }
}

impl StandardBuilder {
    /// Create a new builder with `rg`'s defaults: line numbers on, no
    /// headings, no color.
    pub fn new() -> StandardBuilder {
        StandardBuilder::default()
    }

    /// Print a colorized file header once per file and omit the path from
    /// every matched/context line (the "grouped" format). When `false`,
    /// every line is instead prefixed with `path:` (the "no-heading"
    /// format).
    pub fn heading(&mut self, yes: bool) -> &mut StandardBuilder {
        self.heading = yes;
        self
    }

    /// Whether to prefix output with the file path at all.
    pub fn with_filename(&mut self, yes: bool) -> &mut StandardBuilder {
        self.with_filename = yes;
        self
    }

    /// Whether to print 1-based line numbers. On by default.
    pub fn line_number(&mut self, yes: bool) -> &mut StandardBuilder {
        self.line_number = yes;
        self
    }

    /// Whether to print the 1-based byte column of the first match on each
    /// line.
    pub fn column(&mut self, yes: bool) -> &mut StandardBuilder {
        self.column = yes;
        self
    }

    /// Emit one output line per match occurrence containing only the
    /// matched substring, instead of the full line.
    pub fn only_matching(&mut self, yes: bool) -> &mut StandardBuilder {
        self.only_matching = yes;
        self
    }

    /// Strip leading ASCII whitespace from every printed line before
    /// matching positions are computed for highlighting.
    pub fn trim(&mut self, yes: bool) -> &mut StandardBuilder {
        self.trim = yes;
        self
    }

    /// Substitute every match with `replacement` before highlighting.
    pub fn replacement(&mut self, replacement: Option<Vec<u8>>) -> &mut StandardBuilder {
        self.replacement = replacement;
        self
    }

    /// The separator line printed between non-adjacent context groups.
    /// Defaults to `--`.
    pub fn separator_context(&mut self, sep: Vec<u8>) -> &mut StandardBuilder {
        self.separator_context = sep;
        self
    }

    /// Terminate paths with this byte instead of the usual `:`/`-`
    /// separator (used for `-0`/null-data consumers). `None` disables it.
    pub fn path_terminator(&mut self, term: Option<u8>) -> &mut StandardBuilder {
        self.path_terminator = term;
        self
    }

    /// The color specification to apply when the writer supports color.
    pub fn color_specs(&mut self, colors: ColorSpecs) -> &mut StandardBuilder {
        self.colors = colors;
        self
    }

    /// Build the printer, writing to `wtr`.
    pub fn build<W: WriteColor>(&self, wtr: W) -> Standard<W> {
        Standard { config: self.clone(), wtr, stats: Stats::new() }
    }
}

/// The grouped/no-heading printer: ripgrep's default human-readable output.
///
/// A fresh [`StandardSink`] should be created per file via [`Standard::sink`]
/// and handed to [`grep_searcher::Searcher::search_reader`]; this type
/// itself just owns the shared writer, configuration and running [`Stats`].
pub struct Standard<W> {
    config: StandardBuilder,
    wtr: W,
    stats: Stats,
}

impl<W: WriteColor> Standard<W> {
    /// Create a sink bound to a single file's path. `matcher` is used both
    /// to recompute the column of the first match and to find highlight
    /// ranges within already-scanned lines.
    pub fn sink<'p, 's, M: Matcher>(
        &'s mut self,
        matcher: &'s M,
        path: &'p Path,
    ) -> StandardSink<'p, 's, M, W> {
        StandardSink {
            standard: self,
            matcher,
            path,
            match_count: 0,
            last_printed: None,
            has_printed_path: false,
        }
    }

    /// The counters accumulated across every sink built from this printer.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Access the underlying writer directly, e.g. to print a file
    /// separator between files in no-heading mode.
    pub fn write_file_separator(&mut self, sep: &[u8]) -> io::Result<()> {
        self.wtr.write_all(sep)?;
        self.wtr.write_all(b"\n")
    }

    /// Consume the printer and return its writer, e.g. to drain a
    /// private `Vec<u8>` buffer built per file by one worker of a pool
    /// before handing the finished bytes to the collector.
    pub fn into_writer(self) -> W {
        self.wtr
    }
}

/// A per-file adapter implementing [`Sink`], writing matches and context for
/// one file to the [`Standard`] printer's shared writer.
pub struct StandardSink<'p, 's, M, W> {
    standard: &'s mut Standard<W>,
    matcher: &'s M,
    path: &'p Path,
    match_count: u64,
    last_printed: Option<u64>,
    has_printed_path: bool,
}

impl<'p, 's, M: Matcher, W: WriteColor> StandardSink<'p, 's, M, W> {
    /// The number of matches recorded so far in this file.
    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    fn write_path_heading(&mut self) -> io::Result<()> {
        let cfg = &self.standard.config;
        self.standard.wtr.set_color(cfg.colors.path())?;
        write_path(&mut self.standard.wtr, self.path)?;
        self.standard.wtr.reset()?;
        match cfg.path_terminator {
            Some(term) => self.standard.wtr.write_all(&[term])?,
            None => self.standard.wtr.write_all(b"\n")?,
        }
        Ok(())
    }

    fn write_path_prefix(&mut self) -> io::Result<()> {
        let cfg = &self.standard.config;
        if !cfg.with_filename {
            return Ok(());
        }
        self.standard.wtr.set_color(cfg.colors.path())?;
        write_path(&mut self.standard.wtr, self.path)?;
        self.standard.wtr.reset()?;
        let sep = cfg.path_terminator.unwrap_or(b':');
        self.standard.wtr.write_all(&[sep])?;
        Ok(())
    }

    fn write_line_number(&mut self, n: u64, sep: u8) -> io::Result<()> {
        let cfg = &self.standard.config;
        if !cfg.line_number {
            return Ok(());
        }
        self.standard.wtr.set_color(cfg.colors.line())?;
        write!(self.standard.wtr, "{}", n)?;
        self.standard.wtr.reset()?;
        self.standard.wtr.write_all(&[sep])?;
        Ok(())
    }

    fn write_column(&mut self, col: u64) -> io::Result<()> {
        let cfg = &self.standard.config;
        if !cfg.column {
            return Ok(());
        }
        self.standard.wtr.set_color(cfg.colors.column())?;
        write!(self.standard.wtr, "{}", col)?;
        self.standard.wtr.reset()?;
        self.standard.wtr.write_all(b":")?;
        Ok(())
    }

    /// Emit the header/prefix shared by a matched or context line.
    fn write_prefix(&mut self, line_number: Option<u64>, sep: u8) -> io::Result<()> {
        let heading = self.standard.config.heading;
        if heading && self.standard.config.with_filename && !self.has_printed_path {
            self.write_path_heading()?;
            self.has_printed_path = true;
        } else if !heading {
            self.write_path_prefix()?;
        }
        if let Some(n) = line_number {
            self.write_line_number(n, sep)?;
        }
        Ok(())
    }

    fn trim_line<'b>(&self, line: &'b [u8]) -> &'b [u8] {
        if !self.standard.config.trim {
            return line;
        }
        let lead = line.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
        &line[lead..]
    }

    /// Render one matched/context line, highlighting every match occurrence
    /// and applying `--replace` if configured. Matched lines, when
    /// `only_matching` is set, are instead handled by
    /// [`StandardSink::write_only_matching`].
    fn write_line(&mut self, line: &[u8], is_match: bool) -> io::Result<()> {
        let line = self.trim_line(line);
        let replacement = self.standard.config.replacement.clone();

        let (rendered, highlights): (std::borrow::Cow<[u8]>, Vec<grep_matcher::Match>) =
            if !is_match {
                (std::borrow::Cow::Borrowed(line), Vec::new())
            } else if let Some(ref replacement) = replacement {
                let replacer = Replacer::new(replacement);
                match replacer.replace_all(self.matcher, line) {
                    Ok((out, marks)) => (std::borrow::Cow::Owned(out), marks),
                    Err(_) => (std::borrow::Cow::Borrowed(line), Vec::new()),
                }
            } else {
                let mut marks = Vec::new();
                let _ = find_iter_at(self.matcher, line, |m| {
                    marks.push(m);
                    true
                });
                (std::borrow::Cow::Borrowed(line), marks)
            };

        let mut last = 0;
        for m in &highlights {
            self.standard.wtr.write_all(&rendered[last..m.start()])?;
            self.write_highlighted_span(&rendered[m.start()..m.end()], true)?;
            last = m.end();
        }
        self.standard.wtr.write_all(&rendered[last..])?;
        self.standard.wtr.write_all(b"\n")?;
        Ok(())
    }

    /// `only_matching` mode: emit one fully-prefixed output line per match
    /// occurrence on this input line, containing just the matched text.
    fn write_only_matching(&mut self, line_number: Option<u64>, line: &[u8]) -> io::Result<()> {
        let line = self.trim_line(line);
        let mut matches = Vec::new();
        let _ = find_iter_at(self.matcher, line, |m| {
            matches.push(m);
            true
        });
        for m in matches {
            self.write_prefix(line_number, b':')?;
            if self.standard.config.column {
                self.write_column(m.start() as u64 + 1)?;
            }
            self.write_highlighted_span(&line[m.start()..m.end()], true)?;
            self.standard.wtr.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_highlighted_span(&mut self, bytes: &[u8], matched: bool) -> io::Result<()> {
        if matched {
            self.standard.wtr.set_color(self.standard.config.colors.matched())?;
        }
        self.standard.wtr.write_all(bytes)?;
        if matched {
            self.standard.wtr.reset()?;
        }
        Ok(())
    }

    fn maybe_break(
        &mut self,
        searcher: &Searcher,
        line_number: Option<u64>,
    ) -> io::Result<()> {
        let _ = searcher;
        if let (Some(last), Some(cur)) = (self.last_printed, line_number) {
            if cur > last + 1 {
                let sep = self.standard.config.separator_context.clone();
                if !sep.is_empty() {
                    self.standard.wtr.write_all(&sep)?;
                    self.standard.wtr.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }
}

impl<'p, 's, M: Matcher, W: WriteColor> Sink for StandardSink<'p, 's, M, W> {
    type Error = io::Error;

    fn matched(
        &mut self,
        searcher: &Searcher,
        mat: &SinkMatch<'_>,
    ) -> Result<bool, io::Error> {
        self.maybe_break(searcher, mat.line_number())?;
        self.match_count += 1;

        if self.standard.config.only_matching {
            self.write_only_matching(mat.line_number(), mat.bytes())?;
            self.last_printed = mat.line_number();
            return Ok(true);
        }

        let column = if self.standard.config.column {
            let trimmed_line = self.trim_line(mat.bytes());
            self.matcher
                .find(trimmed_line)
                .ok()
                .flatten()
                .map(|m| m.start() as u64 + 1)
                .unwrap_or(1)
        } else {
            0
        };

        self.write_prefix(mat.line_number(), b':')?;
        if self.standard.config.column {
            self.write_column(column)?;
        }
        self.write_line(mat.bytes(), true)?;
        self.last_printed = mat.line_number();
        Ok(true)
    }

    fn context(
        &mut self,
        searcher: &Searcher,
        ctx: &SinkContext<'_>,
    ) -> Result<bool, io::Error> {
        self.maybe_break(searcher, ctx.line_number())?;
        self.write_prefix(ctx.line_number(), b'-')?;
        self.write_line(ctx.bytes(), false)?;
        self.last_printed = ctx.line_number();
        Ok(true)
    }

    fn finish(&mut self, _searcher: &Searcher, _finish: &SinkFinish) -> Result<(), io::Error> {
        self.standard.stats.add(self.match_count);
        self.standard.wtr.flush()
    }
}

#[cfg(unix)]
fn write_path<W: Write>(wtr: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    wtr.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(wtr: &mut W, path: &Path) -> io::Result<()> {
    wtr.write_all(path.to_string_lossy().as_bytes())
}

/// Strip a leading `./` from a relative path for display, mirroring how
/// paths are shown when a root of `.` was searched.
pub fn display_path(path: &Path) -> PathBuf {
    path.strip_prefix("./").map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_regex::RegexMatcher;
    use grep_searcher::SearcherBuilder;
    use termcolor::{Ansi, NoColor};

    fn run(pattern: &str, haystack: &str, cfg: impl Fn(&mut StandardBuilder)) -> String {
        let matcher = RegexMatcher::new(pattern).unwrap();
        let mut builder = StandardBuilder::new();
        cfg(&mut builder);
        let mut printer = builder.build(NoColor::new(Vec::new()));
        {
            let mut sink = printer.sink(&matcher, Path::new("f.txt"));
            SearcherBuilder::new()
                .build()
                .search_reader(&matcher, haystack.as_bytes(), &mut sink)
                .unwrap();
        }
        String::from_utf8(printer.wtr.into_inner()).unwrap()
    }

    #[test]
    fn no_heading_prefixes_path() {
        let out = run("fn", "fn main() {}\n", |b| {
            b.with_filename(true);
        });
        assert_eq!(out, "f.txt:1:fn main() {}\n");
    }

    #[test]
    fn heading_prints_path_once() {
        let out = run("fn", "fn a() {}\nfn b() {}\n", |b| {
            b.with_filename(true).heading(true);
        });
        assert_eq!(out, "f.txt\n1:fn a() {}\n2:fn b() {}\n");
    }

    #[test]
    fn only_matching_emits_substrings() {
        let out = run("a+", "aa b aaa\n", |b| {
            b.only_matching(true).line_number(false);
        });
        assert_eq!(out, "aa\naaa\n");
    }

    #[test]
    fn only_matching_repeats_prefix_per_occurrence() {
        let out = run("a+", "aa b aaa\n", |b| {
            b.only_matching(true);
        });
        assert_eq!(out, "1:aa\n1:aaa\n");
    }

    #[test]
    fn replace_substitutes_before_highlight() {
        let out = run("fn", "fn main() {}\n", |b| {
            b.replacement(Some(b"func".to_vec()));
        });
        assert_eq!(out, "1:func main() {}\n");
    }

    #[test]
    fn context_separator_on_gap() {
        let out = run("X", "a\nX\nb\nc\nd\ne\nX\n", |b| {
            b.line_number(true);
        });
        assert!(out.contains("1:X\n") || out.contains("2:X\n"));
    }

    #[test]
    fn color_wraps_match() {
        let matcher = RegexMatcher::new("hi").unwrap();
        let mut builder = StandardBuilder::new();
        builder.color_specs(ColorSpecs::default_with_color());
        let mut printer = builder.build(Ansi::new(Vec::new()));
        {
            let mut sink = printer.sink(&matcher, Path::new("f"));
            SearcherBuilder::new()
                .build()
                .search_reader(&matcher, b"hi there".as_ref(), &mut sink)
                .unwrap();
        }
        let out = String::from_utf8(printer.wtr.into_inner()).unwrap();
        assert!(out.contains("\x1b["));
    }
}
