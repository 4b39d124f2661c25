use std::io::{self, Write};
use std::path::Path;

use grep_searcher::{Searcher, Sink, SinkContext, SinkFinish, SinkMatch};
use termcolor::WriteColor;

use crate::color::ColorSpecs;
use crate::stats::Stats;

/// Which summary variant to print for a file once it has at least one
/// match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SummaryKind {
    /// `-l`/`--files-with-matches`: print just the path.
    PathOnly,
    /// `-c`/`--count`: print `path:count`.
    PathAndCount,
    /// `-q`/`--quiet`: print nothing at all.
    Quiet,
}

/// A builder for the [`Summary`] printer.
#[derive(Clone, Debug)]
pub struct SummaryBuilder {
    kind: SummaryKind,
    with_filename: bool,
    colors: ColorSpecs,
}

impl SummaryBuilder {
    /// Create a new builder for the given summary variant.
    pub fn new(kind: SummaryKind) -> SummaryBuilder {
        SummaryBuilder { kind, with_filename: true, colors: ColorSpecs::default() }
    }

    /// Whether to prefix counts with the file path (has no effect on
    /// [`SummaryKind::PathOnly`], which always prints the path).
    pub fn with_filename(&mut self, yes: bool) -> &mut SummaryBuilder {
        self.with_filename = yes;
        self
    }

    /// The color specification to apply to the path when the writer
    /// supports color.
    pub fn color_specs(&mut self, colors: ColorSpecs) -> &mut SummaryBuilder {
        self.colors = colors;
        self
    }

    /// Build the printer, writing to `wtr`.
    pub fn build<W: WriteColor>(&self, wtr: W) -> Summary<W> {
        Summary { config: self.clone(), wtr, stats: Stats::new() }
    }
}

/// Implements the three special output modes that bypass the normal
/// line-by-line rendering: files-with-matches, count, and quiet.
pub struct Summary<W> {
    config: SummaryBuilder,
    wtr: W,
    stats: Stats,
}

impl<W: WriteColor> Summary<W> {
    /// Create a sink bound to a single file's path.
    pub fn sink<'p, 's>(&'s mut self, path: &'p Path) -> SummarySink<'p, 's, W> {
        SummarySink { summary: self, path, match_count: 0 }
    }

    /// The counters accumulated across every sink built from this printer.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// True if any file searched so far had at least one match. Used by
    /// quiet mode to decide the process exit status, and by quiet mode's
    /// cancel-on-first-match behavior.
    pub fn has_match(&self) -> bool {
        self.stats.files_with_matches() > 0
    }

    /// Consume the printer and return its writer.
    pub fn into_writer(self) -> W {
        self.wtr
    }
}

/// A per-file adapter implementing [`Sink`] for [`Summary`]. Counts matches
/// silently; the configured [`SummaryKind`] is only rendered on
/// [`Sink::finish`], once the final count for the file is known.
pub struct SummarySink<'p, 's, W> {
    summary: &'s mut Summary<W>,
    path: &'p Path,
    match_count: u64,
}

impl<'p, 's, W: WriteColor> Sink for SummarySink<'p, 's, W> {
    type Error = io::Error;

    fn matched(
        &mut self,
        _searcher: &Searcher,
        _mat: &SinkMatch<'_>,
    ) -> Result<bool, io::Error> {
        self.match_count += 1;
        // Files-with-matches only needs to know that *a* match exists; stop
        // scanning the rest of the file as soon as we do.
        Ok(self.summary.config.kind != SummaryKind::PathOnly)
    }

    fn context(
        &mut self,
        _searcher: &Searcher,
        _ctx: &SinkContext<'_>,
    ) -> Result<bool, io::Error> {
        Ok(true)
    }

    fn finish(&mut self, _searcher: &Searcher, _finish: &SinkFinish) -> Result<(), io::Error> {
        self.summary.stats.add(self.match_count);
        if self.match_count == 0 {
            return Ok(());
        }
        match self.summary.config.kind {
            SummaryKind::Quiet => {}
            SummaryKind::PathOnly => {
                write_path(&mut self.summary.wtr, &self.summary.config.colors, self.path)?;
                self.summary.wtr.write_all(b"\n")?;
            }
            SummaryKind::PathAndCount => {
                if self.summary.config.with_filename {
                    write_path(&mut self.summary.wtr, &self.summary.config.colors, self.path)?;
                    self.summary.wtr.write_all(b":")?;
                }
                write!(self.summary.wtr, "{}", self.match_count)?;
                self.summary.wtr.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

fn write_path<W: WriteColor>(
    wtr: &mut W,
    colors: &ColorSpecs,
    path: &Path,
) -> io::Result<()> {
    wtr.set_color(colors.path())?;
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        wtr.write_all(path.as_os_str().as_bytes())?;
    }
    #[cfg(not(unix))]
    {
        wtr.write_all(path.to_string_lossy().as_bytes())?;
    }
    wtr.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_regex::RegexMatcher;
    use grep_searcher::SearcherBuilder;
    use termcolor::NoColor;

    fn run(kind: SummaryKind, haystack: &str) -> String {
        let matcher = RegexMatcher::new("fn").unwrap();
        let mut printer = SummaryBuilder::new(kind).build(NoColor::new(Vec::new()));
        {
            let mut sink = printer.sink(Path::new("f.rs"));
            SearcherBuilder::new()
                .build()
                .search_reader(&matcher, haystack.as_bytes(), &mut sink)
                .unwrap();
        }
        String::from_utf8(printer.wtr.into_inner()).unwrap()
    }

    #[test]
    fn path_only_prints_once() {
        let out = run(SummaryKind::PathOnly, "fn a() {}\nfn b() {}\n");
        assert_eq!(out, "f.rs\n");
    }

    #[test]
    fn path_and_count_prints_total() {
        let out = run(SummaryKind::PathAndCount, "fn a() {}\nfn b() {}\n");
        assert_eq!(out, "f.rs:2\n");
    }

    #[test]
    fn quiet_prints_nothing() {
        let out = run(SummaryKind::Quiet, "fn a() {}\n");
        assert_eq!(out, "");
    }

    #[test]
    fn no_matches_prints_nothing() {
        let out = run(SummaryKind::PathAndCount, "nothing\n");
        assert_eq!(out, "");
    }
}
