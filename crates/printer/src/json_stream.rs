use std::io;
use std::path::Path;

use grep_matcher::Matcher;
use grep_searcher::{Searcher, Sink, SinkContext, SinkFinish, SinkMatch};
use serde_derive::Serialize;

use crate::stats::Stats;
use crate::util::find_iter_at;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum Event {
    Begin(BeginData),
    Match(MatchData),
    End(EndData),
    Summary(SummaryData),
}

#[derive(Clone, Debug, Serialize)]
struct BeginData {
    path: String,
}

#[derive(Clone, Debug, Serialize)]
struct MatchData {
    path: String,
    line_number: Option<u64>,
    column: Option<u64>,
    lines: Lines,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    matched: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct Lines {
    text: String,
}

#[derive(Clone, Debug, Serialize)]
struct EndData {
    path: String,
    match_count: u64,
}

#[derive(Clone, Debug, Serialize)]
struct SummaryData {
    total_files: u64,
    total_matches: u64,
}

/// A builder for the NDJSON streaming printer.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStreamBuilder {
    only_matching: bool,
    column: bool,
}

impl JsonStreamBuilder {
    /// Create a new builder.
    pub fn new() -> JsonStreamBuilder {
        JsonStreamBuilder::default()
    }

    /// Populate the `match` field of every record with the matched
    /// substring.
    pub fn only_matching(&mut self, yes: bool) -> &mut JsonStreamBuilder {
        self.only_matching = yes;
        self
    }

    /// Populate the `column` field of every record.
    pub fn column(&mut self, yes: bool) -> &mut JsonStreamBuilder {
        self.column = yes;
        self
    }

    /// Build the printer, writing to `wtr`.
    pub fn build<W: io::Write>(&self, wtr: W) -> JsonStream<W> {
        JsonStream { config: *self, wtr, stats: Stats::new() }
    }
}

/// The NDJSON printer: emits one `begin`/`match`*/`end` sequence of JSON
/// objects per file as it is searched, and a final `summary` object for the
/// whole run.
pub struct JsonStream<W> {
    config: JsonStreamBuilder,
    wtr: W,
    stats: Stats,
}

impl<W: io::Write> JsonStream<W> {
    /// Create a sink bound to a single file's path. Writes the `begin`
    /// event immediately.
    pub fn sink<'p, 's, M: Matcher>(
        &'s mut self,
        matcher: &'s M,
        path: &'p Path,
    ) -> io::Result<JsonStreamSink<'p, 's, M, W>> {
        let path_str = path.to_string_lossy().into_owned();
        let mut sink = JsonStreamSink {
            stream: self,
            matcher,
            path,
            match_count: 0,
        };
        sink.write_event(&Event::Begin(BeginData { path: path_str }))?;
        Ok(sink)
    }

    /// The counters accumulated across every sink built from this printer.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Consume the printer and return its writer.
    pub fn into_writer(self) -> W {
        self.wtr
    }

    /// Write the final `summary` event. Called once, after every file has
    /// been searched.
    pub fn finish_summary(&mut self) -> io::Result<()> {
        write_event(
            &mut self.wtr,
            &Event::Summary(SummaryData {
                total_files: self.stats.files_with_matches(),
                total_matches: self.stats.matches(),
            }),
        )
    }
}

fn write_event<W: io::Write>(wtr: &mut W, event: &Event) -> io::Result<()> {
    serde_json::to_writer(&mut *wtr, event)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    wtr.write_all(b"\n")
}

/// A per-file adapter implementing [`Sink`] that writes NDJSON events
/// directly to the parent [`JsonStream`]'s writer as they occur.
pub struct JsonStreamSink<'p, 's, M, W> {
    stream: &'s mut JsonStream<W>,
    matcher: &'s M,
    path: &'p Path,
    match_count: u64,
}

impl<'p, 's, M: Matcher, W: io::Write> JsonStreamSink<'p, 's, M, W> {
    fn write_event(&mut self, event: &Event) -> io::Result<()> {
        write_event(&mut self.stream.wtr, event)
    }

    fn column_of(&self, bytes: &[u8]) -> Option<u64> {
        if !self.stream.config.column {
            return None;
        }
        self.matcher.find(bytes).ok().flatten().map(|m| m.start() as u64 + 1)
    }

    fn matched_text(&self, bytes: &[u8]) -> Option<String> {
        if !self.stream.config.only_matching {
            return None;
        }
        let mut first = None;
        let _ = find_iter_at(self.matcher, bytes, |m| {
            first = Some(String::from_utf8_lossy(&bytes[m.start()..m.end()]).into_owned());
            false
        });
        first
    }
}

impl<'p, 's, M: Matcher, W: io::Write> Sink for JsonStreamSink<'p, 's, M, W> {
    type Error = io::Error;

    fn matched(
        &mut self,
        _searcher: &Searcher,
        mat: &SinkMatch<'_>,
    ) -> Result<bool, io::Error> {
        self.match_count += 1;
        let data = MatchData {
            path: self.path.to_string_lossy().into_owned(),
            line_number: mat.line_number(),
            column: self.column_of(mat.bytes()),
            lines: Lines { text: String::from_utf8_lossy(mat.bytes()).into_owned() },
            matched: self.matched_text(mat.bytes()),
        };
        self.write_event(&Event::Match(data))?;
        Ok(true)
    }

    fn context(
        &mut self,
        _searcher: &Searcher,
        _ctx: &SinkContext<'_>,
    ) -> Result<bool, io::Error> {
        Ok(true)
    }

    fn finish(&mut self, _searcher: &Searcher, _finish: &SinkFinish) -> Result<(), io::Error> {
        self.stream.stats.add(self.match_count);
        let data = EndData {
            path: self.path.to_string_lossy().into_owned(),
            match_count: self.match_count,
        };
        self.write_event(&Event::End(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_regex::RegexMatcher;
    use grep_searcher::SearcherBuilder;

    #[test]
    fn emits_begin_match_end_and_summary() {
        let matcher = RegexMatcher::new("fn").unwrap();
        let mut out = Vec::new();
        {
            let mut stream = JsonStreamBuilder::new().build(&mut out);
            {
                let mut sink = stream.sink(&matcher, Path::new("a.rs")).unwrap();
                SearcherBuilder::new()
                    .build()
                    .search_reader(&matcher, b"fn a() {}\n".as_ref(), &mut sink)
                    .unwrap();
            }
            stream.finish_summary().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("\"type\":\"begin\""));
        assert!(lines[1].contains("\"type\":\"match\""));
        assert!(lines[2].contains("\"type\":\"end\""));
        assert!(lines[3].contains("\"type\":\"summary\""));
    }
}
