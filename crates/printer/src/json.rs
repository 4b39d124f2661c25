use std::io;
use std::path::Path;

use grep_matcher::Matcher;
use grep_searcher::{Searcher, Sink, SinkContext, SinkFinish, SinkMatch};
use serde_derive::Serialize;

use crate::stats::Stats;
use crate::util::find_iter_at;

/// One match record within a [`JsonFileResult`].
#[derive(Clone, Debug, Serialize)]
pub struct JsonMatch {
    path: String,
    line_number: Option<u64>,
    column: Option<u64>,
    line: String,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    matched: Option<String>,
}

/// Every match found in one file.
#[derive(Clone, Debug, Serialize)]
pub struct JsonFileResult {
    path: String,
    matches: Vec<JsonMatch>,
    count: u64,
}

/// The single document emitted at the end of a batch-JSON run.
#[derive(Clone, Debug, Serialize)]
pub struct JsonDocument {
    files: Vec<JsonFileResult>,
    total_files: u64,
    total_matches: u64,
}

/// A builder for the batch JSON printer.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonBuilder {
    only_matching: bool,
    column: bool,
}

impl JsonBuilder {
    /// Create a new builder.
    pub fn new() -> JsonBuilder {
        JsonBuilder::default()
    }

    /// Populate the `match` field of every record with the matched
    /// substring.
    pub fn only_matching(&mut self, yes: bool) -> &mut JsonBuilder {
        self.only_matching = yes;
        self
    }

    /// Populate the `column` field of every record.
    pub fn column(&mut self, yes: bool) -> &mut JsonBuilder {
        self.column = yes;
        self
    }

    /// Build the accumulator. Unlike [`Standard`](crate::standard::Standard),
    /// this does not own a writer: results accumulate in memory across every
    /// file searched and are serialized only once, via [`Json::finish`].
    pub fn build(&self) -> Json {
        Json { config: *self, files: Vec::new(), stats: Stats::new() }
    }
}

/// The batch JSON printer: accumulates every file's matches in memory and
/// serializes a single document at the end of the run.
#[derive(Clone, Debug, Default)]
pub struct Json {
    config: JsonBuilder,
    files: Vec<JsonFileResult>,
    stats: Stats,
}

impl Json {
    /// Create a sink bound to a single file's path.
    pub fn sink<'p, 's, M: Matcher>(
        &'s mut self,
        matcher: &'s M,
        path: &'p Path,
    ) -> JsonSink<'p, 's, M> {
        JsonSink {
            json: self,
            matcher,
            path,
            matches: Vec::new(),
        }
    }

    /// The counters accumulated across every sink built from this printer.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Consume the accumulator and return its per-file results, e.g. to
    /// merge several workers' independent accumulators into one before
    /// the final [`Json::finish`]-style serialization.
    pub fn into_files(self) -> Vec<JsonFileResult> {
        self.files
    }

    /// Serialize the accumulated document and write it to `wtr`, consuming
    /// the accumulator. Called once, after every file has been searched.
    pub fn finish<W: io::Write>(self, mut wtr: W) -> io::Result<()> {
        let doc = JsonDocument {
            total_files: self.stats.files_with_matches(),
            total_matches: self.stats.matches(),
            files: self.files,
        };
        serde_json::to_writer(&mut wtr, &doc)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        wtr.write_all(b"\n")
    }
}

/// A per-file adapter implementing [`Sink`] that records matches into the
/// parent [`Json`] accumulator on [`Sink::finish`].
pub struct JsonSink<'p, 's, M> {
    json: &'s mut Json,
    matcher: &'s M,
    path: &'p Path,
    matches: Vec<JsonMatch>,
}

impl<'p, 's, M: Matcher> JsonSink<'p, 's, M> {
    fn record(&mut self, bytes: &[u8], line_number: Option<u64>) {
        let path = self.path.to_string_lossy().into_owned();
        let column = if self.json.config.column {
            self.matcher.find(bytes).ok().flatten().map(|m| m.start() as u64 + 1)
        } else {
            None
        };
        let matched = if self.json.config.only_matching {
            let mut first = None;
            let _ = find_iter_at(self.matcher, bytes, |m| {
                first = Some(String::from_utf8_lossy(&bytes[m.start()..m.end()]).into_owned());
                false
            });
            first
        } else {
            None
        };
        self.matches.push(JsonMatch {
            path,
            line_number,
            column,
            line: String::from_utf8_lossy(bytes).into_owned(),
            matched,
        });
    }
}

impl<'p, 's, M: Matcher> Sink for JsonSink<'p, 's, M> {
    type Error = io::Error;

    fn matched(
        &mut self,
        _searcher: &Searcher,
        mat: &SinkMatch<'_>,
    ) -> Result<bool, io::Error> {
        self.record(mat.bytes(), mat.line_number());
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
        let count = self.matches.len() as u64;
        self.json.stats.add(count);
        if count > 0 {
            self.json.files.push(JsonFileResult {
                path: self.path.to_string_lossy().into_owned(),
                matches: std::mem::take(&mut self.matches),
                count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_regex::RegexMatcher;
    use grep_searcher::SearcherBuilder;

    #[test]
    fn accumulates_and_serializes_one_document() {
        let matcher = RegexMatcher::new("fn").unwrap();
        let mut json = JsonBuilder::new().build();
        {
            let mut sink = json.sink(&matcher, Path::new("a.rs"));
            SearcherBuilder::new()
                .build()
                .search_reader(&matcher, b"fn a() {}\nlet x = 1;\nfn b() {}\n".as_ref(), &mut sink)
                .unwrap();
        }
        {
            let mut sink = json.sink(&matcher, Path::new("b.rs"));
            SearcherBuilder::new()
                .build()
                .search_reader(&matcher, b"nothing here\n".as_ref(), &mut sink)
                .unwrap();
        }
        assert_eq!(json.stats().files_with_matches(), 1);
        assert_eq!(json.stats().matches(), 2);

        let mut out = Vec::new();
        json.finish(&mut out).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["total_files"], 1);
        assert_eq!(v["total_matches"], 2);
        assert_eq!(v["files"][0]["path"], "a.rs");
        assert_eq!(v["files"][0]["count"], 2);
    }
}
