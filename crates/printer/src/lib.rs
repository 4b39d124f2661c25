/*!
The Formatter: implementations of [`grep_searcher::Sink`] that render match
records in one of four formats — grouped (with file headings), no-heading,
batch JSON, or NDJSON — plus the `-l`/`-c`/`-q` summary modes, with optional
ANSI color, replacement and only-matching extraction.
*/

#![deny(missing_docs)]

mod color;
mod json;
mod json_stream;
mod standard;
mod stats;
mod summary;
mod util;

pub use crate::color::{default_color_specs, ColorError, ColorSpecs, UserColorSpec};
pub use crate::json::{Json, JsonBuilder, JsonDocument, JsonFileResult, JsonMatch, JsonSink};
pub use crate::json_stream::{JsonStream, JsonStreamBuilder, JsonStreamSink};
pub use crate::standard::{display_path, Standard, StandardBuilder, StandardSink};
pub use crate::stats::Stats;
pub use crate::summary::{Summary, SummaryBuilder, SummaryKind, SummarySink};
