/*!
A facade crate that re-exports the matcher, regex, searcher, printer and
cli crates under a single namespace, for callers that want the whole
search stack without naming every sub-crate individually.
*/

#![deny(missing_docs)]

/// Utilities for search oriented command line applications.
pub mod cli {
    pub use grep_cli::*;
}

/// Interfaces shared by every matcher/searcher implementation.
pub mod matcher {
    pub use grep_matcher::*;
}

/// A [`grep_matcher::Matcher`] implementation built on Rust's `regex`
/// crate.
pub mod regex {
    pub use grep_regex::*;
}

/// The line-oriented, streaming searcher.
pub mod searcher {
    pub use grep_searcher::*;
}

/// Formatters that render search results as human-readable, JSON, or
/// NDJSON output.
pub mod printer {
    pub use grep_printer::*;
}
