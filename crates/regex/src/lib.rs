/*!
An implementation of `grep-matcher`'s `Matcher` trait for Rust's regex
engine, with the case-folding, word-boundary and fixed-string options
the Line Scanner needs.
*/

#![deny(missing_docs)]

mod config;
mod error;
mod matcher;

pub use crate::error::{Error, ErrorKind};
pub use crate::matcher::{RegexCaptures, RegexMatcher, RegexMatcherBuilder};
