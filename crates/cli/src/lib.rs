/*!
Small utilities shared by the search-oriented command line: escaping
patterns and replacements for diagnostics, and resolving the process's
stdout color policy against terminal detection.
*/

#![deny(missing_docs)]

mod escape;
mod wtr;

pub use crate::escape::{escape, unescape};
pub use crate::wtr::{flush, is_tty_stdout, resolve_color_choice, stdout, stdout_locked};
