/*!
Cross platform glob and glob-set matching.

This crate implements the "Glob Compiler" described for gitignore-style
pattern matching: it translates a single glob pattern into a compiled
regular expression and lets callers test candidate paths against one or
many such patterns at once.

Glob set matching is the process of matching a single candidate path
against one or more glob patterns simultaneously and determining which
of them (if any) matched, in the order they were added. This is the
primitive that the `ignore` crate builds the gitignore-style layered
matching described in this system's Ignore Engine on top of.
*/

#![deny(missing_docs)]

mod error;
mod glob;

pub use crate::error::{Error, ErrorKind};
pub use crate::glob::{Candidate, Glob, GlobBuilder};

/// A collection of glob patterns that can be matched against a
/// candidate path all at once.
///
/// Patterns are tested in the order they were added to the
/// [`GlobSetBuilder`], and [`GlobSet::matches_candidate_into`] reports
/// every pattern index that matched (not just the first or last),
/// letting the caller apply its own precedence (such as
/// last-match-wins).
#[derive(Clone, Debug)]
pub struct GlobSet {
    globs: Vec<Glob>,
}

impl GlobSet {
    /// Create an empty glob set that never matches anything.
    pub fn empty() -> GlobSet {
        GlobSet { globs: vec![] }
    }

    /// Returns true if and only if this set has zero globs.
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Returns the total number of globs in this set.
    pub fn len(&self) -> usize {
        self.globs.len()
    }

    /// Returns the indices, in ascending order, of every glob in this
    /// set that matches the given candidate.
    pub fn matches_candidate_into(
        &self,
        candidate: &Candidate<'_>,
        matches: &mut Vec<usize>,
    ) {
        matches.clear();
        for (i, glob) in self.globs.iter().enumerate() {
            if glob.is_match_candidate(candidate) {
                matches.push(i);
            }
        }
    }

    /// Returns true if and only if at least one glob in this set
    /// matches the given path.
    pub fn is_match<P: AsRef<std::path::Path>>(&self, path: P) -> bool {
        let cand = Candidate::new(path.as_ref());
        self.globs.iter().any(|g| g.is_match_candidate(&cand))
    }
}

/// Build a [`GlobSet`] from zero or more compiled globs.
#[derive(Clone, Debug, Default)]
pub struct GlobSetBuilder {
    globs: Vec<Glob>,
}

impl GlobSetBuilder {
    /// Create a new empty builder.
    pub fn new() -> GlobSetBuilder {
        GlobSetBuilder { globs: vec![] }
    }

    /// Add a pre-compiled glob to this builder.
    pub fn add(&mut self, glob: Glob) -> &mut GlobSetBuilder {
        self.globs.push(glob);
        self
    }

    /// Build the glob set from the globs added so far.
    pub fn build(&self) -> Result<GlobSet, Error> {
        Ok(GlobSet { globs: self.globs.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_match_wins_order() {
        let mut b = GlobSetBuilder::new();
        b.add(Glob::new("*.log").unwrap());
        b.add(Glob::new("important.log").unwrap());
        let set = b.build().unwrap();
        let cand = Candidate::new("important.log");
        let mut matches = vec![];
        set.matches_candidate_into(&cand, &mut matches);
        assert_eq!(matches, vec![0, 1]);
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = GlobSet::empty();
        assert!(!set.is_match("anything"));
    }
}
