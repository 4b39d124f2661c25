/*!
Glob post-filters (`-g`) applied by the Walker to file paths after the
Ignore Stack and type filters have run. Unlike the Ignore Engine,
negation here means exclusion: a plain pattern is a positive
(include) filter, and one prefixed with `!` is a negative (exclude)
filter.
*/

use std::path::Path;

use globset::{Candidate, Error as GlobError, Glob, GlobBuilder};

/// A single override pattern: a compiled glob plus whether it's a
/// negation (exclude) pattern.
#[derive(Clone, Debug)]
struct Override {
    glob: Glob,
    negated: bool,
}

/// A set of glob post-filters built from `-g` patterns.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    patterns: Vec<Override>,
}

impl Overrides {
    /// An empty set of overrides, which admits every path.
    pub fn empty() -> Overrides {
        Overrides::default()
    }

    /// Returns true if no patterns were added.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Evaluate `path` per §4.4: a path matching any negation pattern
    /// is rejected; a path matching any positive pattern is accepted;
    /// otherwise it's accepted only if every supplied pattern was a
    /// negation (i.e. there were no positive patterns to satisfy).
    pub fn matched<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let candidate = Candidate::new(path.as_ref());
        let mut any_positive = false;
        let mut positive_matched = false;
        for pat in &self.patterns {
            let hit = pat.glob.is_match_candidate(&candidate);
            if pat.negated {
                if hit {
                    return false;
                }
            } else {
                any_positive = true;
                if hit {
                    positive_matched = true;
                }
            }
        }
        if any_positive {
            positive_matched
        } else {
            true
        }
    }
}

/// Builds a set of glob post-filters.
#[derive(Clone, Debug, Default)]
pub struct OverrideBuilder {
    patterns: Vec<Override>,
}

impl OverrideBuilder {
    /// Create an empty builder.
    pub fn new() -> OverrideBuilder {
        OverrideBuilder::default()
    }

    /// Add a single `-g` pattern. A leading `!` marks it as a negation
    /// (exclude) pattern.
    pub fn add(&mut self, pattern: &str) -> Result<&mut OverrideBuilder, GlobError> {
        let (negated, text) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let glob = GlobBuilder::new(text)
            .literal_separator(false)
            .build()?;
        self.patterns.push(Override { glob, negated });
        Ok(self)
    }

    /// Build the final [`Overrides`] set.
    pub fn build(&self) -> Overrides {
        Overrides { patterns: self.patterns.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_pattern_includes_matches_only() {
        let mut b = OverrideBuilder::new();
        b.add("*.rs").unwrap();
        let ov = b.build();
        assert!(ov.matched("main.rs"));
        assert!(!ov.matched("main.go"));
    }

    #[test]
    fn negated_pattern_excludes() {
        let mut b = OverrideBuilder::new();
        b.add("!*.log").unwrap();
        let ov = b.build();
        assert!(!ov.matched("debug.log"));
        assert!(ov.matched("main.go"));
    }

    #[test]
    fn mixed_patterns() {
        let mut b = OverrideBuilder::new();
        b.add("*.rs").unwrap();
        b.add("!generated.rs").unwrap();
        let ov = b.build();
        assert!(ov.matched("main.rs"));
        assert!(!ov.matched("generated.rs"));
        assert!(!ov.matched("main.go"));
    }

    #[test]
    fn empty_admits_everything() {
        let ov = Overrides::empty();
        assert!(ov.matched("anything"));
    }
}
