use grep_matcher::{Match, Matcher};

/// Invoke `each` once for every non-overlapping match of `matcher` in
/// `bytes`, left to right. Stops early if `each` returns `false`.
///
/// Empty matches advance by one byte so iteration always terminates.
pub fn find_iter_at<M, F>(
    matcher: &M,
    bytes: &[u8],
    mut each: F,
) -> Result<(), M::Error>
where
    M: Matcher,
    F: FnMut(Match) -> bool,
{
    let mut at = 0;
    while at <= bytes.len() {
        let m = match matcher.find_at(bytes, at)? {
            Some(m) => m,
            None => break,
        };
        if !each(m) {
            break;
        }
        at = if m.is_empty() { m.end() + 1 } else { m.end() };
    }
    Ok(())
}

/// Applies a `--replace` substitution to a line, rewriting every match of
/// `matcher` into `replacement` (which may reference capture groups via
/// `$1`/`$name` syntax, per [`grep_matcher::interpolate`]).
///
/// Returns the rewritten bytes along with the byte ranges of each inserted
/// replacement, so the caller can still highlight them.
pub struct Replacer<'r> {
    replacement: &'r [u8],
}

impl<'r> Replacer<'r> {
    /// Create a new replacer that substitutes matches with `replacement`.
    pub fn new(replacement: &'r [u8]) -> Replacer<'r> {
        Replacer { replacement }
    }

    /// Replace every match of `matcher` in `line` with the configured
    /// replacement, expanding capture references.
    ///
    /// Returns the rewritten line and the ranges, within it, that came from
    /// the replacement text (for highlighting).
    pub fn replace_all<M: Matcher>(
        &self,
        matcher: &M,
        line: &[u8],
    ) -> Result<(Vec<u8>, Vec<Match>), M::Error> {
        let mut dst = Vec::with_capacity(line.len());
        let mut highlights = Vec::new();
        let mut caps = matcher.new_captures()?;
        let mut last_end = 0;
        let mut at = 0;
        while at <= line.len() {
            if !matcher.captures_at(line, at, &mut caps)? {
                break;
            }
            let m = caps.get(0).expect("capture group 0 is always present");
            dst.extend_from_slice(&line[last_end..m.start()]);

            let insert_at = dst.len();
            grep_matcher::interpolate(
                self.replacement,
                |i, dst| {
                    if let Some(cap) = caps.get(i) {
                        dst.extend_from_slice(&line[cap.start()..cap.end()]);
                    }
                },
                |name| matcher.capture_index(name),
                &mut dst,
            );
            highlights.push(Match::new(insert_at, dst.len()));

            last_end = m.end();
            at = if m.is_empty() { m.end() + 1 } else { m.end() };
        }
        dst.extend_from_slice(&line[last_end..]);
        Ok((dst, highlights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grep_regex::RegexMatcher;

    #[test]
    fn find_iter_at_collects_all_matches() {
        let matcher = RegexMatcher::new("a+").unwrap();
        let mut found = Vec::new();
        find_iter_at(&matcher, b"aa b a", |m| {
            found.push((m.start(), m.end()));
            true
        })
        .unwrap();
        assert_eq!(found, vec![(0, 2), (5, 6)]);
    }

    #[test]
    fn replace_all_substitutes_every_match() {
        let matcher = RegexMatcher::new(r"(\w+)@(\w+)").unwrap();
        let replacer = Replacer::new(b"$2:$1");
        let (out, _) =
            replacer.replace_all(&matcher, b"user@host other user@host").unwrap();
        assert_eq!(out, b"host:user other host:user");
    }
}
