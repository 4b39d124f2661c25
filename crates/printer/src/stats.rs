/// Aggregated counters produced by a run of the printer across every file
/// searched.
///
/// A `Stats` value accumulates as each file finishes; the final value backs
/// the `summary` record in NDJSON mode and the `total_files`/`total_matches`
/// fields of the batch JSON document.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    files_with_matches: u64,
    matches: u64,
}

impl Stats {
    /// A zeroed counter set.
    pub fn new() -> Stats {
        Stats::default()
    }

    /// The number of files that had at least one match.
    pub fn files_with_matches(&self) -> u64 {
        self.files_with_matches
    }

    /// The total number of matching lines across every file.
    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Fold in the result of searching one file: its match count.
    pub fn add(&mut self, match_count: u64) {
        if match_count > 0 {
            self.files_with_matches += 1;
        }
        self.matches += match_count;
    }

    /// Fold another counter set into this one, e.g. when a collector
    /// merges per-worker totals computed from independent printers.
    pub fn merge(&mut self, other: Stats) {
        self.files_with_matches += other.files_with_matches;
        self.matches += other.matches;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_both_counters() {
        let mut a = Stats::new();
        a.add(2);
        let mut b = Stats::new();
        b.add(0);
        b.add(3);
        a.merge(b);
        assert_eq!(a.files_with_matches(), 2);
        assert_eq!(a.matches(), 5);
    }
}
