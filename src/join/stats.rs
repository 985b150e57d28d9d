/// Counters describing what happened to every candidate pair in a run.
///
/// Every candidate returned by the index lands in exactly one of the
/// outcome buckets, so `candidates` equals the sum of the outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Submissions processed.
    pub submissions: usize,
    /// Submissions with empty geometry (no bounding box, no candidates).
    pub empty_submissions: usize,
    /// Block candidates returned by the index.
    pub candidates: usize,
    /// Candidates rejected by the exact overlap test.
    pub disjoint: usize,
    /// Candidates whose overlap test failed.
    pub overlap_errors: usize,
    /// Candidates whose overlay construction failed.
    pub overlay_errors: usize,
    /// Candidates whose overlay had no area.
    pub empty_overlays: usize,
    /// Candidates below the area-ratio threshold.
    pub negligible: usize,
    /// Candidates recorded as results.
    pub accepted: usize,
}

impl JoinStats {
    /// Number of candidates that did not produce a result.
    #[inline]
    pub fn rejected(&self) -> usize {
        self.disjoint + self.overlap_errors + self.overlay_errors + self.empty_overlays + self.negligible
    }

    /// Add the counters of `other` to this one.
    pub fn merge(&mut self, other: &JoinStats) {
        self.submissions += other.submissions;
        self.empty_submissions += other.empty_submissions;
        self.candidates += other.candidates;
        self.disjoint += other.disjoint;
        self.overlap_errors += other.overlap_errors;
        self.overlay_errors += other.overlay_errors;
        self.empty_overlays += other.empty_overlays;
        self.negligible += other.negligible;
        self.accepted += other.accepted;
    }
}
