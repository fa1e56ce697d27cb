use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use longstitch_core::RowSignature;

/// A contiguous run of equal row hashes between two signatures.
///
/// `prev_sig[prev_start + i] == next_sig[next_start + i]` for `i < len`,
/// with `prev_start` in absolute composite coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OverlapCandidate {
    pub prev_start: usize,
    pub next_start: usize,
    pub len: usize,
}

impl OverlapCandidate {
    /// Composite height that accepting this candidate would produce:
    /// the kept prefix of the composite plus the kept suffix of the frame.
    #[inline]
    pub fn predicted_height(&self, next_len: usize) -> usize {
        (self.prev_start + self.len) + (next_len - (self.next_start + self.len))
    }
}

/// Settings for [`OverlapMatcher`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatcherParams {
    /// Minimum overlap as a fraction of the shorter signature. Runs below
    /// this length are noise (a few coincidentally equal rows) and never
    /// become candidates.
    #[serde(default = "default_min_overlap_ratio")]
    pub min_overlap_ratio: f32,
    /// How many diverse candidates to keep for shrink-safe selection.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Upper bound on the rows fed to the O(n·m) search. The window keeps
    /// its last `max_match_rows` rows and the frame signature its first,
    /// which preserves any genuine tail/top overlap while bounding the DP
    /// table on pathologically tall frames.
    #[serde(default = "default_max_match_rows")]
    pub max_match_rows: usize,
}

fn default_min_overlap_ratio() -> f32 {
    0.01
}

fn default_top_k() -> usize {
    5
}

fn default_max_match_rows() -> usize {
    8192
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            min_overlap_ratio: default_min_overlap_ratio(),
            top_k: default_top_k(),
            max_match_rows: default_max_match_rows(),
        }
    }
}

/// Result of an overlap search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OverlapSearch {
    /// A candidate that does not shrink the composite.
    Match(OverlapCandidate),
    /// Candidates exist but every one of them would shrink the composite;
    /// carries the longest as a last-resort fallback for tolerant callers.
    AllShrink(OverlapCandidate),
    /// No run of common rows reached the minimum length.
    NoOverlap,
}

/// Finds the best non-shrinking overlap between a composite signature and
/// the signature of a newly captured frame.
///
/// Deterministic for identical inputs; never mutates its arguments.
#[derive(Clone, Debug)]
pub struct OverlapMatcher {
    params: MatcherParams,
}

impl OverlapMatcher {
    pub fn new(params: MatcherParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MatcherParams {
        &self.params
    }

    /// Search the tail of `prev` for the overlap with `next`.
    ///
    /// Only the suffix of `prev` of length `next.len()` is searched:
    /// sequential captures can only overlap the tail of the composite, and
    /// a tighter window avoids matching repeated page chrome further up.
    /// If every candidate would shrink the composite, the search is retried
    /// once over only the last `last_growth` rows (the region most recently
    /// appended and therefore most likely to hold the genuine overlap).
    pub fn find_overlap(
        &self,
        prev: &RowSignature,
        next: &RowSignature,
        last_growth: Option<usize>,
    ) -> OverlapSearch {
        if prev.is_empty() || next.is_empty() {
            return OverlapSearch::NoOverlap;
        }

        // Cheap pre-check: no shared hash values means no run of any length.
        let next_set: HashSet<u64> = next.iter().copied().collect();
        if !prev.iter().any(|h| next_set.contains(h)) {
            debug!("no common row hashes between composite and frame");
            return OverlapSearch::NoOverlap;
        }

        let window_start = prev.len().saturating_sub(next.len());
        let wide = self.window_candidates(prev, next, window_start);
        if wide.is_empty() {
            debug!("common hashes but no run above the minimum length");
            return OverlapSearch::NoOverlap;
        }
        if let Some(c) = first_non_shrinking(&wide, prev.len(), next.len()) {
            return OverlapSearch::Match(c);
        }

        debug!(
            "all {} candidates would shrink the composite ({} rows)",
            wide.len(),
            prev.len()
        );
        if let Some(growth) = last_growth.filter(|&g| g > 0) {
            let narrow_start = prev.len().saturating_sub(growth);
            if narrow_start > window_start {
                debug!("retrying over the last {growth} rows of the composite");
                let narrow = self.window_candidates(prev, next, narrow_start);
                if let Some(c) = first_non_shrinking(&narrow, prev.len(), next.len()) {
                    return OverlapSearch::Match(c);
                }
            }
        }

        OverlapSearch::AllShrink(wide[0])
    }

    /// Candidates within `prev[window_start..]`, longest first, with
    /// `prev_start` converted back to absolute composite coordinates.
    fn window_candidates(
        &self,
        prev: &[u64],
        next: &[u64],
        mut window_start: usize,
    ) -> Vec<OverlapCandidate> {
        let cap = self.params.max_match_rows.max(1);
        if prev.len() - window_start > cap {
            window_start = prev.len() - cap;
        }
        let window = &prev[window_start..];
        let next_view = &next[..next.len().min(cap)];

        let shorter = window.len().min(next_view.len());
        let min_len = ((shorter as f32 * self.params.min_overlap_ratio) as usize).max(1);

        let mut candidates = collect_candidates(window, next_view, min_len, self.params.top_k);
        for c in &mut candidates {
            c.prev_start += window_start;
        }
        for (rank, c) in candidates.iter().enumerate() {
            debug!(
                "candidate #{}: prev[{}..{}] == next[{}..{}] ({} rows)",
                rank + 1,
                c.prev_start,
                c.prev_start + c.len,
                c.next_start,
                c.next_start + c.len,
                c.len
            );
        }
        candidates
    }
}

fn first_non_shrinking(
    candidates: &[OverlapCandidate],
    prev_len: usize,
    next_len: usize,
) -> Option<OverlapCandidate> {
    candidates
        .iter()
        .find(|c| c.predicted_height(next_len) >= prev_len)
        .copied()
}

/// All common runs of at least `min_len` rows between `window` and `next`,
/// longest first, pruned for diversity.
///
/// A standard O(n·m) longest-common-substring DP with a rolling row, except
/// that every run is recorded where it ends instead of keeping only the
/// global maximum. Selection then walks runs longest-first and keeps one
/// only if it overlaps every already-kept run by at most half its own
/// length (in window coordinates), so `top_k` candidates land at distinct
/// positions rather than being shifted copies of the same region.
fn collect_candidates(
    window: &[u64],
    next: &[u64],
    min_len: usize,
    top_k: usize,
) -> Vec<OverlapCandidate> {
    let n = window.len();
    let m = next.len();
    if n == 0 || m == 0 || top_k == 0 {
        return Vec::new();
    }

    // (len, end_i, end_j), ends exclusive.
    let mut runs: Vec<(usize, usize, usize)> = Vec::new();
    let mut above = vec![0usize; m + 1];
    let mut current = vec![0usize; m + 1];
    for i in 1..=n {
        current[0] = 0;
        for j in 1..=m {
            if window[i - 1] == next[j - 1] {
                let len = above[j - 1] + 1;
                current[j] = len;
                let run_ends = i == n || j == m || window[i] != next[j];
                if run_ends && len >= min_len {
                    runs.push((len, i, j));
                }
            } else {
                current[j] = 0;
            }
        }
        std::mem::swap(&mut above, &mut current);
    }

    runs.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut kept: Vec<OverlapCandidate> = Vec::new();
    let mut used: Vec<(usize, usize)> = Vec::new();
    for (len, end_i, end_j) in runs {
        let start_i = end_i - len;
        let redundant = used.iter().any(|&(used_start, used_end)| {
            let shared = used_end.min(end_i).saturating_sub(used_start.max(start_i));
            shared * 2 > len
        });
        if redundant {
            continue;
        }
        kept.push(OverlapCandidate {
            prev_start: start_i,
            next_start: end_j - len,
            len,
        });
        used.push((start_i, end_i));
        if kept.len() >= top_k {
            break;
        }
    }
    kept
}
