//! Row-hash overlap matching for scroll-capture stitching.
//!
//! Strategy: fingerprint every row of both images
//! ([`longstitch_core::compute_row_signature`]), then find the best
//! contiguous run of equal fingerprints between the tail of the composite
//! and the new frame. Because captures are strictly sequential, a new frame
//! can only overlap the tail of the composite, never an arbitrary earlier
//! region; restricting the search window this way avoids false matches on
//! repeated page elements such as sticky headers.
//!
//! 1. Dynamic-programming longest-common-run search over the window,
//!    recording every run above a minimum length, not just the longest.
//! 2. Longest-first diversity selection across candidates.
//! 3. Shrink-safe acceptance: the first candidate that does not make the
//!    composite shorter wins, with one retry over a narrower window before
//!    giving up.

mod matcher;
mod stitcher;

pub use matcher::{MatcherParams, OverlapCandidate, OverlapMatcher, OverlapSearch};
pub use stitcher::HashStitcher;
