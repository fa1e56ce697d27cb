//! Per-row frame fingerprints.
//!
//! Each row is reduced to the quantized average of its RGB channels and
//! hashed into a single integer. The signature is an approximate index used
//! to seed overlap search; collisions between unrelated rows are acceptable
//! and handled by the matcher's candidate selection.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::frame::{PixelFormat, RasterFrame};

/// Ordered per-row hashes of one frame, `len == frame.height()`.
pub type RowSignature = Vec<u64>;

/// Settings for [`compute_row_signature`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureParams {
    /// Pixels excluded from the right edge of every row, so a scrollbar
    /// that moves between captures does not change the row hash.
    #[serde(default = "default_ignore_right_margin")]
    pub ignore_right_margin: usize,
    /// Quantization bucket for the per-channel row averages. Averages are
    /// integer-divided by this and re-multiplied, coarsening them enough to
    /// tolerate anti-aliasing and compression noise.
    #[serde(default = "default_bucket_size")]
    pub bucket_size: u32,
}

fn default_ignore_right_margin() -> usize {
    20
}

fn default_bucket_size() -> u32 {
    8
}

impl Default for SignatureParams {
    fn default() -> Self {
        Self {
            ignore_right_margin: default_ignore_right_margin(),
            bucket_size: default_bucket_size(),
        }
    }
}

/// Compute the row signature of a frame.
///
/// Deterministic and pure. A frame whose usable width (after the right
/// margin) is zero yields an empty signature, as does a zero-height frame.
pub fn compute_row_signature(frame: &RasterFrame, params: &SignatureParams) -> RowSignature {
    let usable = frame.width().saturating_sub(params.ignore_right_margin);
    if usable == 0 || frame.height() == 0 {
        return Vec::new();
    }
    let bucket = u64::from(params.bucket_size.max(1));
    let channels = frame.format().channels();
    let gray = frame.format() == PixelFormat::Gray8;

    (0..frame.height())
        .into_par_iter()
        .map(|y| {
            let row = frame.row(y);
            let mut sums = [0u64; 3];
            for x in 0..usable {
                let px = &row[x * channels..x * channels + channels];
                if gray {
                    let v = u64::from(px[0]);
                    sums = [sums[0] + v, sums[1] + v, sums[2] + v];
                } else {
                    sums[0] += u64::from(px[0]);
                    sums[1] += u64::from(px[1]);
                    sums[2] += u64::from(px[2]);
                }
            }
            let n = usable as u64;
            let q = |sum: u64| (sum / n / bucket) * bucket;
            hash_rgb(q(sums[0]), q(sums[1]), q(sums[2]))
        })
        .collect()
}

#[inline]
fn hash_rgb(r: u64, g: u64, b: u64) -> u64 {
    r.wrapping_mul(73856093)
        .wrapping_add(g.wrapping_mul(19349663))
        .wrapping_add(b.wrapping_mul(83492791))
}
