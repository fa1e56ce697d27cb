use log::{debug, warn};

use longstitch_core::{
    compute_row_signature, FrameError, RasterFrame, ShrinkPolicy, SignatureParams, StitchEngine,
    StitchError, StitchOutcome,
};

use crate::matcher::{MatcherParams, OverlapCandidate, OverlapMatcher, OverlapSearch};

/// Row-hash stitching engine.
///
/// Owns the growing composite. Each new frame is fingerprinted, matched
/// against the composite tail by [`OverlapMatcher`], and spliced in: the
/// composite keeps its rows above the overlap, the frame contributes its
/// rows below it. A frame with no detectable overlap is appended verbatim.
pub struct HashStitcher {
    sig_params: SignatureParams,
    matcher: OverlapMatcher,
    shrink_policy: ShrinkPolicy,
    composite: Option<RasterFrame>,
    last_growth: Option<usize>,
}

impl HashStitcher {
    pub fn new(
        sig_params: SignatureParams,
        matcher_params: MatcherParams,
        shrink_policy: ShrinkPolicy,
    ) -> Self {
        Self {
            sig_params,
            matcher: OverlapMatcher::new(matcher_params),
            shrink_policy,
            composite: None,
            last_growth: None,
        }
    }

    /// Adopt an existing composite as the baseline, e.g. the output of a
    /// previous engine. Clears the growth history: the baseline's internal
    /// seams are unknown, so the narrow-retry window starts fresh.
    pub fn seed(&mut self, baseline: RasterFrame) {
        self.composite = Some(baseline);
        self.last_growth = None;
    }

    pub fn composite(&self) -> Option<&RasterFrame> {
        self.composite.as_ref()
    }

    /// Height gained by the most recent accepted stitch.
    pub fn last_growth(&self) -> Option<usize> {
        self.last_growth
    }

    fn splice(
        composite: &RasterFrame,
        frame: &RasterFrame,
        c: &OverlapCandidate,
    ) -> Result<RasterFrame, FrameError> {
        let prev_keep = c.prev_start + c.len;
        let next_skip = c.next_start + c.len;
        let mut merged = composite.crop_rows(0, prev_keep)?;
        merged.append_rows(frame, next_skip)?;
        Ok(merged)
    }
}

impl StitchEngine for HashStitcher {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn add_frame(&mut self, frame: &RasterFrame) -> Result<StitchOutcome, StitchError> {
        let Some(composite) = self.composite.as_ref() else {
            self.composite = Some(frame.clone());
            return Ok(StitchOutcome::Accepted {
                new_height: frame.height(),
                overlap_len: 0,
            });
        };
        if frame.width() != composite.width() {
            return Err(FrameError::WidthMismatch {
                expected: composite.width(),
                got: frame.width(),
            }
            .into());
        }
        if frame.format() != composite.format() {
            return Err(FrameError::FormatMismatch {
                expected: composite.format(),
                got: frame.format(),
            }
            .into());
        }

        let prev_sig = compute_row_signature(composite, &self.sig_params);
        let next_sig = compute_row_signature(frame, &self.sig_params);
        let old_height = composite.height();

        match self.matcher.find_overlap(&prev_sig, &next_sig, self.last_growth) {
            OverlapSearch::Match(c) => {
                let merged = Self::splice(composite, frame, &c)?;
                let new_height = merged.height();
                debug!(
                    "accepted {}-row overlap at composite row {} ({} -> {} rows)",
                    c.len, c.prev_start, old_height, new_height
                );
                self.last_growth = Some(new_height - old_height);
                self.composite = Some(merged);
                Ok(StitchOutcome::Accepted {
                    new_height,
                    overlap_len: c.len,
                })
            }
            OverlapSearch::NoOverlap => {
                let mut merged = composite.clone();
                merged.append_rows(frame, 0)?;
                debug!(
                    "no overlap, appending frame verbatim ({} -> {} rows)",
                    old_height,
                    merged.height()
                );
                self.last_growth = Some(frame.height());
                self.composite = Some(merged);
                Ok(StitchOutcome::NoOverlap)
            }
            OverlapSearch::AllShrink(best) => match self.shrink_policy {
                ShrinkPolicy::Reject => {
                    debug!(
                        "every candidate shrinks the composite, frame discarded \
                         (best was {} rows)",
                        best.len
                    );
                    Ok(StitchOutcome::ShrinkRejected)
                }
                ShrinkPolicy::TolerateBestEffort => {
                    let merged = Self::splice(composite, frame, &best)?;
                    let new_height = merged.height();
                    warn!(
                        "accepting shrinking {}-row overlap ({} -> {} rows)",
                        best.len, old_height, new_height
                    );
                    self.last_growth = Some(new_height.saturating_sub(old_height));
                    self.composite = Some(merged);
                    Ok(StitchOutcome::Accepted {
                        new_height,
                        overlap_len: best.len,
                    })
                }
            },
        }
    }

    fn composite_height(&self) -> usize {
        self.composite.as_ref().map_or(0, RasterFrame::height)
    }

    fn export(&self) -> Option<RasterFrame> {
        self.composite.clone()
    }

    fn reset(&mut self) {
        self.composite = None;
        self.last_growth = None;
    }
}
