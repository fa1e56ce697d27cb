use serde::{Deserialize, Serialize};

use crate::frame::{FrameError, RasterFrame};

/// What to do when every overlap candidate would make the composite shorter.
///
/// `Reject` is the safe default: the frame is discarded and the caller may
/// capture again. `TolerateBestEffort` accepts the longest candidate even
/// though it shrinks the result and can silently lose content; it exists
/// only as an explicit opt-in escape hatch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShrinkPolicy {
    #[default]
    Reject,
    TolerateBestEffort,
}

/// Per-frame result of a stitch attempt. All expected conditions are
/// variants here, never errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StitchOutcome {
    /// The frame was aligned and appended; the composite is now `new_height`
    /// rows tall and `overlap_len` rows of the frame were trimmed.
    Accepted {
        new_height: usize,
        overlap_len: usize,
    },
    /// No common rows were found; the frame was appended verbatim below the
    /// composite without trimming.
    NoOverlap,
    /// Every candidate would have shrunk the composite; the frame was
    /// discarded and the composite is unchanged.
    ShrinkRejected,
    /// The active engine could not place the frame at all. The session
    /// handles this internally (one-way downgrade to the hash engine).
    EngineFailure,
}

impl StitchOutcome {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, StitchOutcome::Accepted { .. })
    }
}

/// Hard errors. Expected stitch conditions are [`StitchOutcome`] variants;
/// only malformed input and engine-internal faults surface here, and they
/// are fatal for the offending frame, never for the session.
#[derive(thiserror::Error, Debug)]
pub enum StitchError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("stitch engine fault: {0}")]
    Engine(String),
}

/// A stitching strategy that incrementally grows a composite image.
///
/// Implementations own their composite and any per-session matching state.
/// Frames must be fed in strict arrival order; `&mut self` on
/// [`StitchEngine::add_frame`] gives the single-flight discipline the
/// algorithms rely on.
pub trait StitchEngine {
    /// Engine name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Align `frame` against the composite and append the new content.
    ///
    /// The engine is left consistent and continuable after every return,
    /// including errors: a failed frame never corrupts accumulated output.
    fn add_frame(&mut self, frame: &RasterFrame) -> Result<StitchOutcome, StitchError>;

    /// Current composite height in rows, zero before the first frame.
    fn composite_height(&self) -> usize;

    /// The current composite, `None` before the first frame.
    fn export(&self) -> Option<RasterFrame>;

    /// Discard all accumulated state. Idempotent.
    fn reset(&mut self);
}
