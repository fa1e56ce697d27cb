use log::{info, warn};

use longstitch_core::{RasterFrame, StitchEngine, StitchError, StitchOutcome};
use longstitch_feature::{FeatureIndex, FeatureStitcher};
use longstitch_hash::HashStitcher;

use crate::config::{EnginePreference, SessionConfig};

/// Engine currently driving a session.
///
/// `Unresolved` only exists before the first frame; the first `add_frame`
/// call commits to `Feature` or `Hash`, and the only transition after that
/// is the one-way downgrade `Feature -> Hash`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineKind {
    Unresolved,
    Feature,
    Hash,
}

impl EngineKind {
    fn label(self) -> &'static str {
        match self {
            EngineKind::Unresolved => "unresolved",
            EngineKind::Feature => "feature",
            EngineKind::Hash => "hash",
        }
    }
}

/// Running per-session counters, for diagnostics and progress UIs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SessionStats {
    /// Frames submitted to `add_frame`, including rejected ones.
    pub frames_in: usize,
    pub accepted: usize,
    pub no_overlap: usize,
    pub shrink_rejected: usize,
    /// Feature placement failures, whether or not they triggered a
    /// downgrade.
    pub engine_failures: usize,
    /// The session has permanently switched from features to hashing.
    pub downgraded: bool,
}

/// One scroll-capture session: owns the composite, routes frames to the
/// active engine, and handles the feature-to-hash fallback.
///
/// Frames must be submitted in strict capture order, one at a time; the
/// `&mut self` receiver on [`StitchSession::add_frame`] enforces that
/// single-flight discipline at compile time. Wrap the session in a mutex or
/// an actor if captures can be submitted concurrently.
pub struct StitchSession {
    config: SessionConfig,
    feature: Option<FeatureStitcher>,
    hash: HashStitcher,
    active: EngineKind,
    stats: SessionStats,
}

impl StitchSession {
    /// A session without a feature capability; all frames go through the
    /// row-hash engine (unless the preference is `FeatureOnly`, in which
    /// case `add_frame` reports an engine fault).
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            feature: None,
            hash: HashStitcher::new(config.signature, config.matcher, config.shrink_policy),
            active: EngineKind::Unresolved,
            stats: SessionStats::default(),
        }
    }

    /// A session with a feature index attached. Under the default `Auto`
    /// preference the index drives stitching until it first fails.
    pub fn with_feature(config: SessionConfig, index: Box<dyn FeatureIndex>) -> Self {
        let mut session = Self::new(config);
        session.feature = Some(FeatureStitcher::new(index));
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> EngineKind {
        self.active
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Align the next captured frame and fold it into the composite.
    ///
    /// Expected conditions (no overlap, shrink rejection, feature placement
    /// failure) come back as [`StitchOutcome`] variants; `Err` is reserved
    /// for malformed frames and engine faults, and the session stays
    /// consistent and continuable after either.
    pub fn add_frame(&mut self, frame: &RasterFrame) -> Result<StitchOutcome, StitchError> {
        self.stats.frames_in += 1;
        if self.active == EngineKind::Unresolved {
            self.active = self.resolve_engine()?;
            info!("session resolved to the {} engine", self.active.label());
        }

        let outcome = match self.active {
            EngineKind::Feature => self.feature_frame(frame)?,
            _ => self.hash.add_frame(frame)?,
        };

        match outcome {
            StitchOutcome::Accepted { .. } => self.stats.accepted += 1,
            StitchOutcome::NoOverlap => self.stats.no_overlap += 1,
            StitchOutcome::ShrinkRejected => self.stats.shrink_rejected += 1,
            StitchOutcome::EngineFailure => self.stats.engine_failures += 1,
        }
        Ok(outcome)
    }

    /// Current composite height in rows, zero before the first frame.
    pub fn composite_height(&self) -> usize {
        match self.active {
            EngineKind::Feature => self
                .feature
                .as_ref()
                .map_or(0, StitchEngine::composite_height),
            EngineKind::Hash => self.hash.composite_height(),
            EngineKind::Unresolved => 0,
        }
    }

    /// The stitched result so far, `None` before the first frame.
    pub fn export(&self) -> Option<RasterFrame> {
        match self.active {
            EngineKind::Feature => self.feature.as_ref().and_then(StitchEngine::export),
            EngineKind::Hash => self.hash.export(),
            EngineKind::Unresolved => None,
        }
    }

    /// Discard all accumulated state; the next frame starts a fresh capture
    /// with the same configuration and capability. Idempotent.
    pub fn reset(&mut self) {
        self.hash.reset();
        if let Some(feature) = self.feature.as_mut() {
            feature.reset();
        }
        self.active = EngineKind::Unresolved;
        self.stats = SessionStats::default();
    }

    /// Abort the capture. Identical to [`StitchSession::reset`]; results of
    /// any `add_frame` still running elsewhere must be dropped by the
    /// caller.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn resolve_engine(&self) -> Result<EngineKind, StitchError> {
        match (self.config.engine_preference, self.feature.is_some()) {
            (EnginePreference::HashOnly, _) | (EnginePreference::Auto, false) => {
                Ok(EngineKind::Hash)
            }
            (EnginePreference::Auto, true) | (EnginePreference::FeatureOnly, true) => {
                Ok(EngineKind::Feature)
            }
            (EnginePreference::FeatureOnly, false) => Err(StitchError::Engine(
                "feature engine requested but no feature index is attached".into(),
            )),
        }
    }

    fn feature_frame(&mut self, frame: &RasterFrame) -> Result<StitchOutcome, StitchError> {
        let Some(feature) = self.feature.as_mut() else {
            return Err(StitchError::Engine(
                "feature engine active but no feature index is attached".into(),
            ));
        };
        let result = feature.add_frame(frame);
        if self.config.engine_preference == EnginePreference::FeatureOnly {
            return result;
        }
        match result {
            Ok(StitchOutcome::EngineFailure) => {
                self.downgrade_and_retry(frame, "index returned no placement")
            }
            Err(StitchError::Engine(reason)) => self.downgrade_and_retry(frame, &reason),
            other => other,
        }
    }

    /// One-way switch to the hash engine: the feature composite built so
    /// far becomes the hash baseline and the failed frame is retried there.
    /// The index is cleared afterwards; it holds the capture's pixels and
    /// descriptors and is never consulted again this session.
    fn downgrade_and_retry(
        &mut self,
        frame: &RasterFrame,
        reason: &str,
    ) -> Result<StitchOutcome, StitchError> {
        warn!("feature engine failed ({reason}), switching to row hashing for this session");
        self.stats.engine_failures += 1;
        self.stats.downgraded = true;
        if let Some(feature) = self.feature.as_mut() {
            if let Some(baseline) = feature.export() {
                self.hash.seed(baseline);
            }
            feature.reset();
        }
        self.active = EngineKind::Hash;
        self.hash.add_frame(frame)
    }
}

/// Stitch an ordered batch of frames in one call.
///
/// Frames the engine rejects (shrinking matches under the default policy)
/// are skipped, matching what an interactive session would do. Returns
/// `None` for an empty batch.
pub fn stitch_frames(
    config: SessionConfig,
    frames: &[RasterFrame],
) -> Result<Option<RasterFrame>, StitchError> {
    let mut session = StitchSession::new(config);
    for frame in frames {
        session.add_frame(frame)?;
    }
    Ok(session.export())
}
