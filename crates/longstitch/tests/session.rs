//! End-to-end session behavior over synthetic page content.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use longstitch::feature::{AppendEdge, FeatureError, FeatureIndex};
use longstitch::{
    EngineKind, EnginePreference, PixelFormat, RasterFrame, SessionConfig, StitchError,
    StitchOutcome, StitchSession,
};

// Every virtual document row gets a distinct flat color that survives
// quantization (all channels multiples of 8).
fn doc_row_color(row: usize) -> [u8; 3] {
    [
        ((row % 32) * 8) as u8,
        (((row / 32) % 32) * 8) as u8,
        (((row / 1024) % 32) * 8) as u8,
    ]
}

fn frame_of(width: usize, rows: impl IntoIterator<Item = usize>) -> RasterFrame {
    let mut data = Vec::new();
    let mut height = 0;
    for row in rows {
        let px = doc_row_color(row);
        for _ in 0..width {
            data.extend_from_slice(&px);
        }
        height += 1;
    }
    RasterFrame::new(width, height, PixelFormat::Rgb8, data).unwrap()
}

fn doc_frame(width: usize, rows: std::ops::Range<usize>) -> RasterFrame {
    frame_of(width, rows)
}

fn config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.signature.ignore_right_margin = 0;
    config
}

/// Feature index stub that keeps a real composite so a downgraded session
/// can continue from its pixels. Placements for frames after the first are
/// replayed from a script; a scripted `None` leaves the composite alone.
struct ScriptedFeatureIndex {
    placements: Vec<Option<usize>>,
    composite: Option<RasterFrame>,
    cleared: Arc<AtomicBool>,
}

impl ScriptedFeatureIndex {
    fn new(placements: Vec<Option<usize>>) -> Self {
        Self {
            placements,
            composite: None,
            cleared: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that outlives the boxed index, for observing `clear`.
    fn cleared_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cleared)
    }
}

impl FeatureIndex for ScriptedFeatureIndex {
    fn add_image(
        &mut self,
        frame: &RasterFrame,
        edge: AppendEdge,
    ) -> Result<Option<usize>, FeatureError> {
        assert_eq!(edge, AppendEdge::Bottom);
        let Some(composite) = self.composite.as_mut() else {
            self.composite = Some(frame.clone());
            return Ok(None);
        };
        match self.placements.remove(0) {
            Some(overlap) => {
                composite
                    .append_rows(frame, overlap)
                    .map_err(|e| FeatureError::Index(e.to_string()))?;
                Ok(Some(overlap))
            }
            None => Ok(None),
        }
    }

    fn export(&self) -> Result<Option<RasterFrame>, FeatureError> {
        Ok(self.composite.clone())
    }

    fn clear(&mut self) {
        self.composite = None;
        self.cleared.store(true, Ordering::SeqCst);
    }
}

#[test]
fn single_frame_round_trip() {
    let mut session = StitchSession::new(config());
    let frame = doc_frame(60, 0..40);
    let outcome = session.add_frame(&frame).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(session.export().unwrap(), frame);
    assert_eq!(session.engine(), EngineKind::Hash);
}

#[test]
fn sequential_captures_reconstruct_the_page() {
    // 100-pixel-wide, 50-row captures scrolled by 30 rows each.
    let mut session = StitchSession::new(config());
    session.add_frame(&doc_frame(100, 0..50)).unwrap();
    let outcome = session.add_frame(&doc_frame(100, 30..80)).unwrap();
    assert_eq!(
        outcome,
        StitchOutcome::Accepted {
            new_height: 80,
            overlap_len: 20
        }
    );
    session.add_frame(&doc_frame(100, 60..110)).unwrap();
    assert_eq!(session.export().unwrap(), doc_frame(100, 0..110));

    let stats = session.stats();
    assert_eq!(stats.frames_in, 3);
    assert_eq!(stats.accepted, 3);
    assert!(!stats.downgraded);
}

#[test]
fn composite_never_shrinks_under_default_policy() {
    let mut session = StitchSession::new(config());
    session.add_frame(&doc_frame(60, 0..80)).unwrap();

    // 35 unseen rows, then a repeat of composite rows 40..55: the only
    // match would cut the composite down to 55 rows.
    let trap = frame_of(60, (3000..3035).chain(40..55));
    let outcome = session.add_frame(&trap).unwrap();
    assert_eq!(outcome, StitchOutcome::ShrinkRejected);
    assert_eq!(session.composite_height(), 80);
    assert_eq!(session.stats().shrink_rejected, 1);

    // The session stays usable for the next capture.
    let outcome = session.add_frame(&doc_frame(60, 60..110)).unwrap();
    assert_eq!(
        outcome,
        StitchOutcome::Accepted {
            new_height: 110,
            overlap_len: 20
        }
    );
}

#[test]
fn repeated_page_header_does_not_truncate_content() {
    // Both captures start with the same 5-row sticky header; the genuine
    // 10-row content overlap must win over the header repeat.
    let header = 900..905;
    let mut session = StitchSession::new(config());
    session
        .add_frame(&frame_of(60, header.clone().chain(0..40)))
        .unwrap();
    let outcome = session
        .add_frame(&frame_of(60, header.clone().chain(30..70)))
        .unwrap();
    assert_eq!(
        outcome,
        StitchOutcome::Accepted {
            new_height: 75,
            overlap_len: 10
        }
    );
    assert_eq!(session.export().unwrap(), frame_of(60, header.chain(0..70)));
}

#[test]
fn feature_failure_downgrades_to_hash_and_continues() {
    // Five 50-row captures scrolled by 30; the index places the second
    // frame, then fails on the third.
    let index = ScriptedFeatureIndex::new(vec![Some(20), None]);
    let cleared = index.cleared_flag();
    let mut session = StitchSession::with_feature(config(), Box::new(index));

    session.add_frame(&doc_frame(60, 0..50)).unwrap();
    assert_eq!(session.engine(), EngineKind::Feature);
    let outcome = session.add_frame(&doc_frame(60, 30..80)).unwrap();
    assert_eq!(
        outcome,
        StitchOutcome::Accepted {
            new_height: 80,
            overlap_len: 20
        }
    );
    assert!(!cleared.load(Ordering::SeqCst));

    // The failed frame is retried on the hash engine against the feature
    // composite, in the same call, and the index is cleared: its frames
    // and descriptors are dead weight once hashing takes over.
    let outcome = session.add_frame(&doc_frame(60, 60..110)).unwrap();
    assert_eq!(
        outcome,
        StitchOutcome::Accepted {
            new_height: 110,
            overlap_len: 20
        }
    );
    assert_eq!(session.engine(), EngineKind::Hash);
    assert!(cleared.load(Ordering::SeqCst));

    session.add_frame(&doc_frame(60, 90..140)).unwrap();
    session.add_frame(&doc_frame(60, 120..170)).unwrap();
    assert_eq!(session.export().unwrap(), doc_frame(60, 0..170));

    let stats = session.stats();
    assert!(stats.downgraded);
    assert_eq!(stats.engine_failures, 1);
    assert_eq!(stats.accepted, 5);
    assert_eq!(stats.frames_in, 5);
}

#[test]
fn hash_only_preference_never_consults_the_index() {
    // An exhausted script panics on any placement attempt, so reaching the
    // third frame proves the index was never called.
    let index = ScriptedFeatureIndex::new(Vec::new());
    let mut cfg = config();
    cfg.engine_preference = EnginePreference::HashOnly;
    let mut session = StitchSession::with_feature(cfg, Box::new(index));

    session.add_frame(&doc_frame(60, 0..50)).unwrap();
    assert_eq!(session.engine(), EngineKind::Hash);
    session.add_frame(&doc_frame(60, 30..80)).unwrap();
    session.add_frame(&doc_frame(60, 60..110)).unwrap();
    assert_eq!(session.composite_height(), 110);
}

#[test]
fn feature_only_surfaces_placement_failure() {
    let index = ScriptedFeatureIndex::new(vec![None]);
    let mut cfg = config();
    cfg.engine_preference = EnginePreference::FeatureOnly;
    let mut session = StitchSession::with_feature(cfg, Box::new(index));

    session.add_frame(&doc_frame(60, 0..50)).unwrap();
    let outcome = session.add_frame(&doc_frame(60, 30..80)).unwrap();
    assert_eq!(outcome, StitchOutcome::EngineFailure);
    assert_eq!(session.engine(), EngineKind::Feature);
    assert!(!session.stats().downgraded);
    assert_eq!(session.composite_height(), 50);
}

#[test]
fn feature_only_without_index_is_an_engine_fault() {
    let mut cfg = config();
    cfg.engine_preference = EnginePreference::FeatureOnly;
    let mut session = StitchSession::new(cfg);
    let err = session.add_frame(&doc_frame(60, 0..50)).unwrap_err();
    assert!(matches!(err, StitchError::Engine(_)));
}

#[test]
fn reset_starts_a_fresh_capture() {
    let mut session = StitchSession::new(config());
    session.add_frame(&doc_frame(60, 0..50)).unwrap();
    session.reset();
    session.reset(); // idempotent
    assert!(session.export().is_none());
    assert_eq!(session.engine(), EngineKind::Unresolved);
    assert_eq!(session.stats().frames_in, 0);

    session.add_frame(&doc_frame(60, 500..540)).unwrap();
    assert_eq!(session.export().unwrap(), doc_frame(60, 500..540));
}

#[test]
fn width_mismatch_rejects_frame_but_not_session() {
    let mut session = StitchSession::new(config());
    session.add_frame(&doc_frame(60, 0..50)).unwrap();
    assert!(session.add_frame(&doc_frame(59, 30..80)).is_err());
    // Same session keeps stitching correctly sized frames.
    let outcome = session.add_frame(&doc_frame(60, 30..80)).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(session.composite_height(), 80);
}

#[test]
fn stitch_frames_batches_a_whole_capture() {
    let frames = vec![
        doc_frame(60, 0..50),
        doc_frame(60, 30..80),
        doc_frame(60, 60..110),
    ];
    let composite = longstitch::stitch_frames(config(), &frames).unwrap().unwrap();
    assert_eq!(composite, doc_frame(60, 0..110));

    assert!(longstitch::stitch_frames(config(), &[]).unwrap().is_none());
}
