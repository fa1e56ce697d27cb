use log::debug;

use longstitch_core::{
    FrameError, PixelFormat, RasterFrame, StitchEngine, StitchError, StitchOutcome,
};

use crate::capability::{AppendEdge, FeatureIndex};

/// Adapter from a [`FeatureIndex`] capability to the engine interface.
///
/// The index owns the pixels; this type only validates frames, keeps the
/// height ledger, and maps the index's tri-state placement result onto
/// [`StitchOutcome`]. A `None` placement after the first frame becomes
/// [`StitchOutcome::EngineFailure`] so the session can switch strategies.
pub struct FeatureStitcher {
    index: Box<dyn FeatureIndex>,
    shape: Option<(usize, PixelFormat)>,
    height: usize,
}

impl FeatureStitcher {
    pub fn new(index: Box<dyn FeatureIndex>) -> Self {
        Self {
            index,
            shape: None,
            height: 0,
        }
    }
}

impl StitchEngine for FeatureStitcher {
    fn name(&self) -> &'static str {
        "feature"
    }

    fn add_frame(&mut self, frame: &RasterFrame) -> Result<StitchOutcome, StitchError> {
        if let Some((width, format)) = self.shape {
            if frame.width() != width {
                return Err(FrameError::WidthMismatch {
                    expected: width,
                    got: frame.width(),
                }
                .into());
            }
            if frame.format() != format {
                return Err(FrameError::FormatMismatch {
                    expected: format,
                    got: frame.format(),
                }
                .into());
            }
        }

        let placed = self
            .index
            .add_image(frame, AppendEdge::Bottom)
            .map_err(|e| StitchError::Engine(e.to_string()))?;

        if self.shape.is_none() {
            // First frame: the index has nothing to match against, so a
            // `None` placement here simply seeds the composite.
            self.shape = Some((frame.width(), frame.format()));
            self.height = frame.height();
            return Ok(StitchOutcome::Accepted {
                new_height: self.height,
                overlap_len: 0,
            });
        }

        match placed {
            Some(overlap) => {
                let grown = frame.height().saturating_sub(overlap);
                self.height += grown;
                debug!(
                    "placed frame with {overlap}-row overlap ({} rows total)",
                    self.height
                );
                Ok(StitchOutcome::Accepted {
                    new_height: self.height,
                    overlap_len: overlap,
                })
            }
            None => {
                debug!("index could not place frame, reporting engine failure");
                Ok(StitchOutcome::EngineFailure)
            }
        }
    }

    fn composite_height(&self) -> usize {
        self.height
    }

    fn export(&self) -> Option<RasterFrame> {
        self.index.export().ok().flatten()
    }

    fn reset(&mut self) {
        self.index.clear();
        self.shape = None;
        self.height = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FeatureError;

    // Index stub that replays a script of placement results and renders a
    // fixed-height gray composite on export.
    struct ScriptedIndex {
        script: Vec<Result<Option<usize>, FeatureError>>,
        frames: usize,
        width: usize,
    }

    impl ScriptedIndex {
        fn new(script: Vec<Result<Option<usize>, FeatureError>>) -> Self {
            Self {
                script,
                frames: 0,
                width: 0,
            }
        }
    }

    impl FeatureIndex for ScriptedIndex {
        fn add_image(
            &mut self,
            frame: &RasterFrame,
            edge: AppendEdge,
        ) -> Result<Option<usize>, FeatureError> {
            assert_eq!(edge, AppendEdge::Bottom);
            let result = self.script.remove(0);
            if result.is_ok() {
                self.frames += 1;
                self.width = frame.width();
            }
            result
        }

        fn export(&self) -> Result<Option<RasterFrame>, FeatureError> {
            if self.frames == 0 {
                return Ok(None);
            }
            let data = vec![128u8; self.width * self.frames];
            Ok(Some(
                RasterFrame::new(self.width, self.frames, PixelFormat::Gray8, data).unwrap(),
            ))
        }

        fn clear(&mut self) {
            self.frames = 0;
        }
    }

    fn gray_frame(width: usize, height: usize, fill: u8) -> RasterFrame {
        RasterFrame::new(width, height, PixelFormat::Gray8, vec![fill; width * height]).unwrap()
    }

    #[test]
    fn first_frame_seeds_height_even_without_placement() {
        let mut s = FeatureStitcher::new(Box::new(ScriptedIndex::new(vec![Ok(None)])));
        let outcome = s.add_frame(&gray_frame(40, 50, 10)).unwrap();
        assert_eq!(
            outcome,
            StitchOutcome::Accepted {
                new_height: 50,
                overlap_len: 0
            }
        );
        assert_eq!(s.composite_height(), 50);
    }

    #[test]
    fn placements_accumulate_height() {
        let mut s = FeatureStitcher::new(Box::new(ScriptedIndex::new(vec![
            Ok(None),
            Ok(Some(20)),
            Ok(Some(35)),
        ])));
        s.add_frame(&gray_frame(40, 50, 10)).unwrap();
        let second = s.add_frame(&gray_frame(40, 50, 20)).unwrap();
        assert_eq!(
            second,
            StitchOutcome::Accepted {
                new_height: 80,
                overlap_len: 20
            }
        );
        let third = s.add_frame(&gray_frame(40, 50, 30)).unwrap();
        assert_eq!(
            third,
            StitchOutcome::Accepted {
                new_height: 95,
                overlap_len: 35
            }
        );
    }

    #[test]
    fn unplaced_frame_reports_engine_failure() {
        let mut s = FeatureStitcher::new(Box::new(ScriptedIndex::new(vec![Ok(None), Ok(None)])));
        s.add_frame(&gray_frame(40, 50, 10)).unwrap();
        let outcome = s.add_frame(&gray_frame(40, 50, 20)).unwrap();
        assert_eq!(outcome, StitchOutcome::EngineFailure);
        // Height ledger is untouched by the failed frame.
        assert_eq!(s.composite_height(), 50);
    }

    #[test]
    fn index_fault_surfaces_as_error() {
        let mut s = FeatureStitcher::new(Box::new(ScriptedIndex::new(vec![
            Ok(None),
            Err(FeatureError::Index("descriptor buffer corrupt".into())),
        ])));
        s.add_frame(&gray_frame(40, 50, 10)).unwrap();
        let err = s.add_frame(&gray_frame(40, 50, 20)).unwrap_err();
        assert!(matches!(err, StitchError::Engine(_)));
    }

    #[test]
    fn width_mismatch_never_reaches_the_index() {
        let mut s = FeatureStitcher::new(Box::new(ScriptedIndex::new(vec![Ok(None)])));
        s.add_frame(&gray_frame(40, 50, 10)).unwrap();
        let err = s.add_frame(&gray_frame(41, 50, 20)).unwrap_err();
        assert!(matches!(
            err,
            StitchError::Frame(FrameError::WidthMismatch {
                expected: 40,
                got: 41
            })
        ));
    }

    #[test]
    fn reset_clears_index_and_height() {
        let mut s = FeatureStitcher::new(Box::new(ScriptedIndex::new(vec![Ok(None), Ok(None)])));
        s.add_frame(&gray_frame(40, 50, 10)).unwrap();
        s.reset();
        assert_eq!(s.composite_height(), 0);
        assert!(s.export().is_none());
        // The next frame is a first frame again.
        let outcome = s.add_frame(&gray_frame(30, 20, 5)).unwrap();
        assert!(outcome.is_accepted());
    }
}
