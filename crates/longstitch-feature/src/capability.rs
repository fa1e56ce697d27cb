use longstitch_core::RasterFrame;

/// Which edge of the accumulated composite a frame is expected to extend.
///
/// Downward scrolling appends at `Bottom`; an index that supports rollback
/// may probe `Top` when the bottom queue yields no match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AppendEdge {
    Top,
    Bottom,
}

/// Faults inside a feature index implementation.
///
/// "No match for this frame" is *not* an error; it is the `Ok(None)`
/// return of [`FeatureIndex::add_image`].
#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    #[error("feature index rejected frame: {0}")]
    Index(String),

    #[error("feature index could not render its composite: {0}")]
    Export(String),
}

/// A persistent, incrementally updated keypoint/descriptor index.
///
/// Implementations keep descriptors of the composite's edge regions in an
/// approximate-nearest-neighbor structure, rebuilt only when the
/// accumulated size change exceeds a threshold rather than per frame, and
/// accept a match when descriptor distance falls under a configured bound
/// (see [`crate::FeatureParams`]).
pub trait FeatureIndex {
    /// Register a frame and try to place it against the indexed composite.
    ///
    /// Returns the overlap in rows when the frame was placed, `None` when
    /// no acceptable match exists. The very first frame necessarily
    /// returns `None`; callers must not treat that as failure.
    fn add_image(
        &mut self,
        frame: &RasterFrame,
        edge: AppendEdge,
    ) -> Result<Option<usize>, FeatureError>;

    /// Render the current composite, `None` if no frame was ever added.
    fn export(&self) -> Result<Option<RasterFrame>, FeatureError>;

    /// Drop all indexed frames and descriptors. Idempotent.
    fn clear(&mut self);
}
