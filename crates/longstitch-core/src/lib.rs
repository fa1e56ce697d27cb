//! Core types for scroll-capture stitching.
//!
//! This crate is intentionally small and engine-agnostic. It defines the
//! raster frame container that captures hand to a stitch session, the
//! per-row signature used by the hash matcher, and the `StitchEngine`
//! seam both matching strategies implement. It does *not* depend on any
//! concrete image codec or feature detector.

mod engine;
mod frame;
mod logger;
mod signature;

pub use engine::{ShrinkPolicy, StitchEngine, StitchError, StitchOutcome};
pub use frame::{FrameError, PixelFormat, RasterFrame};
pub use logger::init_with_level;
pub use signature::{compute_row_signature, RowSignature, SignatureParams};
