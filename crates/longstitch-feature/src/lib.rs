//! Feature-matching stitch strategy, consumed as a capability.
//!
//! Keypoint detection, descriptor extraction, and approximate-nearest-
//! neighbor matching live behind the [`FeatureIndex`] trait; this crate
//! does not implement them. What it owns is the adapter that turns any
//! such index into a [`longstitch_core::StitchEngine`], plus the tuning
//! parameters an index implementation is expected to honor.
//!
//! Why a second strategy at all: row-hash matching is robust for uniform
//! scrolling of static content but can fail on pages with moving content
//! (ads, animations) between captures, while feature matching handles
//! those yet occasionally fails on near-featureless regions. The session
//! layer starts with features when available and downgrades to hashing
//! the first time the index cannot place a frame.

mod capability;
mod params;
mod stitcher;

pub use capability::{AppendEdge, FeatureError, FeatureIndex};
pub use params::FeatureParams;
pub use stitcher::FeatureStitcher;
