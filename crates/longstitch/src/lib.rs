//! High-level facade crate for the `longstitch-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying engine crates
//! - the [`StitchSession`] state machine that picks an engine per session
//!   and downgrades from feature matching to row hashing on failure
//! - (feature-gated) conversions to and from [`image`] buffers and a small
//!   CLI for stitching capture files from disk.
//!
//! ## Quickstart
//!
//! ```
//! use longstitch::{stitch_frames, SessionConfig};
//! use longstitch::core::{PixelFormat, RasterFrame};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Two 4x3 frames whose rows overlap by one.
//! let row = |v: u8| vec![v; 4 * 3];
//! let frame = |rows: &[u8]| {
//!     let data: Vec<u8> = rows.iter().flat_map(|&v| row(v)).collect();
//!     RasterFrame::new(4, rows.len(), PixelFormat::Rgb8, data)
//! };
//! let first = frame(&[10, 20, 30])?;
//! let second = frame(&[30, 40, 50])?;
//!
//! let mut config = SessionConfig::default();
//! config.signature.ignore_right_margin = 0;
//! let composite = stitch_frames(config, &[first, second])?.unwrap();
//! assert_eq!(composite.height(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `longstitch::core`: frames, row signatures, the engine trait, outcomes.
//! - `longstitch::hash`: overlap search and the row-hash engine.
//! - `longstitch::feature`: the feature-index capability interface and its
//!   engine adapter.
//! - `longstitch::convert` (feature `image`): `image` buffer conversions.

pub use longstitch_core as core;
pub use longstitch_feature as feature;
pub use longstitch_hash as hash;

pub use longstitch_core::{
    PixelFormat, RasterFrame, ShrinkPolicy, StitchEngine, StitchError, StitchOutcome,
};
pub use longstitch_feature::{FeatureIndex, FeatureParams};
pub use longstitch_hash::MatcherParams;

mod config;
mod session;

pub use config::{EnginePreference, SessionConfig};
pub use session::{stitch_frames, EngineKind, SessionStats, StitchSession};

#[cfg(feature = "image")]
pub mod convert;
