use serde::{Deserialize, Serialize};

/// Tuning for a [`crate::FeatureIndex`] implementation.
///
/// The core never interprets these values itself; they are passed to the
/// capability when the session constructs it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureParams {
    /// Downscale factor applied before keypoint detection (0.0-1.0).
    /// Higher is more precise but slower.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,
    /// Lower bound on the downscaled edge length, in pixels.
    #[serde(default = "default_min_sample_size")]
    pub min_sample_size: u32,
    /// Upper bound on the downscaled edge length, in pixels.
    #[serde(default = "default_max_sample_size")]
    pub max_sample_size: u32,
    /// Corner detector response threshold; lower detects more keypoints.
    #[serde(default = "default_corner_threshold")]
    pub corner_threshold: u32,
    /// Descriptor patch size in pixels.
    #[serde(default = "default_descriptor_patch_size")]
    pub descriptor_patch_size: u32,
    /// Rebuild the ANN index only after the composite has changed by at
    /// least this many pixels. 1 rebuilds on every frame.
    #[serde(default = "default_min_size_delta")]
    pub min_size_delta: u32,
    /// Probe the opposite composite edge when the expected edge yields no
    /// match.
    #[serde(default = "default_try_rollback")]
    pub try_rollback: bool,
    /// Descriptor distance bound for accepting a match (0.05-0.3); lower
    /// is stricter.
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,
    /// ANN search width (16-128); higher is more accurate but slower.
    #[serde(default = "default_ef_search")]
    pub ef_search: u32,
}

fn default_sample_rate() -> f32 {
    0.6
}

fn default_min_sample_size() -> u32 {
    300
}

fn default_max_sample_size() -> u32 {
    800
}

fn default_corner_threshold() -> u32 {
    30
}

fn default_descriptor_patch_size() -> u32 {
    9
}

fn default_min_size_delta() -> u32 {
    1
}

fn default_try_rollback() -> bool {
    true
}

fn default_distance_threshold() -> f32 {
    0.1
}

fn default_ef_search() -> u32 {
    32
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            min_sample_size: default_min_sample_size(),
            max_sample_size: default_max_sample_size(),
            corner_threshold: default_corner_threshold(),
            descriptor_patch_size: default_descriptor_patch_size(),
            min_size_delta: default_min_size_delta(),
            try_rollback: default_try_rollback(),
            distance_threshold: default_distance_threshold(),
            ef_search: default_ef_search(),
        }
    }
}
