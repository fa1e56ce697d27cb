use serde::{Deserialize, Serialize};

use longstitch_core::{ShrinkPolicy, SignatureParams};
use longstitch_feature::FeatureParams;
use longstitch_hash::MatcherParams;

/// Which stitching strategy a session may run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePreference {
    /// Feature matching when a capability is attached, downgrading to row
    /// hashing the first time it fails to place a frame. Without a
    /// capability this is plain row hashing. The downgrade is one-way for
    /// the life of the session.
    #[default]
    Auto,
    /// Feature matching only; placement failures surface to the caller.
    FeatureOnly,
    /// Row hashing only; an attached capability is never consulted.
    HashOnly,
}

/// Complete per-session settings. Every field has a working default, so a
/// JSON `{}` deserializes to the same configuration as [`Default`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Row fingerprinting, shared by both engines' frame validation.
    pub signature: SignatureParams,
    /// Overlap search of the hash engine.
    pub matcher: MatcherParams,
    /// Tuning for a feature index. Carried here so one JSON document can
    /// describe a whole session; the session itself takes a pre-built
    /// index, so whoever constructs it applies these values.
    pub feature: FeatureParams,
    pub engine_preference: EnginePreference,
    pub shrink_policy: ShrinkPolicy,
}
