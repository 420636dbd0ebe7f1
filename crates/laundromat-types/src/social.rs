//! Social score: the public-reputation metric of a laundromat.
//!
//! Older server builds send the score as a bare number; newer ones send a
//! breakdown with per-component scores and tier information. Both shapes
//! deserialize into [`SocialScore`], and every consumer reads it through
//! [`SocialScore::normalize`] instead of matching on the shape itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reputation tier reported alongside a structured social score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SocialTier {
    /// Display name of the current tier (e.g. `"Community Favorite"`).
    #[serde(default)]
    pub name: String,
    /// Score at which the current tier starts.
    #[serde(default)]
    pub min_score: f64,
    /// Name of the next tier, if there is one.
    #[serde(default)]
    pub next_tier: Option<String>,
    /// Score required to reach the next tier.
    #[serde(default)]
    pub next_threshold: Option<f64>,
}

/// Social score in either of the two wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SocialScore {
    /// A single number.
    Scalar(f64),
    /// A breakdown with components and tier.
    Structured {
        /// Aggregate score.
        total_score: f64,
        /// Per-component contributions (cleanliness, community, ...).
        #[serde(default)]
        components: BTreeMap<String, f64>,
        /// Current tier, when the server reports one.
        #[serde(default)]
        tier_info: Option<SocialTier>,
    },
}

impl Default for SocialScore {
    fn default() -> Self {
        Self::Scalar(0.0)
    }
}

/// Shape-independent view of a [`SocialScore`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedSocialScore {
    /// Aggregate score.
    pub total: f64,
    /// Per-component contributions; empty for scalar scores.
    pub components: BTreeMap<String, f64>,
    /// Tier information; `None` for scalar scores.
    pub tier: Option<SocialTier>,
}

impl SocialScore {
    /// Flatten either wire shape into a [`NormalizedSocialScore`].
    pub fn normalize(&self) -> NormalizedSocialScore {
        match self {
            Self::Scalar(total) => NormalizedSocialScore {
                total: *total,
                components: BTreeMap::new(),
                tier: None,
            },
            Self::Structured {
                total_score,
                components,
                tier_info,
            } => NormalizedSocialScore {
                total: *total_score,
                components: components.clone(),
                tier: tier_info.clone(),
            },
        }
    }

    /// Aggregate score regardless of shape.
    pub const fn total(&self) -> f64 {
        match self {
            Self::Scalar(total) | Self::Structured { total_score: total, .. } => *total,
        }
    }
}
