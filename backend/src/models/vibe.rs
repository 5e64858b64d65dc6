//! Daily market vibe
//!
//! One categorical value is rolled per day from a fixed distribution and
//! biases volume and overnight gap calculations for every asset until the
//! next roll. Non-Normie vibes also designate 1-3 target assets that feel
//! the bias hardest.

use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Market-wide daily bias category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketVibe {
    Moonshot,
    Bloodbath,
    MemeFrenzy,
    RugSeason,
    WhaleWar,
    Normie,
}

/// The fixed categorical distribution, in roll order.
///
/// Weights are percentages and sum to 100:
/// moonshot 10, bloodbath 8, memefrenzy 15, rugseason 3, whalewar 3,
/// normie 61.
pub const VIBE_WEIGHTS: [(MarketVibe, f64); 6] = [
    (MarketVibe::Moonshot, 0.10),
    (MarketVibe::Bloodbath, 0.08),
    (MarketVibe::MemeFrenzy, 0.15),
    (MarketVibe::RugSeason, 0.03),
    (MarketVibe::WhaleWar, 0.03),
    (MarketVibe::Normie, 0.61),
];

impl MarketVibe {
    /// Roll a vibe from the fixed distribution (one uniform draw)
    pub fn roll(rng: &mut RngManager) -> MarketVibe {
        let draw = rng.next_f64();
        let mut cumulative = 0.0;
        for (vibe, weight) in VIBE_WEIGHTS {
            cumulative += weight;
            if draw < cumulative {
                return vibe;
            }
        }
        // Floating-point edge: the weights sum to 1.0, so only a draw at the
        // very top of the interval lands here.
        MarketVibe::Normie
    }

    /// Volume multiplier for an asset under this vibe
    pub fn volume_multiplier(&self, targeted: bool) -> f64 {
        match (self, targeted) {
            (MarketVibe::Moonshot, true) => 2.5,
            (MarketVibe::Moonshot, false) => 1.1,
            (MarketVibe::Bloodbath, true) => 2.0,
            (MarketVibe::Bloodbath, false) => 1.2,
            (MarketVibe::MemeFrenzy, true) => 1.8,
            (MarketVibe::MemeFrenzy, false) => 1.2,
            (MarketVibe::RugSeason, true) => 1.5,
            (MarketVibe::RugSeason, false) => 1.0,
            (MarketVibe::WhaleWar, true) => 2.2,
            (MarketVibe::WhaleWar, false) => 1.1,
            (MarketVibe::Normie, _) => 1.0,
        }
    }

    /// Additive drift applied to the overnight gap mean
    pub fn gap_bias(&self, targeted: bool) -> f64 {
        match (self, targeted) {
            (MarketVibe::Moonshot, true) => 0.05,
            (MarketVibe::Moonshot, false) => 0.01,
            (MarketVibe::Bloodbath, true) => -0.05,
            (MarketVibe::Bloodbath, false) => -0.02,
            (MarketVibe::MemeFrenzy, true) => 0.02,
            (MarketVibe::MemeFrenzy, false) => 0.005,
            (MarketVibe::RugSeason, true) => -0.03,
            (MarketVibe::RugSeason, false) => -0.01,
            (MarketVibe::WhaleWar, _) => 0.0,
            (MarketVibe::Normie, _) => 0.0,
        }
    }
}

/// The vibe in effect for one day, with its designated targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyVibe {
    pub vibe: MarketVibe,
    /// Asset ids singled out by this vibe (empty for Normie)
    pub targets: Vec<String>,
}

impl DailyVibe {
    /// Roll the day's vibe and pick its targets from the asset list
    ///
    /// `asset_ids` must be in deterministic order (callers pass BTreeMap
    /// keys). Normie days have no targets; other vibes target 1-3 distinct
    /// assets.
    pub fn roll(rng: &mut RngManager, asset_ids: &[String]) -> Self {
        let vibe = MarketVibe::roll(rng);

        let mut targets = Vec::new();
        if vibe != MarketVibe::Normie && !asset_ids.is_empty() {
            let want = rng.int(1, 3).min(asset_ids.len() as i64) as usize;
            while targets.len() < want {
                let candidate = rng.pick(asset_ids).clone();
                if !targets.contains(&candidate) {
                    targets.push(candidate);
                }
            }
        }

        Self { vibe, targets }
    }

    pub fn is_target(&self, asset_id: &str) -> bool {
        self.targets.iter().any(|id| id == asset_id)
    }

    /// Neutral starting value before the first roll
    pub fn normie() -> Self {
        Self {
            vibe: MarketVibe::Normie,
            targets: Vec::new(),
        }
    }
}
