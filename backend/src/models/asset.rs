//! Asset model
//!
//! A tradable instrument in the simulated market. Assets are created at game
//! start from a static seed list (or mid-game by the coin-launch generator)
//! and persist until rugged to the floor; they are never deleted.
//!
//! # Critical Invariants
//!
//! 1. **Price floor**: `price >= MIN_PRICE` at all times
//! 2. **Rug monotonicity**: a rugged asset's price only bleeds downward
//! 3. **Tier freshness**: tier is recomputed whenever liquidity or audit
//!    score change materially

use crate::core::MIN_PRICE;
use crate::models::candle::PriceHistory;
use serde::{Deserialize, Serialize};

/// Liquidity above which (with a strong audit) an asset counts as bluechip
pub const BLUECHIP_LIQUIDITY: f64 = 5_000_000.0;
/// Minimum audit score for bluechip classification
pub const BLUECHIP_AUDIT: f64 = 0.8;
/// Liquidity above which (with a passable audit) an asset counts as midcap
pub const MIDCAP_LIQUIDITY: f64 = 500_000.0;
/// Minimum audit score for midcap classification
pub const MIDCAP_AUDIT: f64 = 0.4;

/// Relative liquidity change below which the tier is not re-derived
const TIER_REFRESH_THRESHOLD: f64 = 0.05;

/// Coarse risk classification derived from liquidity and audit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetTier {
    Bluechip,
    Midcap,
    Shitcoin,
}

impl AssetTier {
    /// Derive the tier from liquidity and audit score
    pub fn derive(liquidity_usd: f64, audit_score: f64) -> Self {
        if liquidity_usd >= BLUECHIP_LIQUIDITY && audit_score >= BLUECHIP_AUDIT {
            AssetTier::Bluechip
        } else if liquidity_usd >= MIDCAP_LIQUIDITY && audit_score >= MIDCAP_AUDIT {
            AssetTier::Midcap
        } else {
            AssetTier::Shitcoin
        }
    }
}

/// A tradable instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset identifier (e.g. "asset_btc")
    pub id: String,
    /// Display ticker (e.g. "MOON")
    pub symbol: String,
    /// Display name
    pub name: String,

    /// Current price. Always >= MIN_PRICE.
    pub price: f64,
    /// Reference price at listing
    pub base_price: f64,
    /// Static base volume attribute in [0, 1]
    pub base_volume: f64,
    /// Pool liquidity in USD
    pub liquidity_usd: f64,
    /// Share of supply held by the dev team, 0-100
    pub dev_tokens_pct: f64,
    /// Third-party audit score in [0, 1]
    pub audit_score: f64,
    /// Social hype level in [0, 1]
    pub social_hype: f64,
    /// Per-day volatility before intraday scaling
    pub base_volatility: f64,

    /// Derived risk tier; see [`AssetTier::derive`]
    pub tier: AssetTier,

    /// Whether a rug pull has destroyed this asset
    pub rugged: bool,
    /// Whether the rug-warning generator has flagged this asset
    /// (precondition for the rug-pull trigger)
    pub rug_warned: bool,
    /// Tick at which the rug started (drives the bleed cadence)
    pub rug_start_tick: Option<usize>,

    /// Multi-resolution OHLC history
    pub history: PriceHistory,
}

impl Asset {
    /// Create a freshly listed asset
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::models::asset::{Asset, AssetTier};
    ///
    /// let asset = Asset::new("asset_moon", "MOON", "Moonseeker", 0.004, 0.6, 120_000.0, 55.0, 0.2, 0.7, 0.12);
    /// assert_eq!(asset.tier, AssetTier::Shitcoin);
    /// ```
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        base_volume: f64,
        liquidity_usd: f64,
        dev_tokens_pct: f64,
        audit_score: f64,
        social_hype: f64,
        base_volatility: f64,
    ) -> Self {
        let price = price.max(MIN_PRICE);
        let tier = AssetTier::derive(liquidity_usd, audit_score);
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            price,
            base_price: price,
            base_volume: base_volume.clamp(0.0, 1.0),
            liquidity_usd: liquidity_usd.max(0.0),
            dev_tokens_pct: dev_tokens_pct.clamp(0.0, 100.0),
            audit_score: audit_score.clamp(0.0, 1.0),
            social_hype: social_hype.clamp(0.0, 1.0),
            base_volatility,
            tier,
            rugged: false,
            rug_warned: false,
            rug_start_tick: None,
            history: PriceHistory::new(),
        }
    }

    /// Liquidity normalized into [0, 1] against a $1M reference pool
    pub fn liquidity_factor(&self) -> f64 {
        (self.liquidity_usd / 1_000_000.0).min(1.0)
    }

    /// Whether the asset has bled all the way down to the price floor
    pub fn is_dead(&self) -> bool {
        self.rugged && self.price <= MIN_PRICE
    }

    /// Re-derive the tier from current liquidity and audit score
    pub fn refresh_tier(&mut self) {
        self.tier = AssetTier::derive(self.liquidity_usd, self.audit_score);
    }

    /// Apply a patch produced by a subsystem
    ///
    /// This is the single reducer for asset mutation: clamps and the price
    /// floor are enforced here, and the tier is re-derived when liquidity or
    /// audit score changed materially.
    pub fn apply(&mut self, patch: &AssetPatch) {
        let old_liquidity = self.liquidity_usd;
        let old_audit = self.audit_score;

        if let Some(price) = patch.price {
            self.price = price.max(MIN_PRICE);
        }
        if let Some(liquidity) = patch.liquidity_usd {
            self.liquidity_usd = liquidity.max(0.0);
        }
        if let Some(hype) = patch.social_hype {
            self.social_hype = hype.clamp(0.0, 1.0);
        }
        if let Some(audit) = patch.audit_score {
            self.audit_score = audit.clamp(0.0, 1.0);
        }
        if let Some(rugged) = patch.rugged {
            self.rugged = rugged;
        }
        if let Some(warned) = patch.rug_warned {
            self.rug_warned = warned;
        }
        if let Some(tick) = patch.rug_start_tick {
            self.rug_start_tick = Some(tick);
        }

        let liquidity_moved = if old_liquidity > 0.0 {
            (self.liquidity_usd - old_liquidity).abs() / old_liquidity >= TIER_REFRESH_THRESHOLD
        } else {
            self.liquidity_usd > 0.0
        };
        if liquidity_moved || self.audit_score != old_audit {
            self.refresh_tier();
        }
    }
}

/// Partial update to an asset, applied atomically by [`Asset::apply`]
///
/// Subsystems return patches instead of mutating state directly; the
/// orchestrator applies them before the next step reads state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPatch {
    pub price: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub social_hype: Option<f64>,
    pub audit_score: Option<f64>,
    pub rugged: Option<bool>,
    pub rug_warned: Option<bool>,
    pub rug_start_tick: Option<usize>,
}

impl AssetPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
