//! Price/volume model
//!
//! Per-tick trade generation for one asset: dynamic volume decides how
//! likely a trade is this second, and a triggered trade moves the price by
//! a random walk scaled to the asset's intraday volatility.
//!
//! # Tick flow
//!
//! ```text
//! dynamic volume ∈ [0.05, 1.0]
//!       │
//!       ▼
//! trade probability = 0.1 + 0.8 × volume
//!       │ uniform draw below threshold?
//!       ▼
//! σ = (baseVol/√ticksPerDay) × (0.8 + 0.6×hype) × (1 + noise)
//! delta ~ Normal(0, σ)
//! new price = max(floor, old × (1 + delta)) → candle appended to `today`
//! ```
//!
//! # Critical Invariants
//!
//! - Volume is always within [0.05, 1.0]; rugged assets are pinned to 0.05
//! - The price floor holds after every update
//! - RNG draw count per tick depends only on whether a trade fired, so an
//!   independent replay of the same sequence reproduces prices exactly

use crate::core::MIN_PRICE;
use crate::models::asset::{Asset, AssetPatch};
use crate::models::candle::PriceCandle;
use crate::models::vibe::DailyVibe;
use crate::rng::RngManager;

/// Lower clamp of dynamic volume (and the value rugged assets are pinned to)
pub const VOLUME_FLOOR: f64 = 0.05;
/// Upper clamp of dynamic volume
pub const VOLUME_CEIL: f64 = 1.0;

/// Result of one pricing tick for one asset
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub patch: AssetPatch,
    pub candle: PriceCandle,
}

/// Hype multiplier: 0.5x at zero hype up to 1.5x at full hype
fn hype_multiplier(social_hype: f64) -> f64 {
    0.5 + social_hype.clamp(0.0, 1.0)
}

/// Momentum multiplier: 0.8x for a flat day up to 2.0x for a big move
///
/// Momentum is the magnitude of the intraday move so far — |last close −
/// first open| / first open over `today` — scaled so a 12% move saturates
/// the band.
fn momentum_multiplier(asset: &Asset) -> f64 {
    let (first, last) = match (asset.history.today.first(), asset.history.today.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.8,
    };
    if first.open <= 0.0 {
        return 0.8;
    }
    let change = ((last.close - first.open) / first.open).abs();
    (0.8 + change * 10.0).clamp(0.8, 2.0)
}

/// Time-of-day multiplier over the trading window
///
/// Quiet open (0.5→0.8 across the first 10%), building middle (0.8→1.0),
/// frantic close (1.0→2.0 across the last 20%).
fn time_of_day_multiplier(tick_within_day: usize, ticks_per_day: usize) -> f64 {
    let t = tick_within_day as f64 / ticks_per_day as f64;
    if t < 0.1 {
        0.5 + 0.3 * (t / 0.1)
    } else if t < 0.8 {
        0.8 + 0.2 * ((t - 0.1) / 0.7)
    } else {
        1.0 + 1.0 * ((t - 0.8) / 0.2)
    }
}

/// Dynamic volume for an asset at this point of the day
///
/// Product of the static base volume, hype, momentum, market vibe, and
/// time-of-day terms, clamped to [0.05, 1.0]. Rugged assets are forced to
/// the floor.
///
/// # Example
/// ```
/// use market_simulator_core_rs::models::{Asset, DailyVibe};
/// use market_simulator_core_rs::pricing::dynamic_volume;
///
/// let asset = Asset::new("a", "A", "A", 1.0, 0.6, 500_000.0, 10.0, 0.5, 0.5, 0.1);
/// let volume = dynamic_volume(&asset, &DailyVibe::normie(), 900, 1800);
/// assert!((0.05..=1.0).contains(&volume));
/// ```
pub fn dynamic_volume(
    asset: &Asset,
    vibe: &DailyVibe,
    tick_within_day: usize,
    ticks_per_day: usize,
) -> f64 {
    if asset.rugged {
        return VOLUME_FLOOR;
    }

    let volume = asset.base_volume
        * hype_multiplier(asset.social_hype)
        * momentum_multiplier(asset)
        * vibe.vibe.volume_multiplier(vibe.is_target(&asset.id))
        * time_of_day_multiplier(tick_within_day, ticks_per_day);

    volume.clamp(VOLUME_FLOOR, VOLUME_CEIL)
}

/// Probability that a trade fires this tick
pub fn trade_probability(dynamic_volume: f64) -> f64 {
    0.1 + 0.8 * dynamic_volume
}

/// Per-tick volatility for a trade on this asset
///
/// σ = (baseVolatility / √ticksPerDay) × (0.8 + 0.6 × hype) × (1 + noise)
pub fn tick_sigma(asset: &Asset, ticks_per_day: usize, noise: f64) -> f64 {
    (asset.base_volatility / (ticks_per_day as f64).sqrt())
        * (0.8 + 0.6 * asset.social_hype)
        * (1.0 + noise)
}

/// Run one pricing tick for one asset
///
/// Returns `None` when no trade fired. RNG usage: one uniform draw for the
/// trade check; a firing trade additionally draws one uniform (noise) and
/// one normal (two uniforms).
pub fn tick_asset(
    asset: &Asset,
    vibe: &DailyVibe,
    tick: usize,
    day: usize,
    tick_within_day: usize,
    ticks_per_day: usize,
    rng: &mut RngManager,
) -> Option<TradeOutcome> {
    let volume = dynamic_volume(asset, vibe, tick_within_day, ticks_per_day);
    if !rng.chance(trade_probability(volume)) {
        return None;
    }

    let noise = rng.range(-0.1, 0.1);
    let sigma = tick_sigma(asset, ticks_per_day, noise);
    let delta = rng.normal(0.0, sigma);

    let old_price = asset.price;
    let new_price = (old_price * (1.0 + delta)).max(MIN_PRICE);

    Some(TradeOutcome {
        patch: AssetPatch {
            price: Some(new_price),
            ..Default::default()
        },
        candle: PriceCandle::from_trade(tick, day, old_price, new_price),
    })
}

/// Overnight gap applied to a non-rugged asset at day advance
///
/// Gap ~ Normal(vibe bias, 0.03); the patched price keeps the floor.
pub fn overnight_gap(asset: &Asset, vibe: &DailyVibe, rng: &mut RngManager) -> AssetPatch {
    let bias = vibe.vibe.gap_bias(vibe.is_target(&asset.id));
    let gap = rng.normal(bias, 0.03);
    AssetPatch {
        price: Some((asset.price * (1.0 + gap)).max(MIN_PRICE)),
        ..Default::default()
    }
}
