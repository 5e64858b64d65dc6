//! Risk/event subsystem
//!
//! Per-tick probability evaluation for the rare, nasty state changes: rug
//! pulls, exit scams, oracle hacks, whale buybacks, and account freezes.
//! Every check is independent; several may fire in the same tick across
//! different assets.
//!
//! # Design Principles
//!
//! 1. **Telegraphed risk**: a rug pull requires a prior rug warning (set by
//!    the news subsystem) — the player always had a chance to get out
//! 2. **Patch isolation**: each trigger returns a patch + event; one asset's
//!    outcome can never abort evaluation of the others
//! 3. **Deterministic draws**: evaluation order and draw counts depend only
//!    on (deterministic) state, so replays reproduce every trigger

use crate::models::asset::{Asset, AssetPatch, AssetTier};
use crate::models::event::GameEvent;
use crate::models::player::PlayerState;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed per-tick exit-scam probability (shitcoins only)
pub const EXIT_SCAM_P: f64 = 0.000_01;
/// Fixed per-tick global oracle-hack probability
pub const ORACLE_HACK_P: f64 = 0.000_05;
/// Fixed per-tick whale-buyback probability (per eligible asset)
pub const WHALE_BUYBACK_P: f64 = 0.000_02;
/// Liquidity an asset needs before a whale will bother
pub const WHALE_LIQUIDITY_MIN: f64 = 100_000.0;
/// Ticks between bleed steps on a rugged asset
pub const RUG_BLEED_INTERVAL: usize = 30;

/// Risk-rate tuning
///
/// `rate_multiplier` scales every probability; 1.0 in normal play, larger
/// (e.g. 5.0) in devmode for testing and demos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub rate_multiplier: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            rate_multiplier: 1.0,
        }
    }
}

impl RiskConfig {
    /// Accelerated rates for testing/demo sessions
    pub fn devmode() -> Self {
        Self {
            rate_multiplier: 5.0,
        }
    }
}

/// One triggered risk event: the asset patch to apply plus its feed event
#[derive(Debug, Clone, PartialEq)]
pub struct RiskOutcome {
    pub asset_id: String,
    pub patch: AssetPatch,
    pub event: GameEvent,
}

/// Per-tick rug-pull probability for a warned asset
///
/// clamp(0.015 + devPct/100 × 0.012 − audit × 0.01
///       + (0.3 − liquidityFactor) × 0.04 + hype × 0.01, 0.002, 0.45)
pub fn rug_probability(asset: &Asset) -> f64 {
    let p = 0.015 + (asset.dev_tokens_pct / 100.0) * 0.012 - asset.audit_score * 0.01
        + (0.3 - asset.liquidity_factor()) * 0.04
        + asset.social_hype * 0.01;
    p.clamp(0.002, 0.45)
}

/// Per-tick account-freeze probability
///
/// clamp(0.001 + exposure × 0.005 + scrutiny × 0.01 − security × 0.02, 0, 0.9)
pub fn freeze_probability(player: &PlayerState) -> f64 {
    let p = 0.001 + player.exposure * 0.005 + player.scrutiny * 0.01 - player.security * 0.02;
    p.clamp(0.0, 0.9)
}

/// Whether the tier gate permits a rug pull at all
fn tier_permits_rug(tier: AssetTier) -> bool {
    tier != AssetTier::Bluechip
}

/// Evaluate the per-asset risk checks for one tick
///
/// Checks, in order: rug pull (gated on tier + warning), exit scam
/// (shitcoins only), whale buyback (liquidity-gated). Rugged assets are
/// handled by [`rug_bleed`] instead and get no checks here.
pub fn evaluate_asset(
    asset: &Asset,
    tick: usize,
    day: usize,
    config: &RiskConfig,
    rng: &mut RngManager,
) -> Vec<RiskOutcome> {
    let mut outcomes = Vec::new();
    if asset.rugged {
        return outcomes;
    }
    let rate = config.rate_multiplier;

    // Rug pull: only tier-permitted assets that were warned first.
    if tier_permits_rug(asset.tier) && asset.rug_warned && rng.chance(rug_probability(asset) * rate)
    {
        let drop_pct = rng.range(0.20, 0.30);
        let liquidity_keep = rng.range(0.6, 0.8);
        outcomes.push(RiskOutcome {
            asset_id: asset.id.clone(),
            patch: AssetPatch {
                price: Some(asset.price * (1.0 - drop_pct)),
                liquidity_usd: Some(asset.liquidity_usd * liquidity_keep),
                rugged: Some(true),
                rug_start_tick: Some(tick),
                ..Default::default()
            },
            event: GameEvent::RugPull {
                tick,
                day,
                asset_id: asset.id.clone(),
                price_drop_pct: drop_pct,
            },
        });
        // The asset is gone; nothing further can fire on it this tick.
        return outcomes;
    }

    // Exit scam: shitcoins can simply vanish.
    if asset.tier == AssetTier::Shitcoin && rng.chance(EXIT_SCAM_P * rate) {
        outcomes.push(RiskOutcome {
            asset_id: asset.id.clone(),
            patch: AssetPatch {
                price: Some(asset.price * 0.001),
                liquidity_usd: Some(0.0),
                rugged: Some(true),
                rug_start_tick: Some(tick),
                ..Default::default()
            },
            event: GameEvent::ExitScam {
                tick,
                day,
                asset_id: asset.id.clone(),
            },
        });
        return outcomes;
    }

    // Whale buyback: enough liquidity attracts deep pockets.
    if asset.liquidity_usd >= WHALE_LIQUIDITY_MIN && rng.chance(WHALE_BUYBACK_P * rate) {
        let multiplier = rng.range(2.0, 4.0);
        outcomes.push(RiskOutcome {
            asset_id: asset.id.clone(),
            patch: AssetPatch {
                price: Some(asset.price * multiplier),
                ..Default::default()
            },
            event: GameEvent::WhaleBuyback {
                tick,
                day,
                asset_id: asset.id.clone(),
                multiplier,
            },
        });
    }

    outcomes
}

/// Evaluate the global oracle-hack check for one tick
///
/// One roll per tick; a hit shocks one random non-rugged asset by
/// ±100-400% (downward shocks use the reciprocal so the floor holds and the
/// magnitude is symmetric in log space).
pub fn evaluate_oracle_hack(
    assets: &BTreeMap<String, Asset>,
    tick: usize,
    day: usize,
    config: &RiskConfig,
    rng: &mut RngManager,
) -> Option<RiskOutcome> {
    if !rng.chance(ORACLE_HACK_P * config.rate_multiplier) {
        return None;
    }

    let live_ids: Vec<String> = assets
        .iter()
        .filter(|(_, a)| !a.rugged)
        .map(|(id, _)| id.clone())
        .collect();
    if live_ids.is_empty() {
        return None;
    }

    let target_id = rng.pick(&live_ids).clone();
    let upward = rng.chance(0.5);
    let magnitude = rng.range(1.0, 4.0);
    let multiplier = if upward {
        1.0 + magnitude
    } else {
        1.0 / (1.0 + magnitude)
    };

    let asset = &assets[&target_id];
    Some(RiskOutcome {
        asset_id: target_id.clone(),
        patch: AssetPatch {
            price: Some(asset.price * multiplier),
            ..Default::default()
        },
        event: GameEvent::OracleHack {
            tick,
            day,
            asset_id: target_id,
            multiplier,
        },
    })
}

/// Apply the bleed step to a rugged asset if the cadence is due
///
/// Every `RUG_BLEED_INTERVAL` ticks since the rug started, the price decays
/// by 5-15% until it reaches the floor.
pub fn rug_bleed(asset: &Asset, tick: usize, rng: &mut RngManager) -> Option<AssetPatch> {
    let start = asset.rug_start_tick?;
    if !asset.rugged || asset.is_dead() {
        return None;
    }
    if tick <= start || (tick - start) % RUG_BLEED_INTERVAL != 0 {
        return None;
    }

    let keep = rng.range(0.85, 0.95);
    Some(AssetPatch {
        price: Some(asset.price * keep),
        ..Default::default()
    })
}

/// Result of a triggered account freeze
#[derive(Debug, Clone, PartialEq)]
pub struct FreezeOutcome {
    /// Cash to lock
    pub amount: f64,
    /// Tick at which the lock releases
    pub release_tick: usize,
    /// Scrutiny after the small "cost of getting caught" reduction
    pub scrutiny_after: f64,
}

/// Evaluate the player-level freeze check for one tick
pub fn evaluate_freeze(
    player: &PlayerState,
    tick: usize,
    config: &RiskConfig,
    rng: &mut RngManager,
) -> Option<FreezeOutcome> {
    // An active freeze can't stack another.
    if player.freeze_release_tick.is_some() {
        return None;
    }
    if !rng.chance(freeze_probability(player) * config.rate_multiplier) {
        return None;
    }

    let fraction = rng.range(0.10, 0.50);
    let duration = rng.int(600, 3600) as usize;
    Some(FreezeOutcome {
        amount: player.cash * fraction,
        release_tick: tick + duration,
        scrutiny_after: (player.scrutiny - 0.05).max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::Asset;

    fn shitcoin(warned: bool) -> Asset {
        let mut a = Asset::new(
            "asset_rug", "RUG", "Ruggable", 0.05, 0.5, 50_000.0, 80.0, 0.05, 0.9, 0.3,
        );
        a.rug_warned = warned;
        a
    }

    fn bluechip() -> Asset {
        let mut a = Asset::new(
            "asset_blue", "BLUE", "Bluechip", 50_000.0, 0.8, 10_000_000.0, 2.0, 0.95, 0.4, 0.03,
        );
        a.rug_warned = true; // even warned, the tier gate must hold
        a
    }

    #[test]
    fn test_rug_probability_clamped() {
        let asset = shitcoin(true);
        let p = rug_probability(&asset);
        assert!((0.002..=0.45).contains(&p));

        // A pristine asset bottoms out at the clamp floor.
        let clean = Asset::new(
            "asset_ok", "OK", "Okay", 1.0, 0.5, 2_000_000.0, 0.0, 1.0, 0.0, 0.05,
        );
        assert_eq!(rug_probability(&clean), 0.002);
    }

    #[test]
    fn test_unwarned_asset_never_rugs() {
        let asset = shitcoin(false);
        let config = RiskConfig::devmode();
        let mut rng = RngManager::new(1);

        for tick in 0..20_000 {
            for outcome in evaluate_asset(&asset, tick, 0, &config, &mut rng) {
                assert!(!matches!(outcome.event, GameEvent::RugPull { .. }));
            }
        }
    }

    #[test]
    fn test_bluechip_never_rugs() {
        let asset = bluechip();
        let config = RiskConfig::devmode();
        let mut rng = RngManager::new(2);

        for tick in 0..20_000 {
            for outcome in evaluate_asset(&asset, tick, 0, &config, &mut rng) {
                assert!(!matches!(
                    outcome.event,
                    GameEvent::RugPull { .. } | GameEvent::ExitScam { .. }
                ));
            }
        }
    }

    #[test]
    fn test_warned_shitcoin_rugs_eventually() {
        let asset = shitcoin(true);
        let config = RiskConfig::default();
        let mut rng = RngManager::new(3);

        let rugged = (0..10_000).any(|tick| {
            evaluate_asset(&asset, tick, 0, &config, &mut rng)
                .iter()
                .any(|o| matches!(o.event, GameEvent::RugPull { .. }))
        });
        assert!(rugged, "warned shitcoin never rugged in 10k ticks");
    }

    #[test]
    fn test_rug_patch_shape() {
        let asset = shitcoin(true);
        let config = RiskConfig::devmode();
        let mut rng = RngManager::new(4);

        let outcome = (0..10_000)
            .find_map(|tick| {
                evaluate_asset(&asset, tick, 0, &config, &mut rng)
                    .into_iter()
                    .find(|o| matches!(o.event, GameEvent::RugPull { .. }))
            })
            .expect("rug fires under devmode");

        let price = outcome.patch.price.unwrap();
        assert!(price >= asset.price * 0.70 && price <= asset.price * 0.80);
        let liq = outcome.patch.liquidity_usd.unwrap();
        assert!(liq >= asset.liquidity_usd * 0.6 && liq <= asset.liquidity_usd * 0.8);
        assert_eq!(outcome.patch.rugged, Some(true));
    }

    #[test]
    fn test_bleed_cadence() {
        let mut asset = shitcoin(true);
        asset.rugged = true;
        asset.rug_start_tick = Some(100);
        let mut rng = RngManager::new(5);

        assert!(rug_bleed(&asset, 100, &mut rng).is_none());
        assert!(rug_bleed(&asset, 115, &mut rng).is_none());

        let patch = rug_bleed(&asset, 130, &mut rng).expect("bleed due at +30");
        let price = patch.price.unwrap();
        assert!(price < asset.price && price >= asset.price * 0.85);
    }

    #[test]
    fn test_freeze_probability_clamped() {
        let mut player = PlayerState::new(1000.0);
        player.security = 1.0;
        assert_eq!(freeze_probability(&player), 0.0);

        player.security = 0.0;
        player.exposure = 1.0;
        player.scrutiny = 1.0;
        let p = freeze_probability(&player);
        assert!(p > 0.0 && p <= 0.9);
    }

    #[test]
    fn test_freeze_does_not_stack() {
        let mut player = PlayerState::new(1000.0);
        player.exposure = 1.0;
        player.scrutiny = 1.0;
        player.freeze_release_tick = Some(9999);
        let mut rng = RngManager::new(6);

        for tick in 0..5000 {
            assert!(evaluate_freeze(&player, tick, &RiskConfig::devmode(), &mut rng).is_none());
        }
    }

    #[test]
    fn test_oracle_hack_targets_live_asset() {
        let mut assets = BTreeMap::new();
        let mut dead = shitcoin(false);
        dead.rugged = true;
        assets.insert(dead.id.clone(), dead);
        assets.insert("asset_blue".to_string(), bluechip());

        let config = RiskConfig {
            rate_multiplier: 20_000.0, // force the roll for the test
        };
        let mut rng = RngManager::new(7);

        let outcome = (0..100)
            .find_map(|tick| evaluate_oracle_hack(&assets, tick, 0, &config, &mut rng))
            .expect("hack fires at forced rate");
        assert_eq!(outcome.asset_id, "asset_blue");
        assert!(outcome.patch.price.unwrap() > 0.0);
    }
}
