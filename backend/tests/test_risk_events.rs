//! Risk subsystem tests: tier gates, warning precondition, clamps.

use market_simulator_core_rs::models::{Asset, GameEvent};
use market_simulator_core_rs::risk::{
    evaluate_asset, evaluate_freeze, evaluate_oracle_hack, freeze_probability, rug_bleed,
    rug_probability, RiskConfig,
};
use market_simulator_core_rs::{PlayerState, RngManager, MIN_PRICE};
use std::collections::BTreeMap;

fn warned_shitcoin() -> Asset {
    let mut asset = Asset::new(
        "asset_rug", "RUG", "Rugly", 0.01, 0.5, 30_000.0, 75.0, 0.05, 0.8, 0.3,
    );
    asset.rug_warned = true;
    asset
}

fn bluechip() -> Asset {
    Asset::new(
        "asset_blue", "BLUE", "Bluechip", 60_000.0, 0.8, 20_000_000.0, 1.0, 0.95, 0.4, 0.03,
    )
}

#[test]
fn test_bluechip_rug_immunity() {
    // Even warned and under devmode rates, a bluechip never rugs.
    let mut asset = bluechip();
    asset.rug_warned = true;
    let config = RiskConfig::devmode();
    let mut rng = RngManager::new(1);

    for tick in 0..50_000 {
        let outcomes = evaluate_asset(&asset, tick, 0, &config, &mut rng);
        for outcome in outcomes {
            assert!(
                !matches!(outcome.event, GameEvent::RugPull { .. }),
                "bluechip rugged at tick {}",
                tick
            );
            assert!(
                !matches!(outcome.event, GameEvent::ExitScam { .. }),
                "bluechip exit-scammed at tick {}",
                tick
            );
        }
    }
}

#[test]
fn test_rug_requires_warning() {
    let mut asset = warned_shitcoin();
    asset.rug_warned = false;
    let config = RiskConfig::devmode();
    let mut rng = RngManager::new(2);

    for tick in 0..50_000 {
        for outcome in evaluate_asset(&asset, tick, 0, &config, &mut rng) {
            assert!(
                !matches!(outcome.event, GameEvent::RugPull { .. }),
                "unwarned asset rugged"
            );
        }
    }
}

#[test]
fn test_warned_shitcoin_rug_effects() {
    let asset = warned_shitcoin();
    let config = RiskConfig::default();
    let mut rng = RngManager::new(3);

    let outcome = (0..20_000)
        .find_map(|tick| {
            evaluate_asset(&asset, tick, 0, &config, &mut rng)
                .into_iter()
                .find(|o| matches!(o.event, GameEvent::RugPull { .. }))
        })
        .expect("warned shitcoin rugs within 20k ticks");

    // Price drops 20-30%, liquidity keeps 60-80%, flags set.
    let price = outcome.patch.price.unwrap();
    assert!(price <= asset.price * 0.80 + 1e-12);
    assert!(price >= asset.price * 0.70 - 1e-12);
    let liquidity = outcome.patch.liquidity_usd.unwrap();
    assert!(liquidity <= asset.liquidity_usd * 0.8 + 1e-9);
    assert!(liquidity >= asset.liquidity_usd * 0.6 - 1e-9);
    assert_eq!(outcome.patch.rugged, Some(true));
    assert!(outcome.patch.rug_start_tick.is_some());
}

#[test]
fn test_rug_probability_formula_clamps() {
    // Worst possible asset caps at 0.45.
    let worst = Asset::new(
        "asset_bad", "BAD", "Bad", 0.001, 1.0, 0.0, 100.0, 0.0, 1.0, 0.5,
    );
    assert!(rug_probability(&worst) <= 0.45);

    // Cleanest possible asset floors at 0.002.
    let clean = Asset::new(
        "asset_ok", "OK", "Okay", 10.0, 0.5, 5_000_000.0, 0.0, 1.0, 0.0, 0.05,
    );
    assert_eq!(rug_probability(&clean), 0.002);
}

#[test]
fn test_rugged_asset_only_bleeds_down() {
    let mut asset = warned_shitcoin();
    asset.rugged = true;
    asset.rug_start_tick = Some(0);
    let mut rng = RngManager::new(4);

    let mut last_price = asset.price;
    for tick in 1..5_000 {
        if let Some(patch) = rug_bleed(&asset, tick, &mut rng) {
            asset.apply(&patch);
            assert!(asset.price <= last_price, "rugged price rose at tick {tick}");
            assert!(asset.price >= MIN_PRICE);
            last_price = asset.price;
        }
    }
    // 5000 ticks of bleeding every 30 ticks leaves very little behind.
    assert!(last_price < warned_shitcoin().price);
}

#[test]
fn test_bleed_cadence_is_thirty_ticks() {
    let mut asset = warned_shitcoin();
    asset.rugged = true;
    asset.rug_start_tick = Some(90);
    let mut rng = RngManager::new(5);

    let due: Vec<usize> = (91..241)
        .filter(|&t| rug_bleed(&asset, t, &mut rng).is_some())
        .collect();
    assert_eq!(due, vec![120, 150, 180, 210, 240]);
}

#[test]
fn test_freeze_probability_clamps() {
    let mut player = PlayerState::new(1_000.0);

    // High security swamps the base rate entirely.
    player.security = 1.0;
    player.exposure = 0.0;
    player.scrutiny = 0.0;
    assert_eq!(freeze_probability(&player), 0.0);

    // Maxed-out heat is still capped at 0.9.
    player.security = 0.0;
    player.exposure = 1.0;
    player.scrutiny = 1.0;
    assert!(freeze_probability(&player) <= 0.9);
}

#[test]
fn test_freeze_outcome_shape() {
    let mut player = PlayerState::new(10_000.0);
    player.security = 0.0;
    player.exposure = 1.0;
    player.scrutiny = 1.0;
    let mut rng = RngManager::new(6);

    let outcome = (0..10_000usize)
        .find_map(|tick| evaluate_freeze(&player, tick, &RiskConfig::default(), &mut rng))
        .expect("freeze fires under max heat");

    // Locks 10-50% of free cash for 600-3600 ticks, and scrutiny drops.
    assert!(outcome.amount >= 1_000.0 - 1e-9 && outcome.amount <= 5_000.0 + 1e-9);
    assert!(outcome.release_tick >= 600);
    assert!((outcome.scrutiny_after - 0.95).abs() < 1e-9);
}

#[test]
fn test_oracle_hack_shock_band() {
    let mut assets = BTreeMap::new();
    let asset = bluechip();
    let base_price = asset.price;
    assets.insert(asset.id.clone(), asset);

    let config = RiskConfig {
        rate_multiplier: 50_000.0, // force the roll
    };
    let mut rng = RngManager::new(7);

    for tick in 0..200 {
        if let Some(outcome) = evaluate_oracle_hack(&assets, tick, 0, &config, &mut rng) {
            let price = outcome.patch.price.unwrap();
            let ratio = price / base_price;
            // Up: x2..x5. Down: x1/5..x1/2.
            assert!(
                (2.0..=5.0).contains(&ratio) || (0.2..=0.5).contains(&ratio),
                "shock ratio {} outside ±100-400%",
                ratio
            );
        }
    }
}

#[test]
fn test_devmode_scales_rates() {
    // Under devmode the same asset rugs measurably sooner on average.
    let asset = warned_shitcoin();

    let first_trigger = |mult: f64, seed: u32| -> usize {
        let config = RiskConfig {
            rate_multiplier: mult,
        };
        let mut rng = RngManager::new(seed);
        (0..100_000)
            .find(|&tick| {
                evaluate_asset(&asset, tick, 0, &config, &mut rng)
                    .iter()
                    .any(|o| matches!(o.event, GameEvent::RugPull { .. }))
            })
            .unwrap_or(100_000)
    };

    let slow: usize = (0..20).map(|s| first_trigger(1.0, s)).sum();
    let fast: usize = (0..20).map(|s| first_trigger(5.0, 1000 + s)).sum();
    assert!(fast < slow, "devmode did not accelerate triggers ({fast} >= {slow})");
}
