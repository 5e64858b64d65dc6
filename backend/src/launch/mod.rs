//! Coin-launch generator
//!
//! Mid-game asset creation: each day advance has a chance to list a fresh
//! shitcoin with a template-generated name and seeded attributes. Launched
//! assets join the market with an empty history and live by the same rules
//! as the seed list.

use crate::models::asset::Asset;
use crate::models::event::GameEvent;
use crate::models::state::SimulationState;
use crate::rng::RngManager;

/// Daily probability that a new coin lists
pub const LAUNCH_DAILY_P: f64 = 0.15;
/// Hard cap on market size; no launches once reached
pub const MAX_ASSETS: usize = 40;

const NAME_PREFIXES: &[&str] = &[
    "Moon", "Giga", "Turbo", "Quantum", "Based", "Hyper", "Mega", "Ultra", "Degen", "Astro",
];
const NAME_SUFFIXES: &[&str] = &[
    "Doge", "Pepe", "Rocket", "Inu", "Chain", "Swap", "Floki", "Lambo", "Ape", "Cat",
];

/// Maybe list a new coin today
///
/// Returns the new asset's id if one launched.
pub fn maybe_launch(
    state: &mut SimulationState,
    tick: usize,
    day: usize,
    rng: &mut RngManager,
) -> Option<String> {
    if state.num_assets() >= MAX_ASSETS || !rng.chance(LAUNCH_DAILY_P) {
        return None;
    }

    let prefix = *rng.pick(NAME_PREFIXES);
    let suffix = *rng.pick(NAME_SUFFIXES);
    let name = format!("{prefix}{suffix}");
    let symbol: String = format!(
        "{}{}",
        &prefix[..prefix.len().min(2)].to_uppercase(),
        &suffix[..suffix.len().min(3)].to_uppercase()
    );

    // Fresh listings skew risky: thin liquidity, heavy dev bags, weak audits.
    let price = rng.range(0.0001, 0.05);
    let base_volume = rng.range(0.3, 0.9);
    let liquidity = rng.range(5_000.0, 250_000.0);
    let dev_pct = rng.range(20.0, 90.0);
    let audit = rng.range(0.0, 0.5);
    let hype = rng.range(0.3, 0.9);
    let volatility = rng.range(0.1, 0.4);

    let id = state.mint_asset_id();
    let asset = Asset::new(
        id.clone(),
        symbol.clone(),
        name,
        price,
        base_volume,
        liquidity,
        dev_pct,
        audit,
        hype,
        volatility,
    );
    state.add_asset(asset);
    state.push_event(GameEvent::CoinLaunched {
        tick,
        day,
        asset_id: id.clone(),
        symbol,
    });

    Some(id)
}
