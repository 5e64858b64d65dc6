//! Offer subsystem
//!
//! Opportunistic offers generated during day advance and resolved by
//! explicit player action. Two flavors:
//!
//! - **Government bump**: buys a chunk of the player's largest holding at a
//!   2-3x premium; acceptance raises scrutiny (someone will ask questions)
//! - **Whale OTC**: a block trade on a liquid asset, either a discounted
//!   sell-to-player or a premium buy-from-player
//!
//! # Critical Invariants
//!
//! - **Atomicity**: acceptance validates first and then applies everything,
//!   or rejects with zero state change
//! - **No partial fills**: an offer is taken whole or not at all
//! - **Expiry**: unaccepted offers vanish after [`OFFER_TTL_DAYS`]

use crate::models::event::GameEvent;
use crate::models::offer::{Offer, OfferKind, OFFER_TTL_DAYS};
use crate::models::player::{PlayerPatch, TradeRecord, TradeSide, WalletError};
use crate::models::state::SimulationState;
use crate::rng::RngManager;
use thiserror::Error;

/// Daily probability of a government-bump offer
pub const GOV_OFFER_DAILY_P: f64 = 0.10;
/// Daily probability of a whale-OTC offer
pub const WHALE_OFFER_DAILY_P: f64 = 0.10;
/// Liquidity an asset needs to attract OTC interest
pub const OTC_LIQUIDITY_MIN: f64 = 50_000.0;

/// Errors from offer resolution
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    #[error("Offer not found: {0}")]
    NotFound(String),

    #[error("Offer {0} has expired")]
    Expired(String),

    #[error("Offer references unknown asset {0}")]
    UnknownAsset(String),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Generate today's offers
///
/// Each kind rolls independently at its daily probability. Returns the
/// number of offers created.
pub fn generate_daily(
    state: &mut SimulationState,
    tick: usize,
    day: usize,
    rng: &mut RngManager,
) -> usize {
    let mut created = 0;

    // Government bump: aimed at the player's largest position.
    if rng.chance(GOV_OFFER_DAILY_P) {
        if let Some((asset_id, units_held)) = largest_holding(state) {
            let price = state.assets[&asset_id].price;
            let fraction = rng.range(0.20, 0.60);
            let premium = rng.range(2.0, 3.0);
            let scrutiny_delta = rng.range(0.05, 0.20);

            let id = state.mint_offer_id();
            state.offers.push(Offer {
                id: id.clone(),
                kind: OfferKind::GovernmentBump,
                asset_id: asset_id.clone(),
                player_side: TradeSide::Sell,
                units: units_held * fraction,
                unit_price: price * premium,
                scrutiny_delta,
                created_day: day,
                expires_day: day + OFFER_TTL_DAYS,
            });
            state.push_event(GameEvent::OfferCreated {
                tick,
                day,
                offer_id: id,
                asset_id,
            });
            created += 1;
        }
    }

    // Whale OTC: a liquid asset, either direction.
    if rng.chance(WHALE_OFFER_DAILY_P) {
        let eligible: Vec<String> = state
            .assets
            .iter()
            .filter(|(_, a)| !a.rugged && a.liquidity_usd >= OTC_LIQUIDITY_MIN)
            .map(|(id, _)| id.clone())
            .collect();

        if !eligible.is_empty() {
            let asset_id = rng.pick(&eligible).clone();
            let price = state.assets[&asset_id].price;
            let sell_to_player = rng.chance(0.5);

            let offer = if sell_to_player {
                // Discounted block the player may buy.
                let discount = rng.range(0.85, 0.95);
                let budget_fraction = rng.range(0.05, 0.20);
                let unit_price = price * discount;
                let units = (state.player.cash * budget_fraction) / unit_price.max(f64::MIN_POSITIVE);
                (units > 0.0).then(|| (TradeSide::Buy, units, unit_price))
            } else {
                // Premium bid for part of the player's position.
                let held = state.player.units_of(&asset_id);
                let premium = rng.range(1.05, 1.20);
                let fraction = rng.range(0.20, 0.60);
                (held > 0.0).then(|| (TradeSide::Sell, held * fraction, price * premium))
            };

            if let Some((player_side, units, unit_price)) = offer {
                let id = state.mint_offer_id();
                state.offers.push(Offer {
                    id: id.clone(),
                    kind: OfferKind::WhaleOtc,
                    asset_id: asset_id.clone(),
                    player_side,
                    units,
                    unit_price,
                    scrutiny_delta: 0.0,
                    created_day: day,
                    expires_day: day + OFFER_TTL_DAYS,
                });
                state.push_event(GameEvent::OfferCreated {
                    tick,
                    day,
                    offer_id: id,
                    asset_id,
                });
                created += 1;
            }
        }
    }

    created
}

/// Remove expired offers, logging each to the feed
pub fn expire_pass(state: &mut SimulationState, tick: usize, day: usize) {
    let expired: Vec<String> = state
        .offers
        .iter()
        .filter(|o| o.is_expired(day))
        .map(|o| o.id.clone())
        .collect();

    for offer_id in expired {
        state.offers.retain(|o| o.id != offer_id);
        state.push_event(GameEvent::OfferExpired {
            tick,
            day,
            offer_id,
        });
    }
}

/// Accept an offer, executing the implied trade atomically
///
/// Validation happens before any mutation: if the player lacks the cash or
/// units the acceptance needs, the offer stays open and state is unchanged.
pub fn accept(
    state: &mut SimulationState,
    offer_id: &str,
    tick: usize,
    day: usize,
) -> Result<(), OfferError> {
    let offer = state
        .get_offer(offer_id)
        .cloned()
        .ok_or_else(|| OfferError::NotFound(offer_id.to_string()))?;
    if offer.is_expired(day) {
        return Err(OfferError::Expired(offer_id.to_string()));
    }
    if state.get_asset(&offer.asset_id).is_none() {
        return Err(OfferError::UnknownAsset(offer.asset_id.clone()));
    }

    // Wallet operations validate before mutating, so a rejection leaves
    // everything untouched and the offer stays open.
    let realized = match offer.player_side {
        TradeSide::Buy => {
            state.player.debit_cash(offer.notional())?;
            state
                .player
                .add_units(&offer.asset_id, offer.units, offer.unit_price);
            0.0
        }
        TradeSide::Sell => {
            let avg_cost = state.player.take_units(&offer.asset_id, offer.units)?;
            state.player.credit_cash(offer.notional());
            (offer.unit_price - avg_cost) * offer.units
        }
    };

    state.player.record_trade(TradeRecord {
        tick,
        day,
        asset_id: offer.asset_id.clone(),
        side: offer.player_side,
        units: offer.units,
        unit_price: offer.unit_price,
        realized_pnl: realized,
    });
    if offer.scrutiny_delta > 0.0 {
        let patch = PlayerPatch {
            scrutiny: Some(state.player.scrutiny + offer.scrutiny_delta),
            ..Default::default()
        };
        state.player.apply(&patch);
    }

    state.take_offer(offer_id);
    state.push_event(GameEvent::OfferAccepted {
        tick,
        day,
        offer_id: offer_id.to_string(),
    });
    Ok(())
}

/// Decline an offer, removing it without side effects
pub fn decline(
    state: &mut SimulationState,
    offer_id: &str,
    tick: usize,
    day: usize,
) -> Result<(), OfferError> {
    state
        .take_offer(offer_id)
        .ok_or_else(|| OfferError::NotFound(offer_id.to_string()))?;
    state.push_event(GameEvent::OfferDeclined {
        tick,
        day,
        offer_id: offer_id.to_string(),
    });
    Ok(())
}

/// The player's largest holding by market value
fn largest_holding(state: &SimulationState) -> Option<(String, f64)> {
    state
        .player
        .holdings
        .iter()
        .filter_map(|(id, holding)| {
            state
                .assets
                .get(id)
                .map(|asset| (id.clone(), holding.units, holding.units * asset.price))
        })
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, units, _)| (id, units))
}
