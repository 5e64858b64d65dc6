//! Simulation State
//!
//! The complete in-memory state of a running market simulation: every
//! asset, the player, open articles/offers/ops, the event feed, and the
//! day's vibe.
//!
//! # Critical Invariants
//!
//! 1. **Deterministic iteration**: assets live in a `BTreeMap` so per-tick
//!    processing order is identical across runs — iteration order is part
//!    of the deterministic-replay contract
//! 2. **Unique ids**: asset/article/offer/op ids are minted from monotonic
//!    counters owned by this struct
//! 3. **Atomic reads**: subsystems read a consistent snapshot and return
//!    patches; no partial mutation is visible mid-step

use crate::models::asset::Asset;
use crate::models::event::{EventFeed, GameEvent};
use crate::models::news::NewsArticle;
use crate::models::offer::Offer;
use crate::models::op::ActiveOp;
use crate::models::player::PlayerState;
use crate::models::vibe::DailyVibe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle phase of the simulation
///
/// ```text
/// backfill → beginning-of-day → trading → end-of-day ─┐
///                  ▲                                  │
///                  └──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// Offline catch-up before the first interactive day
    Backfill,
    /// Waiting for the player to start trading
    BeginningOfDay,
    /// Live ticking
    Trading,
    /// Day's tick budget consumed; waiting for the day-advance routine
    EndOfDay,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub status: SimulationStatus,
    /// The day's market-wide bias
    pub vibe: DailyVibe,

    /// All assets, keyed by id. BTreeMap for deterministic iteration.
    pub assets: BTreeMap<String, Asset>,
    pub player: PlayerState,

    /// Published articles still being tracked (pruned when stale)
    pub articles: Vec<NewsArticle>,
    /// Open offers
    pub offers: Vec<Offer>,
    /// Running player operations
    pub ops: Vec<ActiveOp>,
    /// Bounded rolling event feed
    pub events: EventFeed,

    // Monotonic id counters
    pub next_article_id: usize,
    pub next_offer_id: usize,
    pub next_op_id: usize,
    pub next_order_id: usize,
    pub next_asset_id: usize,
}

impl SimulationState {
    /// Create the initial state from a seeded asset list and player
    pub fn new(assets: Vec<Asset>, player: PlayerState) -> Self {
        let assets_map = assets
            .into_iter()
            .map(|asset| (asset.id.clone(), asset))
            .collect();

        Self {
            status: SimulationStatus::Backfill,
            vibe: DailyVibe::normie(),
            assets: assets_map,
            player,
            articles: Vec::new(),
            offers: Vec::new(),
            ops: Vec::new(),
            events: EventFeed::new(),
            next_article_id: 1,
            next_offer_id: 1,
            next_op_id: 1,
            next_order_id: 1,
            next_asset_id: 1,
        }
    }

    /// Get reference to an asset by id
    pub fn get_asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Get mutable reference to an asset by id
    pub fn get_asset_mut(&mut self, id: &str) -> Option<&mut Asset> {
        self.assets.get_mut(id)
    }

    /// All asset ids in deterministic (sorted) order
    pub fn asset_ids(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }

    /// Ids of assets that have not been rugged, in deterministic order
    pub fn live_asset_ids(&self) -> Vec<String> {
        self.assets
            .iter()
            .filter(|(_, a)| !a.rugged)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Add a newly launched asset
    ///
    /// # Panics
    /// Panics if the asset id already exists (duplicate listing)
    pub fn add_asset(&mut self, asset: Asset) {
        assert!(
            !self.assets.contains_key(&asset.id),
            "Asset id {} already exists",
            asset.id
        );
        self.assets.insert(asset.id.clone(), asset);
    }

    /// Mint the next article id
    pub fn mint_article_id(&mut self) -> String {
        let id = format!("art_{:08}", self.next_article_id);
        self.next_article_id += 1;
        id
    }

    /// Mint the next offer id
    pub fn mint_offer_id(&mut self) -> String {
        let id = format!("offer_{:08}", self.next_offer_id);
        self.next_offer_id += 1;
        id
    }

    /// Mint the next op id
    pub fn mint_op_id(&mut self) -> String {
        let id = format!("op_{:08}", self.next_op_id);
        self.next_op_id += 1;
        id
    }

    /// Mint the next limit-order id
    pub fn mint_order_id(&mut self) -> String {
        let id = format!("ord_{:08}", self.next_order_id);
        self.next_order_id += 1;
        id
    }

    /// Mint the next launched-asset id
    pub fn mint_asset_id(&mut self) -> String {
        let id = format!("asset_launch_{:04}", self.next_asset_id);
        self.next_asset_id += 1;
        id
    }

    /// Find an open offer by id
    pub fn get_offer(&self, id: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == id)
    }

    /// Remove an offer by id, returning it
    pub fn take_offer(&mut self, id: &str) -> Option<Offer> {
        let idx = self.offers.iter().position(|o| o.id == id)?;
        Some(self.offers.remove(idx))
    }

    /// Push an event into the rolling feed
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::Asset;

    fn asset(id: &str) -> Asset {
        Asset::new(id, "X", "X", 1.0, 0.5, 100_000.0, 10.0, 0.5, 0.3, 0.1)
    }

    #[test]
    fn test_new_state() {
        let state = SimulationState::new(
            vec![asset("b"), asset("a")],
            PlayerState::new(10_000.0),
        );

        assert_eq!(state.num_assets(), 2);
        assert_eq!(state.status, SimulationStatus::Backfill);
        // BTreeMap keys come back sorted regardless of insertion order.
        assert_eq!(state.asset_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_live_asset_ids_excludes_rugged() {
        let mut state = SimulationState::new(
            vec![asset("a"), asset("b")],
            PlayerState::new(0.0),
        );
        state.get_asset_mut("a").unwrap().rugged = true;

        assert_eq!(state.live_asset_ids(), vec!["b".to_string()]);
    }

    #[test]
    fn test_id_minting_monotonic() {
        let mut state = SimulationState::new(vec![], PlayerState::new(0.0));

        assert_eq!(state.mint_article_id(), "art_00000001");
        assert_eq!(state.mint_article_id(), "art_00000002");
        assert_eq!(state.mint_offer_id(), "offer_00000001");
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_duplicate_asset_panics() {
        let mut state = SimulationState::new(vec![asset("a")], PlayerState::new(0.0));
        state.add_asset(asset("a"));
    }

    #[test]
    fn test_take_offer() {
        let mut state = SimulationState::new(vec![], PlayerState::new(0.0));
        state.offers.push(crate::models::offer::Offer {
            id: "offer_00000001".to_string(),
            kind: crate::models::offer::OfferKind::WhaleOtc,
            asset_id: "a".to_string(),
            player_side: crate::models::player::TradeSide::Buy,
            units: 1.0,
            unit_price: 1.0,
            scrutiny_delta: 0.0,
            created_day: 0,
            expires_day: 2,
        });

        assert!(state.get_offer("offer_00000001").is_some());
        assert!(state.take_offer("offer_00000001").is_some());
        assert!(state.get_offer("offer_00000001").is_none());
        assert!(state.take_offer("offer_00000001").is_none());
    }
}
