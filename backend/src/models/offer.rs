//! Offer model
//!
//! Opportunistic proposals generated by the offer subsystem. An offer is
//! accepted whole or not at all: acceptance executes the implied trade and
//! removes the offer, declining just removes it, and unaccepted offers are
//! pruned once their expiry day passes.

use crate::models::player::TradeSide;
use serde::{Deserialize, Serialize};

/// The two offer flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    /// A government agency buys a chunk of the player's largest holding at a
    /// generous premium, at the cost of increased scrutiny
    GovernmentBump,
    /// A whale proposes an over-the-counter block trade off the open market
    WhaleOtc,
}

/// Days after creation at which an unaccepted offer expires
pub const OFFER_TTL_DAYS: usize = 2;

/// An open offer to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Deterministic id (e.g. "offer_00000007")
    pub id: String,
    pub kind: OfferKind,
    pub asset_id: String,
    /// What the player does if they accept (sell to the counterparty, or
    /// buy from them)
    pub player_side: TradeSide,
    pub units: f64,
    /// Price per unit the counterparty is committing to
    pub unit_price: f64,
    /// Scrutiny added on acceptance (government offers only)
    pub scrutiny_delta: f64,
    pub created_day: usize,
    pub expires_day: usize,
}

impl Offer {
    /// Whether the offer has expired by `day`
    pub fn is_expired(&self, day: usize) -> bool {
        day >= self.expires_day
    }

    /// Total cash that changes hands on acceptance
    pub fn notional(&self) -> f64 {
        self.units * self.unit_price
    }
}
