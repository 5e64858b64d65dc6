//! Player state model
//!
//! The single player's wallet, holdings, and standing scalars. Created once
//! at onboarding and mutated continuously afterwards.
//!
//! # Critical Invariants
//!
//! 1. **Cash never negative**: debits are rejected, never clamped
//! 2. **Units never negative**: selling more than held is rejected
//! 3. **Derived net worth**: `net_worth` is recomputed from holdings x price
//!    + cash + LP value every tick; it is never an independent source of
//!    truth

use crate::models::asset::Asset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from low-level wallet operations
#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    #[error("Insufficient cash: required {required:.2}, available {available:.2}")]
    InsufficientCash { required: f64, available: f64 },

    #[error("Insufficient units of {asset_id}: required {required}, held {held}")]
    InsufficientUnits {
        asset_id: String,
        required: f64,
        held: f64,
    },

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(f64),
}

/// A position in one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Units held
    pub units: f64,
    /// Volume-weighted average cost per unit (for realized P&L)
    pub avg_cost: f64,
}

/// A passive liquidity-pool position, valued directly in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpPosition {
    pub asset_id: String,
    pub usd_value: f64,
}

/// Side of a trade or resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A resting limit order, checked against current prices every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub id: String,
    pub asset_id: String,
    pub side: TradeSide,
    /// Buy fills at or below this price; sell fills at or above it
    pub trigger_price: f64,
    pub units: f64,
    pub placed_tick: usize,
}

/// One executed trade, for the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub tick: usize,
    pub day: usize,
    pub asset_id: String,
    pub side: TradeSide,
    pub units: f64,
    pub unit_price: f64,
    /// Realized P&L of this fill (zero for buys)
    pub realized_pnl: f64,
}

/// Maximum ledger entries retained (oldest evicted first)
pub const TRADE_LEDGER_CAP: usize = 500;

/// The player's complete state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Free cash (centralized balance), excludes frozen funds
    pub cash: f64,
    /// Cash locked by an account freeze
    pub frozen_cash: f64,
    /// Tick at which frozen cash unlocks
    pub freeze_release_tick: Option<usize>,

    /// Derived every tick; see module invariants
    pub net_worth: f64,

    /// Holdings keyed by asset id (BTreeMap: deterministic iteration)
    pub holdings: BTreeMap<String, Holding>,
    /// Passive LP positions
    pub lp_positions: Vec<LpPosition>,
    /// Resting limit orders
    pub limit_orders: Vec<LimitOrder>,
    /// Bounded trade history, oldest first
    pub trade_ledger: Vec<TradeRecord>,
    /// Cumulative realized P&L
    pub realized_pnl: f64,

    /// Standing scalars, all in [0, 1]
    pub reputation: f64,
    pub influence: f64,
    pub security: f64,
    pub scrutiny: f64,
    pub exposure: f64,
}

impl PlayerState {
    /// Fresh player with the given starting cash
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            frozen_cash: 0.0,
            freeze_release_tick: None,
            net_worth: starting_cash,
            holdings: BTreeMap::new(),
            lp_positions: Vec::new(),
            limit_orders: Vec::new(),
            trade_ledger: Vec::new(),
            realized_pnl: 0.0,
            reputation: 0.5,
            influence: 0.1,
            security: 0.5,
            scrutiny: 0.0,
            exposure: 0.0,
        }
    }

    /// Units held of an asset (zero if no position)
    pub fn units_of(&self, asset_id: &str) -> f64 {
        self.holdings.get(asset_id).map_or(0.0, |h| h.units)
    }

    /// Remove cash, rejecting overdrafts
    pub fn debit_cash(&mut self, amount: f64) -> Result<(), WalletError> {
        if amount <= 0.0 {
            return Err(WalletError::NonPositiveAmount(amount));
        }
        if amount > self.cash {
            return Err(WalletError::InsufficientCash {
                required: amount,
                available: self.cash,
            });
        }
        self.cash -= amount;
        Ok(())
    }

    /// Add cash
    pub fn credit_cash(&mut self, amount: f64) {
        self.cash += amount;
    }

    /// Add units to a holding, updating the volume-weighted average cost
    pub fn add_units(&mut self, asset_id: &str, units: f64, unit_price: f64) {
        let holding = self.holdings.entry(asset_id.to_string()).or_insert(Holding {
            units: 0.0,
            avg_cost: 0.0,
        });
        let total_cost = holding.units * holding.avg_cost + units * unit_price;
        holding.units += units;
        holding.avg_cost = if holding.units > 0.0 {
            total_cost / holding.units
        } else {
            0.0
        };
    }

    /// Remove units from a holding, rejecting oversells
    ///
    /// Returns the average cost of the removed units (for realized P&L).
    /// A holding emptied to zero is removed from the map.
    pub fn take_units(&mut self, asset_id: &str, units: f64) -> Result<f64, WalletError> {
        if units <= 0.0 {
            return Err(WalletError::NonPositiveAmount(units));
        }
        let held = self.units_of(asset_id);
        if units > held + 1e-9 {
            return Err(WalletError::InsufficientUnits {
                asset_id: asset_id.to_string(),
                required: units,
                held,
            });
        }

        let holding = self
            .holdings
            .get_mut(asset_id)
            .expect("checked above: holding exists");
        let avg_cost = holding.avg_cost;
        holding.units -= units;
        if holding.units <= 1e-9 {
            self.holdings.remove(asset_id);
        }
        Ok(avg_cost)
    }

    /// Append to the bounded trade ledger
    pub fn record_trade(&mut self, record: TradeRecord) {
        self.realized_pnl += record.realized_pnl;
        self.trade_ledger.push(record);
        if self.trade_ledger.len() > TRADE_LEDGER_CAP {
            let overflow = self.trade_ledger.len() - TRADE_LEDGER_CAP;
            self.trade_ledger.drain(..overflow);
        }
    }

    /// Lock a fraction of free cash until `release_tick`
    pub fn freeze_cash(&mut self, amount: f64, release_tick: usize) {
        let amount = amount.min(self.cash);
        self.cash -= amount;
        self.frozen_cash += amount;
        self.freeze_release_tick = Some(release_tick);
    }

    /// Release frozen cash if the lock has expired
    pub fn maybe_unfreeze(&mut self, current_tick: usize) -> bool {
        match self.freeze_release_tick {
            Some(release) if current_tick >= release => {
                self.cash += self.frozen_cash;
                self.frozen_cash = 0.0;
                self.freeze_release_tick = None;
                true
            }
            _ => false,
        }
    }

    /// Recompute net worth from current prices
    ///
    /// net worth = free cash + frozen cash + sum(units x price) + LP value
    pub fn recompute_net_worth(&mut self, assets: &BTreeMap<String, Asset>) -> f64 {
        let holdings_value: f64 = self
            .holdings
            .iter()
            .map(|(id, holding)| {
                assets
                    .get(id)
                    .map_or(0.0, |asset| holding.units * asset.price)
            })
            .sum();
        let lp_value: f64 = self.lp_positions.iter().map(|lp| lp.usd_value).sum();

        self.net_worth = self.cash + self.frozen_cash + holdings_value + lp_value;
        self.net_worth
    }

    /// Apply a patch produced by a subsystem
    pub fn apply(&mut self, patch: &PlayerPatch) {
        if let Some(cash) = patch.cash {
            self.cash = cash.max(0.0);
        }
        if let Some(reputation) = patch.reputation {
            self.reputation = reputation.clamp(0.0, 1.0);
        }
        if let Some(influence) = patch.influence {
            self.influence = influence.clamp(0.0, 1.0);
        }
        if let Some(security) = patch.security {
            self.security = security.clamp(0.0, 1.0);
        }
        if let Some(scrutiny) = patch.scrutiny {
            self.scrutiny = scrutiny.clamp(0.0, 1.0);
        }
        if let Some(exposure) = patch.exposure {
            self.exposure = exposure.clamp(0.0, 1.0);
        }
    }
}

/// Partial update to the player, applied atomically by [`PlayerState::apply`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub cash: Option<f64>,
    pub reputation: Option<f64>,
    pub influence: Option<f64>,
    pub security: Option<f64>,
    pub scrutiny: Option<f64>,
    pub exposure: Option<f64>,
}
