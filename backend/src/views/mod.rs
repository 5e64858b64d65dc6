//! Read-only selectors
//!
//! Pure reads over the state snapshot for UI/HTTP collaborators: the
//! portfolio table, headline KPIs, and filtered asset lists. Nothing here
//! mutates state or draws randomness.

use crate::models::asset::{Asset, AssetTier};
use crate::models::state::{SimulationState, SimulationStatus};
use serde::{Deserialize, Serialize};

/// One row of the portfolio table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    pub asset_id: String,
    pub symbol: String,
    pub units: f64,
    pub price: f64,
    pub value: f64,
    /// Unrealized P&L against the volume-weighted average cost
    pub unrealized_pnl: f64,
}

/// Headline numbers for the KPI strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub day: usize,
    pub status: SimulationStatus,
    pub net_worth: f64,
    pub cash: f64,
    pub frozen_cash: f64,
    pub realized_pnl: f64,
    pub reputation: f64,
    pub scrutiny: f64,
    pub open_offers: usize,
    pub live_assets: usize,
}

/// Filter for asset listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetFilter {
    pub tier: Option<AssetTier>,
    /// None = both; Some(false) = live only; Some(true) = rugged only
    pub rugged: Option<bool>,
    pub min_liquidity_usd: Option<f64>,
}

/// Build the portfolio table from current holdings and prices
pub fn portfolio_table(state: &SimulationState) -> Vec<PortfolioRow> {
    state
        .player
        .holdings
        .iter()
        .filter_map(|(asset_id, holding)| {
            let asset = state.assets.get(asset_id)?;
            Some(PortfolioRow {
                asset_id: asset_id.clone(),
                symbol: asset.symbol.clone(),
                units: holding.units,
                price: asset.price,
                value: holding.units * asset.price,
                unrealized_pnl: (asset.price - holding.avg_cost) * holding.units,
            })
        })
        .collect()
}

/// Headline KPIs
pub fn kpis(state: &SimulationState, day: usize) -> Kpis {
    Kpis {
        day,
        status: state.status,
        net_worth: state.player.net_worth,
        cash: state.player.cash,
        frozen_cash: state.player.frozen_cash,
        realized_pnl: state.player.realized_pnl,
        reputation: state.player.reputation,
        scrutiny: state.player.scrutiny,
        open_offers: state.offers.len(),
        live_assets: state.assets.values().filter(|a| !a.rugged).count(),
    }
}

/// Assets matching a filter, in deterministic id order
pub fn filtered_assets<'a>(state: &'a SimulationState, filter: &AssetFilter) -> Vec<&'a Asset> {
    state
        .assets
        .values()
        .filter(|asset| {
            filter.tier.map_or(true, |t| asset.tier == t)
                && filter.rugged.map_or(true, |r| asset.rugged == r)
                && filter
                    .min_liquidity_usd
                    .map_or(true, |min| asset.liquidity_usd >= min)
        })
        .collect()
}
