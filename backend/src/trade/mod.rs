//! Trade execution and player operations
//!
//! The action boundary of the simulation: market orders, limit orders, and
//! the shadier "ops" (pump campaigns, wash trading). Everything here
//! validates synchronously before mutating — an invalid action is rejected
//! with a descriptive error and zero state change.

use crate::models::asset::AssetPatch;
use crate::models::event::GameEvent;
use crate::models::op::{ActiveOp, OpKind};
use crate::models::player::{LimitOrder, PlayerPatch, TradeRecord, TradeSide, WalletError};
use crate::models::state::SimulationState;
use thiserror::Error;

/// Errors from the action boundary
#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Asset {0} is rugged; the market is gone")]
    AssetRugged(String),

    #[error("Unknown limit order: {0}")]
    UnknownOrder(String),

    #[error("Units must be positive, got {0}")]
    NonPositiveUnits(f64),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// A player-initiated market action
#[derive(Debug, Clone, PartialEq)]
pub enum TradeAction {
    MarketBuy {
        asset_id: String,
        units: f64,
    },
    MarketSell {
        asset_id: String,
        units: f64,
    },
    PlaceLimit {
        asset_id: String,
        side: TradeSide,
        trigger_price: f64,
        units: f64,
    },
    CancelLimit {
        order_id: String,
    },
}

/// A player-initiated operation
#[derive(Debug, Clone, PartialEq)]
pub enum OpAction {
    StartPump { asset_id: String },
    StartWash { asset_id: String },
}

/// Execute a market action at the current price
///
/// Invariant violations (overspending, overselling, unknown asset) are
/// rejected here with state untouched.
pub fn execute_trade(
    state: &mut SimulationState,
    action: TradeAction,
    tick: usize,
    day: usize,
) -> Result<(), TradeError> {
    match action {
        TradeAction::MarketBuy { asset_id, units } => {
            let price = live_price(state, &asset_id)?;
            if units <= 0.0 {
                return Err(TradeError::NonPositiveUnits(units));
            }
            state.player.debit_cash(units * price)?;
            state.player.add_units(&asset_id, units, price);
            record(state, tick, day, &asset_id, TradeSide::Buy, units, price, 0.0);
            Ok(())
        }
        TradeAction::MarketSell { asset_id, units } => {
            let price = live_price(state, &asset_id)?;
            let avg_cost = state.player.take_units(&asset_id, units)?;
            state.player.credit_cash(units * price);
            let realized = (price - avg_cost) * units;
            record(state, tick, day, &asset_id, TradeSide::Sell, units, price, realized);
            Ok(())
        }
        TradeAction::PlaceLimit {
            asset_id,
            side,
            trigger_price,
            units,
        } => {
            live_price(state, &asset_id)?;
            if units <= 0.0 {
                return Err(TradeError::NonPositiveUnits(units));
            }
            let id = state.mint_order_id();
            state.player.limit_orders.push(LimitOrder {
                id,
                asset_id,
                side,
                trigger_price,
                units,
                placed_tick: tick,
            });
            Ok(())
        }
        TradeAction::CancelLimit { order_id } => {
            let before = state.player.limit_orders.len();
            state.player.limit_orders.retain(|o| o.id != order_id);
            if state.player.limit_orders.len() == before {
                return Err(TradeError::UnknownOrder(order_id));
            }
            Ok(())
        }
    }
}

/// Start an operation on an asset
pub fn execute_op(
    state: &mut SimulationState,
    action: OpAction,
    tick: usize,
    day: usize,
) -> Result<(), TradeError> {
    let (kind, asset_id) = match action {
        OpAction::StartPump { asset_id } => (OpKind::PumpCampaign, asset_id),
        OpAction::StartWash { asset_id } => (OpKind::WashTrading, asset_id),
    };
    live_price(state, &asset_id)?;

    let id = state.mint_op_id();
    state.ops.push(ActiveOp {
        id: id.clone(),
        kind,
        asset_id: asset_id.clone(),
        started_tick: tick,
    });
    state.push_event(GameEvent::OpStarted {
        tick,
        day,
        op_id: id,
        asset_id,
    });
    Ok(())
}

/// Per-tick op accrual and maturation
///
/// Running ops drip hype into their asset and exposure/scrutiny onto the
/// player; finished ops are removed and logged.
pub fn accrue_ops(state: &mut SimulationState, tick: usize, day: usize) {
    let mut finished = Vec::new();
    let mut hype_deltas: Vec<(String, f64)> = Vec::new();
    let mut exposure_delta = 0.0;
    let mut scrutiny_delta = 0.0;

    for op in &state.ops {
        if op.is_finished(tick) {
            finished.push(op.id.clone());
        } else {
            hype_deltas.push((op.asset_id.clone(), op.kind.hype_per_tick()));
            exposure_delta += op.kind.exposure_per_tick();
            scrutiny_delta += op.kind.scrutiny_per_tick();
        }
    }

    for (asset_id, delta) in hype_deltas {
        let patch = state.get_asset(&asset_id).map(|asset| AssetPatch {
            social_hype: Some(asset.social_hype + delta),
            ..Default::default()
        });
        if let (Some(patch), Some(asset)) = (patch, state.get_asset_mut(&asset_id)) {
            asset.apply(&patch);
        }
    }
    if exposure_delta > 0.0 || scrutiny_delta > 0.0 {
        let patch = PlayerPatch {
            exposure: Some(state.player.exposure + exposure_delta),
            scrutiny: Some(state.player.scrutiny + scrutiny_delta),
            ..Default::default()
        };
        state.player.apply(&patch);
    }

    for op_id in finished {
        state.ops.retain(|o| o.id != op_id);
        state.push_event(GameEvent::OpResolved { tick, day, op_id });
    }
}

/// Check resting limit orders against current prices
///
/// A buy fills once the price is at or below its trigger; a sell once at or
/// above. Fills execute at the current market price. An order whose fill
/// can no longer be funded (or covered) is dropped with a logged warning
/// rather than crashing the tick loop.
pub fn check_limit_orders(state: &mut SimulationState, tick: usize, day: usize) {
    let triggered: Vec<LimitOrder> = state
        .player
        .limit_orders
        .iter()
        .filter(|order| match state.get_asset(&order.asset_id) {
            Some(asset) => match order.side {
                TradeSide::Buy => asset.price <= order.trigger_price,
                TradeSide::Sell => asset.price >= order.trigger_price,
            },
            None => false,
        })
        .cloned()
        .collect();

    for order in triggered {
        state.player.limit_orders.retain(|o| o.id != order.id);

        let price = match state.get_asset(&order.asset_id) {
            Some(asset) => asset.price,
            None => continue,
        };

        let result: Result<f64, WalletError> = match order.side {
            TradeSide::Buy => state
                .player
                .debit_cash(order.units * price)
                .map(|_| {
                    state.player.add_units(&order.asset_id, order.units, price);
                    0.0
                }),
            TradeSide::Sell => state.player.take_units(&order.asset_id, order.units).map(|avg| {
                state.player.credit_cash(order.units * price);
                (price - avg) * order.units
            }),
        };

        match result {
            Ok(realized) => {
                record(
                    state,
                    tick,
                    day,
                    &order.asset_id,
                    order.side,
                    order.units,
                    price,
                    realized,
                );
                state.push_event(GameEvent::LimitOrderFilled {
                    tick,
                    day,
                    order_id: order.id,
                    asset_id: order.asset_id,
                    unit_price: price,
                });
            }
            Err(err) => {
                log::warn!("limit order {} dropped at fill time: {}", order.id, err);
            }
        }
    }
}

/// Price of a tradable (non-rugged, known) asset
fn live_price(state: &SimulationState, asset_id: &str) -> Result<f64, TradeError> {
    let asset = state
        .get_asset(asset_id)
        .ok_or_else(|| TradeError::UnknownAsset(asset_id.to_string()))?;
    if asset.rugged {
        return Err(TradeError::AssetRugged(asset_id.to_string()));
    }
    Ok(asset.price)
}

#[allow(clippy::too_many_arguments)]
fn record(
    state: &mut SimulationState,
    tick: usize,
    day: usize,
    asset_id: &str,
    side: TradeSide,
    units: f64,
    unit_price: f64,
    realized_pnl: f64,
) {
    state.player.record_trade(TradeRecord {
        tick,
        day,
        asset_id: asset_id.to_string(),
        side,
        units,
        unit_price,
        realized_pnl,
    });
    state.push_event(GameEvent::TradeExecuted {
        tick,
        day,
        asset_id: asset_id.to_string(),
        units,
        unit_price,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::Asset;
    use crate::models::player::PlayerState;

    fn state() -> SimulationState {
        SimulationState::new(
            vec![Asset::new(
                "a", "AAA", "Asset A", 10.0, 0.5, 1_000_000.0, 10.0, 0.6, 0.4, 0.1,
            )],
            PlayerState::new(1_000.0),
        )
    }

    #[test]
    fn test_buy_then_sell_round_trip() {
        let mut s = state();

        execute_trade(
            &mut s,
            TradeAction::MarketBuy {
                asset_id: "a".to_string(),
                units: 50.0,
            },
            0,
            0,
        )
        .unwrap();
        assert_eq!(s.player.cash, 500.0);
        assert_eq!(s.player.units_of("a"), 50.0);

        s.get_asset_mut("a").unwrap().price = 12.0;
        execute_trade(
            &mut s,
            TradeAction::MarketSell {
                asset_id: "a".to_string(),
                units: 50.0,
            },
            5,
            0,
        )
        .unwrap();
        assert_eq!(s.player.cash, 500.0 + 600.0);
        assert!((s.player.realized_pnl - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overspend_rejected() {
        let mut s = state();
        let err = execute_trade(
            &mut s,
            TradeAction::MarketBuy {
                asset_id: "a".to_string(),
                units: 1_000.0, // 10k notional vs 1k cash
            },
            0,
            0,
        )
        .unwrap_err();

        assert!(matches!(err, TradeError::Wallet(WalletError::InsufficientCash { .. })));
        assert_eq!(s.player.cash, 1_000.0);
        assert_eq!(s.player.units_of("a"), 0.0);
    }

    #[test]
    fn test_oversell_rejected() {
        let mut s = state();
        let err = execute_trade(
            &mut s,
            TradeAction::MarketSell {
                asset_id: "a".to_string(),
                units: 1.0,
            },
            0,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, TradeError::Wallet(WalletError::InsufficientUnits { .. })));
    }

    #[test]
    fn test_rugged_asset_not_tradable() {
        let mut s = state();
        s.get_asset_mut("a").unwrap().rugged = true;

        let err = execute_trade(
            &mut s,
            TradeAction::MarketBuy {
                asset_id: "a".to_string(),
                units: 1.0,
            },
            0,
            0,
        )
        .unwrap_err();
        assert_eq!(err, TradeError::AssetRugged("a".to_string()));
    }

    #[test]
    fn test_limit_buy_fills_on_dip() {
        let mut s = state();
        execute_trade(
            &mut s,
            TradeAction::PlaceLimit {
                asset_id: "a".to_string(),
                side: TradeSide::Buy,
                trigger_price: 8.0,
                units: 10.0,
            },
            0,
            0,
        )
        .unwrap();

        // Above trigger: rests.
        check_limit_orders(&mut s, 1, 0);
        assert_eq!(s.player.limit_orders.len(), 1);

        // Dip below trigger: fills at market.
        s.get_asset_mut("a").unwrap().price = 7.5;
        check_limit_orders(&mut s, 2, 0);
        assert!(s.player.limit_orders.is_empty());
        assert_eq!(s.player.units_of("a"), 10.0);
        assert_eq!(s.player.cash, 1_000.0 - 75.0);
    }

    #[test]
    fn test_unfundable_limit_order_dropped() {
        let mut s = state();
        s.player.cash = 5.0;
        execute_trade(
            &mut s,
            TradeAction::PlaceLimit {
                asset_id: "a".to_string(),
                side: TradeSide::Buy,
                trigger_price: 11.0, // fills immediately at price 10
                units: 10.0,
            },
            0,
            0,
        )
        .unwrap();

        check_limit_orders(&mut s, 1, 0);
        // Dropped, not filled, not crashed.
        assert!(s.player.limit_orders.is_empty());
        assert_eq!(s.player.units_of("a"), 0.0);
        assert_eq!(s.player.cash, 5.0);
    }

    #[test]
    fn test_ops_accrue_and_resolve() {
        let mut s = state();
        execute_op(
            &mut s,
            OpAction::StartPump {
                asset_id: "a".to_string(),
            },
            0,
            0,
        )
        .unwrap();
        assert_eq!(s.ops.len(), 1);

        let hype_before = s.assets["a"].social_hype;
        accrue_ops(&mut s, 1, 0);
        assert!(s.assets["a"].social_hype > hype_before);
        assert!(s.player.exposure > 0.0);

        // Past the op's duration it resolves and disappears.
        accrue_ops(&mut s, 10_000, 0);
        assert!(s.ops.is_empty());
    }

    #[test]
    fn test_cancel_limit() {
        let mut s = state();
        execute_trade(
            &mut s,
            TradeAction::PlaceLimit {
                asset_id: "a".to_string(),
                side: TradeSide::Sell,
                trigger_price: 20.0,
                units: 1.0,
            },
            0,
            0,
        )
        .unwrap();
        let id = s.player.limit_orders[0].id.clone();

        execute_trade(&mut s, TradeAction::CancelLimit { order_id: id }, 1, 0).unwrap();
        assert!(s.player.limit_orders.is_empty());

        let err = execute_trade(
            &mut s,
            TradeAction::CancelLimit {
                order_id: "ord_nope".to_string(),
            },
            2,
            0,
        )
        .unwrap_err();
        assert_eq!(err, TradeError::UnknownOrder("ord_nope".to_string()));
    }
}
