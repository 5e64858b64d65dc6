//! Offer subsystem tests through the orchestrator API.

use market_simulator_core_rs::models::{OfferKind, TradeSide};
use market_simulator_core_rs::{
    Orchestrator, OrchestratorConfig, SimulationError, TradeAction,
};

fn short_day_config(seed: &str) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default_market(seed);
    config.ticks_per_day = 20; // keep day loops cheap
    config
}

/// Run days until at least one offer is open, building a position first so
/// both offer kinds are possible.
fn run_until_offer(orch: &mut Orchestrator) {
    orch.start_trading().unwrap();
    orch.execute_trade(TradeAction::MarketBuy {
        asset_id: "asset_link".to_string(),
        units: 100.0,
    })
    .unwrap();

    for _ in 0..500 {
        while orch.status() == market_simulator_core_rs::SimulationStatus::Trading {
            orch.process_tick().unwrap();
        }
        orch.process_day().unwrap();
        if !orch.state().offers.is_empty() {
            return;
        }
        orch.start_trading().unwrap();
    }
    panic!("no offer generated in 500 days");
}

#[test]
fn test_offers_eventually_generated() {
    let mut orch = Orchestrator::new(short_day_config("offers-1")).unwrap();
    run_until_offer(&mut orch);

    let offer = &orch.state().offers[0];
    assert!(offer.units > 0.0);
    assert!(offer.unit_price > 0.0);
    assert!(offer.expires_day > offer.created_day);
}

#[test]
fn test_accept_offer_executes_trade() {
    let mut orch = Orchestrator::new(short_day_config("offers-2")).unwrap();
    run_until_offer(&mut orch);

    let offer = orch.state().offers[0].clone();
    let cash_before = orch.state().player.cash;
    let units_before = orch.state().player.units_of(&offer.asset_id);

    match orch.accept_offer(&offer.id) {
        Ok(()) => {
            match offer.player_side {
                TradeSide::Buy => {
                    assert!(
                        (orch.state().player.cash - (cash_before - offer.notional())).abs() < 1e-6
                    );
                    assert!(
                        (orch.state().player.units_of(&offer.asset_id)
                            - (units_before + offer.units))
                            .abs()
                            < 1e-6
                    );
                }
                TradeSide::Sell => {
                    assert!(
                        (orch.state().player.cash - (cash_before + offer.notional())).abs() < 1e-6
                    );
                    assert!(
                        (orch.state().player.units_of(&offer.asset_id)
                            - (units_before - offer.units))
                            .abs()
                            < 1e-6
                    );
                }
            }
            assert!(orch.state().get_offer(&offer.id).is_none());
        }
        Err(SimulationError::Offer(_)) => {
            // A buy offer can legitimately exceed current cash (e.g. after
            // other spending); the rejection must leave state untouched.
            assert_eq!(orch.state().player.cash, cash_before);
            assert_eq!(orch.state().player.units_of(&offer.asset_id), units_before);
            assert!(orch.state().get_offer(&offer.id).is_some());
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_decline_offer_no_side_effects() {
    let mut orch = Orchestrator::new(short_day_config("offers-3")).unwrap();
    run_until_offer(&mut orch);

    let offer_id = orch.state().offers[0].id.clone();
    let cash = orch.state().player.cash;
    let holdings = orch.state().player.holdings.clone();

    orch.decline_offer(&offer_id).unwrap();

    assert!(orch.state().get_offer(&offer_id).is_none());
    assert_eq!(orch.state().player.cash, cash);
    assert_eq!(orch.state().player.holdings, holdings);
}

#[test]
fn test_unknown_offer_rejected() {
    let mut orch = Orchestrator::new(short_day_config("offers-4")).unwrap();

    assert!(matches!(
        orch.accept_offer("offer_99999999"),
        Err(SimulationError::Offer(_))
    ));
    assert!(matches!(
        orch.decline_offer("offer_99999999"),
        Err(SimulationError::Offer(_))
    ));
}

#[test]
fn test_offers_expire() {
    let mut orch = Orchestrator::new(short_day_config("offers-5")).unwrap();
    run_until_offer(&mut orch);

    let offer_id = orch.state().offers[0].id.clone();

    // Let several days pass without touching the offer.
    for _ in 0..4 {
        orch.start_trading().unwrap();
        while orch.status() == market_simulator_core_rs::SimulationStatus::Trading {
            orch.process_tick().unwrap();
        }
        orch.process_day().unwrap();
    }

    assert!(
        orch.state().get_offer(&offer_id).is_none(),
        "offer survived past its TTL"
    );
}

#[test]
fn test_government_offer_raises_scrutiny() {
    // Hunt for a government offer specifically; accepting it must move
    // scrutiny up.
    for seed in 0..40 {
        let mut orch =
            Orchestrator::new(short_day_config(&format!("offers-gov-{seed}"))).unwrap();
        run_until_offer(&mut orch);

        let gov = orch
            .state()
            .offers
            .iter()
            .find(|o| o.kind == OfferKind::GovernmentBump)
            .cloned();
        if let Some(offer) = gov {
            let scrutiny_before = orch.state().player.scrutiny;
            if orch.accept_offer(&offer.id).is_ok() {
                assert!(orch.state().player.scrutiny > scrutiny_before);
                return;
            }
        }
    }
    panic!("no acceptable government offer across 40 seeds");
}
