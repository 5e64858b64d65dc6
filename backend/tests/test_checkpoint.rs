//! Checkpoint tests: save/restore resumes the exact future sequence.

use market_simulator_core_rs::storage::FailingStore;
use market_simulator_core_rs::{
    GameStore, InMemoryStore, Orchestrator, OrchestratorConfig, SimulationStatus,
};

fn config(seed: &str) -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default_market(seed);
    config.ticks_per_day = 50;
    config
}

/// Asset prices in deterministic order, for exact comparison.
fn prices(orch: &Orchestrator) -> Vec<(String, f64)> {
    orch.state()
        .assets
        .iter()
        .map(|(id, a)| (id.clone(), a.price))
        .collect()
}

#[test]
fn test_resume_reproduces_future_exactly() {
    let mut original = Orchestrator::new(config("resume")).unwrap();
    original.start_trading().unwrap();
    for _ in 0..20 {
        original.process_tick().unwrap();
    }

    // Snapshot mid-day, then let the original continue.
    let saved = original.snapshot().unwrap();
    for _ in 0..30 {
        original.process_tick().unwrap();
    }
    original.process_day().unwrap();

    // Restore and replay the same stretch.
    let mut restored = Orchestrator::restore(config("resume"), saved).unwrap();
    assert_eq!(restored.status(), SimulationStatus::Trading);
    for _ in 0..30 {
        restored.process_tick().unwrap();
    }
    restored.process_day().unwrap();

    assert_eq!(prices(&original), prices(&restored));
    assert_eq!(original.rng_state(), restored.rng_state());
    assert_eq!(original.current_tick(), restored.current_tick());
    assert_eq!(original.current_day(), restored.current_day());
    assert_eq!(
        original.state().articles.len(),
        restored.state().articles.len()
    );
    assert_eq!(original.state().offers.len(), restored.state().offers.len());
}

#[test]
fn test_store_round_trip() {
    let mut orch = Orchestrator::new(config("store")).unwrap();
    orch.run_days(2).unwrap();

    let mut store = InMemoryStore::new();
    assert!(orch.is_dirty());
    assert!(orch.save_if_dirty(&mut store, "profile_x"));
    assert!(!orch.is_dirty());

    // A clean orchestrator skips redundant saves.
    assert!(!orch.save_if_dirty(&mut store, "profile_x"));

    let saved = store.load_game("profile_x").unwrap().expect("save exists");
    assert_eq!(saved.current_day, 2);
    assert_eq!(saved.seed, "store");

    let restored = Orchestrator::restore(config("store"), saved).unwrap();
    assert_eq!(prices(&orch), prices(&restored));
    assert_eq!(orch.rng_state(), restored.rng_state());
}

#[test]
fn test_failed_save_keeps_dirty_and_simulation_alive() {
    let mut orch = Orchestrator::new(config("failing")).unwrap();
    orch.run_days(1).unwrap();

    let mut store = FailingStore;
    assert!(!orch.save_if_dirty(&mut store, "profile_x"));
    assert!(orch.is_dirty(), "dirty flag must survive a failed save");

    // The simulation continues regardless of the storage outage.
    orch.run_days(1).unwrap();
    assert_eq!(orch.current_day(), 2);

    // A later healthy save carries everything accumulated since.
    let mut healthy = InMemoryStore::new();
    assert!(orch.save_if_dirty(&mut healthy, "profile_x"));
    let saved = healthy.load_game("profile_x").unwrap().unwrap();
    assert_eq!(saved.current_day, 2);
}

#[test]
fn test_mutation_sets_dirty() {
    let mut orch = Orchestrator::new(config("dirty")).unwrap();
    let mut store = InMemoryStore::new();
    orch.save_if_dirty(&mut store, "p");
    assert!(!orch.is_dirty());

    orch.start_trading().unwrap();
    assert!(orch.is_dirty());
    orch.save_if_dirty(&mut store, "p");

    orch.process_tick().unwrap();
    assert!(orch.is_dirty());
}

#[test]
fn test_restore_carries_id_counters() {
    let mut orch = Orchestrator::new(config("counters")).unwrap();
    orch.run_days(3).unwrap();

    let articles_minted = orch.state().next_article_id;
    assert!(articles_minted > 1, "three days of news mint article ids");

    let saved = orch.snapshot().unwrap();
    let restored = Orchestrator::restore(config("counters"), saved).unwrap();
    assert_eq!(restored.state().next_article_id, articles_minted);
    assert_eq!(restored.state().next_offer_id, orch.state().next_offer_id);
}
