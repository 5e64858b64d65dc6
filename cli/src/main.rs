//! Offline day-batch driver
//!
//! Runs the simulation for N whole days from a seed and prints one KPI line
//! per day. This is the library-level equivalent of the external day-batch
//! endpoint: a plain loop over start-trading / tick / advance-day, adding
//! no semantics of its own.
//!
//! Usage: market-sim [SEED] [DAYS] [--dev]

use market_simulator_core_rs::{
    GameStore, InMemoryStore, Orchestrator, OrchestratorConfig, RiskConfig,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_else(|| "demo-seed".to_string());
    let days: usize = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(5);
    let devmode = args.iter().any(|a| a == "--dev");

    let mut config = OrchestratorConfig::default_market(seed.clone());
    if devmode {
        config.risk = RiskConfig::devmode();
    }

    let mut orchestrator = match Orchestrator::new(config) {
        Ok(orch) => orch,
        Err(err) => {
            eprintln!("failed to initialize simulation: {err}");
            std::process::exit(1);
        }
    };

    let mut store = InMemoryStore::new();
    let profile_id = format!("profile_{seed}");

    println!("seed={seed} days={days} devmode={devmode}");
    for _ in 0..days {
        match orchestrator.run_days(1) {
            Ok(results) => {
                let day = &results[0];
                let kpis = orchestrator.kpis();
                println!(
                    "day {:>3} | net worth {:>12.2} | cash {:>12.2} | articles {} | offers {} | launch {}",
                    day.completed_day,
                    kpis.net_worth,
                    kpis.cash,
                    day.articles_published,
                    day.offers_created,
                    day.launched.as_deref().unwrap_or("-"),
                );
            }
            Err(err) => {
                eprintln!("simulation failed: {err}");
                std::process::exit(1);
            }
        }
        orchestrator.save_if_dirty(&mut store, &profile_id);
    }

    match store.load_game(&profile_id) {
        Ok(Some(saved)) => match serde_json::to_string(&saved.market_vibe) {
            Ok(vibe) => println!("final vibe: {vibe}"),
            Err(err) => log::warn!("could not encode final vibe: {err}"),
        },
        Ok(None) => log::warn!("no save found for {profile_id}"),
        Err(err) => log::warn!("load failed: {err}"),
    }
}
