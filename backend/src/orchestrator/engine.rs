//! Orchestrator Engine
//!
//! Main simulation loop integrating all components:
//! - Price/volume ticks (per-asset trade generation)
//! - Risk evaluation (rugs, scams, hacks, buybacks, freezes)
//! - Player actions (trades, ops, offers)
//! - Day advancement (news, offers, launches, gaps, candle compaction)
//!
//! # Architecture
//!
//! ```text
//! For each tick t (status = Trading):
//! 1. Per asset (deterministic order): rug bleed OR pricing tick + risk checks
//! 2. Global oracle-hack roll
//! 3. Op accrual / maturation
//! 4. Freeze roll + unfreeze check
//! 5. Limit-order checks
//! 6. Net-worth recompute
//! 7. Advance time; auto-transition to EndOfDay once the budget is consumed
//!
//! On process_day (status = Trading|EndOfDay):
//! fast-forward remaining ticks → news → debunks → offers → coin launch →
//! rug warnings → overnight gaps → candle compaction → vibe roll → new day
//! ```
//!
//! # Determinism
//!
//! All randomness goes through one seeded [`RngManager`]; assets iterate in
//! BTreeMap order; draw counts depend only on deterministic state. Same
//! seed + same config + same action sequence = identical history.

use crate::aggregator;
use crate::core::time::TimeManager;
use crate::core::TICKS_PER_DAY;
use crate::launch;
use crate::models::asset::Asset;
use crate::models::event::GameEvent;
use crate::models::player::PlayerState;
use crate::models::state::{SimulationState, SimulationStatus};
use crate::models::vibe::DailyVibe;
use crate::news;
use crate::offers::{self, OfferError};
use crate::pricing;
use crate::risk::{self, RiskConfig};
use crate::rng::RngManager;
use crate::storage::GameStore;
use crate::trade::{self, OpAction, TradeAction, TradeError};
use crate::views::{self, AssetFilter, Kpis, PortfolioRow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Per-asset listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub base_volume: f64,
    pub liquidity_usd: f64,
    pub dev_tokens_pct: f64,
    pub audit_score: f64,
    pub social_hype: f64,
    pub base_volatility: f64,
}

impl AssetConfig {
    fn build(&self) -> Asset {
        Asset::new(
            self.id.clone(),
            self.symbol.clone(),
            self.name.clone(),
            self.price,
            self.base_volume,
            self.liquidity_usd,
            self.dev_tokens_pct,
            self.audit_score,
            self.social_hype,
            self.base_volatility,
        )
    }
}

/// Complete orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Textual seed; the same seed reproduces the same history
    pub seed: String,

    /// Ticks per trading day (1800 = one per real second of the window)
    pub ticks_per_day: usize,

    /// Player's cash at onboarding
    pub starting_cash: f64,

    /// The static seed list of assets
    pub asset_configs: Vec<AssetConfig>,

    /// Risk-rate tuning (devmode multiplier lives here)
    pub risk: RiskConfig,
}

impl OrchestratorConfig {
    /// A ready-to-play market on the given seed: a couple of bluechips, a
    /// couple of midcaps, and a clutch of shitcoins.
    pub fn default_market(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ticks_per_day: TICKS_PER_DAY,
            starting_cash: 10_000.0,
            asset_configs: default_assets(),
            risk: RiskConfig::default(),
        }
    }
}

fn default_assets() -> Vec<AssetConfig> {
    fn cfg(
        id: &str,
        symbol: &str,
        name: &str,
        price: f64,
        base_volume: f64,
        liquidity_usd: f64,
        dev_tokens_pct: f64,
        audit_score: f64,
        social_hype: f64,
        base_volatility: f64,
    ) -> AssetConfig {
        AssetConfig {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
            base_volume,
            liquidity_usd,
            dev_tokens_pct,
            audit_score,
            social_hype,
            base_volatility,
        }
    }

    vec![
        cfg("asset_btc", "BTC", "Bitcorn", 64_000.0, 0.8, 50_000_000.0, 0.0, 0.95, 0.5, 0.04),
        cfg("asset_eth", "ETH", "Etherium Max", 3_100.0, 0.7, 20_000_000.0, 1.0, 0.9, 0.45, 0.05),
        cfg("asset_sol", "SOL", "Solunar", 140.0, 0.6, 2_000_000.0, 8.0, 0.7, 0.55, 0.08),
        cfg("asset_link", "LNK", "Chainlonk", 18.0, 0.5, 900_000.0, 5.0, 0.6, 0.35, 0.07),
        cfg("asset_moon", "MOON", "Moonseeker", 0.004, 0.6, 120_000.0, 55.0, 0.2, 0.7, 0.18),
        cfg("asset_dgn", "DGN", "Degenerate", 0.02, 0.5, 60_000.0, 45.0, 0.15, 0.65, 0.22),
        cfg("asset_rug", "RUG", "Rugly", 0.0009, 0.4, 15_000.0, 80.0, 0.05, 0.8, 0.3),
        cfg("asset_wen", "WEN", "Wenmoon", 0.0001, 0.5, 8_000.0, 70.0, 0.1, 0.75, 0.28),
    ]
}

// ============================================================================
// Results & Errors
// ============================================================================

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Tick number that was processed
    pub tick: usize,
    pub day: usize,
    /// Trades that fired across all assets
    pub num_trades: usize,
    /// Risk events that triggered
    pub num_risk_events: usize,
    /// Net worth after the tick
    pub net_worth: f64,
}

/// Result of a day advance
#[derive(Debug, Clone, PartialEq)]
pub struct DayResult {
    /// The day that just completed
    pub completed_day: usize,
    pub articles_published: usize,
    pub offers_created: usize,
    /// Id of a newly launched coin, if one listed
    pub launched: Option<String>,
}

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Cannot {action} while {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: SimulationStatus,
    },

    #[error("Day advance already in progress")]
    DayInProgress,

    #[error(transparent)]
    Trade(#[from] TradeError),

    #[error(transparent)]
    Offer(#[from] OfferError),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Checkpoint config mismatch: expected hash {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Main orchestrator owning all simulation state and the tick/day loops
///
/// Execution is single-threaded and cooperative: an external 1-second clock
/// drives [`Orchestrator::process_tick`] while trading, and a player action
/// drives [`Orchestrator::process_day`]. No two steps ever run
/// concurrently; the day advance is atomic from the caller's perspective.
pub struct Orchestrator {
    pub(crate) state: SimulationState,
    pub(crate) time: TimeManager,
    pub(crate) rng: RngManager,
    pub(crate) config: OrchestratorConfig,

    /// Re-entry guard for the day-advance routine
    pub(crate) day_in_progress: bool,
    /// Set on any mutation, cleared only by a successful save
    pub(crate) dirty: bool,
}

impl Orchestrator {
    /// Create a new orchestrator from configuration
    ///
    /// Seeds the RNG from the textual seed, lists the seed assets, derives
    /// tiers, and rolls day 0's vibe.
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::{Orchestrator, OrchestratorConfig};
    ///
    /// let orchestrator = Orchestrator::new(OrchestratorConfig::default_market("test-1")).unwrap();
    /// assert_eq!(orchestrator.current_day(), 0);
    /// ```
    pub fn new(config: OrchestratorConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let assets: Vec<Asset> = config.asset_configs.iter().map(AssetConfig::build).collect();
        let player = PlayerState::new(config.starting_cash);
        let mut state = SimulationState::new(assets, player);

        let mut rng = RngManager::from_str_seed(&config.seed);
        state.vibe = DailyVibe::roll(&mut rng, &state.asset_ids());

        let time = TimeManager::new(config.ticks_per_day);

        Ok(Self {
            state,
            time,
            rng,
            config,
            day_in_progress: false,
            dirty: true,
        })
    }

    /// Validate configuration
    fn validate_config(config: &OrchestratorConfig) -> Result<(), SimulationError> {
        if config.ticks_per_day == 0 {
            return Err(SimulationError::InvalidConfig(
                "ticks_per_day must be > 0".to_string(),
            ));
        }
        if config.asset_configs.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must list at least one asset".to_string(),
            ));
        }
        if config.starting_cash < 0.0 {
            return Err(SimulationError::InvalidConfig(
                "starting_cash must not be negative".to_string(),
            ));
        }

        let mut ids = std::collections::HashSet::new();
        for asset in &config.asset_configs {
            if !ids.insert(&asset.id) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Duplicate asset id: {}",
                    asset.id
                )));
            }
            if asset.price <= 0.0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "Asset {} must list at a positive price",
                    asset.id
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get current tick number
    pub fn current_tick(&self) -> usize {
        self.time.current_tick()
    }

    /// Get current day number
    pub fn current_day(&self) -> usize {
        self.time.current_day()
    }

    /// Current lifecycle status
    pub fn status(&self) -> SimulationStatus {
        self.state.status
    }

    /// Get reference to simulation state
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Get mutable reference to simulation state
    ///
    /// Primarily for tests. Direct mutation bypasses orchestrator
    /// invariants; use with caution.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        self.dirty = true;
        &mut self.state
    }

    /// Whether unsaved mutations exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Current RNG state (for replay verification)
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    // ========================================================================
    // Read-only selectors
    // ========================================================================

    /// The portfolio table for the UI
    pub fn portfolio_table(&self) -> Vec<PortfolioRow> {
        views::portfolio_table(&self.state)
    }

    /// Headline KPIs for the UI
    pub fn kpis(&self) -> Kpis {
        views::kpis(&self.state, self.current_day())
    }

    /// Assets matching a filter
    pub fn filtered_assets(&self, filter: &AssetFilter) -> Vec<&Asset> {
        views::filtered_assets(&self.state, filter)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Player action: open the trading window
    ///
    /// Valid from `Backfill` (first day) or `BeginningOfDay`.
    pub fn start_trading(&mut self) -> Result<(), SimulationError> {
        match self.state.status {
            SimulationStatus::Backfill | SimulationStatus::BeginningOfDay => {
                self.state.status = SimulationStatus::Trading;
                self.dirty = true;
                Ok(())
            }
            status => Err(SimulationError::InvalidTransition {
                action: "start trading",
                status,
            }),
        }
    }

    /// Execute one simulation tick
    ///
    /// Only valid while `Trading`. Once the day's tick budget is consumed
    /// the status flips to `EndOfDay` and further ticks are rejected until
    /// the day advances.
    pub fn process_tick(&mut self) -> Result<TickResult, SimulationError> {
        if self.state.status != SimulationStatus::Trading {
            return Err(SimulationError::InvalidTransition {
                action: "process tick",
                status: self.state.status,
            });
        }
        Ok(self.step_tick())
    }

    /// The tick body; callers have already checked the status
    fn step_tick(&mut self) -> TickResult {
        let tick = self.time.current_tick();
        let day = self.time.current_day();
        let tick_within_day = self.time.tick_within_day();
        let ticks_per_day = self.time.ticks_per_day();
        let vibe = self.state.vibe.clone();

        let mut num_trades = 0;
        let mut num_risk_events = 0;

        // STEP 1: PER-ASSET PRICING + RISK
        // BTreeMap order keeps the draw sequence identical across runs.
        for asset_id in self.state.asset_ids() {
            let asset = match self.state.get_asset(&asset_id) {
                Some(a) => a,
                None => continue,
            };

            if asset.rugged {
                // Rugged assets only bleed, on their fixed cadence.
                if let Some(patch) = risk::rug_bleed(asset, tick, &mut self.rng) {
                    if let Some(asset) = self.state.get_asset_mut(&asset_id) {
                        asset.apply(&patch);
                    }
                }
                continue;
            }

            // Pricing tick: maybe a trade, maybe not.
            let outcome = pricing::tick_asset(
                asset,
                &vibe,
                tick,
                day,
                tick_within_day,
                ticks_per_day,
                &mut self.rng,
            );
            if let Some(outcome) = outcome {
                if let Some(asset) = self.state.get_asset_mut(&asset_id) {
                    asset.apply(&outcome.patch);
                    asset.history.today.push(outcome.candle);
                }
                num_trades += 1;
            }

            // Risk checks, isolated per asset: a trigger here can never
            // abort the rest of the loop.
            let asset = match self.state.get_asset(&asset_id) {
                Some(a) => a,
                None => continue,
            };
            let outcomes = risk::evaluate_asset(asset, tick, day, &self.config.risk, &mut self.rng);
            for outcome in outcomes {
                if let Some(asset) = self.state.get_asset_mut(&outcome.asset_id) {
                    asset.apply(&outcome.patch);
                }
                self.state.push_event(outcome.event);
                num_risk_events += 1;
            }
        }

        // STEP 2: GLOBAL ORACLE-HACK ROLL
        if let Some(outcome) =
            risk::evaluate_oracle_hack(&self.state.assets, tick, day, &self.config.risk, &mut self.rng)
        {
            if let Some(asset) = self.state.get_asset_mut(&outcome.asset_id) {
                asset.apply(&outcome.patch);
            }
            self.state.push_event(outcome.event);
            num_risk_events += 1;
        }

        // STEP 3: OP ACCRUAL / MATURATION
        trade::accrue_ops(&mut self.state, tick, day);

        // STEP 4: ACCOUNT FREEZE + UNFREEZE
        if let Some(freeze) =
            risk::evaluate_freeze(&self.state.player, tick, &self.config.risk, &mut self.rng)
        {
            self.state.player.freeze_cash(freeze.amount, freeze.release_tick);
            self.state.player.apply(&crate::models::player::PlayerPatch {
                scrutiny: Some(freeze.scrutiny_after),
                ..Default::default()
            });
            self.state.push_event(GameEvent::AccountFreeze {
                tick,
                day,
                amount: freeze.amount,
                release_tick: freeze.release_tick,
            });
            num_risk_events += 1;
        }
        let frozen = self.state.player.frozen_cash;
        if self.state.player.maybe_unfreeze(tick) {
            self.state.push_event(GameEvent::FundsUnfrozen {
                tick,
                day,
                amount: frozen,
            });
        }

        // STEP 5: LIMIT ORDERS
        trade::check_limit_orders(&mut self.state, tick, day);

        // STEP 6: NET WORTH (derived, never authoritative)
        let net_worth = self
            .state
            .player
            .recompute_net_worth(&self.state.assets);

        // STEP 7: ADVANCE TIME + AUTO END-OF-DAY
        self.time.advance_tick();
        self.dirty = true;
        if self.time.is_day_exhausted() {
            self.state.status = SimulationStatus::EndOfDay;
        }

        TickResult {
            tick,
            day,
            num_trades,
            num_risk_events,
            net_worth,
        }
    }

    /// Advance to the next day
    ///
    /// Valid from `EndOfDay`, or from `Trading` — in which case the
    /// remaining ticks of the day are fast-forwarded synchronously first
    /// (bounded by the day's tick budget). The routine is guarded against
    /// re-entry and is atomic from the caller's perspective.
    pub fn process_day(&mut self) -> Result<DayResult, SimulationError> {
        if self.day_in_progress {
            return Err(SimulationError::DayInProgress);
        }
        match self.state.status {
            SimulationStatus::Trading | SimulationStatus::EndOfDay => {}
            status => {
                return Err(SimulationError::InvalidTransition {
                    action: "process day",
                    status,
                })
            }
        }
        self.day_in_progress = true;

        // Fast-forward any unconsumed ticks of the day.
        while !self.time.is_day_exhausted() {
            self.step_tick();
        }

        let completed_day = self.time.current_day();
        let tick = self.time.current_tick();
        let day_start_tick = tick - self.time.tick_within_day();
        let ticks_per_day = self.time.ticks_per_day();

        // STAGE 1: NEWS
        let articles_published =
            news::publish_daily(&mut self.state, tick, completed_day, &mut self.rng);

        // STAGE 2: DEBUNK PASS
        news::debunk_pass(&mut self.state, tick, completed_day, &mut self.rng);

        // STAGE 3: OFFERS (generate new, expire stale)
        let offers_created =
            offers::generate_daily(&mut self.state, tick, completed_day, &mut self.rng);
        offers::expire_pass(&mut self.state, tick, completed_day + 1);

        // STAGE 4: COIN LAUNCH
        let launched = launch::maybe_launch(&mut self.state, tick, completed_day, &mut self.rng);

        // STAGE 5: RUG WARNINGS
        news::rug_warning_pass(&mut self.state, tick, completed_day, &mut self.rng);

        // STAGE 6: OVERNIGHT GAPS
        let vibe = self.state.vibe.clone();
        for asset_id in self.state.live_asset_ids() {
            let patch = match self.state.get_asset(&asset_id) {
                Some(asset) => pricing::overnight_gap(asset, &vibe, &mut self.rng),
                None => continue,
            };
            if let Some(asset) = self.state.get_asset_mut(&asset_id) {
                asset.apply(&patch);
            }
        }

        // STAGE 7: CANDLE COMPACTION
        for asset_id in self.state.asset_ids() {
            if let Some(asset) = self.state.get_asset_mut(&asset_id) {
                let closing = asset.price;
                aggregator::compact_day(
                    &mut asset.history,
                    completed_day,
                    day_start_tick,
                    ticks_per_day,
                    closing,
                );
            }
        }

        // STAGE 8: VIBE ROLL FOR THE NEW DAY
        let asset_ids = self.state.asset_ids();
        self.state.vibe = DailyVibe::roll(&mut self.rng, &asset_ids);

        // STAGE 9: TRANSITION
        self.time.advance_day();
        self.state.status = SimulationStatus::BeginningOfDay;
        self.state
            .player
            .recompute_net_worth(&self.state.assets);
        self.state.push_event(GameEvent::DayAdvanced {
            tick,
            day: completed_day,
            articles_published,
            offers_created,
        });
        self.dirty = true;
        self.day_in_progress = false;

        log::info!(
            "day {} complete: {} articles, {} offers, launch={:?}",
            completed_day,
            articles_published,
            offers_created,
            launched
        );

        Ok(DayResult {
            completed_day,
            articles_published,
            offers_created,
            launched,
        })
    }

    /// Drive whole days offline (the backfill/batch loop)
    ///
    /// For each day: start trading, consume the full tick budget, advance.
    /// This is exactly the loop the external day-batch driver runs; it adds
    /// no semantics of its own.
    pub fn run_days(&mut self, days: usize) -> Result<Vec<DayResult>, SimulationError> {
        let mut results = Vec::with_capacity(days);
        for _ in 0..days {
            self.start_trading()?;
            while self.state.status == SimulationStatus::Trading {
                self.process_tick()?;
            }
            results.push(self.process_day()?);
        }
        Ok(results)
    }

    // ========================================================================
    // Player actions
    // ========================================================================

    /// Execute a market action at current prices
    pub fn execute_trade(&mut self, action: TradeAction) -> Result<(), SimulationError> {
        let tick = self.time.current_tick();
        let day = self.time.current_day();
        trade::execute_trade(&mut self.state, action, tick, day)?;
        self.state.player.recompute_net_worth(&self.state.assets);
        self.dirty = true;
        Ok(())
    }

    /// Start a player operation
    pub fn execute_op(&mut self, action: OpAction) -> Result<(), SimulationError> {
        let tick = self.time.current_tick();
        let day = self.time.current_day();
        trade::execute_op(&mut self.state, action, tick, day)?;
        self.dirty = true;
        Ok(())
    }

    /// Accept an open offer, executing its implied trade atomically
    pub fn accept_offer(&mut self, offer_id: &str) -> Result<(), SimulationError> {
        let tick = self.time.current_tick();
        let day = self.time.current_day();
        offers::accept(&mut self.state, offer_id, tick, day)?;
        self.state.player.recompute_net_worth(&self.state.assets);
        self.dirty = true;
        Ok(())
    }

    /// Decline an open offer
    pub fn decline_offer(&mut self, offer_id: &str) -> Result<(), SimulationError> {
        let tick = self.time.current_tick();
        let day = self.time.current_day();
        offers::decline(&mut self.state, offer_id, tick, day)?;
        self.dirty = true;
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save to the store if there are unsaved mutations
    ///
    /// A failed save is logged and the simulation continues; the dirty flag
    /// stays set so the next successful save carries everything since.
    pub fn save_if_dirty<S: GameStore>(&mut self, store: &mut S, profile_id: &str) -> bool {
        if !self.dirty {
            return false;
        }

        let saved = match self.snapshot() {
            Ok(saved) => saved,
            Err(err) => {
                log::warn!("snapshot failed, will retry next save: {err}");
                return false;
            }
        };

        match store.save_game(profile_id, &saved) {
            Ok(()) => {
                self.dirty = false;
                true
            }
            Err(err) => {
                log::warn!("save failed, simulation continues: {err}");
                false
            }
        }
    }
}
