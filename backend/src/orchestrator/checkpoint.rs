//! Checkpoint - Save/Load Simulation State
//!
//! Serialization of complete orchestrator state for save games. The layout
//! mirrors what the storage collaborator persists: seed, RNG state, clock,
//! lifecycle status, vibe, player, assets (with candle histories), and the
//! open article/offer/op lists.
//!
//! # Critical Invariants
//!
//! - **Resume determinism**: a restored game's future tick/day sequence is
//!   byte-identical to the uninterrupted run (the RNG state round-trips)
//! - **Config matching**: a snapshot can only be restored with the config
//!   that produced it, verified by a canonical SHA-256 hash

use crate::core::time::TimeManager;
use crate::models::asset::Asset;
use crate::models::event::EventFeed;
use crate::models::news::NewsArticle;
use crate::models::offer::Offer;
use crate::models::op::ActiveOp;
use crate::models::player::PlayerState;
use crate::models::state::{SimulationState, SimulationStatus};
use crate::models::vibe::DailyVibe;
use crate::orchestrator::engine::{Orchestrator, OrchestratorConfig, SimulationError};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================================================
// Snapshot Structure
// ============================================================================

/// Complete saved game
///
/// Everything needed to resume a simulation at an arbitrary point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// The player-facing textual seed
    pub seed: String,

    /// RNG state at snapshot time (CRITICAL for determinism)
    pub rng_state: u32,

    /// Clock position
    pub current_tick: usize,
    pub current_day: usize,
    pub tick_within_day: usize,

    pub status: SimulationStatus,
    pub market_vibe: DailyVibe,

    pub player: PlayerState,
    pub assets: BTreeMap<String, Asset>,

    pub articles: Vec<NewsArticle>,
    pub active_offers: Vec<Offer>,
    pub active_ops: Vec<ActiveOp>,
    pub events: EventFeed,

    // Id counters so restored games keep minting unique ids
    pub next_article_id: usize,
    pub next_offer_id: usize,
    pub next_op_id: usize,
    pub next_order_id: usize,
    pub next_asset_id: usize,

    /// SHA-256 hash of the originating config (for validation)
    pub config_hash: String,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA-256 hash of a config
///
/// Uses canonical JSON with recursively sorted object keys, so the hash is
/// independent of any map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;

    let value = serde_json::to_value(config)
        .map_err(|e| SimulationError::Serialization(format!("config serialization: {e}")))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = serde_json::to_string(&canonicalize(value))
        .map_err(|e| SimulationError::Serialization(format!("canonical encoding: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Snapshot / Restore
// ============================================================================

impl Orchestrator {
    /// Capture the complete current state as a saved game
    pub fn snapshot(&self) -> Result<SavedGame, SimulationError> {
        Ok(SavedGame {
            seed: self.config.seed.clone(),
            rng_state: self.rng.state(),
            current_tick: self.time.current_tick(),
            current_day: self.time.current_day(),
            tick_within_day: self.time.tick_within_day(),
            status: self.state.status,
            market_vibe: self.state.vibe.clone(),
            player: self.state.player.clone(),
            assets: self.state.assets.clone(),
            articles: self.state.articles.clone(),
            active_offers: self.state.offers.clone(),
            active_ops: self.state.ops.clone(),
            events: self.state.events.clone(),
            next_article_id: self.state.next_article_id,
            next_offer_id: self.state.next_offer_id,
            next_op_id: self.state.next_op_id,
            next_order_id: self.state.next_order_id,
            next_asset_id: self.state.next_asset_id,
            config_hash: compute_config_hash(&self.config)?,
        })
    }

    /// Rebuild an orchestrator from a saved game
    ///
    /// The config must be the one that produced the snapshot; a hash
    /// mismatch is rejected rather than silently resuming a different
    /// market.
    pub fn restore(
        config: OrchestratorConfig,
        saved: SavedGame,
    ) -> Result<Orchestrator, SimulationError> {
        let expected = compute_config_hash(&config)?;
        if expected != saved.config_hash {
            return Err(SimulationError::ConfigMismatch {
                expected,
                actual: saved.config_hash,
            });
        }

        let state = SimulationState {
            status: saved.status,
            vibe: saved.market_vibe,
            assets: saved.assets,
            player: saved.player,
            articles: saved.articles,
            offers: saved.active_offers,
            ops: saved.active_ops,
            events: saved.events,
            next_article_id: saved.next_article_id,
            next_offer_id: saved.next_offer_id,
            next_op_id: saved.next_op_id,
            next_order_id: saved.next_order_id,
            next_asset_id: saved.next_asset_id,
        };

        Ok(Orchestrator {
            state,
            time: TimeManager::from_snapshot(
                saved.current_tick,
                saved.current_day,
                saved.tick_within_day,
                config.ticks_per_day,
            ),
            rng: RngManager::restore(saved.rng_state),
            config,
            day_in_progress: false,
            dirty: false,
        })
    }
}
