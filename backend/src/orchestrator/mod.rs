//! Orchestrator - the tick/day simulation loop
//!
//! Implements the lifecycle state machine, the per-tick step sequence, and
//! the staged day-advance pipeline.
//!
//! See `engine.rs` for the loop and `checkpoint.rs` for save/restore.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use checkpoint::{compute_config_hash, SavedGame};
pub use engine::{
    AssetConfig, DayResult, Orchestrator, OrchestratorConfig, SimulationError, TickResult,
};
