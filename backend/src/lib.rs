//! Market Simulator Core - Rust Engine
//!
//! Deterministic economic simulation core of a satirical trading game. The
//! engine advances a virtual market second-by-second and day-by-day,
//! producing prices, news, risk events, and trade offers from a single seed
//! so that a given seed always reproduces the same history.
//!
//! # Architecture
//!
//! - **core**: time management and shared constants
//! - **rng**: deterministic random number generation (mulberry32)
//! - **models**: domain types (Asset, PlayerState, candles, news, offers)
//! - **pricing**: per-tick price/volume model
//! - **risk**: rare-event subsystem (rugs, scams, hacks, freezes)
//! - **news**: article generation, impact, debunking, rug warnings
//! - **offers**: opportunistic offer generation and resolution
//! - **aggregator**: multi-resolution OHLC candle compaction
//! - **launch**: mid-game coin-launch generator
//! - **trade**: player action boundary (trades, limit orders, ops)
//! - **orchestrator**: the tick/day loop and checkpointing
//! - **storage**: save-game persistence port
//! - **ai**: external text collaborator port with deterministic fallback
//! - **views**: read-only selectors for UI collaborators
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG per session)
//! 2. Prices never fall below the fixed floor
//! 3. Subsystems return patches; the reducer applies them atomically

// Module declarations
pub mod aggregator;
pub mod ai;
pub mod core;
pub mod launch;
pub mod models;
pub mod news;
pub mod offers;
pub mod orchestrator;
pub mod pricing;
pub mod risk;
pub mod rng;
pub mod storage;
pub mod trade;
pub mod views;

// Re-exports for convenience
pub use core::time::TimeManager;
pub use core::{MIN_PRICE, TICKS_PER_DAY};
pub use models::{
    Asset, AssetPatch, AssetTier, DailyVibe, EventFeed, GameEvent, MarketVibe, NewsArticle, Offer,
    OfferKind, PlayerState, PriceCandle, PriceHistory, Sentiment, SimulationState,
    SimulationStatus, TradeSide, WalletError,
};
pub use offers::OfferError;
pub use orchestrator::{
    AssetConfig, DayResult, Orchestrator, OrchestratorConfig, SavedGame, SimulationError,
    TickResult,
};
pub use risk::RiskConfig;
pub use rng::RngManager;
pub use storage::{GameStore, InMemoryStore, StorageError};
pub use trade::{OpAction, TradeAction, TradeError};
pub use views::{AssetFilter, Kpis, PortfolioRow};
