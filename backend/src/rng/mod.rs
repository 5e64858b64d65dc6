//! Deterministic random number generation
//!
//! Uses the mulberry32 algorithm for fast, deterministic random number
//! generation with a single 32-bit word of state.
//! CRITICAL: All randomness in the simulator MUST go through this module.

mod mulberry;

pub use mulberry::RngManager;
