//! Core building blocks: time management and shared constants

pub mod time;

/// Number of simulated seconds (ticks) in one trading day.
pub const TICKS_PER_DAY: usize = 1800;

/// Hard price floor. No asset price ever goes below this, rugged or not.
pub const MIN_PRICE: f64 = 1e-6;
