//! Time management for the simulation
//!
//! The simulation operates in discrete ticks: one tick per simulated second,
//! 1800 per trading day. Unlike a free-running clock, days never advance by
//! modulo arithmetic here — only the explicit day-advance routine moves the
//! day forward, because a trading day ends by player/timer action rather
//! than by tick overflow.

use serde::{Deserialize, Serialize};

/// Manages simulation time in discrete ticks and explicitly advanced days
///
/// # Example
/// ```
/// use market_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(1800);
/// assert_eq!(time.current_tick(), 0);
/// assert_eq!(time.current_day(), 0);
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// assert_eq!(time.tick_within_day(), 1);
///
/// time.advance_day();
/// assert_eq!(time.current_day(), 1);
/// assert_eq!(time.tick_within_day(), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since simulation start
    current_tick: usize,
    /// Current day, advanced only by the day-advance routine
    current_day: usize,
    /// Ticks consumed within the current day
    tick_within_day: usize,
    /// Number of ticks in one trading day
    ticks_per_day: usize,
}

impl TimeManager {
    /// Create a new TimeManager
    ///
    /// # Arguments
    /// * `ticks_per_day` - Number of ticks in one trading day
    ///
    /// # Panics
    /// Panics if `ticks_per_day` is zero
    pub fn new(ticks_per_day: usize) -> Self {
        assert!(ticks_per_day > 0, "ticks_per_day must be positive");
        Self {
            current_tick: 0,
            current_day: 0,
            tick_within_day: 0,
            ticks_per_day,
        }
    }

    /// Rebuild a TimeManager from checkpointed fields
    pub fn from_snapshot(
        current_tick: usize,
        current_day: usize,
        tick_within_day: usize,
        ticks_per_day: usize,
    ) -> Self {
        assert!(ticks_per_day > 0, "ticks_per_day must be positive");
        Self {
            current_tick,
            current_day,
            tick_within_day,
            ticks_per_day,
        }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
        self.tick_within_day += 1;
    }

    /// Advance to the next day, resetting the intraday tick window
    pub fn advance_day(&mut self) {
        self.current_day += 1;
        self.tick_within_day = 0;
    }

    /// Get the current tick (total ticks since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the current day (0-indexed)
    pub fn current_day(&self) -> usize {
        self.current_day
    }

    /// Get the tick within the current day (0-indexed)
    pub fn tick_within_day(&self) -> usize {
        self.tick_within_day
    }

    /// Ticks of the current day not yet consumed
    pub fn ticks_remaining_today(&self) -> usize {
        self.ticks_per_day.saturating_sub(self.tick_within_day)
    }

    /// Check if the current day's full tick budget has been consumed
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(1800);
    /// for _ in 0..1800 {
    ///     time.advance_tick();
    /// }
    /// assert!(time.is_day_exhausted());
    /// ```
    pub fn is_day_exhausted(&self) -> bool {
        self.tick_within_day >= self.ticks_per_day
    }

    /// Get ticks per day
    pub fn ticks_per_day(&self) -> usize {
        self.ticks_per_day
    }
}
