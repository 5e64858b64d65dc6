//! mulberry32 random number generator
//!
//! A fast 32-bit-state PRNG that is deterministic and suitable for
//! simulation purposes.
//!
//! # Algorithm
//!
//! mulberry32 advances a single 32-bit word by a fixed additive step and
//! mixes it with multiplicative/xorshift operations. It has good statistical
//! quality for its size and a tiny, trivially serializable state.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Replays (a saved game resumes its exact future sequence)
//! - Debugging (reproduce exact market history)
//! - Testing (verify behavior against an independent replay)

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using mulberry32
///
/// There is exactly one live instance per running game session. It is owned
/// by the orchestrator and passed `&mut` into every subsystem call; nothing
/// else in the crate may draw randomness from anywhere but this type.
///
/// # Example
/// ```
/// use market_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let roll = rng.next_f64();           // [0.0, 1.0)
/// let pct = rng.range(0.20, 0.30);     // [0.20, 0.30)
/// let n = rng.int(2, 5);               // {2, 3, 4, 5}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (32-bit)
    state: u32,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// ```
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create a new RNG from a textual seed
    ///
    /// Hashes the string with 32-bit FNV-1a, so the same seed string always
    /// produces the same sequence. Used for player-facing seeds like
    /// `"test-1"`.
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::RngManager;
    ///
    /// let mut a = RngManager::from_str_seed("test-1");
    /// let mut b = RngManager::from_str_seed("test-1");
    /// assert_eq!(a.next_u32(), b.next_u32());
    /// ```
    pub fn from_str_seed(seed: &str) -> Self {
        let mut hash: u32 = 0x811C_9DC5;
        for byte in seed.as_bytes() {
            hash ^= u32::from(*byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        Self::new(hash)
    }

    /// Generate next random u32 value
    ///
    /// Advances the internal state by the fixed mulberry32 step.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut z = self.state;
        z = (z ^ (z >> 15)).wrapping_mul(z | 1);
        z ^= z.wrapping_add((z ^ (z >> 7)).wrapping_mul(z | 61));
        z ^ (z >> 14)
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Generate random f64 in range [min, max)
    ///
    /// # Panics
    /// Panics if min > max
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        assert!(min <= max, "min must not exceed max");
        min + self.next_f64() * (max - min)
    }

    /// Generate random integer in range [min, max] (inclusive)
    ///
    /// # Panics
    /// Panics if min > max
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let articles = rng.int(2, 5);
    /// assert!((2..=5).contains(&articles));
    /// ```
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        let span = (max - min + 1) as u64;
        min + (u64::from(self.next_u32()) % span) as i64
    }

    /// Return true with probability `p`
    ///
    /// Always consumes exactly one draw, even for p <= 0 or p >= 1, so the
    /// sequence position stays independent of the probability value.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick a uniformly random element from a slice
    ///
    /// # Panics
    /// Panics if the slice is empty
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot pick from an empty slice");
        let idx = (u64::from(self.next_u32()) % items.len() as u64) as usize;
        &items[idx]
    }

    /// Sample from Normal(mean, std_dev) via Box-Muller
    ///
    /// Consumes exactly two uniform draws per call and keeps no spare value,
    /// so state advancement is position-independent across save/restore.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        let mag = (-2.0 * u1.ln()).sqrt();
        mean + std_dev * mag * (std::f64::consts::TAU * u2).cos()
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// # Example
    /// ```
    /// use market_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// rng.next_u32();
    /// let state = rng.state();
    ///
    /// // Later, can recreate the RNG mid-sequence from this state
    /// let rng2 = RngManager::restore(state);
    /// ```
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Recreate an RNG mid-sequence from a saved state
    pub fn restore(state: u32) -> Self {
        Self { state }
    }
}
