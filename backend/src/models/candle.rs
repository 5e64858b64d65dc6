//! OHLC candles and the multi-resolution price history
//!
//! A [`PriceCandle`] is immutable once appended to a resolution window: it is
//! only ever aggregated into a coarser candle or evicted from the old end of
//! a sliding window. The five display resolutions all share one window
//! abstraction, [`CandleWindow`], so the pop-from-front/push-to-back
//! discipline exists exactly once.
//!
//! # Critical Invariants
//!
//! 1. **Immutability**: appended candles are never mutated in place
//! 2. **Order**: every window is ordered oldest → newest
//! 3. **Bound**: a window never exceeds its capacity
//! 4. **Reduction**: aggregation is first-open / last-close / max-high /
//!    min-low, and is idempotent on a single candle

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One OHLC record over a time bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceCandle {
    /// Tick at which the bucket opened
    pub tick: usize,
    /// Day the bucket belongs to
    pub day: usize,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceCandle {
    /// Build the candle for a single trade: open at the pre-trade price,
    /// close at the post-trade price, high/low the wider of the two.
    pub fn from_trade(tick: usize, day: usize, old_price: f64, new_price: f64) -> Self {
        Self {
            tick,
            day,
            open: old_price,
            high: old_price.max(new_price),
            low: old_price.min(new_price),
            close: new_price,
        }
    }

    /// A zero-range candle at a single price, used to keep resolutions
    /// continuous across tradeless days.
    pub fn flat(tick: usize, day: usize, price: f64) -> Self {
        Self {
            tick,
            day,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }
}

/// Reduce an ordered, non-empty run of candles into one coarser candle
///
/// open = first.open, close = last.close, high = max of highs, low = min of
/// lows. The result carries the first candle's tick and day (the bucket's
/// opening moment). Applying this to a single already-aggregated candle
/// returns it unchanged.
///
/// # Example
/// ```
/// use market_simulator_core_rs::models::candle::{aggregate, PriceCandle};
///
/// let run = vec![
///     PriceCandle { tick: 0, day: 0, open: 10.0, high: 12.0, low: 9.5, close: 11.0 },
///     PriceCandle { tick: 1, day: 0, open: 11.0, high: 14.0, low: 11.0, close: 13.0 },
/// ];
/// let candle = aggregate(&run).unwrap();
/// assert_eq!(candle.open, 10.0);
/// assert_eq!(candle.close, 13.0);
/// assert_eq!(candle.high, 14.0);
/// assert_eq!(candle.low, 9.5);
/// ```
pub fn aggregate(candles: &[PriceCandle]) -> Option<PriceCandle> {
    let first = candles.first()?;
    let last = candles.last()?;

    let mut high = f64::MIN;
    let mut low = f64::MAX;
    for c in candles {
        high = high.max(c.high);
        low = low.min(c.low);
    }

    Some(PriceCandle {
        tick: first.tick,
        day: first.day,
        open: first.open,
        high,
        low,
        close: last.close,
    })
}

/// A capacity-bounded, ordered candle sequence
///
/// Maintained by a single `push_evict` operation: append to the back, evict
/// from the front when over capacity. All five resolutions use this type
/// with different capacities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleWindow {
    candles: VecDeque<PriceCandle>,
    capacity: usize,
}

impl CandleWindow {
    /// Create an empty window with the given capacity
    ///
    /// # Panics
    /// Panics if capacity is zero
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            candles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one candle, evicting from the front if over capacity
    pub fn push_evict(&mut self, candle: PriceCandle) {
        self.candles.push_back(candle);
        while self.candles.len() > self.capacity {
            self.candles.pop_front();
        }
    }

    /// Append a batch in order, evicting as needed
    pub fn extend_evict(&mut self, candles: impl IntoIterator<Item = PriceCandle>) {
        for candle in candles {
            self.push_evict(candle);
        }
    }

    /// Drop all candles, keeping the capacity
    pub fn clear(&mut self) {
        self.candles.clear();
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceCandle> {
        self.candles.iter()
    }

    pub fn front(&self) -> Option<&PriceCandle> {
        self.candles.front()
    }

    pub fn back(&self) -> Option<&PriceCandle> {
        self.candles.back()
    }

    /// Copy the newest `n` candles, oldest first
    pub fn last_n(&self, n: usize) -> Vec<PriceCandle> {
        let skip = self.candles.len().saturating_sub(n);
        self.candles.iter().skip(skip).copied().collect()
    }

    /// Copy the whole window into a Vec, oldest first
    pub fn to_vec(&self) -> Vec<PriceCandle> {
        self.candles.iter().copied().collect()
    }
}

/// Number of intraday buckets kept for the `yesterday` resolution
pub const YESTERDAY_BUCKETS: usize = 6;
/// `d5` holds 5 days of intraday buckets
pub const D5_CAPACITY: usize = 5 * YESTERDAY_BUCKETS;
/// `m1` holds 30 daily candles
pub const M1_CAPACITY: usize = 30;
/// `y1` holds 365 daily candles
pub const Y1_CAPACITY: usize = 365;
/// `y5` holds ~5 years of weekly candles
pub const Y5_CAPACITY: usize = 260;

/// The five display resolutions of one asset's price history
///
/// `today` accumulates every individual trade candle during the live day;
/// the other windows are only written by the end-of-day aggregation
/// pipeline (see the `aggregator` module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Every trade of the live day, in tick order
    pub today: Vec<PriceCandle>,
    /// Prior day re-aggregated into 6 five-minute buckets
    pub yesterday: CandleWindow,
    /// Most recent 5 days x 6 buckets
    pub d5: CandleWindow,
    /// 30 single-day candles
    pub m1: CandleWindow,
    /// 365 single-day candles
    pub y1: CandleWindow,
    /// ~260 weekly candles, written every 7th day
    pub y5: CandleWindow,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self {
            today: Vec::new(),
            yesterday: CandleWindow::new(YESTERDAY_BUCKETS),
            d5: CandleWindow::new(D5_CAPACITY),
            m1: CandleWindow::new(M1_CAPACITY),
            y1: CandleWindow::new(Y1_CAPACITY),
            y5: CandleWindow::new(Y5_CAPACITY),
        }
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}
