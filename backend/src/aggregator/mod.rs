//! Candle aggregator
//!
//! End-of-day compaction of the raw trade stream into the five display
//! resolutions. Runs once per asset inside the day-advance pipeline.
//!
//! ```text
//! today (raw trades) ──┬─→ 6 × 300-tick buckets ─→ yesterday (replace)
//!                      │                        └→ d5   (push 6, evict 6)
//!                      ├─→ 1 daily candle ─→ m1 (30) and y1 (365)
//!                      │                  └→ y5 (260): every 7th day,
//!                      │                     1 weekly candle from y1's tail
//!                      └─→ cleared for the next session
//! ```
//!
//! A tradeless day synthesizes a flat candle at the closing price so every
//! window stays continuous; empty intraday buckets are likewise filled flat
//! at the previous bucket's close.

use crate::models::candle::{aggregate, PriceCandle, PriceHistory, YESTERDAY_BUCKETS};

/// Compact one asset's finished day into the resolution windows
///
/// * `day` - the day that just ended
/// * `day_start_tick` - global tick at which that day's window began
/// * `ticks_per_day` - size of the day's tick window
/// * `closing_price` - asset price at day end (used when no trades fired)
///
/// Returns the whole-day candle that was pushed into `m1`/`y1`.
pub fn compact_day(
    history: &mut PriceHistory,
    day: usize,
    day_start_tick: usize,
    ticks_per_day: usize,
    closing_price: f64,
) -> PriceCandle {
    let trades = std::mem::take(&mut history.today);

    // Whole-day candle; a tradeless day flattens at the closing price.
    let day_candle = aggregate(&trades)
        .unwrap_or_else(|| PriceCandle::flat(day_start_tick, day, closing_price));

    // Re-bucket the day into 6 fixed intraday buckets.
    let buckets = bucketize(&trades, day, day_start_tick, ticks_per_day, closing_price);

    history.yesterday.clear();
    history.yesterday.extend_evict(buckets.iter().copied());
    history.d5.extend_evict(buckets.iter().copied());

    history.m1.push_evict(day_candle);
    history.y1.push_evict(day_candle);

    // Weekly resolution: one candle per completed 7-day span.
    if (day + 1) % 7 == 0 {
        let week = history.y1.last_n(7);
        if let Some(weekly) = aggregate(&week) {
            history.y5.push_evict(weekly);
        }
    }

    day_candle
}

/// Reduce a day's trades into the fixed intraday buckets
///
/// Buckets are `ticks_per_day / 6` ticks wide. An empty bucket carries the
/// previous close forward as a flat candle (or the day's opening price if
/// the day started quiet).
fn bucketize(
    trades: &[PriceCandle],
    day: usize,
    day_start_tick: usize,
    ticks_per_day: usize,
    closing_price: f64,
) -> Vec<PriceCandle> {
    let bucket_len = (ticks_per_day / YESTERDAY_BUCKETS).max(1);
    let mut out = Vec::with_capacity(YESTERDAY_BUCKETS);
    let mut prev_close = trades.first().map_or(closing_price, |c| c.open);

    for bucket in 0..YESTERDAY_BUCKETS {
        let run: Vec<PriceCandle> = trades
            .iter()
            .filter(|c| {
                let offset = c.tick.saturating_sub(day_start_tick);
                // The last bucket also absorbs any tail past the nominal window.
                offset / bucket_len == bucket
                    || (bucket == YESTERDAY_BUCKETS - 1 && offset / bucket_len >= YESTERDAY_BUCKETS)
            })
            .copied()
            .collect();

        let candle = aggregate(&run).unwrap_or_else(|| {
            PriceCandle::flat(day_start_tick + bucket * bucket_len, day, prev_close)
        });
        prev_close = candle.close;
        out.push(candle);
    }

    out
}
