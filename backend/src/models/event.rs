//! Game event feed
//!
//! Transient records of everything noteworthy the simulation does: rug
//! pulls, hacks, news, offers, trades. Events are kept in a bounded rolling
//! feed — the UI reads the recent past, never the full history.
//!
//! All events carry the tick and day they occurred on, in the order they
//! occurred within a tick.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single noteworthy happening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// The warning that telegraphs a possible future rug pull
    RugWarning {
        tick: usize,
        day: usize,
        asset_id: String,
    },

    /// The rug was pulled
    RugPull {
        tick: usize,
        day: usize,
        asset_id: String,
        price_drop_pct: f64,
    },

    /// Dev team vanished with the liquidity
    ExitScam {
        tick: usize,
        day: usize,
        asset_id: String,
    },

    /// A price oracle was exploited, shocking one asset
    OracleHack {
        tick: usize,
        day: usize,
        asset_id: String,
        multiplier: f64,
    },

    /// A whale bought the asset back up
    WhaleBuyback {
        tick: usize,
        day: usize,
        asset_id: String,
        multiplier: f64,
    },

    /// Part of the player's cash was frozen
    AccountFreeze {
        tick: usize,
        day: usize,
        amount: f64,
        release_tick: usize,
    },

    /// Frozen funds were released
    FundsUnfrozen {
        tick: usize,
        day: usize,
        amount: f64,
    },

    /// An article went out
    NewsPublished {
        tick: usize,
        day: usize,
        article_id: String,
        asset_id: String,
    },

    /// A fake article was exposed
    NewsDebunked {
        tick: usize,
        day: usize,
        article_id: String,
        asset_id: String,
    },

    /// A new offer landed
    OfferCreated {
        tick: usize,
        day: usize,
        offer_id: String,
        asset_id: String,
    },

    /// The player accepted an offer
    OfferAccepted {
        tick: usize,
        day: usize,
        offer_id: String,
    },

    /// The player declined an offer
    OfferDeclined {
        tick: usize,
        day: usize,
        offer_id: String,
    },

    /// An offer lapsed unanswered
    OfferExpired {
        tick: usize,
        day: usize,
        offer_id: String,
    },

    /// A market trade executed
    TradeExecuted {
        tick: usize,
        day: usize,
        asset_id: String,
        units: f64,
        unit_price: f64,
    },

    /// A resting limit order filled
    LimitOrderFilled {
        tick: usize,
        day: usize,
        order_id: String,
        asset_id: String,
        unit_price: f64,
    },

    /// A new coin listed mid-game
    CoinLaunched {
        tick: usize,
        day: usize,
        asset_id: String,
        symbol: String,
    },

    /// A player operation started
    OpStarted {
        tick: usize,
        day: usize,
        op_id: String,
        asset_id: String,
    },

    /// A player operation ran its course
    OpResolved {
        tick: usize,
        day: usize,
        op_id: String,
    },

    /// A day-advance completed
    DayAdvanced {
        tick: usize,
        day: usize,
        articles_published: usize,
        offers_created: usize,
    },
}

impl GameEvent {
    /// Get the tick this event occurred on
    pub fn tick(&self) -> usize {
        match self {
            GameEvent::RugWarning { tick, .. }
            | GameEvent::RugPull { tick, .. }
            | GameEvent::ExitScam { tick, .. }
            | GameEvent::OracleHack { tick, .. }
            | GameEvent::WhaleBuyback { tick, .. }
            | GameEvent::AccountFreeze { tick, .. }
            | GameEvent::FundsUnfrozen { tick, .. }
            | GameEvent::NewsPublished { tick, .. }
            | GameEvent::NewsDebunked { tick, .. }
            | GameEvent::OfferCreated { tick, .. }
            | GameEvent::OfferAccepted { tick, .. }
            | GameEvent::OfferDeclined { tick, .. }
            | GameEvent::OfferExpired { tick, .. }
            | GameEvent::TradeExecuted { tick, .. }
            | GameEvent::LimitOrderFilled { tick, .. }
            | GameEvent::CoinLaunched { tick, .. }
            | GameEvent::OpStarted { tick, .. }
            | GameEvent::OpResolved { tick, .. }
            | GameEvent::DayAdvanced { tick, .. } => *tick,
        }
    }

    /// Asset id if the event concerns a specific asset
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            GameEvent::RugWarning { asset_id, .. }
            | GameEvent::RugPull { asset_id, .. }
            | GameEvent::ExitScam { asset_id, .. }
            | GameEvent::OracleHack { asset_id, .. }
            | GameEvent::WhaleBuyback { asset_id, .. }
            | GameEvent::NewsPublished { asset_id, .. }
            | GameEvent::NewsDebunked { asset_id, .. }
            | GameEvent::OfferCreated { asset_id, .. }
            | GameEvent::TradeExecuted { asset_id, .. }
            | GameEvent::LimitOrderFilled { asset_id, .. }
            | GameEvent::CoinLaunched { asset_id, .. }
            | GameEvent::OpStarted { asset_id, .. } => Some(asset_id),
            _ => None,
        }
    }
}

/// Maximum events retained in the rolling feed
pub const EVENT_FEED_CAP: usize = 200;

/// Bounded rolling feed of recent events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFeed {
    events: VecDeque<GameEvent>,
}

impl EventFeed {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Append an event, evicting the oldest once over the cap
    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
        while self.events.len() > EVENT_FEED_CAP {
            self.events.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Events for one asset, oldest first
    pub fn for_asset(&self, asset_id: &str) -> Vec<&GameEvent> {
        self.events
            .iter()
            .filter(|e| e.asset_id() == Some(asset_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_bounded() {
        let mut feed = EventFeed::new();
        for i in 0..(EVENT_FEED_CAP + 25) {
            feed.push(GameEvent::RugWarning {
                tick: i,
                day: 0,
                asset_id: "a".to_string(),
            });
        }

        assert_eq!(feed.len(), EVENT_FEED_CAP);
        assert_eq!(feed.iter().next().unwrap().tick(), 25);
    }

    #[test]
    fn test_for_asset_filter() {
        let mut feed = EventFeed::new();
        feed.push(GameEvent::RugWarning {
            tick: 1,
            day: 0,
            asset_id: "a".to_string(),
        });
        feed.push(GameEvent::RugPull {
            tick: 2,
            day: 0,
            asset_id: "b".to_string(),
            price_drop_pct: 0.25,
        });

        assert_eq!(feed.for_asset("a").len(), 1);
        assert_eq!(feed.for_asset("b").len(), 1);
        assert_eq!(feed.for_asset("c").len(), 0);
    }
}
