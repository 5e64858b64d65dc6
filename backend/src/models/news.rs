//! News article model
//!
//! Articles are transient records emitted by the news subsystem at day
//! advance. Each carries its creation day, a sentiment, a 0-100 weight, and
//! a fake flag; fake articles remember the hype they injected so a later
//! debunk can reverse exactly half of it.

use serde::{Deserialize, Serialize};

/// Direction an article pushes price/hype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    /// +1.0 for positive, -1.0 for negative
    pub fn sign(&self) -> f64 {
        match self {
            Sentiment::Positive => 1.0,
            Sentiment::Negative => -1.0,
        }
    }
}

/// A published article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Deterministic id (e.g. "art_00000042")
    pub id: String,
    /// Day the article was published
    pub day: usize,
    /// Asset the article is tagged to
    pub asset_id: String,
    pub headline: String,
    pub sentiment: Sentiment,
    /// Impact weight, 0-100
    pub weight: u8,
    /// Fabricated article, candidate for debunking
    pub fake: bool,
    /// Set once a fake article has been debunked
    pub debunked: bool,
    /// Signed hype delta this article applied at publication
    /// (recorded so debunking can reverse exactly half of it)
    pub hype_applied: f64,
}

impl NewsArticle {
    /// Days elapsed since publication
    pub fn age_days(&self, current_day: usize) -> usize {
        current_day.saturating_sub(self.day)
    }

    /// Still eligible for a debunk roll
    pub fn debunk_candidate(&self) -> bool {
        self.fake && !self.debunked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_sign() {
        assert_eq!(Sentiment::Positive.sign(), 1.0);
        assert_eq!(Sentiment::Negative.sign(), -1.0);
    }

    #[test]
    fn test_debunk_candidate() {
        let mut article = NewsArticle {
            id: "art_00000001".to_string(),
            day: 3,
            asset_id: "a".to_string(),
            headline: "x".to_string(),
            sentiment: Sentiment::Positive,
            weight: 50,
            fake: true,
            debunked: false,
            hype_applied: 0.1,
        };
        assert!(article.debunk_candidate());

        article.debunked = true;
        assert!(!article.debunk_candidate());
        assert_eq!(article.age_days(5), 2);
    }
}
