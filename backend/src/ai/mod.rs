//! AI/text collaborator port
//!
//! Social-post classification and comment-pack generation are delegated to
//! an external text service. The simulation never blocks on or fails due to
//! that collaborator: every call has a deterministic seeded fallback keyed
//! the same way, so unavailability degrades to reproducible templates.

use crate::models::news::Sentiment;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the external text service
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Text service unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Coarse classification of a social post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    Shill,
    Fud,
    Question,
    Meme,
    Analysis,
}

/// Result of classifying a post and generating its comment pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysis {
    pub category: PostCategory,
    pub sentiment: Sentiment,
    /// Asset ids/symbols the post is judged to be about
    pub targets: Vec<String>,
    /// How many days the post's influence should linger
    pub horizon_days: usize,
    /// Canned replies for the feed
    pub comment_pack: Vec<String>,
    /// Free-form quality notes for the composer UI
    pub quality_hints: Vec<String>,
}

/// Port to the external text service
pub trait SocialTextService {
    /// Classify a post and build its comment pack
    fn classify_and_pack(
        &self,
        text: &str,
        mentions: &[String],
        seed: u32,
    ) -> Result<PostAnalysis, AiError>;

    /// Compose a post about a topic
    fn compose_post(&self, topic: &str, seed: u32) -> Result<String, AiError>;

    /// Punch up a draft
    fn improve_post(&self, draft: &str, seed: u32) -> Result<String, AiError>;
}

const CATEGORIES: &[PostCategory] = &[
    PostCategory::Shill,
    PostCategory::Fud,
    PostCategory::Question,
    PostCategory::Meme,
    PostCategory::Analysis,
];

const COMMENTS: &[&str] = &[
    "ser this is the way",
    "who is selling?? hands of paper",
    "my bags are ready",
    "down catastrophically but still believing",
    "wen lambo",
    "this aged well",
    "zoom out.",
    "liquidity looking thin ngl",
    "devs pls do something",
    "priced in",
];

const QUALITY_HINTS: &[&str] = &[
    "add a chart screenshot",
    "tag the project account",
    "shorter hook, same cope",
    "numbers make it look researched",
];

const COMPOSE_TEMPLATES: &[&str] = &[
    "hearing things about {topic}. not financial advice but my bags are packed",
    "{topic} chart looking like a staircase to somewhere. up or down, no idea",
    "everyone sleeping on {topic}. anyway, adding on every dip",
];

/// Deterministic template-based stand-in for the text service
///
/// Keyed by an FNV hash of (input, seed) feeding the same RNG the rest of
/// the simulation uses — identical inputs always produce identical outputs.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextFallback;

impl DeterministicTextFallback {
    pub fn new() -> Self {
        Self
    }

    fn rng_for(text: &str, seed: u32) -> RngManager {
        // Fold the caller's seed into the text hash so the same text under
        // different seeds diverges deterministically.
        let base = RngManager::from_str_seed(text);
        RngManager::new(base.state() ^ seed.rotate_left(16))
    }
}

impl SocialTextService for DeterministicTextFallback {
    fn classify_and_pack(
        &self,
        text: &str,
        mentions: &[String],
        seed: u32,
    ) -> Result<PostAnalysis, AiError> {
        let mut rng = Self::rng_for(text, seed);

        let category = *rng.pick(CATEGORIES);
        let sentiment = if rng.chance(0.5) {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        };
        let horizon_days = rng.int(1, 5) as usize;

        let pack_size = rng.int(3, 6) as usize;
        let mut comment_pack = Vec::with_capacity(pack_size);
        for _ in 0..pack_size {
            comment_pack.push((*rng.pick(COMMENTS)).to_string());
        }

        let hint_count = rng.int(1, 2) as usize;
        let mut quality_hints = Vec::with_capacity(hint_count);
        for _ in 0..hint_count {
            quality_hints.push((*rng.pick(QUALITY_HINTS)).to_string());
        }

        Ok(PostAnalysis {
            category,
            sentiment,
            targets: mentions.to_vec(),
            horizon_days,
            comment_pack,
            quality_hints,
        })
    }

    fn compose_post(&self, topic: &str, seed: u32) -> Result<String, AiError> {
        let mut rng = Self::rng_for(topic, seed);
        Ok(rng.pick(COMPOSE_TEMPLATES).replace("{topic}", topic))
    }

    fn improve_post(&self, draft: &str, seed: u32) -> Result<String, AiError> {
        let mut rng = Self::rng_for(draft, seed);
        let suffix = *rng.pick(&["🚀", "📉", "💎🙌", "(not financial advice)"]);
        Ok(format!("{draft} {suffix}"))
    }
}

/// Wrap a primary service with the deterministic fallback
///
/// Any primary error is swallowed (with a logged warning) and answered by
/// the fallback, so callers never see this collaborator fail.
pub struct FallbackOnError<S> {
    primary: S,
    fallback: DeterministicTextFallback,
}

impl<S: SocialTextService> FallbackOnError<S> {
    pub fn new(primary: S) -> Self {
        Self {
            primary,
            fallback: DeterministicTextFallback::new(),
        }
    }
}

impl<S: SocialTextService> SocialTextService for FallbackOnError<S> {
    fn classify_and_pack(
        &self,
        text: &str,
        mentions: &[String],
        seed: u32,
    ) -> Result<PostAnalysis, AiError> {
        match self.primary.classify_and_pack(text, mentions, seed) {
            Ok(analysis) => Ok(analysis),
            Err(err) => {
                log::warn!("text service failed, using fallback: {err}");
                self.fallback.classify_and_pack(text, mentions, seed)
            }
        }
    }

    fn compose_post(&self, topic: &str, seed: u32) -> Result<String, AiError> {
        match self.primary.compose_post(topic, seed) {
            Ok(post) => Ok(post),
            Err(err) => {
                log::warn!("text service failed, using fallback: {err}");
                self.fallback.compose_post(topic, seed)
            }
        }
    }

    fn improve_post(&self, draft: &str, seed: u32) -> Result<String, AiError> {
        match self.primary.improve_post(draft, seed) {
            Ok(post) => Ok(post),
            Err(err) => {
                log::warn!("text service failed, using fallback: {err}");
                self.fallback.improve_post(draft, seed)
            }
        }
    }
}
