//! Persistence port
//!
//! The simulation treats storage purely as get/put of its full serialized
//! state, keyed by a profile identifier. No transactional multi-key
//! semantics are assumed. Persistence failures never stop the simulation:
//! the dirty flag stays set and the next successful save carries everything
//! accumulated since.

use crate::orchestrator::checkpoint::SavedGame;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the storage collaborator
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Mint a new profile identifier at onboarding
///
/// Profile ids are the one identifier outside the deterministic replay
/// domain, so a random UUID is fine here.
pub fn new_profile_id() -> String {
    format!("profile_{}", Uuid::new_v4())
}

/// Get/put port to the save-game store
pub trait GameStore {
    /// Load the saved game for a profile, if one exists
    fn load_game(&self, profile_id: &str) -> Result<Option<SavedGame>, StorageError>;

    /// Persist the full saved game for a profile
    fn save_game(&mut self, profile_id: &str, game: &SavedGame) -> Result<(), StorageError>;
}

/// In-memory store for tests and the offline driver
///
/// Serializes through JSON to exercise the same codec a real backend would.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    games: HashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl GameStore for InMemoryStore {
    fn load_game(&self, profile_id: &str) -> Result<Option<SavedGame>, StorageError> {
        match self.games.get(profile_id) {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn save_game(&mut self, profile_id: &str, game: &SavedGame) -> Result<(), StorageError> {
        let raw = serde_json::to_string(game)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.games.insert(profile_id.to_string(), raw);
        Ok(())
    }
}

/// A store that always fails, for exercising the persistence-failure path
#[derive(Debug, Default)]
pub struct FailingStore;

impl GameStore for FailingStore {
    fn load_game(&self, _profile_id: &str) -> Result<Option<SavedGame>, StorageError> {
        Err(StorageError::Unavailable("failing store".to_string()))
    }

    fn save_game(&mut self, _profile_id: &str, _game: &SavedGame) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("failing store".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_ids_unique() {
        assert_ne!(new_profile_id(), new_profile_id());
    }

    #[test]
    fn test_missing_profile_is_none() {
        let store = InMemoryStore::new();
        assert!(store.load_game("profile_missing").unwrap().is_none());
    }
}
