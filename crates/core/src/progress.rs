//! Visitor progress: discovered games, discovered collectibles, high scores.
//!
//! `Progress` is the one shared mutable resource of the arcade. Every write is
//! a whole-value write (the complete id list, the complete score) done right
//! after the in-memory check-and-update, so there is no partial state to race
//! on. A failing backend never surfaces to callers: the first failure is
//! logged and the rest of the visit runs memory-only.

use arcade_games::GameId;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::unlock::{UnlockKind, UnlockSet};

pub fn high_score_key(game: GameId) -> String {
    format!("highScore:{}", game.as_str())
}

pub struct Progress {
    backend: Box<dyn KeyValueStore>,
    games: UnlockSet,
    collectibles: UnlockSet,
    high_scores: HashMap<GameId, u32>,
    degraded: bool,
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress")
            .field("games", &self.games)
            .field("collectibles", &self.collectibles)
            .field("high_scores", &self.high_scores)
            .field("degraded", &self.degraded)
            .finish()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Progress {
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::new()))
    }

    /// Load everything the backend holds. Unreadable or malformed values are
    /// logged and treated as empty.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let mut progress = Self {
            backend,
            games: UnlockSet::new(),
            collectibles: UnlockSet::new(),
            high_scores: HashMap::new(),
            degraded: false,
        };
        progress.games = progress.load_set(UnlockKind::Game);
        progress.collectibles = progress.load_set(UnlockKind::Collectible);
        for game in GameId::ALL {
            let key = high_score_key(game);
            match progress.backend.get(&key) {
                Ok(Some(raw)) => match raw.trim().parse::<u32>() {
                    Ok(v) => {
                        progress.high_scores.insert(game, v);
                    }
                    Err(_) => warn!("Ignoring malformed high score under {}: {:?}", key, raw),
                },
                Ok(None) => {}
                Err(e) => progress.mark_degraded(&e),
            }
        }
        progress
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn has(&self, kind: UnlockKind, id: &str) -> bool {
        self.set(kind).has(id)
    }

    /// Record a discovery; `true` iff this is the first time for `id`.
    pub fn record(&mut self, kind: UnlockKind, id: &str) -> bool {
        let is_new = self.set_mut(kind).record(id);
        if is_new {
            debug!("Recorded {} discovery: {}", kind.as_str(), id);
            self.persist_set(kind);
        }
        is_new
    }

    pub fn all(&self, kind: UnlockKind) -> impl Iterator<Item = &str> + '_ {
        self.set(kind).all()
    }

    pub fn count(&self, kind: UnlockKind) -> usize {
        self.set(kind).len()
    }

    pub fn high_score(&self, game: GameId) -> u32 {
        self.high_scores.get(&game).copied().unwrap_or(0)
    }

    /// Raise the stored high score; returns `true` when `score` beat it.
    pub fn submit_score(&mut self, game: GameId, score: u32) -> bool {
        if score <= self.high_score(game) {
            return false;
        }
        self.high_scores.insert(game, score);
        let key = high_score_key(game);
        if let Err(e) = self.backend.set(&key, &score.to_string()) {
            self.mark_degraded(&e);
        }
        true
    }

    fn set(&self, kind: UnlockKind) -> &UnlockSet {
        match kind {
            UnlockKind::Game => &self.games,
            UnlockKind::Collectible => &self.collectibles,
        }
    }

    fn set_mut(&mut self, kind: UnlockKind) -> &mut UnlockSet {
        match kind {
            UnlockKind::Game => &mut self.games,
            UnlockKind::Collectible => &mut self.collectibles,
        }
    }

    fn load_set(&mut self, kind: UnlockKind) -> UnlockSet {
        match self.backend.get(kind.storage_key()) {
            Ok(Some(raw)) => UnlockSet::from_json(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed {}: {}", kind.storage_key(), e);
                UnlockSet::new()
            }),
            Ok(None) => UnlockSet::new(),
            Err(e) => {
                self.mark_degraded(&e);
                UnlockSet::new()
            }
        }
    }

    fn persist_set(&mut self, kind: UnlockKind) {
        let raw = match self.set(kind).to_json() {
            Ok(raw) => raw,
            Err(e) => {
                self.mark_degraded(&StorageError::Format(e));
                return;
            }
        };
        if let Err(e) = self.backend.set(kind.storage_key(), &raw) {
            self.mark_degraded(&e);
        }
    }

    fn mark_degraded(&mut self, e: &StorageError) {
        if !self.degraded {
            warn!("Progress storage unavailable, continuing in memory: {}", e);
        }
        self.degraded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Memory backend whose contents stay observable after being boxed.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.lock().unwrap().get(key)
        }
        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.lock().unwrap().set(key, value)
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn record_twice_persists_once() {
        let store = SharedStore::default();
        let mut progress = Progress::load(Box::new(store.clone()));
        assert!(progress.record(UnlockKind::Collectible, "thor"));
        assert!(!progress.record(UnlockKind::Collectible, "thor"));

        let raw = store.get("discoveredEasterEggs").unwrap().unwrap();
        let ids: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(ids, vec!["thor".to_string()]);
        assert_eq!(store.get("discoveredGames").unwrap(), None);
    }

    #[test]
    fn reload_sees_previous_visit() {
        let store = SharedStore::default();
        {
            let mut progress = Progress::load(Box::new(store.clone()));
            progress.record(UnlockKind::Game, "snake");
            progress.record(UnlockKind::Game, "memory");
            progress.submit_score(GameId::Flappy, 7);
        }
        let progress = Progress::load(Box::new(store));
        assert!(progress.has(UnlockKind::Game, "snake"));
        assert!(progress.has(UnlockKind::Game, "memory"));
        assert!(!progress.has(UnlockKind::Collectible, "snake"));
        assert_eq!(progress.high_score(GameId::Flappy), 7);
    }

    #[test]
    fn high_score_never_decreases() {
        let mut progress = Progress::in_memory();
        assert!(progress.submit_score(GameId::Snake, 30));
        assert!(!progress.submit_score(GameId::Snake, 20));
        assert!(!progress.submit_score(GameId::Snake, 30));
        assert_eq!(progress.high_score(GameId::Snake), 30);
    }

    #[test]
    fn broken_backend_degrades_to_memory() {
        let mut progress = Progress::load(Box::new(BrokenStore));
        assert!(progress.is_degraded());
        assert!(progress.record(UnlockKind::Game, "flappy"));
        assert!(!progress.record(UnlockKind::Game, "flappy"));
        assert!(progress.submit_score(GameId::Flappy, 3));
        assert_eq!(progress.high_score(GameId::Flappy), 3);
    }

    #[test]
    fn malformed_values_are_ignored() {
        let mut store = MemoryStore::new();
        store.set("discoveredGames", "{oops").unwrap();
        store.set("highScore:snake", "lots").unwrap();
        let progress = Progress::load(Box::new(store));
        assert_eq!(progress.count(UnlockKind::Game), 0);
        assert_eq!(progress.high_score(GameId::Snake), 0);
        assert!(!progress.is_degraded());
    }
}
