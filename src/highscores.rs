//! Persisted high score
//!
//! A single integer stored as a decimal string, read once at startup and
//! written whenever a finished session beats it.

use crate::persistence::{KeyValueStore, StorageError};

/// Best score across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "retroRacerHighScore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    #[inline]
    pub fn best(&self) -> u64 {
        self.best
    }

    /// Check if a score beats the stored best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Load the high score, treating missing or unreadable values as 0
    pub fn load(store: &impl KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(best) => {
                    log::info!("Loaded high score {}", best);
                    Self { best }
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable high score '{}': {}", raw, e);
                    Self::default()
                }
            },
            None => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
        }
    }

    /// Record a finished session's score.
    ///
    /// Returns true when it is a new best. The in-memory value is updated even
    /// if the store rejects the write.
    pub fn record(
        &mut self,
        score: u64,
        store: &mut impl KeyValueStore,
    ) -> Result<bool, StorageError> {
        if !self.qualifies(score) {
            return Ok(false);
        }
        self.best = score;
        store.set(Self::STORAGE_KEY, &score.to_string())?;
        log::info!("New high score saved: {}", score);
        Ok(true)
    }
}
