//! Paragon rank accessor.
//!
//! The currency store is the only source of truth for a character's rank.
//! Nothing here caches a rank: every read and every increment goes to the
//! store, so two connections to the same character can never disagree.

use crate::character::CharacterId;
use crate::error::ParagonError;
use crate::host::CurrencyStore;
use tracing::{debug, warn};

/// Reads and advances paragon ranks through a [`CurrencyStore`].
pub struct ProgressionState {
    store: Box<dyn CurrencyStore>,
}

impl ProgressionState {
    pub fn new(store: Box<dyn CurrencyStore>) -> Self {
        Self { store }
    }

    /// Current rank of `character`.
    ///
    /// Fails soft: a missing record or an unavailable store both read as 0.
    /// Only for display paths; anything that advances a rank must use
    /// [`try_rank`](Self::try_rank).
    pub fn rank(&self, character: CharacterId) -> u32 {
        self.try_rank(character).unwrap_or_else(|err| {
            warn!(%character, error = %err, "paragon rank unavailable, reading as 0");
            0
        })
    }

    /// Current rank of `character`, or the store's error.
    ///
    /// A missing record is rank 0; an unavailable store is an error.
    pub fn try_rank(&self, character: CharacterId) -> Result<u32, ParagonError> {
        self.store
            .paragon_rank(character)
            .map(|rank| rank.unwrap_or(0))
            .map_err(|source| ParagonError::RankStore { character, source })
    }

    /// Add one rank and return the store's value after the increment.
    ///
    /// The new rank comes from the store, never from local arithmetic. On
    /// error the rank is unchanged.
    pub fn increment(&self, character: CharacterId) -> Result<u32, ParagonError> {
        let rank = self
            .store
            .increment_paragon_rank(character)
            .map_err(|source| ParagonError::RankStore { character, source })?;
        debug!(%character, rank, "paragon rank incremented");
        Ok(rank)
    }
}

impl std::fmt::Debug for ProgressionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionState").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryCurrency {
        ranks: Mutex<HashMap<CharacterId, u32>>,
        offline: bool,
    }

    impl CurrencyStore for MemoryCurrency {
        fn paragon_rank(&self, character: CharacterId) -> Result<Option<u32>, StoreError> {
            if self.offline {
                return Err(StoreError::Unavailable("offline".into()));
            }
            Ok(self.ranks.lock().unwrap().get(&character).copied())
        }

        fn increment_paragon_rank(&self, character: CharacterId) -> Result<u32, StoreError> {
            if self.offline {
                return Err(StoreError::Unavailable("offline".into()));
            }
            let mut ranks = self.ranks.lock().unwrap();
            let rank = ranks.entry(character).or_insert(0);
            *rank += 1;
            Ok(*rank)
        }
    }

    #[test]
    fn test_missing_record_reads_zero() {
        let state = ProgressionState::new(Box::new(MemoryCurrency::default()));
        assert_eq!(state.rank(CharacterId::new(1)), 0);
    }

    #[test]
    fn test_try_rank_reads_missing_record_as_zero() {
        let store = MemoryCurrency::default();
        store.ranks.lock().unwrap().insert(CharacterId::new(2), 7);
        let state = ProgressionState::new(Box::new(store));

        assert_eq!(state.try_rank(CharacterId::new(1)), Ok(0));
        assert_eq!(state.try_rank(CharacterId::new(2)), Ok(7));
    }

    #[test]
    fn test_increment_returns_store_value() {
        let store = MemoryCurrency::default();
        store.ranks.lock().unwrap().insert(CharacterId::new(1), 41);
        let state = ProgressionState::new(Box::new(store));

        assert_eq!(state.increment(CharacterId::new(1)).unwrap(), 42);
        assert_eq!(state.rank(CharacterId::new(1)), 42);
    }

    #[test]
    fn test_offline_store() {
        let store = MemoryCurrency {
            offline: true,
            ..MemoryCurrency::default()
        };
        let state = ProgressionState::new(Box::new(store));
        let id = CharacterId::new(3);

        assert_eq!(state.rank(id), 0);
        assert!(matches!(
            state.try_rank(id),
            Err(ParagonError::RankStore { character, .. }) if character == id
        ));
        let err = state.increment(id).unwrap_err();
        assert!(matches!(err, ParagonError::RankStore { character, .. } if character == id));
    }
}
