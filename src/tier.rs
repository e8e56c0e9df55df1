//! Rank tiers and the per-character tier-color preference.
//!
//! Ranks fall into five tiers, each with a configured display color.
//! Whether a character sees those colors is a preference loaded lazily from
//! the preference store and cached for the rest of the session.

use crate::character::CharacterId;
use crate::config::ProgressionConfig;
use crate::error::ParagonError;
use crate::host::PreferenceStore;
use dashmap::DashMap;
use tracing::{debug, warn};

/// One of the five rank ranges.
///
/// Lower bounds are inclusive: 0-49, 50-99, 100-149, 150-199, 200+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Tier0,
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl Tier {
    /// The tier a rank falls in.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::Tier;
    ///
    /// assert_eq!(Tier::for_rank(49), Tier::Tier0);
    /// assert_eq!(Tier::for_rank(50), Tier::Tier1);
    /// assert_eq!(Tier::for_rank(200), Tier::Tier4);
    /// ```
    pub fn for_rank(rank: u32) -> Self {
        match rank {
            200..=u32::MAX => Tier::Tier4,
            150..=199 => Tier::Tier3,
            100..=149 => Tier::Tier2,
            50..=99 => Tier::Tier1,
            _ => Tier::Tier0,
        }
    }

    /// Position of this tier, `0` through `4`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The configured color token for this tier.
    pub fn color(self, config: &ProgressionConfig) -> &str {
        &config.tier_colors[self.index()]
    }
}

/// Color used for ranks when tier colors are off.
pub const PLAIN_RANK_COLOR: &str = "ffFF0000";

/// Render a rank wrapped in its display color.
///
/// Uses the tier color when `tier_colors` is set, otherwise the plain rank
/// color.
///
/// # Examples
///
/// ```rust
/// use paragon::{colorize_rank, ProgressionConfig};
///
/// let config = ProgressionConfig::default();
/// assert_eq!(colorize_rank(120, true, &config), "|cff0070dd120|r");
/// assert_eq!(colorize_rank(120, false, &config), "|cffFF0000120|r");
/// ```
pub fn colorize_rank(rank: u32, tier_colors: bool, config: &ProgressionConfig) -> String {
    let color = if tier_colors {
        Tier::for_rank(rank).color(config)
    } else {
        PLAIN_RANK_COLOR
    };
    format!("|c{color}{rank}|r")
}

/// Session cache of tier-color preferences.
///
/// Reads are cache-then-store; writes update the cache first and then
/// persist best-effort. A failed save leaves the cached value in place, so
/// the rest of the session sees what the character asked for. Entries live
/// from first use until [`evict`](Self::evict) on disconnect.
///
/// No lock is held while the store is called.
pub struct TierPreferenceCache {
    store: Box<dyn PreferenceStore>,
    entries: DashMap<CharacterId, bool>,
}

impl TierPreferenceCache {
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        Self {
            store,
            entries: DashMap::new(),
        }
    }

    /// Whether `character` sees tier colors.
    ///
    /// Loads and caches the stored preference on first use, falling back to
    /// `default` when there is no row or the store fails.
    pub fn is_enabled(&self, character: CharacterId, default: bool) -> bool {
        if let Some(enabled) = self.entries.get(&character) {
            return *enabled;
        }

        let loaded = match self.load(character) {
            Ok(stored) => stored.unwrap_or(default),
            Err(err) => {
                warn!(%character, error = %err, "tier color preference unavailable, using default");
                default
            }
        };

        // Another caller may have set a value while the store was read; it wins.
        *self.entries.entry(character).or_insert(loaded)
    }

    /// Change the preference for `character`.
    ///
    /// The cached value changes immediately. The returned error only reports
    /// that persisting failed; it never undoes the change.
    pub fn set_enabled(&self, character: CharacterId, enabled: bool) -> Result<(), ParagonError> {
        self.entries.insert(character, enabled);
        debug!(%character, enabled, "tier color preference changed");

        self.store
            .save_chat_color(character, enabled)
            .map_err(|source| ParagonError::PreferenceStore { character, source })
    }

    /// Forget `character`'s cached preference.
    pub fn evict(&self, character: CharacterId) {
        self.entries.remove(&character);
    }

    /// Forget every cached preference.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of characters with a cached preference.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn load(&self, character: CharacterId) -> Result<Option<bool>, ParagonError> {
        self.store
            .load_chat_color(character)
            .map_err(|source| ParagonError::PreferenceStore { character, source })
    }
}

impl std::fmt::Debug for TierPreferenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierPreferenceCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
