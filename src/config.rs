//! Configuration for paragon progression.
//!
//! The host exposes its settings as dotted keys (`ParagonLevel.Enable`,
//! `MaxPlayerLevel`, ...). `ConfigValues` holds those raw values, and
//! `ProgressionConfig::from_values` turns them into a typed, immutable
//! snapshot. `ConfigHandle` is the shared slot a reload swaps wholesale.

use crate::error::ParagonError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Ranks at which a milestone title may be granted.
pub const MILESTONE_RANKS: [u32; 4] = [50, 100, 150, 200];

/// Level cap used when the host does not report one.
pub const DEFAULT_MAX_PLAYER_LEVEL: u8 = 80;

/// Visual effect cast on rank-up when none is configured.
pub const DEFAULT_LEVEL_UP_SPELL: u32 = 47292;

/// Configuration keys read by the engine.
pub mod keys {
    pub const ENABLE: &str = "ParagonLevel.Enable";
    pub const XP_PER_LEVEL_MOD: &str = "ParagonLevel.XpPerLevelMod";
    pub const MAX_PARAGON_LEVEL: &str = "ParagonLevel.MaxParagonLevel";
    pub const LEVEL_UP_SPELL: &str = "ParagonLevel.LevelUpSpell";
    pub const RESTORE_STATS: &str = "ParagonLevel.RestoreStatsOnLevelUp";
    pub const EXCLUDE_BOTS: &str = "ParagonLevel.ExcludeBots";
    pub const CHAT_COLOR_DEFAULT: &str = "ParagonLevel.ChatColor.DefaultEnabled";
    pub const MAX_PLAYER_LEVEL: &str = "MaxPlayerLevel";

    /// `ParagonLevel.TitleAt<rank>`.
    pub fn title_at(rank: u32) -> String {
        format!("ParagonLevel.TitleAt{rank}")
    }

    /// `ParagonLevel.ChatColor.Tier<n>`.
    pub fn tier_color(tier: usize) -> String {
        format!("ParagonLevel.ChatColor.Tier{tier}")
    }
}

/// Raw configuration values keyed by their dotted host name.
///
/// The engine does not own the host's configuration loader; whatever
/// loads it fills one of these and hands it over on startup and reload.
///
/// # Examples
///
/// ```rust
/// use paragon::ConfigValues;
///
/// let mut values = ConfigValues::new();
/// values.set("ParagonLevel.Enable", true);
/// values.set("ParagonLevel.MaxParagonLevel", 150);
///
/// let max: Option<u32> = values.get("ParagonLevel.MaxParagonLevel");
/// assert_eq!(max, Some(150));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigValues {
    data: HashMap<String, serde_json::Value>,
}

impl ConfigValues {
    /// Create an empty set of values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document, flattening nested tables into dotted keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::ConfigValues;
    ///
    /// let values = ConfigValues::from_toml_str(r#"
    ///     MaxPlayerLevel = 70
    ///
    ///     [ParagonLevel]
    ///     Enable = true
    ///
    ///     [ParagonLevel.ChatColor]
    ///     DefaultEnabled = false
    /// "#).unwrap();
    ///
    /// assert_eq!(values.get::<u8>("MaxPlayerLevel"), Some(70));
    /// assert_eq!(values.get::<bool>("ParagonLevel.ChatColor.DefaultEnabled"), Some(false));
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self, ParagonError> {
        let table: toml::Table =
            toml::from_str(document).map_err(|e| ParagonError::Config(e.to_string()))?;
        let mut values = Self::new();
        values.flatten_table("", &table)?;
        Ok(values)
    }

    fn flatten_table(&mut self, prefix: &str, table: &toml::Table) -> Result<(), ParagonError> {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                toml::Value::Table(nested) => self.flatten_table(&full_key, nested)?,
                other => {
                    let json = serde_json::to_value(other)
                        .map_err(|e| ParagonError::Config(format!("{full_key}: {e}")))?;
                    self.data.insert(full_key, json);
                }
            }
        }
        Ok(())
    }

    /// Set a value. Values that fail to serialize are silently dropped.
    pub fn set(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.data.insert(key.into(), json_value);
        }
    }

    /// Get a value, or `None` if it is absent or of the wrong type.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    fn raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

/// Typed, immutable paragon configuration.
///
/// Built once per load or reload. Handlers read it through a
/// [`ConfigHandle`] snapshot, so a single handler invocation always sees
/// one consistent configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    pub enabled: bool,
    /// Percent of the standard requirement added per rank. Values at or
    /// below 1.0 leave the standard curve untouched.
    pub xp_per_rank_multiplier: f64,
    pub max_rank: u32,
    /// The host's un-extended level cap.
    pub host_level_cap: u8,
    pub level_up_effect: Option<u32>,
    pub restore_resources_on_rank_up: bool,
    pub exclude_bots: bool,
    /// Title identifiers for each entry of [`MILESTONE_RANKS`].
    pub milestone_titles: [Option<u32>; 4],
    /// Color tokens for the five rank tiers, lowest first.
    pub tier_colors: [String; 5],
    pub default_tier_color_enabled: bool,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            xp_per_rank_multiplier: 1.0,
            max_rank: 200,
            host_level_cap: DEFAULT_MAX_PLAYER_LEVEL,
            level_up_effect: Some(DEFAULT_LEVEL_UP_SPELL),
            restore_resources_on_rank_up: false,
            exclude_bots: true,
            milestone_titles: [None; 4],
            tier_colors: [
                "ffffffff".to_string(),
                "ff1eff00".to_string(),
                "ff0070dd".to_string(),
                "ffa335ee".to_string(),
                "ffff8000".to_string(),
            ],
            default_tier_color_enabled: true,
        }
    }
}

impl ProgressionConfig {
    /// Build a configuration from raw values.
    ///
    /// Never fails: absent keys take their default and ill-typed keys take
    /// their default with a warning.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::{ConfigValues, ProgressionConfig};
    ///
    /// let mut values = ConfigValues::new();
    /// values.set("ParagonLevel.MaxParagonLevel", 100);
    /// values.set("ParagonLevel.TitleAt50", 143);
    /// values.set("ParagonLevel.TitleAt100", "none");
    ///
    /// let config = ProgressionConfig::from_values(&values);
    /// assert_eq!(config.max_rank, 100);
    /// assert_eq!(config.title_for_rank(50), Some(143));
    /// assert_eq!(config.title_for_rank(100), None);
    /// assert!(config.enabled);
    /// ```
    pub fn from_values(values: &ConfigValues) -> Self {
        let defaults = Self::default();

        let mut multiplier = read(values, keys::XP_PER_LEVEL_MOD, defaults.xp_per_rank_multiplier);
        if !multiplier.is_finite() || multiplier < 0.0 {
            warn!(key = keys::XP_PER_LEVEL_MOD, multiplier, "invalid multiplier, using default");
            multiplier = defaults.xp_per_rank_multiplier;
        }

        let level_up_effect = match read::<u32>(values, keys::LEVEL_UP_SPELL, DEFAULT_LEVEL_UP_SPELL) {
            0 => None,
            spell => Some(spell),
        };

        let mut milestone_titles = [None; 4];
        for (slot, rank) in milestone_titles.iter_mut().zip(MILESTONE_RANKS) {
            let key = keys::title_at(rank);
            *slot = values.raw(&key).and_then(|v| parse_title(&key, v));
        }

        let mut tier_colors = defaults.tier_colors.clone();
        for (tier, color) in tier_colors.iter_mut().enumerate() {
            let key = keys::tier_color(tier);
            let configured: String = read(values, &key, color.clone());
            *color = configured;
        }

        Self {
            enabled: read(values, keys::ENABLE, defaults.enabled),
            xp_per_rank_multiplier: multiplier,
            max_rank: read(values, keys::MAX_PARAGON_LEVEL, defaults.max_rank),
            host_level_cap: read(values, keys::MAX_PLAYER_LEVEL, defaults.host_level_cap),
            level_up_effect,
            restore_resources_on_rank_up: read(values, keys::RESTORE_STATS, defaults.restore_resources_on_rank_up),
            exclude_bots: read(values, keys::EXCLUDE_BOTS, defaults.exclude_bots),
            milestone_titles,
            tier_colors,
            default_tier_color_enabled: read(values, keys::CHAT_COLOR_DEFAULT, defaults.default_tier_color_enabled),
        }
    }

    /// The title configured for `rank`, if `rank` is a milestone with one.
    pub fn title_for_rank(&self, rank: u32) -> Option<u32> {
        MILESTONE_RANKS
            .iter()
            .position(|&milestone| milestone == rank)
            .and_then(|idx| self.milestone_titles[idx])
    }
}

fn read<T: DeserializeOwned>(values: &ConfigValues, key: &str, default: T) -> T {
    match values.raw(key) {
        None => default,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(key, %value, %err, "ill-typed config value, using default");
                default
            }
        },
    }
}

/// Titles are numeric ids, or `"none"` (also empty or `0`) for no title.
fn parse_title(key: &str, value: &serde_json::Value) -> Option<u32> {
    let id = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("none") {
                return None;
            }
            s.parse::<u32>().ok()
        }
        _ => None,
    };
    match id {
        Some(0) => None,
        Some(id) => Some(id),
        None => {
            warn!(key, %value, "unrecognized title identifier, treating as none");
            None
        }
    }
}

/// Shared slot holding the current configuration.
///
/// Cloning the handle shares the slot. `current` hands out a snapshot and
/// releases the lock before returning, so no lock is held while a handler
/// runs. `replace` swaps the whole configuration at once.
///
/// # Examples
///
/// ```rust
/// use paragon::{ConfigHandle, ProgressionConfig};
///
/// let handle = ConfigHandle::new(ProgressionConfig::default());
/// let before = handle.current();
///
/// handle.replace(ProgressionConfig { max_rank: 10, ..ProgressionConfig::default() });
///
/// assert_eq!(before.max_rank, 200);
/// assert_eq!(handle.current().max_rank, 10);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    slot: Arc<RwLock<Arc<ProgressionConfig>>>,
}

impl ConfigHandle {
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Snapshot of the configuration in effect right now.
    pub fn current(&self) -> Arc<ProgressionConfig> {
        let guard = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install a new configuration, returning the one it replaced.
    pub fn replace(&self, config: ProgressionConfig) -> Arc<ProgressionConfig> {
        let next = Arc::new(config);
        let mut guard = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}
