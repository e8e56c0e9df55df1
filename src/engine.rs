//! The paragon engine.
//!
//! `ParagonEngine` is the one object the host talks to. It is constructed
//! explicitly and passed by reference to whatever wires host events and chat
//! commands; there is no global instance.
//!
//! Every handler returns a definite value. Store failures degrade to safe
//! defaults and are logged, never propagated into the host.

use crate::addon::{AddonBridge, ChatDisposition, ChatMessage};
use crate::advancement::{AdvancementController, LevelDecision};
use crate::character::CharacterId;
use crate::config::{ConfigHandle, ConfigValues, ProgressionConfig};
use crate::curve::required_xp;
use crate::error::ParagonError;
use crate::host::{ExperienceCurve, HostServices, Player, World};
use crate::rewards::MilestoneDispatcher;
use crate::state::ProgressionState;
use crate::tier::TierPreferenceCache;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Paragon progression for one host process.
///
/// The host forwards four events: level change, experience query, outgoing
/// chat and configuration reload, plus connect/disconnect for each session.
pub struct ParagonEngine {
    config: ConfigHandle,
    state: ProgressionState,
    preferences: TierPreferenceCache,
    rewards: MilestoneDispatcher,
    experience: Box<dyn ExperienceCurve>,
    world: Box<dyn World>,
}

impl ParagonEngine {
    /// Build the engine and apply `config` to the host, as on startup.
    pub fn new(config: ProgressionConfig, services: HostServices) -> Self {
        let HostServices {
            currency,
            preferences,
            experience,
            titles,
            rewards,
            world,
        } = services;

        let engine = Self {
            config: ConfigHandle::new(config),
            state: ProgressionState::new(currency),
            preferences: TierPreferenceCache::new(preferences),
            rewards: MilestoneDispatcher::new(rewards, titles),
            experience,
            world,
        };
        engine.apply_config(&engine.config());
        engine
    }

    /// Snapshot of the configuration in effect.
    pub fn config(&self) -> Arc<ProgressionConfig> {
        self.config.current()
    }

    /// Shared handle to the configuration slot.
    pub fn config_handle(&self) -> &ConfigHandle {
        &self.config
    }

    /// Host reloaded its configuration.
    ///
    /// The new configuration replaces the old one in a single swap. When
    /// enabled the host cap is raised by one so the host raises a level
    /// event at the cap; when disabled the cap is restored and cached
    /// preferences are dropped.
    pub fn on_config_reload(&self, values: &ConfigValues) {
        let config = ProgressionConfig::from_values(values);
        let previous = self.config.replace(config);
        let current = self.config();
        info!(
            enabled = current.enabled,
            was_enabled = previous.enabled,
            max_rank = current.max_rank,
            "paragon configuration reloaded"
        );
        self.apply_config(&current);
    }

    fn apply_config(&self, config: &ProgressionConfig) {
        if config.enabled {
            self.world
                .set_max_player_level(config.host_level_cap.saturating_add(1));
        } else {
            self.world.set_max_player_level(config.host_level_cap);
            self.preferences.clear();
        }
    }

    /// Character finished logging in.
    pub fn on_character_connected(&self, character: CharacterId) {
        let config = self.config();
        if !config.enabled {
            return;
        }
        let tier_colors = self
            .preferences
            .is_enabled(character, config.default_tier_color_enabled);
        debug!(%character, tier_colors, "paragon session started");
    }

    /// Character logged out or disconnected.
    pub fn on_character_disconnected(&self, character: CharacterId) {
        self.preferences.evict(character);
        debug!(%character, "paragon session ended");
    }

    /// Host is about to change `player`'s level to `proposed_level`.
    pub fn on_before_level_change(&self, player: &mut dyn Player, proposed_level: u8) -> LevelDecision {
        let config = self.config();
        AdvancementController {
            state: &self.state,
            preferences: &self.preferences,
            rewards: &self.rewards,
            curve: self.experience.as_ref(),
        }
        .evaluate(player, proposed_level, &config)
    }

    /// Experience `player` needs to advance from `level`.
    ///
    /// Below the cap, or with the feature off, this is the host's standard
    /// value; at the cap it is the paragon requirement for the current rank.
    pub fn on_query_xp_for_level(&self, player: &dyn Player, level: u8) -> u32 {
        let config = self.config();
        if !config.enabled || player.level() < config.host_level_cap {
            return self.experience.xp_for_level(level);
        }
        let rank = self.state.rank(player.id());
        required_xp(self.experience.as_ref(), level, rank, &config)
    }

    /// `player` is about to send `message`.
    pub fn on_before_send_chat(&self, player: &mut dyn Player, message: &mut ChatMessage) -> ChatDisposition {
        AddonBridge {
            state: &self.state,
            world: self.world.as_ref(),
        }
        .handle(player, message)
    }

    /// Current paragon rank of `character`; 0 when unknown.
    pub fn rank(&self, character: CharacterId) -> u32 {
        self.state.rank(character)
    }

    /// Whether `character` sees tier-colored ranks.
    pub fn is_tier_color_enabled(&self, character: CharacterId) -> bool {
        let default = self.config().default_tier_color_enabled;
        self.preferences.is_enabled(character, default)
    }

    /// Change `character`'s tier-color preference.
    ///
    /// Takes effect immediately. A failed save is logged and does not
    /// undo the change.
    pub fn set_tier_color_enabled(&self, character: CharacterId, enabled: bool) {
        if let Err(err) = self.preferences.set_enabled(character, enabled) {
            warn!(%character, enabled, error = %err, "tier color preference not persisted");
        }
    }

    /// Number of characters with a cached tier-color preference.
    pub fn cached_preferences(&self) -> usize {
        self.preferences.len()
    }

    /// Increment `character`'s rank directly, without level-change handling.
    pub fn increment_rank(&self, character: CharacterId) -> Result<u32, ParagonError> {
        self.state.increment(character)
    }
}

impl std::fmt::Debug for ParagonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParagonEngine")
            .field("config", &self.config.current())
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}
