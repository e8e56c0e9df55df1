//! Cap and advancement controller.
//!
//! The host asks before granting a level. At or below the cap the engine
//! stays out of the way. Past the cap a real level is never granted: the
//! character gains a paragon rank instead, or nothing if capped or a bot.
//!
//! The host serializes events per character, so at most one advancement
//! per character is in flight. A port to a host without that guarantee must
//! add per-character exclusion around [`AdvancementController::evaluate`].

use crate::config::ProgressionConfig;
use crate::curve::{required_xp, UNREACHABLE_XP};
use crate::host::{ExperienceCurve, Player, Power};
use crate::rewards::MilestoneDispatcher;
use crate::state::ProgressionState;
use crate::tier::{colorize_rank, TierPreferenceCache};
use tracing::{debug, info, warn};

/// Why a level change was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Bot sessions do not earn paragon ranks.
    BotSession,
    /// The character is already at the rank cap.
    RankCapped { rank: u32 },
    /// The level was converted into a paragon rank.
    RankedUp { rank: u32 },
    /// The current rank could not be read; nothing was attempted.
    RankUnavailable,
    /// The rank store failed to increment; the rank is unchanged.
    StoreFailure { rank: u32 },
}

/// The answer to the host's "may this character level up?" question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelDecision {
    /// Let the host apply the level normally.
    Allow,
    /// Keep the host's level where it is.
    Deny(DenyReason),
}

impl LevelDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, LevelDecision::Allow)
    }
}

/// Rank-up announcement.
pub fn rank_up_message(rank_text: &str) -> String {
    format!("|cff00FFFFYour Paragon Level is:|r {rank_text}")
}

/// Notification shown when a capped character would have ranked up.
pub fn capped_message(rank_text: &str) -> String {
    format!("|cff00FFFFYou have reached the maximum Paragon Level:|r {rank_text}")
}

/// Decides what happens when the host is about to grant a level.
pub struct AdvancementController<'a> {
    pub state: &'a ProgressionState,
    pub preferences: &'a TierPreferenceCache,
    pub rewards: &'a MilestoneDispatcher,
    pub curve: &'a dyn ExperienceCurve,
}

impl AdvancementController<'_> {
    /// Evaluate a proposed level change for `player`.
    pub fn evaluate(
        &self,
        player: &mut dyn Player,
        proposed_level: u8,
        config: &ProgressionConfig,
    ) -> LevelDecision {
        if !config.enabled || proposed_level <= config.host_level_cap {
            return LevelDecision::Allow;
        }

        let character = player.id();
        if config.exclude_bots && player.is_bot() {
            debug!(%character, "bot session denied paragon advancement");
            return LevelDecision::Deny(DenyReason::BotSession);
        }

        let rank = match self.state.try_rank(character) {
            Ok(rank) => rank,
            Err(err) => {
                warn!(%character, error = %err, "paragon rank unreadable, level denied");
                return LevelDecision::Deny(DenyReason::RankUnavailable);
            }
        };
        if rank >= config.max_rank {
            let text = self.rank_text(player, rank, config);
            player.send_system_message(&capped_message(&text));
            player.set_next_level_xp(UNREACHABLE_XP);
            debug!(%character, rank, "paragon rank capped");
            return LevelDecision::Deny(DenyReason::RankCapped { rank });
        }

        if let Some(spell) = config.level_up_effect {
            player.cast_spell_on_self(spell);
        }

        let rank = match self.state.increment(character) {
            Ok(rank) => rank,
            Err(err) => {
                warn!(%character, rank, error = %err, "paragon rank not advanced");
                self.set_next_requirement(player, rank, config);
                return LevelDecision::Deny(DenyReason::StoreFailure { rank });
            }
        };
        info!(%character, rank, "paragon rank up");

        self.rewards.dispatch(player, rank, config);

        let text = self.rank_text(player, rank, config);
        player.send_system_message(&rank_up_message(&text));

        if config.restore_resources_on_rank_up && !player.is_dead() {
            restore_resources(player);
        }

        self.set_next_requirement(player, rank, config);
        LevelDecision::Deny(DenyReason::RankedUp { rank })
    }

    fn rank_text(&self, player: &dyn Player, rank: u32, config: &ProgressionConfig) -> String {
        let tier_colors = self
            .preferences
            .is_enabled(player.id(), config.default_tier_color_enabled);
        colorize_rank(rank, tier_colors, config)
    }

    fn set_next_requirement(&self, player: &mut dyn Player, rank: u32, config: &ProgressionConfig) {
        let xp = required_xp(self.curve, player.level(), rank, config);
        player.set_next_level_xp(xp);
    }
}

/// Refill health, mana and energy; pull rage down to its maximum; empty
/// focus and happiness.
pub fn restore_resources(player: &mut dyn Player) {
    player.set_full_health();
    for power in [Power::Mana, Power::Energy] {
        let max = player.max_power(power);
        player.set_power(power, max);
    }
    let max_rage = player.max_power(Power::Rage);
    if player.power(Power::Rage) > max_rage {
        player.set_power(Power::Rage, max_rage);
    }
    player.set_power(Power::Focus, 0);
    player.set_power(Power::Happiness, 0);
}
