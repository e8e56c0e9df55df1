//! Host seams.
//!
//! The engine owns none of the character runtime. Everything it needs from
//! the host goes through the traits in this module, which the host (or a
//! test) implements.

use crate::character::CharacterId;
use crate::error::StoreError;

/// Resource pools the engine may restore on rank-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Power {
    Mana,
    Rage,
    Focus,
    Energy,
    Happiness,
}

/// A connected character as seen by one handler invocation.
///
/// Implementations are borrowed mutably for the duration of a handler and
/// never retained by the engine.
pub trait Player {
    fn id(&self) -> CharacterId;
    fn name(&self) -> &str;
    fn level(&self) -> u8;
    fn is_dead(&self) -> bool;

    /// Whether the session is driven by an automated client.
    fn is_bot(&self) -> bool;

    fn cast_spell_on_self(&mut self, spell_id: u32);
    fn set_full_health(&mut self);
    fn power(&self, power: Power) -> u32;
    fn max_power(&self, power: Power) -> u32;
    fn set_power(&mut self, power: Power, value: u32);

    /// Set the experience the character needs to reach its next level.
    fn set_next_level_xp(&mut self, xp: u32);

    /// Show a system message to the character.
    fn send_system_message(&mut self, text: &str);

    /// Write a raw packet to the character's own session.
    fn send_packet(&mut self, opcode: u16, body: &[u8]);
}

/// Per-character currency store holding the paragon rank.
pub trait CurrencyStore: Send + Sync {
    /// Current rank, or `None` if the character has no record.
    fn paragon_rank(&self, character: CharacterId) -> Result<Option<u32>, StoreError>;

    /// Add exactly one rank and return the stored value after the increment.
    ///
    /// Must apply fully or not at all.
    fn increment_paragon_rank(&self, character: CharacterId) -> Result<u32, StoreError>;
}

/// The `(character_id, enable_chat_color)` preference table.
pub trait PreferenceStore: Send + Sync {
    /// Stored preference, or `None` when the character has no row.
    fn load_chat_color(&self, character: CharacterId) -> Result<Option<bool>, StoreError>;

    fn save_chat_color(&self, character: CharacterId, enabled: bool) -> Result<(), StoreError>;
}

/// The host's standard experience-for-level table.
pub trait ExperienceCurve: Send + Sync {
    fn xp_for_level(&self, level: u8) -> u32;
}

impl<F> ExperienceCurve for F
where
    F: Fn(u8) -> u32 + Send + Sync,
{
    fn xp_for_level(&self, level: u8) -> u32 {
        self(level)
    }
}

/// A title resolved from the host's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEntry {
    pub id: u32,
    pub name: String,
}

/// The host's title catalog.
pub trait TitleCatalog: Send + Sync {
    /// Resolve a title id, or `None` if the catalog has no such title.
    fn find_title(&self, id: u32) -> Result<Option<TitleEntry>, StoreError>;

    fn grant_title(&self, character: CharacterId, title: &TitleEntry) -> Result<(), StoreError>;
}

/// Named reward events handed to the host's reward system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardEvent {
    /// Every paragon rank-up.
    RankUp,
    /// Rank-ups that land on a multiple of five.
    FiveRankInterval,
}

impl RewardEvent {
    /// The event name the reward system is keyed by.
    pub fn as_str(self) -> &'static str {
        match self {
            RewardEvent::RankUp => "ON_PLAYER_LEVEL_UP_PARAGON",
            RewardEvent::FiveRankInterval => "ON_PLAYER_LEVEL_UP_PARAGON_5_INTERVAL",
        }
    }
}

/// The host's reward system.
pub trait RewardHooks: Send + Sync {
    fn handle_rewards(&self, character: CharacterId, event: RewardEvent);
}

/// Reward hooks for hosts without a reward system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRewards;

impl RewardHooks for NoRewards {
    fn handle_rewards(&self, _character: CharacterId, _event: RewardEvent) {}
}

/// Process-wide host state the engine reads or adjusts.
pub trait World: Send + Sync {
    /// Resolve an online character by name.
    fn find_online_by_name(&self, name: &str) -> Option<CharacterId>;

    /// Set the level cap the host enforces.
    fn set_max_player_level(&self, level: u8);
}

/// Every host seam the engine is built from.
pub struct HostServices {
    pub currency: Box<dyn CurrencyStore>,
    pub preferences: Box<dyn PreferenceStore>,
    pub experience: Box<dyn ExperienceCurve>,
    pub titles: Box<dyn TitleCatalog>,
    pub rewards: Box<dyn RewardHooks>,
    pub world: Box<dyn World>,
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
