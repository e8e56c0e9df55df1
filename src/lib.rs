//! # paragon - Uncapped Progression Past the Level Cap
//!
//! Once a character reaches the host's level cap, experience keeps flowing
//! into a paragon rank instead of a level. This crate is the engine behind
//! that tier:
//! - **Rank accessor** backed solely by the host's currency store
//! - **Experience curve** that grows with rank and stops at the rank cap
//! - **Advancement controller** that turns capped level-ups into rank-ups
//! - **Milestone rewards** and titles at configured ranks
//! - **Tier colors** with a per-character, session-cached preference
//! - **Addon bridge** answering rank queries over tunneled whispers
//!
//! ## Host Integration
//!
//! The engine owns no game state. The host implements the traits in
//! [`host`] and forwards its events:
//!
//! ```text
//! level about to change  -> ParagonEngine::on_before_level_change
//! xp for level queried   -> ParagonEngine::on_query_xp_for_level
//! chat about to be sent  -> ParagonEngine::on_before_send_chat
//! configuration reloaded -> ParagonEngine::on_config_reload
//! login / logout         -> on_character_connected / on_character_disconnected
//! ```
//!
//! ## Example
//!
//! ```rust
//! use paragon::*;
//!
//! let mut values = ConfigValues::new();
//! values.set("ParagonLevel.XpPerLevelMod", 10.0);
//! let config = ProgressionConfig::from_values(&values);
//!
//! let curve = |level: u8| u32::from(level) * 100;
//! assert_eq!(required_xp(&curve, 80, 0, &config), 8_000);
//! assert_eq!(required_xp(&curve, 80, 10, &config), 16_000);
//! assert_eq!(Tier::for_rank(120), Tier::Tier2);
//! ```
//!
//! ## Modules
//!
//! - [`character`] - Character identifier type
//! - [`config`] - Configuration values, typed config and reload slot
//! - [`host`] - Traits the host implements
//! - [`state`] - Paragon rank accessor
//! - [`curve`] - Experience curve
//! - [`advancement`] - Cap and advancement controller
//! - [`rewards`] - Milestone reward dispatch
//! - [`tier`] - Rank tiers and the tier-color preference cache
//! - [`protocol`] - Addon wire protocol
//! - [`addon`] - Addon protocol bridge
//! - [`command`] - Chat command surface
//! - [`engine`] - The engine the host talks to
//! - [`error`] - Error types

pub mod addon;
pub mod advancement;
pub mod character;
pub mod command;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod host;
pub mod protocol;
pub mod rewards;
pub mod state;
pub mod tier;

// Re-export main types for convenience
pub use character::CharacterId;
pub use config::{ConfigHandle, ConfigValues, ProgressionConfig};
pub use engine::ParagonEngine;
pub use error::{FrameError, ParagonError, StoreError};

pub use addon::{ChatDisposition, ChatMessage};
pub use advancement::{DenyReason, LevelDecision};
pub use curve::{required_xp, scale_requirement, UNREACHABLE_XP};
pub use host::{
    CurrencyStore, ExperienceCurve, HostServices, NoRewards, Player, Power, PreferenceStore,
    RewardEvent, RewardHooks, TitleCatalog, TitleEntry, World,
};
pub use rewards::{DispatchOutcome, MilestoneDispatcher};
pub use state::ProgressionState;
pub use tier::{colorize_rank, Tier, TierPreferenceCache};
