//! Paragon experience curve.
//!
//! Maps the host's standard requirement for a level onto the requirement
//! for the next paragon rank.

use crate::config::ProgressionConfig;
use crate::host::ExperienceCurve;

/// Requirement reported once a character is at the rank cap.
///
/// The host compares earned experience against this and can never reach
/// it, so no further level-up event fires.
pub const UNREACHABLE_XP: u32 = u32::MAX;

/// Experience a character at `host_level` and `rank` needs for the next rank.
///
/// # Examples
///
/// ```rust
/// use paragon::{required_xp, ProgressionConfig, UNREACHABLE_XP};
///
/// let curve = |level: u8| u32::from(level) * 1_000;
/// let config = ProgressionConfig { xp_per_rank_multiplier: 10.0, ..ProgressionConfig::default() };
///
/// assert_eq!(required_xp(&curve, 80, 0, &config), 80_000);
/// assert_eq!(required_xp(&curve, 80, 5, &config), 120_000);
/// assert_eq!(required_xp(&curve, 80, config.max_rank, &config), UNREACHABLE_XP);
/// ```
pub fn required_xp(
    curve: &dyn ExperienceCurve,
    host_level: u8,
    rank: u32,
    config: &ProgressionConfig,
) -> u32 {
    if rank >= config.max_rank {
        return UNREACHABLE_XP;
    }
    scale_requirement(curve.xp_for_level(host_level), rank, config)
}

/// Scale a standard requirement for `rank`.
///
/// * `rank >= max_rank` yields [`UNREACHABLE_XP`].
/// * A multiplier at or below 1.0 leaves `standard_xp` untouched.
/// * Otherwise `standard_xp * (1 + rank * multiplier / 100)`, truncated.
///
/// Non-decreasing in `rank` for a fixed `standard_xp`.
pub fn scale_requirement(standard_xp: u32, rank: u32, config: &ProgressionConfig) -> u32 {
    if rank >= config.max_rank {
        return UNREACHABLE_XP;
    }
    if config.xp_per_rank_multiplier <= 1.0 {
        return standard_xp;
    }

    let scale = 1.0 + f64::from(rank) * config.xp_per_rank_multiplier / 100.0;
    let scaled = (f64::from(standard_xp) * scale).trunc();

    // Reachable requirements stay strictly below the sentinel.
    if scaled >= f64::from(UNREACHABLE_XP - 1) {
        UNREACHABLE_XP - 1
    } else {
        scaled as u32
    }
}
