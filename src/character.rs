//! Character identifier module.
//!
//! Provides the `CharacterId` type, the host's stable per-character key.
//! Every store lookup, cache entry and wire frame is addressed by it.

use serde::{Deserialize, Serialize};

/// Stable identifier of a character, as assigned by the host.
///
/// The raw value is the same 64-bit identifier the host writes into chat
/// frames, so it can be placed on the wire unchanged.
///
/// # Examples
///
/// ```rust
/// use paragon::CharacterId;
///
/// let id = CharacterId::new(42);
/// let same: CharacterId = 42u64.into();
///
/// assert_eq!(id, same);
/// assert_eq!(id.raw(), 42);
/// ```
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(u64);

impl CharacterId {
    /// Wrap a raw host identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for CharacterId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
