//! Error types for paragon progression.
//!
//! Internal components report failures through `ParagonError`. The engine
//! never lets these cross into the host: each handler turns them into a
//! safe default and a log record.

use crate::character::CharacterId;
use thiserror::Error;

/// A failure reported by one of the host's external stores.
///
/// # Examples
///
/// ```rust
/// use paragon::StoreError;
///
/// let err = StoreError::Unavailable("connection reset".into());
/// assert_eq!(err.to_string(), "Store unavailable: connection reset");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or refused the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something the engine cannot use.
    #[error("Store returned an invalid record: {0}")]
    InvalidRecord(String),
}

/// Reasons a byte buffer is not a well-formed chat frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer ended before a fixed-width field.
    #[error("Frame truncated: needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },

    /// The declared message length disagrees with the buffer.
    #[error("Frame length mismatch: header says {declared}, body has {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    /// The message body is not terminated by a zero byte.
    #[error("Frame body is not zero-terminated")]
    MissingTerminator,

    /// The message body is not valid UTF-8.
    #[error("Frame body is not valid UTF-8")]
    InvalidUtf8,

    /// The body is too long for the 32-bit length field.
    #[error("Frame body of {0} bytes does not fit the length field")]
    Oversized(usize),
}

/// Errors that can occur inside the paragon engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParagonError {
    /// The currency store failed while reading or incrementing a rank.
    #[error("Paragon rank store failed for character {character}: {source}")]
    RankStore {
        character: CharacterId,
        #[source]
        source: StoreError,
    },

    /// The preference store failed while loading or saving a preference.
    #[error("Preference store failed for character {character}: {source}")]
    PreferenceStore {
        character: CharacterId,
        #[source]
        source: StoreError,
    },

    /// A configured milestone title does not exist in the title catalog.
    #[error("Title {0} does not exist")]
    UnknownTitle(u32),

    /// The title catalog failed while resolving or granting a title.
    #[error("Title catalog failed for title {title}: {source}")]
    TitleCatalog {
        title: u32,
        #[source]
        source: StoreError,
    },

    /// A configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A chat frame could not be decoded.
    #[error(transparent)]
    Frame(#[from] FrameError),
}
