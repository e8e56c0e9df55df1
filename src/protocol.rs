//! Addon wire protocol.
//!
//! The paragon addon talks to the engine through whispers in the reserved
//! addon language. A frame body is `PREFIX '\t' PAYLOAD`; the request payload
//! is `Q:<name>` and the reply payload is `A:<name>:<rank>`.
//!
//! Replies are written straight to the requesting session as a chat frame:
//!
//! ```text
//! +------+----------+-----------+-------+-------------+--------+---------+----+
//! | type | language | sender    | flags | receiver    | length | payload | 00 |
//! | u8   | u32 LE   | u64 LE    | u32   | u64 LE      | u32 LE | bytes   |    |
//! +------+----------+-----------+-------+-------------+--------+---------+----+
//! ```
//!
//! `length` counts the payload plus the trailing zero.

use crate::character::CharacterId;
use crate::error::FrameError;

/// Prefix that marks a frame as belonging to the paragon addon.
pub const ADDON_PREFIX: &str = "RTG_PARAGON";

/// Chat message type for whispers.
pub const CHAT_MSG_WHISPER: u8 = 0x07;

/// Language code reserved for addon traffic.
pub const LANG_ADDON: u32 = 0xFFFF_FFFF;

/// Opcode of a server chat message packet.
pub const SMSG_MESSAGECHAT: u16 = 0x0096;

const QUERY_TAG: &str = "Q:";
const ANSWER_TAG: &str = "A:";

/// Split a whisper body into `(prefix, payload)`.
///
/// Fields past the second tab are ignored. Returns `None` when there is no
/// tab at all.
///
/// # Examples
///
/// ```rust
/// use paragon::protocol::split_frame;
///
/// assert_eq!(split_frame("RTG_PARAGON\tQ:Alice"), Some(("RTG_PARAGON", "Q:Alice")));
/// assert_eq!(split_frame("RTG_PARAGON\tQ:Alice\textra"), Some(("RTG_PARAGON", "Q:Alice")));
/// assert_eq!(split_frame("hello"), None);
/// ```
pub fn split_frame(body: &str) -> Option<(&str, &str)> {
    let mut fields = body.split('\t');
    let prefix = fields.next()?;
    let payload = fields.next()?;
    Some((prefix, payload))
}

/// A rank query sent by the addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonQuery {
    pub name: String,
}

impl AddonQuery {
    /// Parse a request payload of the form `Q:<name>`.
    ///
    /// Returns `None` for any other payload, including `Q:` with no name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::protocol::AddonQuery;
    ///
    /// assert_eq!(AddonQuery::parse("Q:Alice").unwrap().name, "Alice");
    /// assert!(AddonQuery::parse("Q:").is_none());
    /// assert!(AddonQuery::parse("X:bogus").is_none());
    /// ```
    pub fn parse(payload: &str) -> Option<Self> {
        let name = payload.strip_prefix(QUERY_TAG)?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
        })
    }

    /// The full frame body for this query.
    pub fn to_body(&self) -> String {
        format!("{ADDON_PREFIX}\t{QUERY_TAG}{}", self.name)
    }
}

/// The engine's answer to an [`AddonQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonReply {
    pub name: String,
    pub rank: u32,
}

impl AddonReply {
    pub fn new(name: impl Into<String>, rank: u32) -> Self {
        Self {
            name: name.into(),
            rank,
        }
    }

    /// The full frame body, `RTG_PARAGON\tA:<name>:<rank>`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::protocol::AddonReply;
    ///
    /// assert_eq!(AddonReply::new("Alice", 37).to_body(), "RTG_PARAGON\tA:Alice:37");
    /// ```
    pub fn to_body(&self) -> String {
        format!("{ADDON_PREFIX}\t{ANSWER_TAG}{}:{}", self.name, self.rank)
    }

    /// Parse a full reply body. The rank is the field after the last colon,
    /// so names containing colons survive.
    pub fn parse_body(body: &str) -> Option<Self> {
        let (prefix, payload) = split_frame(body)?;
        if prefix != ADDON_PREFIX {
            return None;
        }
        let rest = payload.strip_prefix(ANSWER_TAG)?;
        let (name, rank) = rest.rsplit_once(':')?;
        Some(Self {
            name: name.to_string(),
            rank: rank.parse().ok()?,
        })
    }
}

/// A chat message frame as laid out on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFrame {
    pub msg_type: u8,
    pub language: u32,
    pub sender: CharacterId,
    pub flags: u32,
    pub receiver: CharacterId,
    pub body: String,
}

/// Size of the fixed fields before the body.
const HEADER_LEN: usize = 1 + 4 + 8 + 4 + 8 + 4;

impl ChatFrame {
    /// An addon whisper from a character to itself.
    pub fn addon_whisper_to_self(character: CharacterId, body: impl Into<String>) -> Self {
        Self {
            msg_type: CHAT_MSG_WHISPER,
            language: LANG_ADDON,
            sender: character,
            flags: 0,
            receiver: character,
            body: body.into(),
        }
    }

    /// Serialize to wire bytes.
    ///
    /// Fails with [`FrameError::Oversized`] when the body plus its terminator
    /// does not fit in a `u32`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use paragon::protocol::ChatFrame;
    /// use paragon::CharacterId;
    ///
    /// let bytes = ChatFrame::addon_whisper_to_self(CharacterId::new(1), "hi")
    ///     .encode()
    ///     .unwrap();
    /// assert_eq!(bytes.len(), 29 + 2 + 1);
    /// assert_eq!(bytes[0], 0x07);
    /// assert_eq!(&bytes[25..29], &3u32.to_le_bytes());
    /// assert_eq!(bytes.last(), Some(&0));
    /// ```
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let payload = self.body.as_bytes();
        let declared = declared_length(payload.len())?;
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + 1);
        out.push(self.msg_type);
        out.extend_from_slice(&self.language.to_le_bytes());
        out.extend_from_slice(&self.sender.raw().to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.receiver.raw().to_le_bytes());
        out.extend_from_slice(&declared.to_le_bytes());
        out.extend_from_slice(payload);
        out.push(0);
        Ok(out)
    }

    /// Parse wire bytes produced by [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let mut reader = Reader { bytes, pos: 0 };
        let msg_type = reader.take::<1>()?[0];
        let language = u32::from_le_bytes(reader.take()?);
        let sender = CharacterId::new(u64::from_le_bytes(reader.take()?));
        let flags = u32::from_le_bytes(reader.take()?);
        let receiver = CharacterId::new(u64::from_le_bytes(reader.take()?));
        let declared = u32::from_le_bytes(reader.take()?);

        let rest = reader.remaining();
        if declared as usize != rest.len() {
            return Err(FrameError::LengthMismatch {
                declared,
                actual: rest.len(),
            });
        }
        let (terminator, payload) = rest.split_last().ok_or(FrameError::MissingTerminator)?;
        if *terminator != 0 {
            return Err(FrameError::MissingTerminator);
        }
        let body = std::str::from_utf8(payload)
            .map_err(|_| FrameError::InvalidUtf8)?
            .to_string();

        Ok(Self {
            msg_type,
            language,
            sender,
            flags,
            receiver,
            body,
        })
    }
}

/// Value of the length field for a payload of `payload_len` bytes.
fn declared_length(payload_len: usize) -> Result<u32, FrameError> {
    payload_len
        .checked_add(1)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or(FrameError::Oversized(payload_len))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], FrameError> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or(FrameError::Truncated {
            needed: end,
            available: self.bytes.len(),
        })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}
