//! Addon protocol bridge.
//!
//! Sits in front of the host's chat pipeline and claims whispers that carry
//! paragon addon frames. Claimed messages are cleared so normal whisper
//! delivery never sees them; queries are answered with a raw frame written
//! straight to the asking session.

use crate::host::{Player, World};
use crate::protocol::{
    split_frame, AddonQuery, AddonReply, ChatFrame, ADDON_PREFIX, CHAT_MSG_WHISPER, LANG_ADDON,
    SMSG_MESSAGECHAT,
};
use crate::state::ProgressionState;
use tracing::{trace, warn};

/// An outgoing chat message the host is about to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub msg_type: u8,
    pub language: u32,
    pub text: String,
}

impl ChatMessage {
    pub fn new(msg_type: u8, language: u32, text: impl Into<String>) -> Self {
        Self {
            msg_type,
            language,
            text: text.into(),
        }
    }

    /// A whisper in the addon language.
    pub fn addon_whisper(text: impl Into<String>) -> Self {
        Self::new(CHAT_MSG_WHISPER, LANG_ADDON, text)
    }

    fn is_addon_whisper(&self) -> bool {
        self.msg_type == CHAT_MSG_WHISPER && self.language == LANG_ADDON
    }
}

/// What the host should do with a message after the bridge saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatDisposition {
    /// Not ours; deliver as usual.
    PassThrough,
    /// Claimed by the bridge; the text has been cleared.
    Consumed { replied: bool },
}

impl ChatDisposition {
    pub fn is_consumed(self) -> bool {
        matches!(self, ChatDisposition::Consumed { .. })
    }
}

/// Answers paragon rank queries from the addon.
pub struct AddonBridge<'a> {
    pub state: &'a ProgressionState,
    pub world: &'a dyn World,
}

impl AddonBridge<'_> {
    /// Inspect a message `player` is about to send.
    pub fn handle(&self, player: &mut dyn Player, message: &mut ChatMessage) -> ChatDisposition {
        if !message.is_addon_whisper() {
            return ChatDisposition::PassThrough;
        }
        let query = match split_frame(&message.text) {
            Some((ADDON_PREFIX, payload)) => AddonQuery::parse(payload),
            _ => return ChatDisposition::PassThrough,
        };

        message.text.clear();

        let Some(query) = query else {
            trace!(character = %player.id(), "dropped malformed paragon addon frame");
            return ChatDisposition::Consumed { replied: false };
        };

        let rank = self
            .world
            .find_online_by_name(&query.name)
            .map(|character| self.state.rank(character))
            .unwrap_or(0);

        let reply = AddonReply::new(query.name, rank);
        let frame = ChatFrame::addon_whisper_to_self(player.id(), reply.to_body());
        let bytes = match frame.encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(character = %player.id(), error = %err, "paragon addon reply not sent");
                return ChatDisposition::Consumed { replied: false };
            }
        };
        player.send_packet(SMSG_MESSAGECHAT, &bytes);
        trace!(character = %player.id(), name = %reply.name, rank, "answered paragon addon query");

        ChatDisposition::Consumed { replied: true }
    }
}
