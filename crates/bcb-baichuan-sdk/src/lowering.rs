// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lowering between [`ChatMessage`]s and the Baichuan message format.
//!
//! The two directions are asymmetric. Outbound, only human and
//! AI turns have a wire form and everything else is rejected. Inbound, every
//! role is accepted and unknown roles survive as [`ChatMessage::Chat`].

use bcb_core::{ChatMessage, ChunkKind, MessageChunk};
use tracing::debug;

use crate::dialect::BaichuanMessage;
use crate::error::{BaichuanError, Result};

/// Wire role of a human turn.
pub const ROLE_USER: &str = "user";

/// Wire role of an AI turn.
pub const ROLE_ASSISTANT: &str = "assistant";

/// Convert a [`ChatMessage`] into a [`BaichuanMessage`].
///
/// # Errors
///
/// Returns [`BaichuanError::UnsupportedMessageType`] for every kind other
/// than human and AI.
pub fn message_to_wire(message: &ChatMessage) -> Result<BaichuanMessage> {
    match message {
        ChatMessage::Human { content } => Ok(BaichuanMessage::new(ROLE_USER, content.as_str())),
        ChatMessage::Ai { content } => Ok(BaichuanMessage::new(ROLE_ASSISTANT, content.as_str())),
        other => Err(BaichuanError::UnsupportedMessageType { kind: other.kind() }),
    }
}

/// Convert a conversation into Baichuan messages, stopping at the first
/// unsupported message.
///
/// # Errors
///
/// Returns [`BaichuanError::UnsupportedMessageType`] as [`message_to_wire`] does.
pub fn messages_to_wire(messages: &[ChatMessage]) -> Result<Vec<BaichuanMessage>> {
    messages.iter().map(message_to_wire).collect()
}

/// Convert a [`BaichuanMessage`] into a [`ChatMessage`].
///
/// Never fails: roles other than `user` and `assistant` are kept verbatim in
/// a [`ChatMessage::Chat`].
#[must_use]
pub fn message_from_wire(message: &BaichuanMessage) -> ChatMessage {
    match message.role.as_str() {
        ROLE_USER => ChatMessage::human(message.content.as_str()),
        ROLE_ASSISTANT => ChatMessage::ai(message.content.as_str()),
        role => {
            debug!(target: "bcb_baichuan_sdk", role, "keeping unrecognised role");
            ChatMessage::chat(role, message.content.as_str())
        }
    }
}

/// Convert a streamed delta into a chunk of the requested kind.
///
/// The delta's role does not influence the kind; the caller knows which
/// message the stream belongs to. For [`ChunkKind::Chat`] the delta's role
/// becomes the chunk's role.
#[must_use]
pub fn delta_to_chunk(delta: &BaichuanMessage, kind: ChunkKind) -> MessageChunk {
    MessageChunk::new(kind, delta.role.as_str(), delta.content.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_lowers_to_user() {
        let wire = message_to_wire(&ChatMessage::human("foo")).unwrap();
        assert_eq!(wire, BaichuanMessage::new("user", "foo"));
    }

    #[test]
    fn ai_lowers_to_assistant() {
        let wire = message_to_wire(&ChatMessage::ai("foo")).unwrap();
        assert_eq!(wire, BaichuanMessage::new("assistant", "foo"));
    }

    #[test]
    fn system_is_rejected() {
        let err = message_to_wire(&ChatMessage::system("foo")).unwrap_err();
        assert!(err.to_string().contains("Got unknown type"));
        assert!(err.to_string().contains("system"));
    }

    #[test]
    fn chat_with_user_role_is_still_rejected() {
        let err = message_to_wire(&ChatMessage::chat("user", "foo")).unwrap_err();
        assert!(matches!(
            err,
            BaichuanError::UnsupportedMessageType {
                kind: bcb_core::MessageKind::Chat
            }
        ));
    }

    #[test]
    fn unknown_role_is_preserved() {
        let msg = message_from_wire(&BaichuanMessage::new("tool", "out"));
        assert_eq!(msg, ChatMessage::chat("tool", "out"));
    }

    #[test]
    fn delta_role_does_not_override_kind() {
        let chunk = delta_to_chunk(&BaichuanMessage::new("user", "x"), ChunkKind::Ai);
        assert_eq!(chunk, MessageChunk::ai("x"));
    }

    #[test]
    fn chat_delta_takes_role_from_wire() {
        let chunk = delta_to_chunk(&BaichuanMessage::new("system", "x"), ChunkKind::Chat);
        assert_eq!(chunk, MessageChunk::new(ChunkKind::Chat, "system", "x"));
    }
}
