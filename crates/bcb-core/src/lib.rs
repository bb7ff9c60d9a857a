// SPDX-License-Identifier: MIT OR Apache-2.0
//! Chat message model shared by the Baichuan bridge crates.
//!
//! [`ChatMessage`] is the in-process representation of a single conversation
//! turn. Vendor crates lower it into their own wire shapes and lift wire
//! shapes back into it. Streamed replies are represented as
//! [`MessageChunk`]s which concatenate into a full message.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod chunk;

pub use chunk::{ChunkAccumulator, ChunkKind, ChunkMismatch, MessageChunk};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// Discriminant of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Human / user turn.
    Human,
    /// AI / assistant turn.
    Ai,
    /// System instructions.
    System,
    /// Result of a function invocation.
    Function,
    /// Message carrying an explicit, free-form role.
    Chat,
}

impl MessageKind {
    /// Stable lowercase name of the kind (e.g. `"system"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::System => "system",
            Self::Function => "function",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChatMessage
// ---------------------------------------------------------------------------

/// A single conversation turn.
///
/// Equality is structural: two messages are equal when their kind and
/// content match, plus `name` for [`ChatMessage::Function`] and `role` for
/// [`ChatMessage::Chat`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChatMessage {
    /// Human / user turn.
    Human {
        /// Text content.
        content: String,
    },
    /// AI / assistant turn.
    Ai {
        /// Text content.
        content: String,
    },
    /// System instructions.
    System {
        /// Text content.
        content: String,
    },
    /// Result of a function invocation.
    Function {
        /// Name of the function that produced the result.
        name: String,
        /// Text content.
        content: String,
    },
    /// Message with an explicit role string not covered by the other kinds.
    Chat {
        /// Literal role string.
        role: String,
        /// Text content.
        content: String,
    },
}

impl ChatMessage {
    /// Create a human message.
    #[must_use]
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Create an AI message.
    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        Self::Ai {
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create a function-result message.
    #[must_use]
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Function {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a message with an explicit role.
    #[must_use]
    pub fn chat(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Chat {
            role: role.into(),
            content: content.into(),
        }
    }

    /// The kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Human { .. } => MessageKind::Human,
            Self::Ai { .. } => MessageKind::Ai,
            Self::System { .. } => MessageKind::System,
            Self::Function { .. } => MessageKind::Function,
            Self::Chat { .. } => MessageKind::Chat,
        }
    }

    /// The text content of this message.
    pub fn content(&self) -> &str {
        match self {
            Self::Human { content }
            | Self::Ai { content }
            | Self::System { content }
            | Self::Function { content, .. }
            | Self::Chat { content, .. } => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind_and_content() {
        let cases = [
            (ChatMessage::human("a"), MessageKind::Human),
            (ChatMessage::ai("a"), MessageKind::Ai),
            (ChatMessage::system("a"), MessageKind::System),
            (ChatMessage::function("f", "a"), MessageKind::Function),
            (ChatMessage::chat("tool", "a"), MessageKind::Chat),
        ];
        for (msg, kind) in cases {
            assert_eq!(msg.kind(), kind);
            assert_eq!(msg.content(), "a");
        }
    }

    #[test]
    fn equality_includes_function_name() {
        assert_eq!(
            ChatMessage::function("foo", "bar"),
            ChatMessage::function("foo", "bar")
        );
        assert_ne!(
            ChatMessage::function("foo", "bar"),
            ChatMessage::function("baz", "bar")
        );
    }

    #[test]
    fn equality_includes_chat_role() {
        assert_ne!(ChatMessage::chat("system", "x"), ChatMessage::chat("tool", "x"));
        assert_ne!(ChatMessage::chat("system", "x"), ChatMessage::system("x"));
    }

    #[test]
    fn serde_uses_snake_case_type_tag() {
        let json = serde_json::to_value(ChatMessage::ai("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "ai", "content": "hi"}));

        let parsed: ChatMessage =
            serde_json::from_str(r#"{"type":"function","name":"f","content":"out"}"#).unwrap();
        assert_eq!(parsed, ChatMessage::function("f", "out"));
    }

    #[test]
    fn kind_display_matches_as_str() {
        assert_eq!(MessageKind::System.to_string(), "system");
        assert_eq!(MessageKind::Ai.to_string(), MessageKind::Ai.as_str());
    }
}
