// SPDX-License-Identifier: MIT OR Apache-2.0
//! Streamed partial messages.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ChatMessage;

/// Discriminant of a [`MessageChunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// Fragment of a human turn.
    Human,
    /// Fragment of an AI turn.
    Ai,
    /// Fragment of a turn with an explicit role.
    Chat,
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::Chat => "chat",
        };
        f.write_str(s)
    }
}

/// A fragment of a message emitted while a reply is streamed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageChunk {
    /// Fragment of a human turn.
    Human {
        /// Text fragment.
        content: String,
    },
    /// Fragment of an AI turn.
    Ai {
        /// Text fragment.
        content: String,
    },
    /// Fragment of a turn with an explicit role.
    Chat {
        /// Literal role string.
        role: String,
        /// Text fragment.
        content: String,
    },
}

/// Error returned when two chunks of different shapes are concatenated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkMismatch {
    /// The chunks have different kinds.
    #[error("cannot append a {right} chunk to a {left} chunk")]
    Kind {
        /// Kind of the chunk being appended to.
        left: ChunkKind,
        /// Kind of the appended chunk.
        right: ChunkKind,
    },
    /// Both chunks are [`MessageChunk::Chat`] but their roles differ.
    #[error("cannot append a chat chunk with role '{right}' to one with role '{left}'")]
    Role {
        /// Role of the chunk being appended to.
        left: String,
        /// Role of the appended chunk.
        right: String,
    },
}

impl MessageChunk {
    /// Create a chunk of the given kind.
    ///
    /// `role` is only used for [`ChunkKind::Chat`].
    #[must_use]
    pub fn new(kind: ChunkKind, role: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        match kind {
            ChunkKind::Human => Self::Human { content },
            ChunkKind::Ai => Self::Ai { content },
            ChunkKind::Chat => Self::Chat {
                role: role.into(),
                content,
            },
        }
    }

    /// Create an AI chunk.
    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        Self::Ai {
            content: content.into(),
        }
    }

    /// Create a human chunk.
    #[must_use]
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// The kind of this chunk.
    pub fn kind(&self) -> ChunkKind {
        match self {
            Self::Human { .. } => ChunkKind::Human,
            Self::Ai { .. } => ChunkKind::Ai,
            Self::Chat { .. } => ChunkKind::Chat,
        }
    }

    /// The text fragment carried by this chunk.
    pub fn content(&self) -> &str {
        match self {
            Self::Human { content } | Self::Ai { content } | Self::Chat { content, .. } => content,
        }
    }

    /// Append `other`'s content to this chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkMismatch`] when the kinds (or chat roles) differ; `self`
    /// is left untouched in that case.
    pub fn append(&mut self, other: &MessageChunk) -> Result<(), ChunkMismatch> {
        match (self, other) {
            (Self::Human { content }, Self::Human { content: more })
            | (Self::Ai { content }, Self::Ai { content: more }) => {
                content.push_str(more);
                Ok(())
            }
            (
                Self::Chat { role, content },
                Self::Chat {
                    role: other_role,
                    content: more,
                },
            ) => {
                if *role != *other_role {
                    return Err(ChunkMismatch::Role {
                        left: role.clone(),
                        right: other_role.clone(),
                    });
                }
                content.push_str(more);
                Ok(())
            }
            (this, other) => Err(ChunkMismatch::Kind {
                left: this.kind(),
                right: other.kind(),
            }),
        }
    }
}

impl From<MessageChunk> for ChatMessage {
    fn from(chunk: MessageChunk) -> Self {
        match chunk {
            MessageChunk::Human { content } => ChatMessage::Human { content },
            MessageChunk::Ai { content } => ChatMessage::Ai { content },
            MessageChunk::Chat { role, content } => ChatMessage::Chat { role, content },
        }
    }
}

// ---------------------------------------------------------------------------
// ChunkAccumulator
// ---------------------------------------------------------------------------

/// Folds a sequence of chunks into a single chunk.
#[derive(Debug, Clone, Default)]
pub struct ChunkAccumulator {
    current: Option<MessageChunk>,
    count: usize,
}

impl ChunkAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkMismatch`] if `chunk` does not match the chunks seen so far.
    pub fn push(&mut self, chunk: MessageChunk) -> Result<(), ChunkMismatch> {
        match &mut self.current {
            Some(current) => current.append(&chunk)?,
            None => self.current = Some(chunk),
        }
        self.count += 1;
        Ok(())
    }

    /// Number of chunks accepted so far.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no chunk has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The concatenated chunk, if any chunk was pushed.
    pub fn finish(self) -> Option<MessageChunk> {
        self.current
    }

    /// The concatenated chunk converted into a full message.
    pub fn into_message(self) -> Option<ChatMessage> {
        self.current.map(ChatMessage::from)
    }
}
