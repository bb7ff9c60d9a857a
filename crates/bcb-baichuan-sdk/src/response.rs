// SPDX-License-Identifier: MIT OR Apache-2.0
//! Decoding of complete replies and streamed reply lines.

use bcb_core::{ChatMessage, ChunkKind, MessageChunk};
use tracing::{debug, warn};

use crate::dialect::{BaichuanResponse, BaichuanUsage};
use crate::error::{BaichuanError, Result};
use crate::lowering::{delta_to_chunk, message_from_wire};

/// A decoded, non-streamed reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    /// One message per entry in `data.messages`.
    pub generations: Vec<ChatMessage>,
    /// Token usage, when reported.
    pub usage: Option<BaichuanUsage>,
    /// Model the request was sent to.
    pub model: String,
}

/// Decode a complete reply body.
///
/// # Errors
///
/// * [`BaichuanError::Serde`] if `body` is not a valid response envelope.
/// * [`BaichuanError::Api`] if the envelope reports a non-zero code.
/// * [`BaichuanError::MalformedResponse`] if the envelope has no `data`.
pub fn parse_response(body: &str, model: &str) -> Result<ChatResult> {
    let resp: BaichuanResponse = serde_json::from_str(body)?;
    check_code(&resp)?;
    let data = resp
        .data
        .ok_or_else(|| BaichuanError::MalformedResponse("response has no `data` field".into()))?;

    Ok(ChatResult {
        generations: data.messages.iter().map(message_from_wire).collect(),
        usage: resp.usage,
        model: model.to_string(),
    })
}

fn check_code(resp: &BaichuanResponse) -> Result<()> {
    if resp.code == 0 {
        return Ok(());
    }
    warn!(target: "bcb_baichuan_sdk", code = resp.code, msg = %resp.msg, "Baichuan API returned an error");
    Err(BaichuanError::Api {
        code: resp.code,
        msg: resp.msg.clone(),
    })
}

// ---------------------------------------------------------------------------
// StreamDecoder
// ---------------------------------------------------------------------------

/// Decodes a streamed reply one line at a time.
///
/// Every non-blank line is a full response envelope whose `data.messages`
/// are deltas. Each delta becomes a chunk of the decoder's kind, fixed at
/// construction ([`ChunkKind::Ai`] by default), whatever role it carries.
#[derive(Debug, Clone)]
pub struct StreamDecoder {
    kind: ChunkKind,
    usage: Option<BaichuanUsage>,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    /// Create a decoder expecting an AI reply.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(ChunkKind::Ai)
    }

    /// Create a decoder producing chunks of `kind`.
    #[must_use]
    pub fn with_kind(kind: ChunkKind) -> Self {
        Self { kind, usage: None }
    }

    /// Kind given to every delta.
    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    /// Latest usage reported by the stream.
    pub fn usage(&self) -> Option<BaichuanUsage> {
        self.usage
    }

    /// Decode one line of the stream.
    ///
    /// Blank lines and envelopes without `data` produce no chunks.
    ///
    /// # Errors
    ///
    /// * [`BaichuanError::Serde`] if the line is not a response envelope.
    /// * [`BaichuanError::Api`] if the envelope reports a non-zero code.
    pub fn decode_line(&mut self, line: &str) -> Result<Vec<MessageChunk>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Vec::new());
        }

        let resp: BaichuanResponse = serde_json::from_str(line)?;
        check_code(&resp)?;
        if resp.usage.is_some() {
            self.usage = resp.usage;
        }

        let Some(data) = resp.data else {
            debug!(target: "bcb_baichuan_sdk", "stream line without data");
            return Ok(Vec::new());
        };

        Ok(data
            .messages
            .iter()
            .map(|delta| delta_to_chunk(delta, self.kind))
            .collect())
    }
}
