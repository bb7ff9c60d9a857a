// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations for the `bcb` CLI.
//!
//! Each command takes its input as text and returns its output as text so it
//! can be tested without spawning the binary.

use anyhow::{Context, Result};
use bcb_baichuan_sdk::dialect::{BaichuanConfig, BaichuanMessage};
use bcb_baichuan_sdk::lowering::{message_from_wire, messages_to_wire};
use bcb_baichuan_sdk::request::build_request;
use bcb_baichuan_sdk::signature;
use bcb_core::ChatMessage;
use serde_json::{Value as JsonValue, json};
use std::io::Read;
use std::path::Path;

/// Direction of a `convert` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    /// Typed messages to `{role, content}` wire messages.
    ToWire,
    /// Wire messages to typed messages.
    FromWire,
}

/// Read a file, or stdin when `source` is `-`.
pub fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        return Ok(buf);
    }
    let path = Path::new(source);
    std::fs::read_to_string(path).with_context(|| format!("read file '{}'", path.display()))
}

/// Sign a JSON payload with the configured secret key.
pub fn sign(config: &BaichuanConfig, payload: &str, timestamp: i64) -> Result<String> {
    let secret_key = config
        .secret_key
        .as_ref()
        .filter(|k| !k.is_empty())
        .context("no secret key configured; set BAICHUAN_SECRET_KEY or [baichuan].secret_key")?;
    let payload: JsonValue = serde_json::from_str(payload).context("parse payload JSON")?;
    Ok(signature(secret_key, &payload, timestamp)?)
}

/// Build a signed request and render it as pretty JSON.
///
/// The `Authorization` header is redacted in the output.
pub fn request(config: &BaichuanConfig, messages: &str, timestamp: i64) -> Result<String> {
    let messages: Vec<ChatMessage> =
        serde_json::from_str(messages).context("parse messages JSON")?;
    let req = build_request(config, &messages, timestamp)?;
    let headers = req.redacted_headers();
    let out = json!({
        "url": req.url,
        "headers": headers,
        "body": req.body,
        "timestamp": req.timestamp,
    });
    serde_json::to_string_pretty(&out).context("serialize request")
}

/// Convert a JSON array of messages in the given direction.
pub fn convert(direction: Direction, input: &str) -> Result<String> {
    let out = match direction {
        Direction::ToWire => {
            let messages: Vec<ChatMessage> =
                serde_json::from_str(input).context("parse typed messages")?;
            serde_json::to_value(messages_to_wire(&messages)?)?
        }
        Direction::FromWire => {
            let messages: Vec<BaichuanMessage> =
                serde_json::from_str(input).context("parse wire messages")?;
            let typed: Vec<ChatMessage> = messages.iter().map(message_from_wire).collect();
            serde_json::to_value(typed)?
        }
    };
    serde_json::to_string_pretty(&out).context("serialize output")
}
