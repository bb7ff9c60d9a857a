// SPDX-License-Identifier: MIT OR Apache-2.0
//! Assembly of signed chat requests.
//!
//! [`build_request`] produces everything a transport needs (URL, headers and
//! the exact body text) without performing any I/O.

use bcb_core::ChatMessage;
use std::fmt;
use tracing::debug;

use crate::dialect::{BaichuanConfig, BaichuanParameters, BaichuanRequest};
use crate::error::{BaichuanError, Result};
use crate::lowering::messages_to_wire;
use crate::signing::{SIGN_ALGO, SecretKey, canonical_json, sign_body};

/// Header carrying the request timestamp.
pub const HEADER_TIMESTAMP: &str = "X-BC-Timestamp";

/// Header carrying the request signature.
pub const HEADER_SIGNATURE: &str = "X-BC-Signature";

/// Header naming the signature algorithm.
pub const HEADER_SIGN_ALGO: &str = "X-BC-Sign-Algo";

const HEADER_AUTHORIZATION: &str = "Authorization";
const REDACTED: &str = "[REDACTED]";

/// A fully signed request, ready to hand to an HTTP client.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Endpoint URL.
    pub url: String,
    /// Headers in the order they should be sent.
    pub headers: Vec<(String, String)>,
    /// Request body; the signature covers exactly these bytes.
    pub body: String,
    /// Unix timestamp (seconds) the request was signed with.
    pub timestamp: i64,
}

impl SignedRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `X-BC-Signature` header value.
    pub fn signature(&self) -> Option<&str> {
        self.header(HEADER_SIGNATURE)
    }

    /// Headers with the `Authorization` value replaced by a placeholder.
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(k, v)| {
                if k.eq_ignore_ascii_case(HEADER_AUTHORIZATION) {
                    (k.clone(), REDACTED.to_string())
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedRequest")
            .field("url", &self.url)
            .field("headers", &self.redacted_headers())
            .field("body", &self.body)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Current Unix time in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Chat endpoint under `api_base`; streaming requests use `/stream/chat`.
pub fn endpoint_url(api_base: &str, streaming: bool) -> String {
    let base = api_base.trim_end_matches('/');
    if streaming {
        format!("{base}/stream/chat")
    } else {
        format!("{base}/chat")
    }
}

/// Build the request body for `messages` using the config's model and
/// parameters.
///
/// # Errors
///
/// * [`BaichuanError::UnsupportedMessageType`] if any message has no wire
///   form.
/// * [`BaichuanError::ParameterCollision`] if an extra parameter repeats a
///   built-in one, which would put a duplicate key in the signed body.
pub fn build_payload(config: &BaichuanConfig, messages: &[ChatMessage]) -> Result<BaichuanRequest> {
    if let Some(key) = BaichuanParameters::FIELDS
        .iter()
        .find(|name| config.parameters.extra.contains_key(**name))
    {
        return Err(BaichuanError::ParameterCollision((*key).to_string()));
    }
    Ok(BaichuanRequest {
        model: config.model.clone(),
        messages: messages_to_wire(messages)?,
        parameters: config.parameters.clone(),
    })
}

/// Build and sign a chat request at `timestamp`.
///
/// # Errors
///
/// * [`BaichuanError::MissingCredential`] when the API key or secret key is
///   absent or empty.
/// * [`BaichuanError::UnsupportedMessageType`] if any message has no wire form.
/// * [`BaichuanError::ParameterCollision`] as for [`build_payload`].
/// * [`BaichuanError::Serde`] if the body cannot be serialized.
pub fn build_request(
    config: &BaichuanConfig,
    messages: &[ChatMessage],
    timestamp: i64,
) -> Result<SignedRequest> {
    let api_key = require(config.api_key.as_ref(), "api_key")?;
    let secret_key = require(config.secret_key.as_ref(), "secret_key")?;

    let payload = build_payload(config, messages)?;
    let body = canonical_json(&payload)?;
    let signature = sign_body(secret_key, &body, timestamp);
    let url = endpoint_url(&config.api_base, config.streaming);

    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        (
            HEADER_AUTHORIZATION.to_string(),
            format!("Bearer {}", api_key.expose()),
        ),
        (HEADER_TIMESTAMP.to_string(), timestamp.to_string()),
        (HEADER_SIGNATURE.to_string(), signature),
        (HEADER_SIGN_ALGO.to_string(), SIGN_ALGO.to_string()),
    ];
    headers.extend(config.headers.iter().cloned());

    debug!(
        target: "bcb_baichuan_sdk",
        %url,
        messages = payload.messages.len(),
        timestamp,
        "built signed request"
    );

    Ok(SignedRequest {
        url,
        headers,
        body,
        timestamp,
    })
}

fn require<'a>(key: Option<&'a SecretKey>, name: &'static str) -> Result<&'a SecretKey> {
    match key {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(BaichuanError::MissingCredential(name)),
    }
}
