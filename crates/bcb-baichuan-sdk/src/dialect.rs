// SPDX-License-Identifier: MIT OR Apache-2.0
//! Baichuan dialect: config and request/response wire types.

use serde::{Deserialize, Serialize};

use crate::signing::SecretKey;

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.baichuan-ai.com/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "Baichuan2-53B";

/// Vendor-specific configuration for the Baichuan chat API.
///
/// Credentials are held as [`SecretKey`]s, so the `Debug` output never shows
/// them and the config cannot be serialized back out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BaichuanConfig {
    /// Base URL for the API, without the `/chat` suffix.
    pub api_base: String,

    /// API key sent as a bearer token.
    pub api_key: Option<SecretKey>,

    /// Secret used to sign requests.
    pub secret_key: Option<SecretKey>,

    /// Model identifier (e.g. `Baichuan2-53B`).
    pub model: String,

    /// Whether requests target the streaming endpoint.
    pub streaming: bool,

    /// Request timeout handed to the transport, in seconds.
    pub request_timeout_secs: u64,

    /// Sampling parameters sent with every request.
    pub parameters: BaichuanParameters,

    /// Extra headers appended after the signed headers.
    pub headers: Vec<(String, String)>,
}

impl Default for BaichuanConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            api_key: None,
            secret_key: None,
            model: DEFAULT_MODEL.into(),
            streaming: false,
            request_timeout_secs: 60,
            parameters: BaichuanParameters::default(),
            headers: Vec::new(),
        }
    }
}

/// Sampling parameters of a chat request.
///
/// Fields serialize in declaration order, followed by `extra` in insertion
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaichuanParameters {
    /// Sampling temperature (0.0–1.0).
    pub temperature: f64,
    /// Nucleus sampling mass (0.0–1.0).
    pub top_p: f64,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Whether the service may augment answers with web search.
    pub with_search_enhance: bool,
    /// Additional model keyword arguments passed through verbatim.
    ///
    /// Keys must not repeat a built-in field name; see
    /// [`BaichuanParameters::FIELDS`].
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BaichuanParameters {
    /// Names of the built-in fields, in serialization order.
    pub const FIELDS: [&'static str; 4] = ["temperature", "top_p", "top_k", "with_search_enhance"];
}

impl Default for BaichuanParameters {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_p: 0.85,
            top_k: 5,
            with_search_enhance: false,
            extra: serde_json::Map::new(),
        }
    }
}

/// A single message in the Baichuan conversation format.
///
/// Also used for streamed deltas, where either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaichuanMessage {
    /// `"user"`, `"assistant"`, or any role the service sends back.
    #[serde(default)]
    pub role: String,
    /// Text content.
    #[serde(default)]
    pub content: String,
}

impl BaichuanMessage {
    /// Create a message from a role and content.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Body of a chat request. Field order is part of the signed encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaichuanRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<BaichuanMessage>,
    /// Sampling parameters.
    pub parameters: BaichuanParameters,
}

/// Response envelope, used for complete replies and for every streamed line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaichuanResponse {
    /// `0` on success.
    #[serde(default)]
    pub code: i64,
    /// Status message; carries the error text when `code != 0`.
    #[serde(default)]
    pub msg: String,
    /// Reply payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BaichuanData>,
    /// Token usage, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<BaichuanUsage>,
}

/// Reply payload of a [`BaichuanResponse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaichuanData {
    /// Reply messages (deltas when streaming).
    #[serde(default)]
    pub messages: Vec<BaichuanMessage>,
}

/// Token usage reported by the Baichuan API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaichuanUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u64,
    /// Tokens generated in the answer.
    pub answer_tokens: u64,
    /// Prompt plus answer tokens.
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = BaichuanConfig::default();
        assert!(cfg.api_base.starts_with("https://"));
        assert_eq!(cfg.model, "Baichuan2-53B");
        assert!(cfg.api_key.is_none());
        assert!(cfg.secret_key.is_none());
        assert!(!cfg.streaming);
        assert_eq!(cfg.request_timeout_secs, 60);
    }

    #[test]
    fn default_parameters_match_service_defaults() {
        let p = BaichuanParameters::default();
        assert_eq!(p.temperature, 0.3);
        assert_eq!(p.top_p, 0.85);
        assert_eq!(p.top_k, 5);
        assert!(!p.with_search_enhance);
        assert!(p.extra.is_empty());
    }

    #[test]
    fn parameters_serialize_extra_after_fixed_fields() {
        let mut p = BaichuanParameters::default();
        p.extra.insert("zeta".into(), serde_json::json!(1));
        p.extra.insert("alpha".into(), serde_json::json!(2));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(
            json,
            r#"{"temperature":0.3,"top_p":0.85,"top_k":5,"with_search_enhance":false,"zeta":1,"alpha":2}"#
        );
    }

    #[test]
    fn message_fields_default_to_empty() {
        let msg: BaichuanMessage = serde_json::from_str(r#"{"role":"assistant"}"#).unwrap();
        assert_eq!(msg, BaichuanMessage::new("assistant", ""));

        let delta: BaichuanMessage = serde_json::from_str(r#"{"content":"lo"}"#).unwrap();
        assert_eq!(delta, BaichuanMessage::new("", "lo"));
    }

    #[test]
    fn response_envelope_parses_usage() {
        let resp: BaichuanResponse = serde_json::from_str(
            r#"{"code":0,"msg":"success","data":{"messages":[{"role":"assistant","content":"hi"}]},
                "usage":{"prompt_tokens":3,"answer_tokens":1,"total_tokens":4}}"#,
        )
        .unwrap();
        assert_eq!(resp.code, 0);
        assert_eq!(resp.data.unwrap().messages.len(), 1);
        assert_eq!(resp.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let cfg: BaichuanConfig =
            serde_json::from_str(r#"{"model":"Baichuan2","secret_key":"s3cr3t"}"#).unwrap();
        assert_eq!(cfg.model, "Baichuan2");
        assert_eq!(cfg.secret_key, Some(SecretKey::new("s3cr3t")));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn config_debug_hides_credentials() {
        let cfg = BaichuanConfig {
            api_key: Some(SecretKey::new("api-key-value")),
            secret_key: Some(SecretKey::new("secret-key-value")),
            ..BaichuanConfig::default()
        };
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("api-key-value"));
        assert!(!debug.contains("secret-key-value"));
    }
}
