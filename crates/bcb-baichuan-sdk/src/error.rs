// SPDX-License-Identifier: MIT OR Apache-2.0

use bcb_core::MessageKind;

/// Errors produced by the Baichuan dialect.
#[derive(Debug, thiserror::Error)]
pub enum BaichuanError {
    /// The message kind has no outbound wire representation.
    #[error("Got unknown type {kind} message; only human and ai messages can be sent")]
    UnsupportedMessageType {
        /// Kind of the rejected message.
        kind: MessageKind,
    },

    /// A credential required to sign the request is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// An extra parameter reuses the name of a built-in sampling parameter.
    #[error("extra parameter '{0}' collides with a built-in parameter")]
    ParameterCollision(String),

    /// The API answered with a non-zero status code.
    #[error("Baichuan API error {code}: {msg}")]
    Api {
        /// Status code reported in the response envelope.
        code: i64,
        /// Error message reported in the response envelope.
        msg: String,
    },

    /// The response decoded but lacks a required field.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Serialization / deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result alias for Baichuan dialect operations.
pub type Result<T> = std::result::Result<T, BaichuanError>;
