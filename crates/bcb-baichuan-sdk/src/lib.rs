// SPDX-License-Identifier: MIT OR Apache-2.0
//! Baichuan chat API dialect.
//!
//! * [`lowering`] maps [`bcb_core::ChatMessage`]s to and from the
//!   `{role, content}` wire shape, including streamed deltas.
//! * [`signing`] computes the `X-BC-Signature` request signature.
//! * [`request`] assembles a fully signed request description.
//! * [`response`] decodes complete replies and streamed reply lines.
//!
//! Nothing here performs I/O; callers bring their own HTTP transport.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod dialect;
pub mod lowering;
pub mod request;
pub mod response;
pub mod signing;

mod error;

pub use error::{BaichuanError, Result};
pub use signing::{SecretKey, signature};
