//! Shared types for hookgate, the push-triggered deployment agent.
//!
//! - [`signature`]: the `X-Hub-Signature-256` HMAC-SHA256 scheme.
//! - [`objects`]: push payload and JSON response bodies.
//! - `client` (feature `client`): a signing HTTP client for `POST /webhook`.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
